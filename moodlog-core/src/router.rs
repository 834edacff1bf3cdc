use crate::error::MoodError;
use crate::ipc::{MoodCommand, MoodEvent, DEFAULT_HISTORY_LIMIT};
use crate::journal::Journal;

/// Run one command against the journal. Never fails: errors become events.
pub async fn handle_command(command: MoodCommand, journal: &Journal) -> MoodEvent {
    match dispatch(command, journal).await {
        Ok(event) => event,
        Err(e) => {
            if e.is_informational() {
                tracing::info!("{}", e);
            } else {
                tracing::error!(error = %e, "Command failed");
            }
            MoodEvent::from_error(&e)
        }
    }
}

async fn dispatch(command: MoodCommand, journal: &Journal) -> Result<MoodEvent, MoodError> {
    match command {
        MoodCommand::Submit { text } => {
            let submission = journal.submit(&text).await?;
            Ok(MoodEvent::ResultDisplay(submission))
        }
        MoodCommand::Analyze => {
            let report = journal.analyze()?;
            Ok(MoodEvent::AnalysisDisplay(report))
        }
        MoodCommand::History { limit } => {
            let records = journal.history(limit.unwrap_or(DEFAULT_HISTORY_LIMIT))?;
            Ok(MoodEvent::HistoryDisplay { records })
        }
    }
}
