//! moodlog-cli — terminal front end for the mood journal
//!
//! # Subcommands
//! - `submit <text...> [--json]`   — classify a mood statement and save it
//! - `analyze [--json]`            — show when you tend to feel happiest / saddest
//! - `history [-n <limit>] [--json]` — list recent entries
//!
//! Logs go to stderr; stdout carries only the rendered result (or JSON).

use std::fmt::Write as _;

use clap::{Parser, Subcommand};
use moodlog_core::analysis::DistributionTable;
use moodlog_core::ipc::{MoodCommand, MoodEvent, DEFAULT_HISTORY_LIMIT};
use moodlog_core::models::TIMESTAMP_FORMAT;
use moodlog_core::{
    create_classifier, router, Journal, MoodConfig, MoodRecord, MoodStore, PatternReport,
    Sentiment, Submission,
};
use tracing_subscriber::{fmt, EnvFilter};

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━";
const SUGGESTION_MARKS: [&str; 3] = ["🌟", "⭐", "✨"];

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Debug, Parser)]
#[command(
    name = "moodlog-cli",
    version,
    about = "Mood journal — record how you feel, get a supportive reply, see your patterns"
)]
struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, default_value = "moodlog.toml")]
    config: String,

    /// Print the result as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Record how you are feeling right now
    Submit {
        /// Free-text mood statement
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Show mood patterns by day of week and time of day
    Analyze,

    /// List recent entries
    History {
        /// Number of entries to show
        #[arg(short = 'n', long, default_value_t = DEFAULT_HISTORY_LIMIT)]
        limit: usize,
    },
}

impl Commands {
    fn into_command(self) -> MoodCommand {
        match self {
            Commands::Submit { text } => MoodCommand::Submit {
                text: text.join(" "),
            },
            Commands::Analyze => MoodCommand::Analyze,
            Commands::History { limit } => MoodCommand::History { limit: Some(limit) },
        }
    }
}

// ============================================================================
// Rendering
// ============================================================================

fn title_case(sentiment: Sentiment) -> String {
    let label = sentiment.as_str();
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn render_submission(submission: &Submission) -> String {
    let mut out = String::new();

    match &submission.classification {
        Some(c) => {
            let _ = writeln!(out, "━━━ Mood Analysis ━━━");
            let _ = writeln!(out, "Detected Mood: {}", title_case(c.sentiment));
            let _ = writeln!(out, "Confidence: {:.2}%", c.confidence * 100.0);

            if let Some(message) = &c.supportive_message {
                let _ = writeln!(out, "\n💌 A Note For You 💌\n{}", RULE);
                let _ = writeln!(out, "{}", message);
                let _ = writeln!(out, "{}", RULE);
            }

            if !c.activity_suggestions.is_empty() {
                let _ = writeln!(out, "\n✨ Things You Could Try ✨\n{}", RULE);
                for (i, activity) in c.activity_suggestions.iter().enumerate() {
                    let mark = SUGGESTION_MARKS[i % SUGGESTION_MARKS.len()];
                    let _ = writeln!(out, "  {} {}", mark, activity);
                }
                let _ = writeln!(out, "{}", RULE);
            }
        }
        None => {
            let notice = submission
                .notice
                .as_deref()
                .unwrap_or("Mood analysis is unavailable. Your entry was saved.");
            let _ = writeln!(out, "{}", notice);
        }
    }

    let _ = writeln!(
        out,
        "\nSaved at {} as '{}'.",
        submission.record.timestamp.format(TIMESTAMP_FORMAT),
        submission.record.sentiment
    );
    out
}

fn render_table<K>(title: &str, bucket_header: &str, table: &DistributionTable<K>) -> String
where
    K: Ord + Copy + std::fmt::Display,
{
    let mut out = String::new();
    let _ = writeln!(out, "{}", title);

    let sentiments = table.sentiments();
    let _ = write!(out, "{:<10}", bucket_header);
    for s in &sentiments {
        let _ = write!(out, " {:>8}", s.as_str());
    }
    let _ = writeln!(out);

    for bucket in table.buckets() {
        let _ = write!(out, "{:<10}", bucket.to_string());
        for s in &sentiments {
            let _ = write!(out, " {:>8}", table.count(bucket, *s));
        }
        let _ = writeln!(out);
    }
    out
}

fn render_report(report: &PatternReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Mood Pattern Analysis ({} entries)\n", report.total_records);
    let _ = writeln!(
        out,
        "Most Happy Day: {} (Count: {})",
        report.happiest_day, report.happiest_day.count
    );
    let _ = writeln!(
        out,
        "Happiest Time: {} (Count: {})",
        report.happiest_time, report.happiest_time.count
    );
    let _ = writeln!(
        out,
        "Most Sad Time: {} (Count: {})\n",
        report.saddest_time, report.saddest_time.count
    );
    out.push_str(&render_table(
        "Mood Distribution by Day of Week",
        "Day",
        &report.day_distribution,
    ));
    out.push('\n');
    out.push_str(&render_table(
        "Mood Distribution by Time of Day",
        "Time",
        &report.time_distribution,
    ));
    out
}

fn render_history(records: &[MoodRecord]) -> String {
    if records.is_empty() {
        return "No entries yet.\n".to_string();
    }
    let mut out = String::new();
    for r in records {
        let first_line = r.raw_text.lines().next().unwrap_or("");
        let _ = writeln!(
            out,
            "{}  {:<8} {}",
            r.timestamp.format(TIMESTAMP_FORMAT),
            r.sentiment.as_str(),
            first_line
        );
    }
    out
}

fn render_event(event: &MoodEvent) -> String {
    match event {
        MoodEvent::ResultDisplay(submission) => render_submission(submission),
        MoodEvent::AnalysisDisplay(report) => render_report(report),
        MoodEvent::HistoryDisplay { records } => render_history(records),
        MoodEvent::Info { message } => format!("{}\n", message),
        MoodEvent::Error { message } => format!("Error: {}\n", message),
    }
}

// ============================================================================
// Main
// ============================================================================

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli, config: MoodConfig) -> anyhow::Result<i32> {
    let log_path = config.log_path()?;

    // Only submissions need the classification service.
    let classifier = match cli.command {
        Commands::Submit { .. } => match create_classifier(&config.classifier) {
            Ok(c) => Some(c),
            Err(e) => {
                tracing::warn!(error = %e, "Classification service unavailable");
                None
            }
        },
        _ => None,
    };

    let journal = Journal::new(MoodStore::new(log_path), classifier);
    let event = router::handle_command(cli.command.into_command(), &journal).await;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&event)?);
    } else if event.is_error() {
        eprint!("{}", render_event(&event));
    } else {
        print!("{}", render_event(&event));
    }

    Ok(if event.is_error() { 1 } else { 0 })
}

#[tokio::main]
async fn main() {
    // Load .env file if present (the API key usually lives there)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = match MoodConfig::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("moodlog-cli: failed to load config from {}: {}", cli.config, e);
            std::process::exit(1);
        }
    };

    init_tracing(&config.service.log_level);

    let code = match run(cli, config).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("moodlog-cli: {:#}", e);
            1
        }
    };
    std::process::exit(code);
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use moodlog_core::{analyze_records, Classification};

    fn record(day: u32, hour: u32, text: &str, sentiment: Sentiment) -> MoodRecord {
        let ts = NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap();
        MoodRecord::at(ts, text, sentiment)
    }

    #[test]
    fn test_submit_joins_words() {
        let cli = Cli::try_parse_from(["moodlog-cli", "submit", "pretty", "good", "today"]).unwrap();
        assert_eq!(
            cli.command.into_command(),
            MoodCommand::Submit {
                text: "pretty good today".to_string()
            }
        );
    }

    #[test]
    fn test_submit_requires_text() {
        assert!(Cli::try_parse_from(["moodlog-cli", "submit"]).is_err());
    }

    #[test]
    fn test_global_flags_and_history_limit() {
        let cli = Cli::try_parse_from(["moodlog-cli", "-c", "alt.toml", "history", "-n", "3", "--json"])
            .unwrap();
        assert!(cli.json);
        assert_eq!(cli.config, "alt.toml");
        assert_eq!(
            cli.command.into_command(),
            MoodCommand::History { limit: Some(3) }
        );
    }

    #[test]
    fn test_render_classified_submission() {
        let submission = Submission {
            record: record(4, 9, "sunny walk", Sentiment::Happy),
            classification: Some(Classification {
                sentiment: Sentiment::Happy,
                confidence: 0.8,
                supportive_message: Some("Lovely.".to_string()),
                activity_suggestions: vec![
                    "Picnic".to_string(),
                    "Read outside".to_string(),
                    "Bike ride".to_string(),
                    "Call mum".to_string(),
                ],
            }),
            notice: None,
        };
        let text = render_submission(&submission);

        assert!(text.contains("Detected Mood: Happy"));
        assert!(text.contains("Confidence: 80.00%"));
        assert!(text.contains("Lovely."));
        assert!(text.contains("  🌟 Picnic"));
        assert!(text.contains("  ✨ Bike ride"));
        assert!(text.contains("  🌟 Call mum"));
        assert!(text.contains("Saved at 2024-03-04 09:00:00 as 'happy'."));
    }

    #[test]
    fn test_render_degraded_submission_shows_notice() {
        let submission = Submission {
            record: record(4, 9, "meh", Sentiment::Unknown),
            classification: None,
            notice: Some("Mood analysis is temporarily unavailable.".to_string()),
        };
        let text = render_submission(&submission);
        assert!(text.starts_with("Mood analysis is temporarily unavailable."));
        assert!(text.contains("as 'unknown'"));
        assert!(!text.contains("Detected Mood"));
    }

    #[test]
    fn test_render_report() {
        let records = vec![
            record(4, 6, "a", Sentiment::Happy),
            record(4, 13, "b", Sentiment::Sad),
            record(5, 19, "c", Sentiment::Happy),
        ];
        let report = analyze_records(&records).unwrap();
        let text = render_report(&report);

        assert!(text.contains("Most Happy Day: Monday (Count: 1)"));
        assert!(text.contains("Happiest Time: Morning (Count: 1)"));
        assert!(text.contains("Most Sad Time: Afternoon (Count: 1)"));
        assert!(text.contains("Mood Distribution by Day of Week"));
        assert!(text.contains("Tuesday"));
    }

    #[test]
    fn test_render_report_without_happy_entries() {
        let report = analyze_records(&[record(6, 23, "low", Sentiment::Sad)]).unwrap();
        let text = render_report(&report);
        assert!(text.contains("Most Happy Day: Not enough data (Count: 0)"));
        assert!(text.contains("Most Sad Time: Night (Count: 1)"));
    }

    #[test]
    fn test_render_history_uses_first_line() {
        let records = vec![record(7, 21, "first line\nsecond line", Sentiment::Neutral)];
        let text = render_history(&records);
        assert_eq!(text, "2024-03-07 21:00:00  neutral  first line\n");
        assert_eq!(render_history(&[]), "No entries yet.\n");
    }

    #[test]
    fn test_render_info_and_error() {
        assert_eq!(render_event(&MoodEvent::info("No data")), "No data\n");
        assert_eq!(render_event(&MoodEvent::error("disk full")), "Error: disk full\n");
    }
}
