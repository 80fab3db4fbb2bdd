use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

mod admin;
mod charts;
mod config;
mod feedback;
mod matcher;
mod models;
mod profile;
mod report;
mod roster;
mod visitor_log;

use config::Settings;
use models::{MatchResult, Roster};
use roster::Workbook;

#[derive(Parser)]
#[command(name = "section-results")]
#[command(about = "Student results lookup and feedback per class section", long_about = None)]
struct Cli {
    /// Roster CSV file or directory of section CSVs
    #[arg(long, global = true)]
    data: Option<PathBuf>,
    /// Append-only visitor log file
    #[arg(long, global = true)]
    visitor_log: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct StudentQuery {
    #[arg(long)]
    section: String,
    #[arg(long)]
    name: String,
    /// Minimum match confidence (0-100)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    threshold: Option<u8>,
}

#[derive(Subcommand)]
enum Commands {
    /// List loaded sections
    Sections,
    /// Find a student and print feedback and guidance
    Lookup {
        #[command(flatten)]
        query: StudentQuery,
        #[arg(long)]
        json: bool,
    },
    /// Write a markdown result sheet for a student
    Report {
        #[command(flatten)]
        query: StudentQuery,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Print chart data for a student as JSON
    Charts {
        #[command(flatten)]
        query: StudentQuery,
    },
    /// Print the detailed guidance profile for a student
    Profile {
        #[command(flatten)]
        query: StudentQuery,
    },
    /// Show the latest visitor log entries (admin only)
    Logs {
        #[arg(long)]
        user: String,
        #[arg(long)]
        password: String,
        #[arg(
            long,
            default_value_t = visitor_log::DEFAULT_TAIL,
            value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
        )]
        lines: usize,
    },
}

const NOT_FOUND: &str = "لم يتم العثور على تلميذ بهذا الاسم في القسم المحدد. يرجى التأكد من الاسم والقسم والمحاولة مرة أخرى.";

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let mut settings = Settings::from_env().context("invalid environment configuration")?;
    if let Some(data) = cli.data {
        settings.data_path = data;
    }
    if let Some(log) = cli.visitor_log {
        settings.visitor_log = log;
    }
    let session = Uuid::new_v4();

    match cli.command {
        Commands::Sections => {
            let workbook = load(&settings)?;
            visitor_log::record(&settings.visitor_log, session, "App Load");
            for (name, roster) in &workbook.sections {
                println!("- {name} ({} students)", roster.len());
            }
            for dropped in &workbook.dropped {
                eprintln!(
                    "excluded {} row {}: {}",
                    dropped.section, dropped.row, dropped.reason
                );
            }
        }
        Commands::Lookup { query, json } => {
            let workbook = load(&settings)?;
            let Some((roster, found)) = search(&settings, &workbook, &query, session)? else {
                println!("{NOT_FOUND}");
                return Ok(());
            };
            let bundle = feedback::evaluate(found.record);
            tracing::debug!(
                level = ?bundle.level(),
                trend = ?bundle.trend(),
                consistency = ?bundle.consistency(),
                "feedback evaluated"
            );

            if json {
                let value = serde_json::json!({
                    "section": roster.section(),
                    "record": found.record,
                    "confidence": found.confidence,
                    "feedback": bundle,
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!(
                    "تم العثور على: {} (تطابق بنسبة {}%)",
                    found.record.name, found.confidence
                );
                println!();
                println!("**ملاحظات:**\n\n{}", bundle.feedback_text());
                println!();
                println!("**توجيهات:**\n\n{}", bundle.guidance_text());
            }
        }
        Commands::Report { query, out } => {
            let workbook = load(&settings)?;
            let Some((roster, found)) = search(&settings, &workbook, &query, session)? else {
                println!("{NOT_FOUND}");
                return Ok(());
            };
            let today = chrono::Local::now().date_naive();
            let sheet = report::build_report(roster.section(), today, &found);
            std::fs::write(&out, sheet)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Charts { query } => {
            let workbook = load(&settings)?;
            let Some((_, found)) = search(&settings, &workbook, &query, session)? else {
                println!("{NOT_FOUND}");
                return Ok(());
            };
            let chart_set = charts::charts(found.record);
            println!("{}", serde_json::to_string_pretty(&chart_set)?);
        }
        Commands::Profile { query } => {
            let workbook = load(&settings)?;
            let Some((_, found)) = search(&settings, &workbook, &query, session)? else {
                println!("{NOT_FOUND}");
                return Ok(());
            };
            print_profile(&profile::profile(found.record));
        }
        Commands::Logs {
            user,
            password,
            lines,
        } => {
            if !admin_login(&settings, session, &user, &password) {
                anyhow::bail!("بيانات الدخول غير صحيحة.");
            }
            visitor_log::record(&settings.visitor_log, session, "Admin View Logs");
            let entries = visitor_log::tail(&settings.visitor_log, lines).with_context(|| {
                format!("failed to read {}", settings.visitor_log.display())
            })?;
            if entries.is_empty() {
                println!("سجل الزوار فارغ حالياً.");
            }
            for entry in entries {
                println!("{entry}");
            }
        }
    }

    Ok(())
}

/// Every attempt is written to the visitor log before the credential check.
fn admin_login(settings: &Settings, session: Uuid, user: &str, password: &str) -> bool {
    visitor_log::record(
        &settings.visitor_log,
        session,
        &format!("Admin login attempt: {user}"),
    );
    let accepted = settings.admin.verify(user, password);
    if !accepted {
        tracing::warn!(user, "admin login rejected");
    }
    accepted
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("section_results=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load(settings: &Settings) -> anyhow::Result<Workbook> {
    let workbook = roster::load_workbook(&settings.data_path).with_context(|| {
        format!("failed to load student data from {}", settings.data_path.display())
    })?;
    if !workbook.dropped.is_empty() {
        tracing::warn!(
            dropped = workbook.dropped.len(),
            "some rows were excluded because of invalid data"
        );
    }
    Ok(workbook)
}

fn search<'a>(
    settings: &Settings,
    workbook: &'a Workbook,
    query: &StudentQuery,
    session: Uuid,
) -> anyhow::Result<Option<(&'a Roster, MatchResult<'a>)>> {
    let roster = workbook.section(&query.section).with_context(|| {
        format!(
            "unknown section '{}' (available: {})",
            query.section,
            workbook.section_names().collect::<Vec<_>>().join(", ")
        )
    })?;

    visitor_log::record(
        &settings.visitor_log,
        session,
        &format!("Search: {} - '{}'", query.section, query.name),
    );

    let threshold = query.threshold.unwrap_or(settings.match_threshold);
    Ok(matcher::find(&query.name, roster, threshold).map(|found| (roster, found)))
}

fn print_profile(sheet: &profile::GuidanceProfile) {
    println!("{}", sheet.personal_message);
    for (title, lines) in [
        ("نقاط القوة", &sheet.strengths),
        ("نقاط الضعف", &sheet.weaknesses),
        ("التوصيات", &sheet.recommendations),
        ("التوجيهات الأخلاقية", &sheet.ethical_guidance),
    ] {
        println!();
        println!("## {title}");
        for line in lines {
            println!("- {line}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logs_rejects_zero_lines() {
        let parsed = Cli::try_parse_from([
            "section-results",
            "logs",
            "--user",
            "admin",
            "--password",
            "password",
            "--lines",
            "0",
        ]);
        assert!(parsed.is_err());

        let parsed = Cli::try_parse_from([
            "section-results",
            "logs",
            "--user",
            "admin",
            "--password",
            "password",
        ])
        .unwrap();
        assert!(matches!(parsed.command, Commands::Logs { lines: 50, .. }));
    }

    #[test]
    fn admin_attempts_are_logged_even_when_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            visitor_log: dir.path().join("visitor_log.txt"),
            ..Settings::default()
        };
        let session = Uuid::new_v4();

        assert!(!admin_login(&settings, session, "admin", "wrong"));
        assert!(admin_login(&settings, session, "admin", "password"));

        let entries = visitor_log::tail(&settings.visitor_log, 10).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries
            .iter()
            .all(|line| line.ends_with("Page: Admin login attempt: admin")));
    }
}
