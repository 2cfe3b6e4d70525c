use clap::{Parser, Subcommand};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;
use stride_core::*;

#[derive(Parser)]
#[command(name = "stride")]
#[command(about = "Guided recovery exercise session system", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a guided session for a program day
    Run {
        /// Program day (1-30)
        #[arg(long)]
        day: u32,

        /// Session number within the day
        #[arg(long, default_value_t = 1)]
        session: u32,

        /// Tick without waiting between seconds (for scripting and tests)
        #[arg(long)]
        fast: bool,

        /// Skip the exercise at this 0-based index (repeatable)
        #[arg(long = "skip", value_name = "INDEX")]
        skips: Vec<usize>,

        /// Extend the rest preceding this 0-based exercise index once (repeatable)
        #[arg(long = "extend-rest", value_name = "INDEX")]
        extend_rests: Vec<usize>,

        /// Do not persist the session report
        #[arg(long)]
        no_save: bool,
    },

    /// Show the deterministic exercise plan for a day
    Plan {
        /// Program day (1-30)
        #[arg(long)]
        day: u32,

        /// Show only this session's plan
        #[arg(long)]
        session: Option<u32>,
    },

    /// Show aggregated program progress
    Summary,

    /// Roll up stored reports to CSV
    Rollup {
        /// Clean up processed store files after rollup
        #[arg(long)]
        cleanup: bool,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    stride_core::logging::init();

    let cli = Cli::parse();

    // Determine data directory
    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    tracing::debug!("Using data directory {:?}", data_dir);

    match cli.command {
        Commands::Run {
            day,
            session,
            fast,
            skips,
            extend_rests,
            no_save,
        } => cmd_run(data_dir, day, session, fast, skips, extend_rests, no_save, &config),
        Commands::Plan { day, session } => cmd_plan(day, session, &config),
        Commands::Summary => cmd_summary(data_dir),
        Commands::Rollup { cleanup } => cmd_rollup(data_dir, cleanup),
    }
}

fn report_store_path(data_dir: &std::path::Path) -> PathBuf {
    data_dir.join("reports").join("sessions.jsonl")
}

fn csv_archive_path(data_dir: &std::path::Path) -> PathBuf {
    data_dir.join("sessions.csv")
}

/// Validated default catalog, or a CatalogValidation error
fn checked_catalog() -> Result<&'static Catalog> {
    let catalog = get_default_catalog();
    let errors = catalog.validate();
    if !errors.is_empty() {
        eprintln!("Catalog validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::CatalogValidation("Invalid catalog".into()));
    }
    Ok(catalog)
}

/// Stdout observer narrating phase transitions
struct ConsoleObserver;

impl SessionObserver for ConsoleObserver {
    fn exercise_started(&mut self, index: usize, exercise: &ExerciseDefinition, duration_sec: u32) {
        println!(
            "▶ Exercise {}/{}: {} ({}s)",
            index + 1,
            catalog::EXERCISES_PER_SESSION,
            exercise.name,
            duration_sec
        );
    }

    fn exercise_ended(&mut self, _index: usize, exercise: &ExerciseDefinition) {
        println!("  ✓ {} done", exercise.name);
    }

    fn rest_started(&mut self, duration_sec: u32, _index: usize) {
        println!("  Rest {}s", duration_sec);
    }
}

fn cmd_run(
    data_dir: PathBuf,
    day: u32,
    session: u32,
    fast: bool,
    skips: Vec<usize>,
    extend_rests: Vec<usize>,
    no_save: bool,
    config: &Config,
) -> Result<()> {
    let catalog = checked_catalog()?;

    println!("Day {}: session {} of {}", day, session, sessions_for_day(day));
    println!();

    let mut engine = SessionEngine::new(day, session, catalog)
        .with_observer(Box::new(ConsoleObserver));
    if !no_save {
        let store_path = report_store_path(&data_dir);
        engine = engine.with_report_sink(Box::new(JsonlReportSink::new(store_path)));
    }

    engine.start();

    // Scripted controls stand in for the UI's skip/extend buttons: each
    // requested index fires once, at the start of the matching phase.
    let mut skips_applied = HashSet::new();
    let mut extensions_applied = HashSet::new();

    while engine.state() != SessionState::Complete {
        match engine.state() {
            SessionState::Exercise => {
                let index = engine.current_index();
                if skips.contains(&index) && skips_applied.insert(index) {
                    println!("  ↷ Skipping exercise {}", index + 1);
                    engine.skip_exercise();
                    continue;
                }
            }
            SessionState::Rest => {
                let index = engine.current_index();
                if extend_rests.contains(&index) && extensions_applied.insert(index) {
                    let extra = config.session.rest_extension_sec;
                    println!("  + Extending rest by {}s", extra);
                    engine.extend_rest(Some(extra));
                }
            }
            _ => {}
        }

        if !fast {
            std::thread::sleep(Duration::from_secs(1));
        }
        engine.tick();
    }

    let report = engine
        .report()
        .ok_or_else(|| Error::Report("session finished without a report".into()))?;
    display_report(report);

    if no_save {
        println!("[Report not saved]");
    }

    Ok(())
}

fn display_report(report: &SessionReport) {
    println!();
    println!("╭─────────────────────────────────────────╮");
    println!("│  SESSION REPORT                         │");
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  Day {}, session {}", report.day, report.session);
    println!(
        "  Duration: {}s (planned {}s)",
        report.actual_duration_sec, report.planned_duration_sec
    );
    println!(
        "  Exercises: {}/{} completed, {} skipped",
        report.exercises_completed, report.exercises_planned, report.exercises_skipped
    );
    println!("  Rest extensions: {}", report.rest_extended_count);
    println!(
        "  Effectiveness: {} (score {})",
        report.effectiveness, report.score
    );
    println!();
}

fn cmd_plan(day: u32, session: Option<u32>, config: &Config) -> Result<()> {
    let catalog = checked_catalog()?;

    let count = sessions_for_day(day);
    println!("Day {}: {} sessions", day, count);

    let sessions: Vec<u32> = match session {
        Some(s) => vec![s],
        None => (1..=count).collect(),
    };

    for s in sessions {
        println!();
        println!("Session {}:", s);
        for (i, id) in catalog.session_plan(day, s).iter().enumerate() {
            let exercise = catalog.resolve(id);
            println!(
                "  {}. {} [{}]",
                i + 1,
                exercise.name,
                config.video.src_for(&exercise.id)
            );
        }
    }

    Ok(())
}

fn cmd_summary(data_dir: PathBuf) -> Result<()> {
    let jsonl_path = report_store_path(&data_dir);
    let csv_path = csv_archive_path(&data_dir);

    let reports = load_reports(&jsonl_path, &csv_path)?;
    let summary = summarize(&reports);

    println!("Program progress");
    println!("  Sessions recorded: {}", summary.total_sessions);
    println!(
        "  Days completed: {}/{} ({}%)",
        summary.days_completed.len(),
        catalog::PROGRAM_DAYS,
        summary.completion_pct
    );
    println!(
        "  Streak: {} day(s) current, {} best",
        summary.streaks.current, summary.streaks.best
    );
    println!(
        "  Weekly: {} | {} | {} | {} | {}",
        summary.weekly[0], summary.weekly[1], summary.weekly[2], summary.weekly[3], summary.weekly[4]
    );
    println!();
    println!("  {}", summary.suggestion);

    Ok(())
}

fn cmd_rollup(data_dir: PathBuf, cleanup: bool) -> Result<()> {
    let jsonl_path = report_store_path(&data_dir);
    let csv_path = csv_archive_path(&data_dir);

    if !jsonl_path.exists() {
        println!("No report store found - nothing to roll up.");
        return Ok(());
    }

    let count = stride_core::csv_rollup::reports_to_csv_and_archive(&jsonl_path, &csv_path)?;

    println!("✓ Rolled up {} reports to CSV", count);
    println!("  CSV: {}", csv_path.display());

    if cleanup {
        let store_dir = jsonl_path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or(data_dir);
        let cleaned = stride_core::csv_rollup::cleanup_processed(&store_dir)?;
        if cleaned > 0 {
            println!("✓ Cleaned up {} processed store files", cleaned);
        }
    }

    Ok(())
}
