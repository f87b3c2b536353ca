use clap::{Parser, Subcommand};
use grounding_core::*;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

mod input;

#[derive(Parser)]
#[command(name = "grounded")]
#[command(about = "Guided grounding and breathing exercises", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use a specific config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List exercises, marking the ones completed today (default)
    List,

    /// Start an exercise
    Start {
        /// Exercise id (see `list`)
        id: String,

        /// Auto-complete (for testing) - run every step and finish
        #[arg(long)]
        auto_complete: bool,
    },

    /// Show today's completions and recent totals
    Status,

    /// Roll up the completion journal to CSV
    Rollup {
        /// Clean up processed WAL files after rollup
        #[arg(long)]
        cleanup: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        grounding_core::logging::init_with_level("debug");
    } else {
        grounding_core::logging::init();
    }

    let config = match cli.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    tracing::debug!("Using data directory {:?}", data_dir);

    match cli.command {
        Some(Commands::Start { id, auto_complete }) => {
            cmd_start(&data_dir, &id, auto_complete, &config)
        }
        Some(Commands::Status) => cmd_status(&data_dir, &config),
        Some(Commands::Rollup { cleanup }) => cmd_rollup(&data_dir, cleanup),
        Some(Commands::List) | None => cmd_list(&data_dir, &config),
    }
}

fn load_catalog(config: &Config) -> Result<Catalog> {
    let base = get_default_catalog();
    let errors = validate_additions(base, &config.exercises.custom);
    if !errors.is_empty() {
        eprintln!("Catalog validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::CatalogValidation("Invalid catalog".into()));
    }

    config.catalog(base)
}

fn open_reporter(data_dir: &Path) -> Result<JournalReporter> {
    JournalReporter::open_today(&Config::wal_path(data_dir), &Config::csv_path(data_dir))
}

fn cmd_list(data_dir: &Path, config: &Config) -> Result<()> {
    let catalog = load_catalog(config)?;
    let reporter = open_reporter(data_dir)?;
    let controller = ExerciseController::new(&catalog, reporter);

    println!();
    for entry in controller.entries() {
        let def = entry.definition;
        let mark = if entry.completed_today { "✓" } else { " " };
        println!(
            " {} {:<20} {:<32} {:?}/{:?}",
            mark, def.id, def.name, def.category, def.mode()
        );
    }
    println!();
    println!("Start one with: grounded start <id>");

    Ok(())
}

fn cmd_start(data_dir: &Path, id: &str, auto_complete: bool, config: &Config) -> Result<()> {
    let catalog = load_catalog(config)?;
    let reporter = open_reporter(data_dir)?;
    let mut controller = ExerciseController::new(&catalog, reporter);

    controller.select(id)?;
    let Some(definition) = controller.state().active_exercise().cloned() else {
        return Ok(());
    };

    display_header(&definition, controller.reporter().is_complete(id));

    let completed = if auto_complete {
        run_to_completion(&mut controller)
    } else {
        run_interactive(&mut controller, config)?
    };

    if completed {
        println!("\n✓ Exercise complete: {}", definition.name);
        println!("  Recorded for {}", controller.reporter().today());
    } else {
        println!("\nSession ended without finishing.");
    }

    Ok(())
}

/// Drive the session straight to its terminal state and finish
fn run_to_completion<R: CompletionReporter>(controller: &mut ExerciseController<'_, R>) -> bool {
    while !controller.state().is_terminal() {
        display_position(controller.state());
        let Some(action) = input::to_action(input::Command::Next, controller.state()) else {
            return false;
        };
        controller.dispatch(action);
    }
    controller.complete()
}

fn run_interactive<R: CompletionReporter>(
    controller: &mut ExerciseController<'_, R>,
    config: &Config,
) -> Result<bool> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    while controller.state().is_active() {
        display_position(controller.state());

        if let Some(seconds) = paced_step_seconds(controller.state(), config) {
            std::thread::sleep(std::time::Duration::from_secs(u64::from(seconds)));
            controller.advance();
            continue;
        }

        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next().transpose()? else {
            controller.exit();
            return Ok(false);
        };

        let Some(command) = input::parse(&line) else {
            println!("  (unrecognised input: {})", line.trim());
            continue;
        };

        if let Some(action) = input::to_action(command, controller.state()) {
            if controller.dispatch(action) {
                return Ok(true);
            }
        }
    }

    Ok(false)
}

/// Step length to wait on, when timed steps are paced automatically
fn paced_step_seconds(state: &SessionState, config: &Config) -> Option<u32> {
    if !config.session.pace_timed_steps || state.is_terminal() {
        return None;
    }
    match state.active_exercise()?.body {
        ExerciseBody::Timed { step_seconds, .. } => Some(step_seconds),
        _ => None,
    }
}

fn display_header(definition: &ExerciseDefinition, done_today: bool) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  {}", definition.name);
    println!("╰─────────────────────────────────────────╯");
    if !definition.summary.is_empty() {
        println!("  {}", definition.summary);
    }
    println!(
        "  About {} min{}",
        definition.duration_hint_seconds.div_ceil(60).max(1),
        if done_today { " · already done today" } else { "" }
    );
}

fn display_position(state: &SessionState) {
    println!();
    match state.position() {
        Position::Idle => {}
        Position::Step { index, total, text } => {
            println!("  Step {}/{}", index + 1, total);
            println!("  {}", text);
            let previous = if state.can_retreat() { "  [p] previous" } else { "" };
            println!("  [Enter] next{}  [r] restart  [q] quit", previous);
        }
        Position::Group {
            index,
            total,
            label,
            prompt,
            confirmed,
            required,
        } => {
            let dots: Vec<&str> = (0..required)
                .map(|i| if i < confirmed { "●" } else { "○" })
                .collect();
            println!("  {} ({}/{})", label, index + 1, total);
            println!("  {}", prompt);
            println!("  {}", dots.join(" "));
            println!(
                "  [Enter] or [{}] tick the next one  [r] restart  [q] quit",
                confirmed + 1
            );
        }
        Position::Finished => {
            println!("  All steps done. Take a moment to notice how you feel.");
            println!("  [Enter] finish  [r] repeat  [q] leave without finishing");
        }
    }
}

fn cmd_status(data_dir: &Path, config: &Config) -> Result<()> {
    let catalog = load_catalog(config)?;
    let days = config.session.history_days;
    let records = load_recent_completions(
        &Config::wal_path(data_dir),
        &Config::csv_path(data_dir),
        days,
    )?;
    let today = chrono::Local::now().date_naive();
    let done_today = history::completed_on(&records, today);

    let name_of = |id: &str| {
        catalog
            .get(id)
            .map(|d| d.name.clone())
            .unwrap_or_else(|| id.to_string())
    };

    println!("\nCompleted today ({}):", today);
    if done_today.is_empty() {
        println!("  nothing yet");
    }
    for def in catalog.iter().filter(|d| done_today.contains(&d.id)) {
        println!("  ✓ {}", def.name);
    }
    // Completions of exercises since removed from the config
    let mut retired: Vec<_> = done_today
        .iter()
        .filter(|id| catalog.get(id).is_none())
        .collect();
    retired.sort();
    for id in retired {
        println!("  ✓ {}", name_of(id.as_str()));
    }

    println!("\nLast {} days:", days);
    let totals = history::summarize(&records);
    if totals.is_empty() {
        println!("  no completions");
    }
    for (id, count) in totals {
        println!("  {:<32} {}", name_of(id.as_str()), count);
    }

    Ok(())
}

fn cmd_rollup(data_dir: &Path, cleanup: bool) -> Result<()> {
    let wal_dir = data_dir.join("wal");
    let wal_path = Config::wal_path(data_dir);
    let csv_path = Config::csv_path(data_dir);

    if !wal_path.exists() {
        println!("No WAL file found - nothing to roll up.");
        return Ok(());
    }

    let count = csv_rollup::wal_to_csv_and_archive(&wal_path, &csv_path)?;

    println!("✓ Rolled up {} completions to CSV", count);
    println!("  CSV: {}", csv_path.display());

    if cleanup {
        let cleaned = csv_rollup::cleanup_processed_wals(&wal_dir)?;
        if cleaned > 0 {
            println!("✓ Cleaned up {} processed WAL files", cleaned);
        }
    }

    Ok(())
}
