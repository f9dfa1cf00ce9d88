//! dupdirs - Duplicate Directory Finder
//!
//! Keeps an ordered set of root directories, pairs up same-named immediate
//! children that live under different roots, and measures both sides of every
//! pair in the background.
//!
//! The library side is usable on its own:
//!
//! ```no_run
//! use dupdirs::duplicates::{DuplicateDetector, DuplicatePairSet};
//! use dupdirs::roots::RootDirectorySet;
//!
//! let mut roots = RootDirectorySet::new();
//! roots.add_all(["/mnt/old", "/mnt/new"]);
//!
//! let mut pairs = DuplicatePairSet::new();
//! pairs.add_all(DuplicateDetector::with_defaults().detect_in(&roots).unwrap());
//! for entry in &pairs {
//!     println!("{}", entry.pair());
//! }
//! ```

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod notify;
pub mod output;
pub mod paths;
pub mod progress;
pub mod roots;
pub mod scanner;
pub mod session;
pub mod signal;

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context};

use crate::cli::{Cli, Commands, InitDirArgs, OutputFormat, RootsCommand, ScanArgs};
use crate::config::Config;
use crate::duplicates::{DuplicatePairSet, PairSetChange};
use crate::error::ExitCode;
use crate::output::{records, CsvOutput, JsonOutput, TextOutput};
use crate::progress::{Progress, ProgressCallback, PHASE_SIZING};
use crate::session::{Session, StateStore};
use crate::signal::{install_handler, ShutdownHandler};

/// Interval at which size waits re-check the shutdown flag.
const SIZE_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Longest `roots list --sizes` waits for one root.
const ROOT_SIZE_TIMEOUT: Duration = Duration::from_secs(3600);

/// Options shared by every subcommand.
struct GlobalOptions {
    quiet: bool,
    colored: bool,
    state_file: Option<PathBuf>,
}

impl GlobalOptions {
    fn store(&self) -> Option<StateStore> {
        match &self.state_file {
            Some(path) => Some(StateStore::new(path)),
            None => StateStore::default_location(),
        }
    }
}

/// Run the parsed command line.
///
/// # Errors
///
/// Returns an error if the configuration file given with `--config` cannot be
/// read, a scan has fewer than two roots, detection fails or is interrupted,
/// or output cannot be written.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    let Cli {
        verbose,
        quiet,
        no_color,
        config: config_path,
        state_file,
        command,
        ..
    } = cli;

    logging::init_logging(verbose, quiet);
    log::debug!("Log level: {}", logging::current_level_name());

    let config = match &config_path {
        Some(path) => Config::load_from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load(),
    };

    let globals = GlobalOptions {
        quiet,
        colored: !no_color && io::stdout().is_terminal(),
        state_file,
    };

    match command {
        Commands::Scan(args) => handle_scan(&args, config, &globals),
        Commands::Roots(args) => handle_roots(args.command, config, &globals),
        Commands::InitDir(args) => handle_init_dir(&args, config, &globals),
    }
}

fn handle_scan(
    args: &ScanArgs,
    mut config: Config,
    globals: &GlobalOptions,
) -> anyhow::Result<ExitCode> {
    args.apply_to(&mut config);
    let compute_sizes = config.compute_sizes;

    // The report never shows root sizes
    let mut session = Session::open_with(config, globals.store(), false);
    if !args.saves_roots() {
        session.set_autosave(false);
    }
    if args.only {
        session.clear_roots();
    }

    warn_missing(&args.roots);
    session.add_roots(&args.roots);

    if !session.can_scan() {
        bail!(
            "At least two root directories are needed to scan, {} given",
            session.roots().len()
        );
    }

    let shutdown = install_handler();
    let progress = Arc::new(Progress::new(globals.quiet));
    let detector = session
        .detector()
        .with_shutdown_flag(shutdown.get_flag())
        .with_progress_callback(progress.clone());

    let start = Instant::now();
    let found = session
        .scan_with(&detector)
        .context("Duplicate detection failed")?;
    let elapsed = start.elapsed();

    if compute_sizes && found > 0 {
        wait_for_sizes(session.pairs(), progress.as_ref(), &shutdown);
    }

    let rows = records(session.pairs());
    let exit_code = if rows.is_empty() {
        ExitCode::NoDuplicates
    } else {
        ExitCode::Success
    };

    let stdout = io::stdout().lock();
    match args.format {
        OutputFormat::Text => {
            TextOutput::new(&rows)
                .write_to(stdout, globals.colored)
                .context("Failed to write report")?;
        }
        OutputFormat::Json => {
            let roots = session
                .roots()
                .iter()
                .map(|entry| entry.path().display().to_string())
                .collect();
            let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
            JsonOutput::new(&rows, roots, duration_ms, exit_code)
                .write_to(stdout)
                .context("Failed to write JSON output")?;
        }
        OutputFormat::Csv => {
            CsvOutput::new(&rows)
                .write_to(stdout)
                .context("Failed to write CSV output")?;
        }
    }

    Ok(exit_code)
}

/// Wait for both sides of every pair to be measured, reporting each
/// completion. Returns early, keeping pending sizes, on Ctrl+C.
fn wait_for_sizes(
    pairs: &DuplicatePairSet,
    progress: &dyn ProgressCallback,
    shutdown: &ShutdownHandler,
) {
    let total = pairs.len() * 2;
    progress.on_phase_start(PHASE_SIZING, total);

    let done = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&done);
    let subscription = pairs.subscribe(move |change| {
        if matches!(change, PairSetChange::Reset) {
            counter.fetch_add(1, Ordering::Relaxed);
        }
    });

    loop {
        if pairs.wait_for_sizes(SIZE_POLL_INTERVAL) {
            break;
        }
        progress.on_progress(done.load(Ordering::Relaxed).min(total), "");
        if shutdown.is_shutdown_requested() {
            log::warn!("Interrupted while measuring; unfinished sizes are left blank");
            break;
        }
    }

    pairs.unsubscribe(subscription);
    progress.on_phase_end(PHASE_SIZING);
}

fn handle_roots(
    command: RootsCommand,
    mut config: Config,
    globals: &GlobalOptions,
) -> anyhow::Result<ExitCode> {
    let show_sizes = matches!(command, RootsCommand::List { sizes: true });
    config.compute_sizes = show_sizes;

    let mut session = Session::open(config, globals.store());
    session.set_autosave(false);

    let changed = match command {
        RootsCommand::List { .. } => {
            print_roots(&session, show_sizes)?;
            false
        }
        RootsCommand::Add { paths } => {
            warn_missing(&paths);
            let added = session.add_roots(&paths);
            log::info!("Added {} of {} roots", added, paths.len());
            added > 0
        }
        RootsCommand::Remove { path } => {
            let removed = session.remove_root(&path);
            if !removed {
                log::warn!("{} is not a remembered root", path.display());
            }
            removed
        }
        RootsCommand::Clear => session.clear_roots(),
    };

    if changed {
        session.save().context("Failed to save roots")?;
    }
    Ok(ExitCode::Success)
}

fn print_roots(session: &Session, show_sizes: bool) -> anyhow::Result<()> {
    let mut stdout = io::stdout().lock();
    for entry in session.roots() {
        match entry.size().filter(|_| show_sizes) {
            Some(size) => {
                let state = size.wait_timeout(ROOT_SIZE_TIMEOUT);
                writeln!(
                    stdout,
                    "{}\t{}",
                    entry.path().display(),
                    state.display().trim()
                )?;
            }
            None => writeln!(stdout, "{}", entry.path().display())?,
        }
    }
    Ok(())
}

fn handle_init_dir(
    args: &InitDirArgs,
    mut config: Config,
    globals: &GlobalOptions,
) -> anyhow::Result<ExitCode> {
    config.compute_sizes = false;
    let mut session = Session::open(config, globals.store());
    session.set_autosave(false);

    match &args.path {
        Some(path) => {
            if !path.is_dir() {
                bail!("{} is not a directory", path.display());
            }
            session.set_initial_directory(path);
            session.save().context("Failed to save initial directory")?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            match session.initial_directory() {
                Some(dir) => writeln!(stdout, "{}", dir.display())?,
                None => writeln!(stdout, "(not set)")?,
            }
        }
    }
    Ok(ExitCode::Success)
}

fn warn_missing(paths: &[PathBuf]) {
    for path in paths.iter().filter(|p| !p.exists()) {
        log::warn!("Skipping {}: no such directory", path.display());
    }
}
