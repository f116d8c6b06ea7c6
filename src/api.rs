use crate::{
    errors::{FileOperation, IoError},
    preview::preview_skeleton,
    prompt::{Confirm, TerminalConfirm},
    report::RunOutcome,
    scaffold,
    skeleton::{self, Skeleton},
};
use colored::Colorize;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum SproutError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Skeleton(#[from] skeleton::SkeletonError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Scaffold(#[from] scaffold::ScaffoldError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Io(#[from] IoError),
}

/// Seeds the built-in skeleton into the current working directory, asking on the
/// terminal before anything is written.
///
/// # Errors
///
/// Returns a [`SproutError`] if:
///
/// - The current directory cannot be resolved.
/// - The built-in skeleton is invalid.
/// - Reading the confirmation fails.
/// - A directory or file cannot be created, or an entry of the wrong kind is in the way.
pub fn init_current_dir() -> Result<RunOutcome, SproutError> {
    let root = std::env::current_dir()
        .map_err(|error| IoError::new(FileOperation::CurrentDir, PathBuf::from("."), error))?;

    init_project(&root, &mut TerminalConfirm)
}

/// Seeds the built-in skeleton into `root`: prints what is about to happen, asks
/// `confirm`, then runs the scaffolder and prints a summary.
///
/// # Errors
///
/// See [`init_current_dir`].
pub fn init_project<C>(root: &Path, confirm: &mut C) -> Result<RunOutcome, SproutError>
where
    C: Confirm + ?Sized,
{
    let skeleton = Skeleton::builtin()?;

    log::debug!("initializing project skeleton in {}", root.display());

    println!(
        "{} Initializing project structure in: {}",
        "::".bold().bright_blue(),
        root.display()
    );
    println!(
        "{} Existing files and directories are skipped, never overwritten.\n",
        "::".bold().yellow()
    );

    preview_skeleton(&skeleton, root);

    let outcome = scaffold::run(root, &skeleton, confirm)?;

    match &outcome {
        RunOutcome::Cancelled => {
            println!("{}", "Cancelled, nothing was changed.".yellow());
        }
        RunOutcome::Completed(_) => print_next_steps(),
    }

    Ok(outcome)
}

fn print_next_steps() {
    let rule = "=".repeat(30);

    println!("{}", rule);
    println!("Suggested next steps:");
    println!("   1. Put your raw data into data/raw/");
    println!("   2. Run 'pip install -r requirements.txt'");
    println!("   3. Start Jupyter Lab and begin exploring");
    println!("{}", rule);
}
