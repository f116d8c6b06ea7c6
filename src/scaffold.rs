use crate::{
    errors::{FileOperation, IoError},
    prompt::{Confirm, PromptError, CONFIRM_MESSAGE},
    report::{EntryKind, ExecutionReport, Outcome, Phase, RunOutcome},
    skeleton::{Skeleton, MARKER_FILE},
};
use miette::Diagnostic;
use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum ScaffoldError {
    #[error("I/O error within scaffold domain")]
    #[diagnostic(code(sprout::scaffold::io))]
    Io(#[from] IoError),

    #[error("'{path}' already exists but is not a {expected}")]
    #[diagnostic(
        code(sprout::scaffold::path_conflict),
        help("Move or rename the existing entry, then run again")
    )]
    PathConflict {
        path: PathBuf,
        expected: &'static str,
    },

    #[error("Error occurred trying to confirm with user")]
    #[diagnostic(code(sprout::scaffold::prompt))]
    Prompt(#[from] PromptError),
}

/// Materializes `skeleton` under `root` once the operator confirms.
///
/// Directories are created before any file so every file's parent exists by the time
/// it is written. Anything already on disk with the expected kind is reported as
/// [`Outcome::Skipped`] and left alone; an entry of the wrong kind stops the run with
/// [`ScaffoldError::PathConflict`]. Declining the prompt returns
/// [`RunOutcome::Cancelled`] without touching the filesystem.
pub fn run<C>(
    root: &Path,
    skeleton: &Skeleton,
    confirm: &mut C,
) -> Result<RunOutcome, ScaffoldError>
where
    C: Confirm + ?Sized,
{
    if !confirm.confirm(CONFIRM_MESSAGE)? {
        log::debug!("operator declined, nothing written under {}", root.display());
        return Ok(RunOutcome::Cancelled);
    }

    let mut report = ExecutionReport::new();

    report.begin(Phase::Directories);
    materialize_directories(root, skeleton, &mut report)?;

    report.begin(Phase::Files);
    materialize_files(root, skeleton, &mut report)?;

    report.begin(Phase::Done);

    Ok(RunOutcome::Completed(report))
}

fn materialize_directories(
    root: &Path,
    skeleton: &Skeleton,
    report: &mut ExecutionReport,
) -> Result<(), ScaffoldError> {
    for relative in skeleton.directories() {
        let path = root.join(relative);

        let outcome = match inspect(root, relative)? {
            Some(metadata) if metadata.is_dir() => Outcome::Skipped,
            Some(_) => {
                return Err(ScaffoldError::PathConflict {
                    path,
                    expected: "directory",
                })
            }
            None if create_directory(root, relative)? => {
                touch_marker(&path.join(MARKER_FILE))?;
                Outcome::Created
            }
            // appeared after the check; it belongs to someone else now
            None => Outcome::Skipped,
        };

        log::debug!("directory {}: {:?}", path.display(), outcome);

        report.record(relative.clone(), EntryKind::Directory, outcome);
    }

    Ok(())
}

fn materialize_files(
    root: &Path,
    skeleton: &Skeleton,
    report: &mut ExecutionReport,
) -> Result<(), ScaffoldError> {
    for (relative, content) in skeleton.files() {
        let path = root.join(relative);

        let outcome = match inspect(root, relative)? {
            Some(metadata) if metadata.is_dir() => {
                return Err(ScaffoldError::PathConflict {
                    path,
                    expected: "file",
                })
            }
            Some(_) => Outcome::Skipped,
            None if write_new_file(&path, content.trim())? => Outcome::Created,
            // lost a race against another writer; theirs wins
            None => Outcome::Skipped,
        };

        log::debug!("file {}: {:?}", path.display(), outcome);

        report.record(relative.clone(), EntryKind::File, outcome);
    }

    Ok(())
}

/// Returns the metadata of `root/relative`, or `None` when nothing is there.
///
/// A plain file sitting where one of the ancestors should be is reported as a
/// conflict on that ancestor instead of a raw I/O error.
fn inspect(root: &Path, relative: &Path) -> Result<Option<fs::Metadata>, ScaffoldError> {
    let path = root.join(relative);

    match fs::metadata(&path) {
        Ok(metadata) => Ok(Some(metadata)),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(error) => match blocking_ancestor(root, relative) {
            Some(blocker) => Err(ScaffoldError::PathConflict {
                path: blocker,
                expected: "directory",
            }),
            None => Err(IoError::new(FileOperation::Inspect, path, error).into()),
        },
    }
}

/// First ancestor of `root/relative` (below `root`) that exists but is not a directory.
fn blocking_ancestor(root: &Path, relative: &Path) -> Option<PathBuf> {
    relative
        .ancestors()
        .skip(1)
        .filter(|ancestor| !ancestor.as_os_str().is_empty())
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .map(|ancestor| root.join(ancestor))
        .find(|candidate| {
            fs::metadata(candidate)
                .map(|metadata| !metadata.is_dir())
                .unwrap_or(false)
        })
}

/// Creates `root/relative` and any missing ancestors.
///
/// Returns `false` without touching anything if a directory already sits at the leaf.
fn create_directory(root: &Path, relative: &Path) -> Result<bool, ScaffoldError> {
    let path = root.join(relative);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|error| mkdir_error(root, relative, parent, error))?;
    }

    match fs::create_dir(&path) {
        Ok(()) => Ok(true),
        Err(error) if error.kind() == io::ErrorKind::AlreadyExists => match fs::metadata(&path) {
            Ok(metadata) if metadata.is_dir() => Ok(false),
            Ok(_) => Err(ScaffoldError::PathConflict {
                path,
                expected: "directory",
            }),
            // e.g. a dangling symlink
            Err(_) => Err(IoError::new(FileOperation::Mkdir, path, error).into()),
        },
        Err(error) => Err(mkdir_error(root, relative, &path, error)),
    }
}

fn mkdir_error(root: &Path, relative: &Path, path: &Path, error: io::Error) -> ScaffoldError {
    match blocking_ancestor(root, relative) {
        Some(blocker) => ScaffoldError::PathConflict {
            path: blocker,
            expected: "directory",
        },
        None => IoError::new(FileOperation::Mkdir, path.to_path_buf(), error).into(),
    }
}

/// Drops an empty marker so version control keeps the directory.
fn touch_marker(path: &Path) -> Result<(), IoError> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .map_err(|error| IoError::new(FileOperation::Touch, path.to_path_buf(), error))?;

    Ok(())
}

/// Writes `contents` to a file that must not exist yet.
///
/// Returns `false` without writing if something appeared at `path` in the meantime.
fn write_new_file(path: &Path, contents: &str) -> Result<bool, IoError> {
    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(error) if error.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
        Err(error) => {
            return Err(IoError::new(
                FileOperation::Write,
                path.to_path_buf(),
                error,
            ))
        }
    };

    file.write_all(contents.as_bytes())
        .map_err(|error| IoError::new(FileOperation::Write, path.to_path_buf(), error))?;

    Ok(true)
}
