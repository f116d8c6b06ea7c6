use colored::Colorize;
use std::{fmt, path::PathBuf};

/// What a run did with one skeleton entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Created,
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
}

/// A single line of an [`ExecutionReport`]. `path` is relative to the run's root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    pub path: PathBuf,
    pub kind: EntryKind,
    pub outcome: Outcome,
}
impl fmt::Display for ReportEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.outcome {
            Outcome::Created => "create".green(),
            Outcome::Skipped => "skip  ".yellow(),
        };
        let suffix = match self.kind {
            EntryKind::Directory => "/",
            EntryKind::File => "",
        };
        let note = match self.outcome {
            Outcome::Created => String::new(),
            Outcome::Skipped => format!(" {}", "(already exists)".dimmed()),
        };

        write!(f, "  {} {}{}{}", label, self.path.display(), suffix, note)
    }
}

/// Steps of a completed run, announced with a heading as each one starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Directories,
    Files,
    Done,
}
impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Directories => write!(f, "[1/3] Creating directories..."),
            Self::Files => write!(f, "[2/3] Writing files..."),
            Self::Done => write!(f, "[3/3] Done:"),
        }
    }
}

/// Everything one run did, in the order it happened. Only ever displayed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    entries: Vec<ReportEntry>,
}
impl ExecutionReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an outcome and prints its progress line.
    pub fn record(&mut self, path: PathBuf, kind: EntryKind, outcome: Outcome) {
        let entry = ReportEntry {
            path,
            kind,
            outcome,
        };

        println!("{}", entry);

        self.entries.push(entry);
    }

    /// Prints the heading for `phase`; the last one carries the summary.
    pub fn begin(&self, phase: Phase) {
        let heading = phase.to_string().bold();

        match phase {
            Phase::Done => println!("\n{} {}", heading, self.summary()),
            Phase::Directories | Phase::Files => println!("\n{}", heading),
        }
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    pub fn created(&self) -> usize {
        self.count(Outcome::Created)
    }

    pub fn skipped(&self) -> usize {
        self.count(Outcome::Skipped)
    }

    fn count(&self, outcome: Outcome) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.outcome == outcome)
            .count()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} created, {} skipped",
            self.created().to_string().green(),
            self.skipped().to_string().yellow()
        )
    }
}

/// How a run ended.
#[derive(Debug, PartialEq, Eq)]
pub enum RunOutcome {
    Completed(ExecutionReport),
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_outcomes() {
        colored::control::set_override(false);

        let mut report = ExecutionReport::new();
        report.record("data/raw".into(), EntryKind::Directory, Outcome::Created);
        report.record("README.md".into(), EntryKind::File, Outcome::Skipped);
        report.record(".gitignore".into(), EntryKind::File, Outcome::Created);

        assert_eq!(report.created(), 2);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.entries().len(), 3);
        assert_eq!(report.summary(), "2 created, 1 skipped");
    }

    #[test]
    fn phases_are_numbered_in_order() {
        let headings: Vec<_> = [Phase::Directories, Phase::Files, Phase::Done]
            .iter()
            .map(ToString::to_string)
            .collect();

        assert_eq!(
            headings,
            vec![
                "[1/3] Creating directories...",
                "[2/3] Writing files...",
                "[3/3] Done:",
            ]
        );
    }

    #[test]
    fn directory_lines_end_with_slash() {
        colored::control::set_override(false);

        let entry = ReportEntry {
            path: "notebooks".into(),
            kind: EntryKind::Directory,
            outcome: Outcome::Skipped,
        };

        assert_eq!(entry.to_string(), "  skip   notebooks/ (already exists)");
    }
}
