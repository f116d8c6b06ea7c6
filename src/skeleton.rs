use indexmap::{IndexMap, IndexSet};
use miette::Diagnostic;
use serde::Deserialize;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Name of the marker dropped into every directory created by a run.
pub const MARKER_FILE: &str = ".gitkeep";

const BUILTIN_NAME: &str = "resources/skeleton.toml";
const BUILTIN_SKELETON: &str = include_str!("../resources/skeleton.toml");

#[derive(Debug, Error, Diagnostic)]
pub enum SkeletonError {
    #[error("Unable to parse skeleton '{name}': {source}")]
    #[diagnostic(code(sprout::skeleton::parse_toml), help("Review the skeleton toml"))]
    ParseToml {
        name: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("skeleton path is empty")]
    #[diagnostic(code(sprout::skeleton::empty_path))]
    EmptyPath,

    #[error("skeleton path '{path}' is not relative to the project root")]
    #[diagnostic(
        code(sprout::skeleton::escapes_root),
        help("Paths must be relative and must not contain '..' segments")
    )]
    EscapesRoot { path: String },

    #[error("directory '{path}' is declared more than once")]
    #[diagnostic(code(sprout::skeleton::duplicate_directory))]
    DuplicateDirectory { path: String },

    #[error("file '{path}' is declared more than once")]
    #[diagnostic(code(sprout::skeleton::duplicate_file))]
    DuplicateFile { path: String },

    #[error("file '{path}' overlaps declared directory '{directory}'")]
    #[diagnostic(
        code(sprout::skeleton::file_overlaps_directory),
        help("A path cannot be both a file and a directory, or the parent of one")
    )]
    FileOverlapsDirectory { path: String, directory: String },

    #[error("parent of file '{path}' is not a declared directory")]
    #[diagnostic(
        code(sprout::skeleton::orphan_file),
        help("Declare the parent directory (or one of its descendants) in `directories`")
    )]
    OrphanFile { path: String },
}

/// On-disk shape of a skeleton resource.
#[derive(Debug, Deserialize)]
struct SkeletonFile {
    #[serde(default)]
    directories: Vec<String>,
    #[serde(default)]
    files: IndexMap<String, String>,
}

/// The immutable description of a project skeleton.
///
/// Directories are kept in declaration order so that progress output is deterministic;
/// files keep their insertion order for the same reason. Every path is relative to
/// the root a run targets and never escapes it.
#[derive(Debug, Clone)]
pub struct Skeleton {
    directories: Vec<PathBuf>,
    files: IndexMap<PathBuf, String>,
}
impl Skeleton {
    /// The data-analysis skeleton compiled into the binary.
    pub fn builtin() -> Result<Self, SkeletonError> {
        Self::from_toml_str(BUILTIN_NAME, BUILTIN_SKELETON)
    }

    /// Parses and validates a skeleton. `name` is only used in error messages.
    pub fn from_toml_str(name: &str, content: &str) -> Result<Self, SkeletonError> {
        let parsed: SkeletonFile =
            toml::from_str(content).map_err(|source| SkeletonError::ParseToml {
                name: name.to_string(),
                source,
            })?;

        let mut directories = IndexSet::new();
        for raw in &parsed.directories {
            let path = relative_path(raw)?;
            if !directories.insert(path) {
                return Err(SkeletonError::DuplicateDirectory { path: raw.clone() });
            }
        }

        let mut files = IndexMap::new();
        for (raw, content) in parsed.files {
            let path = relative_path(&raw)?;

            let covered = match path.parent() {
                None => true,
                Some(parent) if parent.as_os_str().is_empty() => true,
                Some(parent) => directories.iter().any(|dir| dir.starts_with(parent)),
            };
            if !covered {
                return Err(SkeletonError::OrphanFile { path: raw });
            }

            if let Some(directory) = directories.iter().find(|dir| dir.starts_with(&path)) {
                return Err(SkeletonError::FileOverlapsDirectory {
                    path: raw,
                    directory: directory.display().to_string(),
                });
            }

            if files.insert(path, content).is_some() {
                return Err(SkeletonError::DuplicateFile { path: raw });
            }
        }

        log::debug!(
            "loaded skeleton '{}': {} directories, {} files",
            name,
            directories.len(),
            files.len()
        );

        Ok(Skeleton {
            directories: directories.into_iter().collect(),
            files,
        })
    }

    pub fn directories(&self) -> &[PathBuf] {
        &self.directories
    }

    pub fn files(&self) -> &IndexMap<PathBuf, String> {
        &self.files
    }

    /// Number of entries a run reports on.
    pub fn len(&self) -> usize {
        self.directories.len() + self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Turns a declared path into a clean relative [`PathBuf`], rejecting anything that
/// could land outside the root.
fn relative_path(raw: &str) -> Result<PathBuf, SkeletonError> {
    let mut path = PathBuf::new();

    for component in Path::new(raw).components() {
        match component {
            Component::Normal(segment) => path.push(segment),
            // "./data" is the same as "data"
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(SkeletonError::EscapesRoot {
                    path: raw.to_string(),
                })
            }
        }
    }

    if path.as_os_str().is_empty() {
        return Err(SkeletonError::EmptyPath);
    }

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_skeleton_matches_layout() {
        let skeleton = Skeleton::builtin().unwrap();

        let directories: Vec<_> = skeleton
            .directories()
            .iter()
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(
            directories,
            vec![
                "data/raw",
                "data/interim",
                "data/processed",
                "data/external",
                "notebooks",
                "references/literature",
                "results/figures",
                "results/tables",
                "results/logs",
                "src/data",
                "src/models",
                "src/visualization",
                "scripts",
            ]
        );

        let files: Vec<_> = skeleton
            .files()
            .keys()
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(
            files,
            vec![
                "README.md",
                ".gitignore",
                "requirements.txt",
                "src/config.py",
                "src/utils.py",
                "src/__init__.py",
                "src/data/__init__.py",
                "src/models/__init__.py",
                "src/visualization/__init__.py",
            ]
        );
        assert_eq!(skeleton.len(), 22);
    }

    #[test]
    fn builtin_payloads_carry_helpers() {
        let skeleton = Skeleton::builtin().unwrap();
        let files = skeleton.files();

        let config = &files[Path::new("src/config.py")];
        assert!(config.contains("RAW_DATA_DIR"));
        assert!(config.contains("mkdir(parents=True, exist_ok=True)"));

        let utils = &files[Path::new("src/utils.py")];
        assert!(utils.contains("def get_project_root()"));
        assert!(utils.contains("def load_data(filename: str, folder=\"raw\")"));
        assert!(utils.contains("FileNotFoundError"));
        assert!(utils.contains("read_csv") && utils.contains("read_excel"));

        assert!(files[Path::new("src/__init__.py")].is_empty());
    }

    #[test]
    fn current_dir_segments_are_dropped() {
        let skeleton =
            Skeleton::from_toml_str("test", "directories = [\"./data/raw\"]").unwrap();

        assert_eq!(skeleton.directories(), &[PathBuf::from("data/raw")]);
    }

    #[test]
    fn parent_segments_are_rejected() {
        let err = Skeleton::from_toml_str("test", "directories = [\"data/../../etc\"]");

        assert!(matches!(err, Err(SkeletonError::EscapesRoot { .. })));
    }

    #[test]
    fn absolute_paths_are_rejected() {
        let err = Skeleton::from_toml_str("test", "[files]\n\"/etc/passwd\" = \"x\"");

        assert!(matches!(err, Err(SkeletonError::EscapesRoot { .. })));
    }

    #[test]
    fn empty_paths_are_rejected() {
        let err = Skeleton::from_toml_str("test", "directories = [\".\"]");

        assert!(matches!(err, Err(SkeletonError::EmptyPath)));
    }

    #[test]
    fn duplicate_directories_are_rejected() {
        let err = Skeleton::from_toml_str("test", "directories = [\"a\", \"./a\"]");

        assert!(matches!(err, Err(SkeletonError::DuplicateDirectory { .. })));
    }

    #[test]
    fn duplicate_files_are_rejected() {
        let err = Skeleton::from_toml_str(
            "test",
            "[files]\n\"README.md\" = \"one\"\n\"./README.md\" = \"two\"",
        );

        match err {
            Err(SkeletonError::DuplicateFile { path }) => assert_eq!(path, "./README.md"),
            other => panic!("expected a duplicate file, got {:?}", other),
        }
    }

    #[test]
    fn file_cannot_take_a_directory_path() {
        let err = Skeleton::from_toml_str("test", "directories = [\"a\"]\n[files]\n\"a\" = \"x\"");
        assert!(matches!(err, Err(SkeletonError::FileOverlapsDirectory { .. })));

        let err = Skeleton::from_toml_str(
            "test",
            "directories = [\"data/raw\"]\n[files]\n\"data\" = \"x\"",
        );
        assert!(matches!(err, Err(SkeletonError::FileOverlapsDirectory { .. })));
    }

    #[test]
    fn file_parent_must_be_declared() {
        let ok = Skeleton::from_toml_str(
            "test",
            "directories = [\"src/data\"]\n[files]\n\"src/main.py\" = \"\"\n\"top.txt\" = \"\"",
        );
        assert!(ok.is_ok());

        let err = Skeleton::from_toml_str("test", "[files]\n\"src/main.py\" = \"\"");
        assert!(matches!(err, Err(SkeletonError::OrphanFile { .. })));
    }

    #[test]
    fn malformed_toml_is_reported() {
        let err = Skeleton::from_toml_str("broken", "directories = [");

        assert!(matches!(err, Err(SkeletonError::ParseToml { .. })));
    }
}
