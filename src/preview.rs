use crate::skeleton::Skeleton;
use colored::Colorize;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Represents a node in the tree (either file or directory).
#[derive(Debug)]
struct TreeNode {
    name: String,
    children: Vec<Rc<RefCell<TreeNode>>>,
    is_file: bool,
    exists: bool,
}
impl TreeNode {
    fn new(name: String, is_file: bool, exists: bool) -> Self {
        Self {
            name,
            children: Vec::new(),
            is_file,
            exists,
        }
    }
}

/// Build the directory tree for `skeleton` as it would land under `root`.
///
/// Intermediate directories (`data` for `data/raw`) get their own node so the tree
/// mirrors what ends up on disk.
fn build_tree(skeleton: &Skeleton, root: &Path) -> Rc<RefCell<TreeNode>> {
    let root_name = root
        .file_name()
        .map(|os| os.to_string_lossy().to_string())
        .unwrap_or_else(|| root.display().to_string());

    let tree = Rc::new(RefCell::new(TreeNode::new(root_name, false, true)));

    // relative path -> node
    let mut lookup: HashMap<PathBuf, Rc<RefCell<TreeNode>>> = HashMap::new();
    lookup.insert(PathBuf::new(), Rc::clone(&tree));

    let entries = skeleton
        .directories()
        .iter()
        .map(|dir| (dir, false))
        .chain(skeleton.files().keys().map(|file| (file, true)));

    for (relative, is_file) in entries {
        let mut current = PathBuf::new();
        let segments: Vec<_> = relative.components().collect();

        for (index, segment) in segments.iter().enumerate() {
            let parent = current.clone();
            current.push(segment);

            if lookup.contains_key(&current) {
                continue;
            }

            let is_leaf_file = is_file && index == segments.len() - 1;
            let node = Rc::new(RefCell::new(TreeNode::new(
                segment.as_os_str().to_string_lossy().to_string(),
                is_leaf_file,
                root.join(&current).exists(),
            )));

            if let Some(parent_node) = lookup.get(&parent) {
                parent_node.borrow_mut().children.push(Rc::clone(&node));
            }

            lookup.insert(current.clone(), node);
        }
    }

    tree
}

/// Render the tree with a nice ASCII style.
fn render_tree(node: &Rc<RefCell<TreeNode>>, prefix: &str, is_last: bool, out: &mut String) {
    let node_borrow = node.borrow();

    let connector = if is_last {
        "└── ".yellow()
    } else {
        "├── ".yellow()
    };
    let name = if node_borrow.is_file {
        node_borrow.name.green()
    } else {
        format!("{}/", node_borrow.name).blue()
    };
    let status = if node_borrow.exists {
        format!(" {}", "(exists)".dimmed())
    } else {
        String::new()
    };
    out.push_str(&format!("{}{}{}{}\n", prefix.yellow(), connector, name, status));

    let child_prefix = if is_last {
        format!("{}    ", prefix)
    } else {
        format!("{}│   ", prefix)
    };

    let len = node_borrow.children.len();
    for (i, child) in node_borrow.children.iter().enumerate() {
        let last = i == len - 1;
        render_tree(child, &child_prefix, last, out);
    }
}

/// The skeleton as a tree rooted at `root`, entries already on disk marked `(exists)`.
pub fn skeleton_tree(skeleton: &Skeleton, root: &Path) -> String {
    let tree_root = build_tree(skeleton, root);

    let mut out = String::new();
    render_tree(&tree_root, "", true, &mut out);

    out
}

pub fn preview_skeleton(skeleton: &Skeleton, root: &Path) {
    println!(
        "Legend: {} = (directory), {} = (file), {} = (left untouched)",
        "blue".blue(),
        "green".green(),
        "(exists)".dimmed()
    );

    let fancy_prompt = format!(
        "{} {}\n",
        "┌─".bold().bright_blue(),
        "Preview".bold().bright_blue(),
    );

    println!("{}", fancy_prompt);

    print!("{}", skeleton_tree(skeleton, root));

    println!("\n{}\n", "└─".bold().bright_blue());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn skeleton() -> Skeleton {
        Skeleton::from_toml_str(
            "test",
            r#"
            directories = ["data/raw", "data/processed", "notebooks"]

            [files]
            "README.md" = "readme"
            "data/raw/notes.txt" = "notes"
            "#,
        )
        .unwrap()
    }

    #[test]
    fn renders_nested_tree() {
        colored::control::set_override(false);
        let dir = tempfile::tempdir().unwrap();

        let tree = skeleton_tree(&skeleton(), dir.path());
        let lines: Vec<_> = tree.lines().skip(1).collect();

        assert_eq!(
            lines,
            vec![
                "    ├── data/",
                "    │   ├── raw/",
                "    │   │   └── notes.txt",
                "    │   └── processed/",
                "    ├── notebooks/",
                "    └── README.md",
            ]
        );
    }

    #[test]
    fn marks_existing_entries() {
        colored::control::set_override(false);
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("notebooks")).unwrap();
        fs::write(dir.path().join("README.md"), "mine").unwrap();

        let tree = skeleton_tree(&skeleton(), dir.path());

        assert!(tree.contains("├── notebooks/ (exists)"));
        assert!(tree.contains("└── README.md (exists)"));
        assert!(tree.contains("├── data/\n"));
    }
}
