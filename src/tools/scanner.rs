//! Directory tree rendering for planner context.

use crate::error::ToolError;
use std::path::Path;

/// Directories never worth showing to a model.
const IGNORED_DIRS: &[&str] = &["node_modules", ".git", "dist", ".vscode", "__pycache__"];

/// Render `root` as an indented tree, four spaces per level.
///
/// Directories end with `/`; entries are sorted so output is stable.
pub fn read_directory_structure(root: &Path) -> Result<String, ToolError> {
    let mut lines = Vec::new();
    let name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.display().to_string());
    lines.push(format!("{name}/"));
    walk(root, 1, &mut lines)?;
    Ok(lines.join("\n"))
}

fn walk(dir: &Path, depth: usize, lines: &mut Vec<String>) -> Result<(), ToolError> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| ToolError::io(format!("Failed to read {}", dir.display()), e))?;

    let mut dirs = Vec::new();
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ToolError::io("Failed to read directory entry", e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if entry.path().is_dir() {
            if !IGNORED_DIRS.contains(&name.as_str()) {
                dirs.push(name);
            }
        } else {
            files.push(name);
        }
    }
    files.sort();
    dirs.sort();

    let indent = " ".repeat(4 * depth);
    for file in files {
        lines.push(format!("{indent}{file}"));
    }
    for sub in dirs {
        lines.push(format!("{indent}{sub}/"));
        walk(&dir.join(&sub), depth + 1, lines)?;
    }
    Ok(())
}
