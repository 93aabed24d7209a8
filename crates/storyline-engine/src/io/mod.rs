use crate::model::{Block, DocTree};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid manuscript JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid manuscripts directory: {0}")]
    InvalidManuscriptsDir(String),
}

/// Read a manuscript tree from a JSON file
pub fn load_tree(path: &Path) -> Result<DocTree, IoError> {
    let content = read(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Write a manuscript tree as pretty-printed JSON
pub fn save_tree(path: &Path, tree: &DocTree) -> Result<(), IoError> {
    write(path, &serde_json::to_string_pretty(tree)?)
}

/// Read a flat block list from a JSON file
pub fn load_blocks(path: &Path) -> Result<Vec<Block>, IoError> {
    let content = read(path)?;
    Ok(serde_json::from_str(&content)?)
}

pub fn save_blocks(path: &Path, blocks: &[Block]) -> Result<(), IoError> {
    write(path, &serde_json::to_string_pretty(blocks)?)
}

/// Scan for manuscript files in the manuscripts directory
pub fn scan_manuscripts(root: &Path) -> Result<Vec<PathBuf>, IoError> {
    validate_manuscripts_dir(root)?;

    let mut files = Vec::new();
    scan_directory_recursive(root, &mut files)?;
    files.sort();
    Ok(files)
}

pub fn validate_manuscripts_dir(path: &Path) -> Result<(), IoError> {
    if !path.is_dir() {
        return Err(IoError::InvalidManuscriptsDir(format!(
            "{} is not a directory",
            path.display()
        )));
    }
    Ok(())
}

fn read(path: &Path) -> Result<String, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    Ok(fs::read_to_string(path)?)
}

fn write(path: &Path, content: &str) -> Result<(), IoError> {
    // Create parent directories if they don't exist
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(fs::write(path, content)?)
}

fn scan_directory_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), IoError> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();

        if path.is_dir() {
            scan_directory_recursive(&path, files)?;
        } else if let Some(ext) = path.extension()
            && ext == "json"
        {
            files.push(path);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Paragraph, Part, Scene};
    use crate::tests::{create_test_file, create_test_manuscripts_dir};
    use pretty_assertions::assert_eq;

    fn sample_tree() -> DocTree {
        DocTree::new(vec![Part::new(
            "p1",
            "Arrival",
            vec![Scene::new(
                "s1",
                "Dock",
                vec![Paragraph::plain("a", "The ship came in."), Paragraph::blank("b")],
            )],
        )])
        .with_title("t", "Harbour")
    }

    #[test]
    fn test_save_and_load_tree() {
        // Given a manuscript tree saved to disk
        let dir = create_test_manuscripts_dir();
        let path = dir.path().join("book.json");
        let tree = sample_tree();
        save_tree(&path, &tree).unwrap();

        // When loading it back
        let loaded = load_tree(&path).unwrap();

        // Then it is unchanged
        assert_eq!(loaded, tree);
    }

    #[test]
    fn test_load_minimal_tree_defaults_optional_fields() {
        let dir = create_test_manuscripts_dir();
        let path = create_test_file(
            &dir,
            "minimal.json",
            r#"{"parts":[{"id":"p","name":"","children":[{"id":"s","name":"","children":[{"id":"a","type":"plain","text":"hi"}]}]}]}"#,
        );

        let tree = load_tree(&path).unwrap();
        assert_eq!(tree.title, None);
        assert!(!tree.parts[0].folded);
        assert_eq!(tree.paragraph_count(), 1);
    }

    #[test]
    fn test_save_blocks_creates_parent_directories() {
        let dir = create_test_manuscripts_dir();
        let path = dir.path().join("drafts").join("nested").join("flat.json");
        let blocks = vec![Block::part_break("p", "One"), Block::scene_break("s", "")];

        save_blocks(&path, &blocks).unwrap();

        assert!(dir.path().join("drafts").join("nested").is_dir());
        assert_eq!(load_blocks(&path).unwrap(), blocks);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = create_test_manuscripts_dir();
        let result = load_tree(&dir.path().join("nope.json"));
        assert!(matches!(result, Err(IoError::NotFound(_))));
    }

    #[test]
    fn test_load_malformed_json() {
        let dir = create_test_manuscripts_dir();
        let path = create_test_file(&dir, "bad.json", "{ not json");
        assert!(matches!(load_tree(&path), Err(IoError::Json(_))));
    }

    #[test]
    fn test_scan_finds_nested_json_only() {
        // Given a manuscripts directory with mixed files
        let dir = create_test_manuscripts_dir();
        create_test_file(&dir, "one.json", "{}");
        create_test_file(&dir, "notes.md", "# not a manuscript");
        let sub = dir.path().join("series");
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("two.json"), "{}").unwrap();

        // When scanning
        let files = scan_manuscripts(dir.path()).unwrap();

        // Then only the JSON files are found, sorted
        let names: Vec<_> = files
            .iter()
            .map(|f| f.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["one.json", "two.json"]);
    }

    #[test]
    fn test_scan_invalid_directory() {
        let result = scan_manuscripts(Path::new("/this/path/does/not/exist"));
        assert!(matches!(result, Err(IoError::InvalidManuscriptsDir(_))));
    }
}
