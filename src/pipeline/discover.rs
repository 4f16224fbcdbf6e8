use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// Every `.json` file below `root`, at any depth, sorted by path.
///
/// A missing root yields an empty list. Entries that cannot be read are
/// logged and skipped.
pub fn discover_json_files(root: &Path) -> Vec<PathBuf> {
    if !root.exists() {
        warn!("Data directory {:?} does not exist", root);
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping unreadable entry under {:?}: {}", root, e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| is_json(path))
        .collect();

    files.sort();
    files
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn finds_nested_json_files_in_order() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("A/B/C")).unwrap();
        fs::create_dir_all(dir.path().join("A/A")).unwrap();
        fs::write(dir.path().join("A/B/C/TRABCEI128F424C983.json"), "{}").unwrap();
        fs::write(dir.path().join("A/A/TRAAAAW128F429D538.json"), "{}").unwrap();
        fs::write(dir.path().join("A/B/notes.txt"), "skip").unwrap();
        fs::write(dir.path().join("top.JSON"), "{}").unwrap();

        let files = discover_json_files(dir.path());
        let relative: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();

        assert_eq!(
            relative,
            vec![
                PathBuf::from("A/A/TRAAAAW128F429D538.json"),
                PathBuf::from("A/B/C/TRABCEI128F424C983.json"),
                PathBuf::from("top.JSON"),
            ]
        );
    }

    #[test]
    fn missing_or_empty_root_yields_nothing() {
        let dir = TempDir::new().unwrap();
        assert!(discover_json_files(dir.path()).is_empty());
        assert!(discover_json_files(&dir.path().join("nope")).is_empty());
    }
}
