use anyhow::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Scans the input directory for candidate source images, flat and
/// non-recursive, keeping only files with the expected extension.
/// The result is sorted by filename, which sorts chronologically given the
/// `YYYY-MM-DD_HHMM` naming scheme.
pub fn scan_source_images(directory: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = WalkDir::new(directory)
        .max_depth(1)
        .follow_links(false)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
        })
        .collect();

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_scan_filters_by_extension() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("2024-01-01_0001.jpg"), b"x").unwrap();
        fs::write(temp_dir.path().join("2024-01-01_0002.JPG"), b"x").unwrap();
        fs::write(temp_dir.path().join("notes.txt"), b"x").unwrap();

        let files = scan_source_images(temp_dir.path(), "jpg").unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_scan_sorts_by_filename() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("2024-01-02_0000.jpg"), b"x").unwrap();
        fs::write(temp_dir.path().join("2024-01-01_0930.jpg"), b"x").unwrap();
        fs::write(temp_dir.path().join("2024-01-01_0005.jpg"), b"x").unwrap();

        let files = scan_source_images(temp_dir.path(), "jpg").unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "2024-01-01_0005.jpg",
                "2024-01-01_0930.jpg",
                "2024-01-02_0000.jpg"
            ]
        );
    }

    #[test]
    fn test_scan_is_not_recursive() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("nested");
        fs::create_dir(&nested).unwrap();
        fs::write(nested.join("2024-01-01_0001.jpg"), b"x").unwrap();
        fs::write(temp_dir.path().join("2024-01-01_0002.jpg"), b"x").unwrap();

        let files = scan_source_images(temp_dir.path(), "jpg").unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_scan_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let files = scan_source_images(temp_dir.path(), "jpg").unwrap();
        assert!(files.is_empty());
    }
}
