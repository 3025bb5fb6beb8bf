use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    // @checks: .xml extension, case-insensitive
    pub fn has_xml_extension<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .extension()
            .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("xml"))
    }

    /// Recursively find XML files under a directory, sorted for stable
    /// processing order. Files under `excluded_subtree` (when given) are
    /// left out so an output directory nested in the input is never
    /// re-consumed as input.
    pub fn find_xml_files<P: AsRef<Path>>(
        dir: P,
        excluded_subtree: Option<&Path>,
    ) -> Result<Vec<PathBuf>> {
        let excluded = excluded_subtree.map(|p| p.canonicalize().unwrap_or_else(|_| p.to_path_buf()));

        let mut result = Vec::new();
        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if !path.is_file() || !Self::has_xml_extension(path) {
                continue;
            }

            if let Some(excluded) = &excluded {
                let absolute = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
                if absolute.starts_with(excluded) {
                    continue;
                }
            }

            result.push(path.to_path_buf());
        }

        result.sort();
        Ok(result)
    }

    /// Write a string to a file, creating parent directories as needed
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }
}
