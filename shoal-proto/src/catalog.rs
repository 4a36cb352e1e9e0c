//! Shared-file catalog.
//!
//! A catalog is the bounded snapshot of the local shared directory that a
//! single PUBLISH request advertises. It is rebuilt fresh for every
//! PUBLISH, never cached, and a build that would violate the wire limits
//! fails instead of silently dropping entries.

use std::fs;
use std::path::Path;

use crate::error::{CatalogError, WireError};
use crate::wire::{self, MAX_CATALOG_FILES, MAX_PUBLISH_BYTES, PUBLISH_HEADER_BYTES};

/// One shared file eligible for publishing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    name: String,
}

impl FileEntry {
    /// Create an entry, enforcing the per-entry wire limits.
    pub fn new(name: impl Into<String>) -> Result<Self, WireError> {
        let name = name.into();
        wire::validate_filename(&name)?;
        Ok(Self { name })
    }

    /// The filename as published.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Encoded size on the wire: the name plus its NUL terminator.
    pub fn wire_len(&self) -> usize {
        self.name.len() + 1
    }
}

/// An ordered, bounded list of shared files.
///
/// Entry order follows directory-enumeration order, which is OS-dependent;
/// callers must treat it as non-deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileCatalog {
    entries: Vec<FileEntry>,
}

impl FileCatalog {
    /// Build a catalog by enumerating a shared directory.
    ///
    /// Subdirectories are skipped; regular entries are admitted in
    /// enumeration order until one would exceed the 12-file or 1200-byte
    /// bound, at which point the whole build fails with `CatalogOverflow`.
    pub fn scan(shared_dir: &Path) -> Result<Self, CatalogError> {
        let entries = fs::read_dir(shared_dir).map_err(|source| {
            CatalogError::DirectoryUnavailable {
                path: shared_dir.to_path_buf(),
                source,
            }
        })?;

        let mut catalog = Self::default();
        for entry in entries {
            let entry = entry.map_err(|source| CatalogError::DirectoryUnavailable {
                path: shared_dir.to_path_buf(),
                source,
            })?;

            let file_type = entry.file_type().map_err(|source| {
                CatalogError::DirectoryUnavailable {
                    path: shared_dir.to_path_buf(),
                    source,
                }
            })?;
            if file_type.is_dir() {
                tracing::debug!(entry = ?entry.file_name(), "skipping subdirectory");
                continue;
            }

            let name = entry.file_name();
            let name = name.to_str().ok_or_else(|| {
                CatalogError::Wire(WireError::InvalidFilename {
                    name: name.to_string_lossy().into_owned(),
                    reason: "not valid UTF-8",
                })
            })?;

            catalog.push(FileEntry::new(name).map_err(CatalogError::Wire)?)?;
        }

        tracing::debug!(
            files = catalog.len(),
            bytes = catalog.wire_size(),
            "built shared-file catalog"
        );

        Ok(catalog)
    }

    /// Build a catalog from filenames, enforcing the same bounds as `scan`.
    pub fn from_names<I, S>(names: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut catalog = Self::default();
        for name in names {
            catalog.push(FileEntry::new(name.as_ref()).map_err(CatalogError::Wire)?)?;
        }
        Ok(catalog)
    }

    /// Admit one entry, failing the moment a bound would be exceeded.
    fn push(&mut self, entry: FileEntry) -> Result<(), CatalogError> {
        if self.entries.len() + 1 > MAX_CATALOG_FILES
            || self.wire_size() + entry.wire_len() > MAX_PUBLISH_BYTES
        {
            return Err(CatalogError::Wire(WireError::CatalogOverflow {
                files: self.entries.len() + 1,
                bytes: self.wire_size() + entry.wire_len(),
            }));
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the entries in publish order.
    pub fn iter(&self) -> impl Iterator<Item = &FileEntry> {
        self.entries.iter()
    }

    /// Total encoded size of the PUBLISH request carrying this catalog,
    /// including the 5-byte header.
    pub fn wire_size(&self) -> usize {
        PUBLISH_HEADER_BYTES + self.entries.iter().map(FileEntry::wire_len).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    fn make_shared_dir(names: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for name in names {
            let mut file = File::create(dir.path().join(name)).unwrap();
            file.write_all(b"data").unwrap();
        }
        dir
    }

    #[test]
    fn test_scan_lists_files() {
        let dir = make_shared_dir(&["one.txt", "two.bin", "three"]);
        let catalog = FileCatalog::scan(dir.path()).unwrap();

        assert_eq!(catalog.len(), 3);
        // Enumeration order is OS-dependent; compare as a set.
        let mut names: Vec<&str> = catalog.iter().map(FileEntry::name).collect();
        names.sort_unstable();
        assert_eq!(names, vec!["one.txt", "three", "two.bin"]);
    }

    #[test]
    fn test_scan_skips_subdirectories() {
        let dir = make_shared_dir(&["kept.txt"]);
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let catalog = FileCatalog::scan(dir.path()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.iter().next().unwrap().name(), "kept.txt");
    }

    #[test]
    fn test_scan_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no-such-dir");

        let result = FileCatalog::scan(&missing);
        assert!(matches!(
            result,
            Err(CatalogError::DirectoryUnavailable { .. })
        ));
    }

    #[test]
    fn test_thirteen_files_overflow() {
        let names: Vec<String> = (0..13).map(|i| format!("file{i}.txt")).collect();
        let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let dir = make_shared_dir(&name_refs);

        let result = FileCatalog::scan(dir.path());
        assert!(matches!(
            result,
            Err(CatalogError::Wire(WireError::CatalogOverflow { files: 13, .. }))
        ));
    }

    #[test]
    fn test_twelve_files_fit() {
        let names: Vec<String> = (0..12).map(|i| format!("file{i}.txt")).collect();
        let catalog = FileCatalog::from_names(&names).unwrap();
        assert_eq!(catalog.len(), 12);
    }

    #[test]
    fn test_byte_cap_overflow() {
        // Twelve 99-byte names need 12 * 100 + 5 bytes, past the 1200 cap.
        let names: Vec<String> = (0..12)
            .map(|i| format!("{i:02}{}", "x".repeat(97)))
            .collect();
        let result = FileCatalog::from_names(&names);
        assert!(matches!(
            result,
            Err(CatalogError::Wire(WireError::CatalogOverflow { .. }))
        ));
    }

    #[test]
    fn test_exactly_full_catalog_is_admitted() {
        // Eleven 99-byte names (100 on the wire each) plus one 94-byte
        // name land on 5 + 1100 + 95 = 1200 bytes, exactly the cap.
        let mut names: Vec<String> = (0..11)
            .map(|i| format!("{i:02}{}", "x".repeat(97)))
            .collect();
        names.push("y".repeat(94));

        let catalog = FileCatalog::from_names(&names).unwrap();
        assert_eq!(catalog.len(), 12);
        assert_eq!(catalog.wire_size(), MAX_PUBLISH_BYTES);
    }

    #[test]
    fn test_name_too_long() {
        let long = "x".repeat(100);
        let dir = make_shared_dir(&[long.as_str()]);

        let result = FileCatalog::scan(dir.path());
        assert!(matches!(
            result,
            Err(CatalogError::Wire(WireError::InvalidFilename { .. }))
        ));
    }

    #[test]
    fn test_wire_size_accounting() {
        let catalog = FileCatalog::from_names(["ab", "cde"]).unwrap();
        // 5-byte header + (2 + 1) + (3 + 1).
        assert_eq!(catalog.wire_size(), 12);
    }

    #[test]
    fn test_empty_catalog() {
        let dir = make_shared_dir(&[]);
        let catalog = FileCatalog::scan(dir.path()).unwrap();
        assert!(catalog.is_empty());
        assert_eq!(catalog.wire_size(), PUBLISH_HEADER_BYTES);
    }
}
