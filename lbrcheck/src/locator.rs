//! Library file lookup inside a library repository.
//!
//! A library is discoverable when a file anywhere below the repository root
//! has a name whose text before the first `.` equals the library name
//! (case-sensitive). The first match in directory-walk order wins; the files
//! of a directory are visited before any of its subdirectories. Directories,
//! including symlinks to directories, never match.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::core::LbrCheckError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryLocation {
    Found(PathBuf),
    NotFound,
}

impl LibraryLocation {
    pub fn path(&self) -> Option<&Path> {
        match self {
            LibraryLocation::Found(path) => Some(path),
            LibraryLocation::NotFound => None,
        }
    }
}

/// Text of a file name before its first `.`.
pub fn library_stem(file_name: &str) -> &str {
    file_name
        .split_once('.')
        .map_or(file_name, |(stem, _)| stem)
}

/// Find the file for library `name` below `repository`.
///
/// An unreadable repository root is an error. Unreadable entries further
/// down are skipped.
pub fn locate_library(name: &str, repository: &Path) -> Result<LibraryLocation, LbrCheckError> {
    let mut found: Option<PathBuf> = None;
    let mut shadowed: Vec<PathBuf> = Vec::new();

    let walker = WalkDir::new(repository).sort_by_key(|entry| entry.file_type().is_dir());

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(source) if source.depth() == 0 => {
                return Err(LbrCheckError::Repository {
                    path: repository.to_path_buf(),
                    source,
                });
            }
            Err(e) => {
                tracing::debug!("Skipping unreadable repository entry: {}", e);
                continue;
            }
        };

        if entry.file_type().is_dir() || (entry.path_is_symlink() && entry.path().is_dir()) {
            continue;
        }
        let Some(file_name) = entry.file_name().to_str() else {
            continue;
        };
        if library_stem(file_name) != name {
            continue;
        }

        if found.is_none() {
            found = Some(entry.into_path());
        } else {
            shadowed.push(entry.into_path());
        }
    }

    match found {
        Some(path) => {
            if !shadowed.is_empty() {
                tracing::warn!(
                    "Library '{}' matches several files; using {} and ignoring {:?}",
                    name,
                    path.display(),
                    shadowed
                );
            }
            tracing::debug!("Resolved library '{}' to {}", name, path.display());
            Ok(LibraryLocation::Found(path))
        }
        None => Ok(LibraryLocation::NotFound),
    }
}
