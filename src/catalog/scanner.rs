use std::path::{Component, Path, PathBuf};
use std::time::Instant;
use walkdir::WalkDir;

use crate::catalog::identifier::entry_id;
use crate::catalog::mime::extension_of;
use crate::catalog::{Catalog, CatalogEntry};
use crate::config::MediaSettings;

/// Startup-fatal failure to read the catalog root.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("root directory does not exist: {}", .0.display())]
    Missing(PathBuf),
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
    #[error("cannot read root directory {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Walk `root` and build the catalog of every file whose extension is in
/// `settings.media_extensions`.
///
/// The root is canonicalized first, so every entry path is absolute.
/// Symlinks are followed; hidden files are included. Entries below the root
/// that cannot be read are logged and skipped, only a root that is missing or
/// unreadable fails the scan.
pub fn scan(root: &Path, settings: &MediaSettings) -> Result<Catalog, ScanError> {
    let start = Instant::now();
    check_root(root)?;
    // Absolute paths for the transcoder's input and the listing notice
    let root = &std::fs::canonicalize(root).map_err(|source| ScanError::Unreadable {
        path: root.to_owned(),
        source,
    })?;

    let mut entries = Vec::new();
    for entry in WalkDir::new(root).follow_links(true) {
        match entry {
            Err(e) if e.depth() == 0 => {
                return Err(ScanError::Unreadable {
                    path: root.to_owned(),
                    source: e.into(),
                });
            }
            Err(e) => {
                tracing::warn!("Cannot access entry: {}", e);
            }
            Ok(entry) if entry.file_type().is_file() => {
                if let Some(item) = process_file(root, entry.path(), settings) {
                    tracing::debug!("indexed {} -> {}", item.id, item.relative_path);
                    entries.push(item);
                }
            }
            Ok(_) => {}
        }
    }

    let catalog = Catalog::from_entries(root, entries);
    let direct = catalog
        .entries()
        .iter()
        .filter(|e| settings.is_playable(&e.extension))
        .count();
    tracing::info!(
        "Scanned {} videos ({} direct, {} transcoded) in {:.1}s",
        catalog.len(),
        direct,
        catalog.len() - direct,
        start.elapsed().as_secs_f64()
    );
    Ok(catalog)
}

fn check_root(root: &Path) -> Result<(), ScanError> {
    let meta = match std::fs::metadata(root) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ScanError::Missing(root.to_owned()));
        }
        Err(source) => {
            return Err(ScanError::Unreadable {
                path: root.to_owned(),
                source,
            });
        }
    };
    if !meta.is_dir() {
        return Err(ScanError::NotADirectory(root.to_owned()));
    }
    std::fs::read_dir(root).map_err(|source| ScanError::Unreadable {
        path: root.to_owned(),
        source,
    })?;
    Ok(())
}

fn process_file(root: &Path, path: &Path, settings: &MediaSettings) -> Option<CatalogEntry> {
    // Files outside the media set are skipped silently
    let extension = extension_of(path)?;
    if !settings.is_media(&extension) {
        return None;
    }

    let relative = path.strip_prefix(root).ok()?;
    let relative_path = relative_path_string(relative);

    let size_bytes = match std::fs::metadata(path) {
        Ok(m) => m.len(),
        Err(e) => {
            tracing::warn!("Cannot stat {}: {}", path.display(), e);
            return None;
        }
    };

    Some(CatalogEntry {
        id: entry_id(&relative_path),
        relative_path,
        path: path.to_owned(),
        size_bytes,
        extension,
    })
}

/// Join the normal components of `relative` with `/`, whatever the platform separator.
pub fn relative_path_string(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
