use std::fs;
use std::path::Path;

use tempfile::TempDir;
use vidshelf::catalog::identifier::entry_id;
use vidshelf::catalog::scanner::relative_path_string;
use vidshelf::catalog::{scan, Catalog, CatalogEntry, ScanError};
use vidshelf::config::MediaSettings;

fn write_file(root: &Path, rel: &str, len: usize) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, vec![0u8; len]).unwrap();
}

fn sample_tree() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "a/movie.mp4", 1000);
    write_file(dir.path(), "b/clip.mkv", 10);
    write_file(dir.path(), "Cinema/Zebra.webm", 20);
    write_file(dir.path(), "notes.txt", 5);
    write_file(dir.path(), "Album/cover.jpg", 5);
    write_file(dir.path(), ".hidden/Extra.MOV", 7);
    dir
}

fn relative_paths(catalog: &Catalog) -> Vec<&str> {
    catalog.entries().iter().map(|e| e.relative_path.as_str()).collect()
}

#[test]
fn scan_nonexistent_root_is_an_error() {
    let err = scan(Path::new("/nonexistent/path/does/not/exist"), &MediaSettings::default())
        .unwrap_err();
    assert!(matches!(err, ScanError::Missing(_)), "got {err:?}");
}

#[test]
fn scan_file_root_is_an_error() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "movie.mp4", 1);
    let err = scan(&dir.path().join("movie.mp4"), &MediaSettings::default()).unwrap_err();
    assert!(matches!(err, ScanError::NotADirectory(_)), "got {err:?}");
}

#[test]
fn scan_empty_root_returns_empty_catalog() {
    let dir = TempDir::new().unwrap();
    let catalog = scan(dir.path(), &MediaSettings::default()).unwrap();
    assert!(catalog.is_empty());
}

#[test]
fn scan_keeps_only_media_extensions() {
    let dir = sample_tree();
    let catalog = scan(dir.path(), &MediaSettings::default()).unwrap();
    assert_eq!(
        relative_paths(&catalog),
        [".hidden/Extra.MOV", "a/movie.mp4", "b/clip.mkv", "Cinema/Zebra.webm"]
    );
}

#[test]
fn scan_records_size_and_lowercase_extension() {
    let dir = sample_tree();
    let catalog = scan(dir.path(), &MediaSettings::default()).unwrap();
    let movie = catalog.lookup(&entry_id("a/movie.mp4")).unwrap();
    assert_eq!(movie.size_bytes, 1000);
    assert_eq!(movie.extension, "mp4");
    let canonical = fs::canonicalize(dir.path()).unwrap();
    assert_eq!(movie.path, canonical.join("a").join("movie.mp4"));

    let extra = catalog.lookup(&entry_id(".hidden/Extra.MOV")).unwrap();
    assert_eq!(extra.extension, "mov");
}

#[test]
fn scan_canonicalizes_root_before_walking() {
    let dir = sample_tree();
    let indirect = dir.path().join("a").join("..");
    let catalog = scan(&indirect, &MediaSettings::default()).unwrap();

    let canonical = fs::canonicalize(dir.path()).unwrap();
    assert_eq!(catalog.root(), canonical.as_path());
    let movie = catalog.lookup(&entry_id("a/movie.mp4")).unwrap();
    assert!(movie.path.is_absolute());
    assert_eq!(movie.path, canonical.join("a").join("movie.mp4"));
    assert_eq!(relative_paths(&catalog).len(), 4);
}

#[test]
fn scan_respects_configured_extensions() {
    let dir = sample_tree();
    let settings = MediaSettings::new(["mkv"], Vec::<String>::new());
    let catalog = scan(dir.path(), &settings).unwrap();
    assert_eq!(relative_paths(&catalog), ["b/clip.mkv"]);
}

#[test]
fn rescanning_yields_identical_catalog() {
    let dir = sample_tree();
    let first = scan(dir.path(), &MediaSettings::default()).unwrap();
    let second = scan(dir.path(), &MediaSettings::default()).unwrap();
    assert_eq!(first.entries(), second.entries());
}

#[test]
fn ids_depend_on_relative_path_only() {
    let one = sample_tree();
    let two = sample_tree();
    let a = scan(one.path(), &MediaSettings::default()).unwrap();
    let b = scan(two.path(), &MediaSettings::default()).unwrap();
    let ids_a: Vec<_> = a.entries().iter().map(|e| e.id).collect();
    let ids_b: Vec<_> = b.entries().iter().map(|e| e.id).collect();
    assert_eq!(ids_a, ids_b);
}

#[test]
fn every_entry_is_found_by_its_id() {
    let dir = sample_tree();
    let catalog = scan(dir.path(), &MediaSettings::default()).unwrap();
    for entry in catalog.entries() {
        assert_eq!(catalog.lookup(&entry.id), Some(entry));
        assert_eq!(entry.id, entry_id(&entry.relative_path));
    }
}

#[test]
fn entry_id_is_deterministic_and_distinct() {
    assert_eq!(entry_id("a/movie.mp4"), entry_id("a/movie.mp4"));
    assert_ne!(entry_id("a/movie.mp4"), entry_id("a/Movie.mp4"));
    assert_ne!(entry_id("a/movie.mp4"), entry_id("b/movie.mp4"));
}

#[test]
fn relative_path_uses_forward_slashes() {
    let rel = Path::new("shows").join("s01").join("e01.mkv");
    assert_eq!(relative_path_string(&rel), "shows/s01/e01.mkv");
}

#[cfg(unix)]
#[test]
fn symlinked_files_are_followed() {
    let dir = sample_tree();
    let outside = TempDir::new().unwrap();
    write_file(outside.path(), "linked.mp4", 3);
    std::os::unix::fs::symlink(outside.path().join("linked.mp4"), dir.path().join("linked.mp4"))
        .unwrap();

    let catalog = scan(dir.path(), &MediaSettings::default()).unwrap();
    let linked = catalog.lookup(&entry_id("linked.mp4")).unwrap();
    assert_eq!(linked.size_bytes, 3);
}

fn entry(rel: &str) -> CatalogEntry {
    CatalogEntry {
        id: entry_id(rel),
        relative_path: rel.to_string(),
        path: Path::new("/lib").join(rel),
        size_bytes: 0,
        extension: "mp4".to_string(),
    }
}

#[test]
fn ordering_is_case_insensitive_and_total() {
    let catalog = Catalog::from_entries(
        "/lib",
        vec![entry("b.mp4"), entry("B.mp4"), entry("a.mp4"), entry("C.mp4")],
    );
    assert_eq!(relative_paths(&catalog), ["a.mp4", "B.mp4", "b.mp4", "C.mp4"]);
}

#[test]
fn duplicate_ids_keep_first_entry() {
    let mut dup = entry("z.mp4");
    dup.id = entry_id("a.mp4");
    let catalog = Catalog::from_entries("/lib", vec![dup, entry("a.mp4")]);
    assert_eq!(catalog.len(), 1);
    assert_eq!(
        catalog.lookup(&entry_id("a.mp4")).unwrap().relative_path,
        "a.mp4"
    );
}
