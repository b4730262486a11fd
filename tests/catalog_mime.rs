use std::path::Path;
use vidshelf::catalog::mime::{extension_of, mime_for_extension, OCTET_STREAM, TRANSCODE_MIME};

#[test]
fn test_mp4_is_video_mp4() {
    assert_eq!(mime_for_extension("mp4"), "video/mp4");
    assert_eq!(mime_for_extension("m4v"), "video/mp4");
}

#[test]
fn test_browser_formats() {
    assert_eq!(mime_for_extension("webm"), "video/webm");
    assert_eq!(mime_for_extension("ogv"), "video/ogg");
}

#[test]
fn test_mkv_mime_is_matroska() {
    assert_eq!(mime_for_extension("mkv"), "video/x-matroska");
}

#[test]
fn test_unknown_extension_is_octet_stream() {
    assert_eq!(mime_for_extension("xyz"), OCTET_STREAM);
}

#[test]
fn test_transcode_target_is_mp4() {
    assert_eq!(TRANSCODE_MIME, "video/mp4");
}

#[test]
fn test_extension_is_lowercased() {
    assert_eq!(extension_of(Path::new("MOVIE.MKV")).as_deref(), Some("mkv"));
}

#[test]
fn test_no_extension_returns_none() {
    assert!(extension_of(Path::new("Makefile")).is_none());
    assert!(extension_of(Path::new("trailing.")).is_none());
}

#[test]
fn test_dotfile_has_no_extension() {
    // std treats ".mp4" as a file stem, not an extension
    assert!(extension_of(Path::new(".mp4")).is_none());
}
