use std::path::Path;

/// Content type of transcoded output (fragmented MP4, H.264 + AAC).
pub const TRANSCODE_MIME: &str = "video/mp4";

/// Fallback for extensions outside the table below.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Map a lowercase extension (no dot) to the MIME type sent on direct delivery.
///
/// Unknown extensions map to `application/octet-stream`: the media set is
/// configurable, so the table can never be exhaustive.
pub fn mime_for_extension(ext: &str) -> &'static str {
    match ext {
        "mp4" | "m4v" => "video/mp4",
        "webm" => "video/webm",
        "ogv" | "ogg" => "video/ogg",
        "mkv" => "video/x-matroska",
        "avi" => "video/x-msvideo",
        "mov" => "video/quicktime",
        "ts" | "m2ts" | "mts" => "video/MP2T",
        "mpg" | "mpeg" => "video/mpeg",
        "wmv" => "video/x-ms-wmv",
        "flv" => "video/x-flv",
        "3gp" => "video/3gpp",
        _ => OCTET_STREAM,
    }
}

/// Lowercase extension of `path`, without the leading dot.
///
/// Returns `None` for files without an extension or with a non-UTF-8 one.
pub fn extension_of(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
