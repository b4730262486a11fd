use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

const DEFAULT_PORT: u16 = 777;

/// Extensions indexed when the config file does not override them.
pub const DEFAULT_MEDIA_EXTENSIONS: &[&str] = &["mp4", "mkv", "avi", "mov", "webm", "m4v", "ogv"];

/// Extensions a browser `<video>` element plays without help.
pub const DEFAULT_PLAYABLE_EXTENSIONS: &[&str] = &["mp4", "webm", "ogv"];

fn default_title() -> String {
    let host = hostname::get()
        .ok()
        .and_then(|os| os.into_string().ok())
        .filter(|s| !s.is_empty())
        .unwrap_or_default();
    if host.is_empty() {
        "vidshelf".to_string()
    } else {
        format!("vidshelf@{}", host)
    }
}

#[derive(Deserialize, Default, Debug)]
pub struct FileConfig {
    pub port: Option<u16>,
    pub root: Option<PathBuf>,
    pub title: Option<String>,
    pub ffmpeg: Option<PathBuf>,
    pub localhost: Option<bool>,
    pub media_extensions: Option<Vec<String>>,
    pub playable_extensions: Option<Vec<String>>,
}

/// Which extensions get indexed and which of those are served without transcoding.
///
/// Extensions are stored lowercase without a leading dot. Every playable
/// extension is also a media extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaSettings {
    pub media_extensions: BTreeSet<String>,
    pub playable_extensions: BTreeSet<String>,
}

impl MediaSettings {
    pub fn new<M, P>(media: M, playable: P) -> Self
    where
        M: IntoIterator,
        M::Item: AsRef<str>,
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        let playable_extensions: BTreeSet<String> =
            playable.into_iter().filter_map(normalize_extension).collect();
        let mut media_extensions: BTreeSet<String> =
            media.into_iter().filter_map(normalize_extension).collect();
        media_extensions.extend(playable_extensions.iter().cloned());
        MediaSettings {
            media_extensions,
            playable_extensions,
        }
    }

    pub fn is_media(&self, ext: &str) -> bool {
        self.media_extensions.contains(ext)
    }

    pub fn is_playable(&self, ext: &str) -> bool {
        self.playable_extensions.contains(ext)
    }
}

impl Default for MediaSettings {
    fn default() -> Self {
        MediaSettings::new(DEFAULT_MEDIA_EXTENSIONS, DEFAULT_PLAYABLE_EXTENSIONS)
    }
}

/// Lowercase, strip leading dots, and drop blank entries (" .MKV " -> "mkv").
fn normalize_extension(raw: impl AsRef<str>) -> Option<String> {
    let ext = raw.as_ref().trim().trim_start_matches('.').to_ascii_lowercase();
    if ext.is_empty() {
        None
    } else {
        Some(ext)
    }
}

#[derive(Debug)]
pub struct Config {
    pub port: u16,
    pub root: PathBuf,
    pub title: String,
    pub ffmpeg: Option<PathBuf>,
    pub localhost: bool,
    pub media: MediaSettings,
}

impl Config {
    pub fn resolve(file: Option<FileConfig>, args: &crate::cli::Args) -> Self {
        let file = file.unwrap_or_default();
        let defaults = MediaSettings::default();
        let media = match (file.media_extensions, file.playable_extensions) {
            (None, None) => defaults,
            (media, playable) => MediaSettings::new(
                media.unwrap_or_else(|| defaults.media_extensions.iter().cloned().collect()),
                playable.unwrap_or_else(|| defaults.playable_extensions.iter().cloned().collect()),
            ),
        };
        Config {
            port: args.port.or(file.port).unwrap_or(DEFAULT_PORT),
            root: args
                .root
                .clone()
                .or(file.root)
                .unwrap_or_else(|| PathBuf::from(".")),
            title: args.title.clone().or(file.title).unwrap_or_else(default_title),
            ffmpeg: args.ffmpeg.clone().or(file.ffmpeg),
            localhost: args.localhost || file.localhost.unwrap_or(false),
            media,
        }
    }
}

pub fn find_config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_owned());
    }
    let cwd_config = PathBuf::from("vidshelf.toml");
    if cwd_config.exists() {
        return Some(cwd_config);
    }
    if let Some(config_dir) = dirs::config_dir() {
        let xdg_config = config_dir.join("vidshelf").join("config.toml");
        if xdg_config.exists() {
            return Some(xdg_config);
        }
    }
    None
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

pub fn load_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: FileConfig = toml::from_str(&content)?;
    Ok(config)
}
