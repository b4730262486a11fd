use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "vidshelf",
    about = "Local video library browser — `vidshelf ~/Videos` and open it in a browser",
    long_about = None,
    version,
)]
pub struct Args {
    /// Directory to index for video files [default: current directory]
    pub root: Option<PathBuf>,

    /// HTTP port to listen on [default: 777]
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Path to TOML config file (overrides default search: ./vidshelf.toml, ~/.config/vidshelf/config.toml)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// ffmpeg-compatible binary used for transcoding [default: `ffmpeg` on PATH]
    #[arg(long, value_name = "PATH")]
    pub ffmpeg: Option<PathBuf>,

    /// Page title shown on the listing [default: vidshelf@<hostname>]
    #[arg(short, long)]
    pub title: Option<String>,

    /// Bind to localhost only (127.0.0.1) instead of all interfaces (0.0.0.0)
    #[arg(long)]
    pub localhost: bool,
}
