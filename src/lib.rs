//! Local video library browser: index a directory tree once, then stream each
//! file over HTTP verbatim or through a live ffmpeg transcode.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod delivery;
pub mod http;
