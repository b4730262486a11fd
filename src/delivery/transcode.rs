//! Live transcoding through an external ffmpeg-compatible process.
//!
//! Every request spawns its own process; its stdout becomes the response body.
//! The process is owned by a [`TranscodeStream`], and dropping the stream
//! (body finished, client gone, or an error on either side) kills and reaps it.
//! Output is fragmented MP4 of unknown length: no `Content-Length`, no ranges.
//! If the process fails after bytes have been sent the body just ends early.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::process::Stdio;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio::process::{Child, ChildStdout, Command};
use tokio_util::io::ReaderStream;

use crate::catalog::{mime::TRANSCODE_MIME, CatalogEntry};
use crate::delivery::DeliveryError;

/// Arguments for re-encoding `input` to fragmented MP4 (H.264 + AAC) on stdout.
pub fn ffmpeg_args(input: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = ["-hide_banner", "-loglevel", "error", "-i"]
        .iter()
        .map(OsString::from)
        .collect();
    args.push(input.as_os_str().to_owned());
    args.extend(
        [
            "-f",
            "mp4",
            "-movflags",
            "frag_keyframe+empty_moov+faststart",
            "-vcodec",
            "libx264",
            "-preset",
            "fast",
            "-acodec",
            "aac",
            "-threads",
            "0",
            "pipe:1",
        ]
        .iter()
        .map(OsString::from),
    );
    args
}

/// Handle to the transcoder binary. `program` is `None` when nothing usable was found.
#[derive(Debug, Clone, Default)]
pub struct Transcoder {
    program: Option<PathBuf>,
}

impl Transcoder {
    /// Locate the binary: the configured path if given, otherwise `ffmpeg` on `PATH`.
    ///
    /// A missing binary is not fatal here; transcode requests fail individually
    /// with [`DeliveryError::TranscodeUnavailable`].
    pub fn locate(configured: Option<&Path>) -> Self {
        let wanted = configured.unwrap_or_else(|| Path::new("ffmpeg"));
        match which::which(wanted) {
            Ok(program) => {
                tracing::info!("Transcoding with {}", program.display());
                Transcoder {
                    program: Some(program),
                }
            }
            Err(e) => {
                tracing::warn!(
                    "No transcoder at {:?} ({}); non-native formats will fail with 503",
                    wanted,
                    e
                );
                Transcoder { program: None }
            }
        }
    }

    /// Use `program` as-is, without a `PATH` lookup.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Transcoder {
            program: Some(program.into()),
        }
    }

    pub fn unavailable() -> Self {
        Transcoder { program: None }
    }

    pub fn program(&self) -> Option<&Path> {
        self.program.as_deref()
    }

    /// Start a transcode of `entry` and wrap its output in a streaming response.
    ///
    /// Fails before any byte is sent if the binary is missing, the source file
    /// vanished, or the process cannot be spawned.
    pub async fn deliver(&self, entry: &CatalogEntry) -> Result<Response, DeliveryError> {
        let stream = self.spawn(entry).await?;
        let body = Body::from_stream(stream);
        Ok((StatusCode::OK, transcode_headers(), body).into_response())
    }

    /// Spawn the process for `entry` without building a response.
    pub async fn spawn(&self, entry: &CatalogEntry) -> Result<TranscodeStream, DeliveryError> {
        let program = self.program.as_deref().ok_or_else(|| {
            DeliveryError::TranscodeUnavailable(
                "no ffmpeg-compatible binary configured or found on PATH".to_string(),
            )
        })?;

        tokio::fs::metadata(&entry.path)
            .await
            .map_err(|e| DeliveryError::from_io(entry, e))?;

        TranscodeStream::spawn(program, &entry.path, &entry.relative_path).map_err(|e| {
            DeliveryError::TranscodeUnavailable(format!(
                "failed to start {}: {}",
                program.display(),
                e
            ))
        })
    }
}

fn transcode_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(TRANSCODE_MIME));
    headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("none"));
    headers
}

/// HEAD for a transcoded entry. Nothing is spawned.
pub fn head() -> Response {
    (StatusCode::OK, transcode_headers()).into_response()
}

/// Stdout of a running transcoder, as a byte stream that owns the process.
pub struct TranscodeStream {
    stdout: ReaderStream<ChildStdout>,
    child: Option<Child>,
    label: String,
    ended: bool,
}

impl TranscodeStream {
    pub fn spawn(program: &Path, input: &Path, label: &str) -> io::Result<Self> {
        let mut child = Command::new(program)
            .args(ffmpeg_args(input))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("transcoder stdout was not captured"))?;

        tracing::debug!(
            "Spawned transcoder pid {:?} for {}",
            child.id(),
            label
        );
        Ok(TranscodeStream {
            stdout: ReaderStream::new(stdout),
            child: Some(child),
            label: label.to_owned(),
            ended: false,
        })
    }

    /// OS pid of the process, while it is still running and unreaped.
    pub fn id(&self) -> Option<u32> {
        self.child.as_ref().and_then(|c| c.id())
    }

    /// Whether stdout has been read to its end.
    pub fn reached_end(&self) -> bool {
        self.ended
    }

    fn reap_if_exited(&mut self) {
        let Some(child) = self.child.as_mut() else {
            return;
        };
        match child.try_wait() {
            Ok(Some(status)) if status.success() => {
                tracing::debug!("Transcode of {} finished", self.label);
                self.child = None;
            }
            Ok(Some(status)) => {
                tracing::warn!(
                    "Transcoder for {} exited with {}; stream ended early",
                    self.label,
                    status
                );
                self.child = None;
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Cannot poll transcoder for {}: {}", self.label, e),
        }
    }
}

impl Stream for TranscodeStream {
    type Item = io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        let next = futures::ready!(this.stdout.poll_next_unpin(cx));
        if next.is_none() {
            this.ended = true;
            this.reap_if_exited();
        }
        Poll::Ready(next)
    }
}

impl Drop for TranscodeStream {
    fn drop(&mut self) {
        self.reap_if_exited();
        let Some(mut child) = self.child.take() else {
            return;
        };

        let handle = tokio::runtime::Handle::try_current().ok();

        // Output is complete and the process is on its way out: wait for it
        if self.ended {
            if let Some(handle) = &handle {
                tracing::debug!("Reaping transcoder for {} after end of output", self.label);
                let label = std::mem::take(&mut self.label);
                handle.spawn(async move {
                    match child.wait().await {
                        Ok(status) if !status.success() => {
                            tracing::warn!("Transcoder for {} exited with {}", label, status);
                        }
                        Ok(_) => tracing::debug!("Transcode of {} finished", label),
                        Err(e) => tracing::warn!("Cannot reap transcoder for {}: {}", label, e),
                    }
                });
                return;
            }
        } else {
            tracing::debug!("Client gone; killing transcoder for {}", self.label);
        }

        if let Err(e) = child.start_kill() {
            tracing::warn!("Failed to kill transcoder for {}: {}", self.label, e);
        }
        // Reap on the runtime so no zombie is left; without one, kill_on_drop
        // hands the child to tokio's orphan reaper.
        if let Some(handle) = handle {
            handle.spawn(async move {
                let _ = child.wait().await;
            });
        }
    }
}
