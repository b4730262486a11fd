//! Per-request delivery: resolve an identifier through the catalog, then
//! stream the file either verbatim or through a live transcode.

pub mod direct;
pub mod transcode;

use std::sync::Arc;

use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::catalog::{mime, Catalog, CatalogEntry};
use crate::config::MediaSettings;
use crate::delivery::transcode::Transcoder;

/// Per-request failure. Each variant maps to one HTTP status; none is retried.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// Identifier is malformed or absent from the catalog.
    #[error("no catalog entry for id {0:?}")]
    NotFound(String),
    /// Entry is in the catalog but the file is gone from disk.
    #[error("file vanished since scan: {0}")]
    FileMissing(String),
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// No usable transcoder binary, or the process could not be started.
    #[error("transcoder unavailable: {0}")]
    TranscodeUnavailable(String),
}

impl DeliveryError {
    /// Classify a file access failure for `entry`.
    pub fn from_io(entry: &CatalogEntry, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            DeliveryError::FileMissing(entry.relative_path.clone())
        } else {
            DeliveryError::Io {
                path: entry.relative_path.clone(),
                source,
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            DeliveryError::NotFound(_) | DeliveryError::FileMissing(_) => StatusCode::NOT_FOUND,
            DeliveryError::Io { source, .. }
                if source.kind() == std::io::ErrorKind::PermissionDenied =>
            {
                StatusCode::FORBIDDEN
            }
            DeliveryError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            DeliveryError::TranscodeUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for DeliveryError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            DeliveryError::NotFound(_) => tracing::debug!("{}", self),
            DeliveryError::FileMissing(_) => tracing::warn!("{}", self),
            _ => tracing::error!("{}", self),
        }
        (status, status.canonical_reason().unwrap_or_default()).into_response()
    }
}

/// How one entry reaches the client.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DeliveryStrategy {
    /// Stream file bytes as-is, with byte-range support.
    Direct,
    /// Stream the live output of an external transcoder as fragmented MP4.
    Transcode,
}

impl DeliveryStrategy {
    /// Pure decision on the entry's extension against the natively-playable set.
    pub fn for_extension(ext: &str, settings: &MediaSettings) -> Self {
        if settings.is_playable(ext) {
            DeliveryStrategy::Direct
        } else {
            DeliveryStrategy::Transcode
        }
    }

    /// `Content-Type` the client will receive for an entry delivered this way.
    pub fn content_type(self, entry: &CatalogEntry) -> &'static str {
        match self {
            DeliveryStrategy::Direct => mime::mime_for_extension(&entry.extension),
            DeliveryStrategy::Transcode => mime::TRANSCODE_MIME,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DeliveryPlan<'a> {
    pub entry: &'a CatalogEntry,
    pub strategy: DeliveryStrategy,
}

/// Resolves identifiers against the catalog and dispatches to a strategy.
///
/// The only input accepted from a request is an identifier; filesystem paths
/// come exclusively from catalog entries.
#[derive(Debug, Clone)]
pub struct DeliveryRouter {
    catalog: Arc<Catalog>,
    settings: Arc<MediaSettings>,
    transcoder: Transcoder,
}

impl DeliveryRouter {
    pub fn new(catalog: Arc<Catalog>, settings: MediaSettings, transcoder: Transcoder) -> Self {
        DeliveryRouter {
            catalog,
            settings: Arc::new(settings),
            transcoder,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn settings(&self) -> &MediaSettings {
        &self.settings
    }

    /// Look up `id` and pick a strategy. Never touches the filesystem.
    pub fn resolve(&self, id: &str) -> Result<DeliveryPlan<'_>, DeliveryError> {
        let uuid = Uuid::parse_str(id).map_err(|_| DeliveryError::NotFound(id.to_owned()))?;
        let entry = self
            .catalog
            .lookup(&uuid)
            .ok_or_else(|| DeliveryError::NotFound(id.to_owned()))?;
        Ok(DeliveryPlan {
            entry,
            strategy: DeliveryStrategy::for_extension(&entry.extension, &self.settings),
        })
    }

    /// Stream the planned entry. `range` is honoured for direct delivery only.
    pub async fn deliver(
        &self,
        plan: DeliveryPlan<'_>,
        range: Option<&HeaderValue>,
    ) -> Result<Response, DeliveryError> {
        match plan.strategy {
            DeliveryStrategy::Direct => direct::deliver(plan.entry, range).await,
            DeliveryStrategy::Transcode => {
                if range.is_some() {
                    tracing::debug!(
                        "Ignoring Range header for transcoded {}",
                        plan.entry.relative_path
                    );
                }
                self.transcoder.deliver(plan.entry).await
            }
        }
    }

    /// Headers a GET would carry, without opening the file or spawning anything.
    pub fn head(&self, plan: DeliveryPlan<'_>) -> Response {
        match plan.strategy {
            DeliveryStrategy::Direct => direct::head(plan.entry),
            DeliveryStrategy::Transcode => transcode::head(),
        }
    }
}
