//! Turns a playlist URL into the stream URIs it lists.
//!
//! One `resolve()` call is one download followed by one parse, and completes
//! exactly once with either the URIs or a [`ResolveError`]. Concurrent calls
//! are independent; nothing is cached or deduplicated.

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::config::ResolverConfig;
use crate::error::ResolveError;
use crate::playlist::PlaylistFormat;

/// A downloaded playlist body.
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    /// Server reported content type, informational only.
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct PlaylistResolver {
    config: ResolverConfig,
}

impl PlaylistResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Download `uri` and extract its stream URIs.
    ///
    /// The format comes from the extension of the URI path. The document is
    /// downloaded before the format is checked, so an unsupported extension
    /// still costs one request. `user_agent` falls back to the configured one.
    pub async fn resolve(
        &self,
        uri: &str,
        insecure: bool,
        user_agent: Option<&str>,
    ) -> Result<Vec<String>, ResolveError> {
        debug!("Resolving playlist '{}'", uri);

        let document = self
            .fetch(uri, insecure, user_agent)
            .await
            .inspect_err(|e| warn!("Playlist '{}': {}", uri, e))?;

        if let Some(content_type) = &document.content_type {
            debug!("Playlist '{}' content type: {}", uri, content_type);
        }

        if document.body.is_empty() {
            warn!("Playlist '{}' is empty", uri);
            return Err(ResolveError::Empty);
        }

        let format = PlaylistFormat::from_uri(uri);
        let Some(parser) = format.parser() else {
            warn!("Playlist '{}': unsupported format", uri);
            return Err(ResolveError::UnsupportedFormat(uri.to_string()));
        };

        let streams = parser(&document.body).inspect_err(|e| {
            warn!("Playlist '{}': failed to parse as {}: {}", uri, format.label(), e)
        })?;

        if streams.is_empty() {
            warn!("Playlist '{}' lists no stream", uri);
            return Err(ResolveError::NoEntries);
        }

        for stream in &streams {
            debug!("Playlist '{}' stream: {}", uri, stream);
        }
        info!("Resolved playlist '{}' to {} stream(s)", uri, streams.len());
        Ok(streams)
    }

    async fn fetch(
        &self,
        uri: &str,
        insecure: bool,
        user_agent: Option<&str>,
    ) -> Result<FetchedDocument, ResolveError> {
        let client = Client::builder()
            .danger_accept_invalid_certs(insecure)
            .user_agent(user_agent.unwrap_or(&self.config.user_agent))
            .timeout(self.config.timeout())
            .build()
            .map_err(transport)?;

        let response = client.get(uri).send().await.map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolveError::Transport {
                status: Some(status.as_u16()),
                reason: status.canonical_reason().unwrap_or("unknown").to_string(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = response.bytes().await.map_err(transport)?.to_vec();

        Ok(FetchedDocument { content_type, body })
    }
}

fn transport(e: reqwest::Error) -> ResolveError {
    ResolveError::Transport {
        status: e.status().map(|s| s.as_u16()),
        reason: e.to_string(),
    }
}
