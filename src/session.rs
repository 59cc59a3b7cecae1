use scraper::Html;
use std::time::Duration;
use url::Url;

use crate::cache::ResponseCache;
use crate::config::ParserConfig;
use crate::error::{ParserError, Result};

/// What a fetch does when the page cannot be retrieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPolicy {
    /// Return the error to the caller.
    Propagate,
    /// Report the failure and yield `None`.
    SkipOnFailure,
}

/// Shared context for one invocation: HTTP client, response cache and settings.
pub struct Session {
    client: reqwest::Client,
    cache: ResponseCache,
    config: ParserConfig,
}

impl Session {
    pub fn new(config: ParserConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.clone())
            .cookie_store(true)
            .build()
            .map_err(ParserError::Client)?;

        Ok(Self {
            client,
            cache: ResponseCache::new(config.cache_dir()),
            config,
        })
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn clear_cache(&self) -> Result<()> {
        self.cache.clear()
    }

    /// GET with the response cache in front of the network.
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        if let Some(body) = self.cache.get("GET", url)? {
            return Ok(body);
        }

        log::debug!("Fetching: {}", url);
        let response = self
            .client
            .get(url)
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .send()
            .await
            .map_err(|e| unreachable(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ParserError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| unreachable(url, e))?.to_vec();
        self.cache.put("GET", url, status.as_u16(), &body)?;
        Ok(body)
    }

    /// Body decoded as UTF-8 whatever charset the server declared.
    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        let body = self.fetch_bytes(url).await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    pub async fn get_document(&self, url: &str) -> Result<Html> {
        let text = self.fetch_text(url).await?;
        Ok(Html::parse_document(&text))
    }

    /// Loads a document, honouring `policy` for transport failures.
    ///
    /// A skipped failure is handed to `on_skip` so the caller can report it
    /// without tearing its progress display.
    pub async fn get_document_with<F>(
        &self,
        url: &str,
        policy: FetchPolicy,
        on_skip: F,
    ) -> Result<Option<Html>>
    where
        F: FnOnce(&ParserError),
    {
        match self.get_document(url).await {
            Ok(document) => Ok(Some(document)),
            Err(e) if policy == FetchPolicy::SkipOnFailure && e.is_transport() => {
                on_skip(&e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

fn unreachable(url: &str, e: reqwest::Error) -> ParserError {
    ParserError::PageUnreachable {
        url: url.to_string(),
        reason: e.to_string(),
    }
}

/// Resolves `href` against `base`, as a browser would.
pub fn join_url(base: &str, href: &str) -> Result<String> {
    let base_url = Url::parse(base).map_err(|source| ParserError::Url {
        url: base.to_string(),
        source,
    })?;
    base_url
        .join(href)
        .map(|u| u.to_string())
        .map_err(|source| ParserError::Url {
            url: href.to_string(),
            source,
        })
}
