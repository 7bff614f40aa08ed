//! Text-to-cell translation
//!
//! Glyph-to-braille translation tables live in an external service; this
//! module only speaks its wire contract. A remote translator POSTs text and
//! receives cell data, and a local translator provides a best-effort offline
//! approximation. Translators are tried as a fallback chain so a dead service
//! degrades to placeholder output instead of blocking the pipeline.

use crate::cell::{normalize_cells, Cell, CellInput};
use crate::config::TranslateConfig;
use crate::error::TranslateError;
use serde::Deserialize;
use std::time::Duration;

/// Trait for text-to-cell translation implementations
#[async_trait::async_trait]
pub trait BrailleTranslator: Send + Sync {
    /// Translate text into braille cells
    async fn translate(&self, text: &str) -> Result<Vec<Cell>, TranslateError>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

/// Wire response from the translation service
#[derive(Debug, Deserialize)]
struct ConvertResponse {
    #[serde(default = "default_ok")]
    ok: bool,
    #[serde(default)]
    cells: Option<Vec<CellInput>>,
    #[serde(default)]
    error: Option<String>,
}

fn default_ok() -> bool {
    true
}

/// Remote translator speaking the `{text}` → `{ok, cells, error?}` contract
pub struct RemoteTranslator {
    endpoint: String,
    timeout: Duration,
}

impl RemoteTranslator {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout,
        }
    }
}

#[async_trait::async_trait]
impl BrailleTranslator for RemoteTranslator {
    async fn translate(&self, text: &str) -> Result<Vec<Cell>, TranslateError> {
        let endpoint = self.endpoint.clone();
        let timeout = self.timeout;
        let body = serde_json::json!({ "text": text });

        // ureq is blocking; keep it off the async executor
        let response = tokio::task::spawn_blocking(move || {
            let agent = ureq::AgentBuilder::new().timeout(timeout).build();
            agent
                .post(&endpoint)
                .send_json(body)
                .map_err(|e| TranslateError::Unreachable(e.to_string()))?
                .into_json::<ConvertResponse>()
                .map_err(|e| TranslateError::Malformed(e.to_string()))
        })
        .await
        .map_err(|e| TranslateError::Service(e.to_string()))??;

        if !response.ok {
            return Err(TranslateError::Service(
                response
                    .error
                    .unwrap_or_else(|| "translation rejected".to_string()),
            ));
        }

        let cells = response
            .cells
            .ok_or_else(|| TranslateError::Malformed("response has no cells".to_string()))?;

        Ok(normalize_cells(&cells))
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}

/// Offline placeholder translation: one cell per character, dots taken from
/// the low six bits of the code point, whitespace blank. Not real braille,
/// but deterministic and good enough to keep the display moving when the
/// translation service is down.
#[derive(Debug, Default)]
pub struct LocalTranslator;

impl LocalTranslator {
    pub fn cells_for(text: &str) -> Vec<Cell> {
        text.chars()
            .map(|ch| {
                if ch.is_whitespace() {
                    Cell::BLANK
                } else {
                    Cell::from_bitmask((ch as u32 & 0x3F) as u8)
                }
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl BrailleTranslator for LocalTranslator {
    async fn translate(&self, text: &str) -> Result<Vec<Cell>, TranslateError> {
        Ok(Self::cells_for(text))
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

/// Fallback chain over translators: the first success wins
pub struct TranslatorChain {
    translators: Vec<Box<dyn BrailleTranslator>>,
}

impl TranslatorChain {
    pub fn new(translators: Vec<Box<dyn BrailleTranslator>>) -> Self {
        Self { translators }
    }
}

#[async_trait::async_trait]
impl BrailleTranslator for TranslatorChain {
    async fn translate(&self, text: &str) -> Result<Vec<Cell>, TranslateError> {
        let mut last_error = TranslateError::NoCellData;

        for translator in &self.translators {
            match translator.translate(text).await {
                Ok(cells) => {
                    tracing::debug!("Translated via {}", translator.name());
                    return Ok(cells);
                }
                Err(e) => {
                    tracing::warn!("{} translator failed: {}, trying next", translator.name(), e);
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }

    fn name(&self) -> &'static str {
        "chain"
    }
}

/// Build the translator chain from configuration: remote endpoint first when
/// configured, local approximation as fallback when enabled
pub fn create_translator(config: &TranslateConfig) -> TranslatorChain {
    let mut translators: Vec<Box<dyn BrailleTranslator>> = Vec::new();

    if let Some(ref endpoint) = config.endpoint {
        translators.push(Box::new(RemoteTranslator::new(
            endpoint.clone(),
            Duration::from_millis(config.timeout_ms),
        )));
    }
    if config.fallback || translators.is_empty() {
        translators.push(Box::new(LocalTranslator));
    }

    TranslatorChain::new(translators)
}
