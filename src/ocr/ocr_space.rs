//! OCR.space provider (`parse/image` endpoint).

use super::{OcrError, OcrInput, OcrProvider, OcrResult};
use crate::config::ServiceConfig;
use crate::diagnostics::FailureSink;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const ENDPOINT: &str = "https://api.ocr.space/parse/image";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(90);
/// Engine used for the single retry after a timeout.
pub const FALLBACK_ENGINE: u8 = 1;

pub struct OcrSpaceProvider {
    api_key: String,
    language: String,
    engine: u8,
    client: reqwest::Client,
}

impl OcrSpaceProvider {
    pub fn new(
        client: reqwest::Client,
        api_key: impl Into<String>,
        language: impl Into<String>,
        engine: u8,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            language: language.into(),
            engine,
            client,
        }
    }

    pub fn from_config(config: &ServiceConfig, client: reqwest::Client) -> Result<Self, OcrError> {
        let api_key = config.ocr_api_key.clone().ok_or(OcrError::MissingKey)?;
        Ok(Self::new(client, api_key, config.ocr_language.clone(), config.ocr_engine))
    }
}

/// PDFs are not accepted by engine 3.
pub fn effective_engine(engine: u8, is_pdf: bool) -> u8 {
    if is_pdf && engine == 3 {
        2
    } else {
        engine
    }
}

// ── OCR.space response types ─────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OcrResponse {
    #[serde(default)]
    parsed_results: Option<Vec<ParsedResult>>,
    #[serde(default)]
    is_errored_on_processing: bool,
    #[serde(default)]
    error_message: Option<ErrorMessage>,
    #[serde(default)]
    processing_time_in_milliseconds: Option<Millis>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ParsedResult {
    #[serde(default)]
    parsed_text: Option<String>,
}

/// Sent as a single string or a list of strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorMessage {
    One(String),
    Many(Vec<String>),
}

/// Sent as a number or a numeric string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Millis {
    Number(f64),
    Text(String),
}

impl Millis {
    fn as_u64(&self) -> Option<u64> {
        match self {
            Millis::Number(n) if *n >= 0.0 => Some(*n as u64),
            Millis::Number(_) => None,
            Millis::Text(s) => s.trim().parse::<f64>().ok().map(|n| n.max(0.0) as u64),
        }
    }
}

/// Page texts (joined with newlines) and processing time from a response body.
pub fn parse_response(body: &str) -> Result<(String, Option<u64>), OcrError> {
    let response: OcrResponse = serde_json::from_str(body)?;

    if response.is_errored_on_processing {
        let message = match response.error_message {
            Some(ErrorMessage::One(m)) => m,
            Some(ErrorMessage::Many(ms)) if !ms.is_empty() => ms.join("; "),
            _ => "Unknown OCR error".to_string(),
        };
        return Err(OcrError::Processing(message));
    }

    let text = response
        .parsed_results
        .unwrap_or_default()
        .into_iter()
        .filter_map(|r| r.parsed_text)
        .collect::<Vec<_>>()
        .join("\n");
    let millis = response
        .processing_time_in_milliseconds
        .as_ref()
        .and_then(Millis::as_u64);
    Ok((text, millis))
}

// ── Provider implementation ──────────────────────────────────────────────────

#[async_trait::async_trait]
impl OcrProvider for OcrSpaceProvider {
    fn name(&self) -> &str {
        "ocr_space"
    }

    async fn process(
        &self,
        input: &OcrInput,
        sink: &dyn FailureSink,
    ) -> Result<OcrResult, OcrError> {
        let engine = effective_engine(self.engine, input.is_pdf());

        let attempt = match self.request(input, engine).await {
            Err(e) if e.is_timeout() => {
                warn!(
                    "OcrSpaceProvider: engine {} timed out, retrying with engine {}",
                    engine, FALLBACK_ENGINE
                );
                self.request(input, FALLBACK_ENGINE)
                    .await
                    .map(|(text, ms)| (text, ms, FALLBACK_ENGINE))
            }
            other => other.map(|(text, ms)| (text, ms, engine)),
        };

        match attempt {
            Ok((text, processing_ms, engine)) => {
                info!(
                    "OcrSpaceProvider: {} chars from {} (engine {})",
                    text.len(),
                    input.filename,
                    engine
                );
                Ok(OcrResult {
                    text,
                    engine,
                    processing_ms,
                    provider_name: self.name().to_string(),
                })
            }
            Err(e) => {
                sink.report(e.context(), &e.to_string());
                Err(e)
            }
        }
    }
}

impl OcrSpaceProvider {
    async fn request(
        &self,
        input: &OcrInput,
        engine: u8,
    ) -> Result<(String, Option<u64>), OcrError> {
        info!(
            "OcrSpaceProvider: sending {} ({} bytes, engine {})",
            input.filename,
            input.data.len(),
            engine
        );

        let part = Part::bytes(input.data.clone())
            .file_name(input.filename.clone())
            .mime_str(input.mime_type())?;

        let form = Form::new()
            .text("apikey", self.api_key.clone())
            .text("language", self.language.clone())
            .text("OCREngine", engine.to_string())
            .text("isOverlayRequired", "false")
            .text("detectOrientation", "true")
            .text("scale", "true")
            .part("file", part);

        let resp = self
            .client
            .post(ENDPOINT)
            .timeout(REQUEST_TIMEOUT)
            .multipart(form)
            .send()
            .await
            .map_err(timeout_or_http)?;

        let resp = resp.error_for_status()?;
        let body = resp.text().await.map_err(timeout_or_http)?;
        debug!(
            "OcrSpaceProvider: raw response ({} bytes): {}",
            body.len(),
            body.chars().take(500).collect::<String>()
        );
        parse_response(&body)
    }
}

fn timeout_or_http(e: reqwest::Error) -> OcrError {
    if e.is_timeout() {
        OcrError::Timeout
    } else {
        OcrError::Http(e)
    }
}
