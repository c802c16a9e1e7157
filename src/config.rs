//! Service configuration from the environment (and `.env`, loaded by `main`).

use anyhow::{Context, Result};
use std::net::SocketAddr;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_MAX_UPLOAD_MB: usize = 10;
pub const DEFAULT_OCR_LANGUAGE: &str = "eng";
pub const DEFAULT_OCR_ENGINE: u8 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub bind_addr: SocketAddr,
    pub max_upload_mb: usize,
    /// Without a key, uploads that need OCR are refused.
    pub ocr_api_key: Option<String>,
    pub ocr_language: String,
    pub ocr_engine: u8,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .context("BIND_ADDR must be a socket address like 0.0.0.0:3000")?;

        let max_upload_mb = match get("MAX_UPLOAD_MB") {
            Some(v) => v
                .parse::<usize>()
                .with_context(|| format!("MAX_UPLOAD_MB is not a number: {:?}", v))?,
            None => DEFAULT_MAX_UPLOAD_MB,
        };
        if max_upload_mb == 0 {
            anyhow::bail!("MAX_UPLOAD_MB must be at least 1");
        }

        let ocr_engine = match get("OCR_ENGINE") {
            Some(v) => v
                .parse::<u8>()
                .with_context(|| format!("OCR_ENGINE is not a number: {:?}", v))?,
            None => DEFAULT_OCR_ENGINE,
        };
        if !(1..=3).contains(&ocr_engine) {
            anyhow::bail!("OCR_ENGINE must be 1, 2 or 3 (got {})", ocr_engine);
        }

        Ok(Self {
            bind_addr,
            max_upload_mb,
            ocr_api_key: get("OCR_API_KEY"),
            ocr_language: get("OCR_LANGUAGE").unwrap_or_else(|| DEFAULT_OCR_LANGUAGE.to_string()),
            ocr_engine,
        })
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }
}
