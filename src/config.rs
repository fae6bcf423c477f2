//! Process-wide configuration, loaded once at startup from the environment.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::EnvError;

/// Default Gemini REST endpoint base.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model name.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-exp";

/// Opaque generation controls passed through to the API unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 8192,
        }
    }
}

/// Immutable run configuration, constructed once and passed by reference.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub generation: GenerationParams,
    /// Maximum length of the rendered first line, including type and scope.
    pub max_subject_length: usize,
    /// Maximum network attempts per generation request (transient retries).
    pub max_attempts: u32,
    /// Maximum user-requested regenerations across one run.
    pub max_regenerates: u32,
    /// Per-attempt request timeout.
    pub request_timeout: Duration,
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// Reads an optional `.env` file first (ignored when absent), then the
    /// process environment. A missing `GEMINI_API_KEY` is a startup failure.
    pub fn from_env() -> Result<Self, EnvError> {
        // .env is a convenience, not a requirement
        let _ = dotenvy::dotenv();

        let api_key = env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or(EnvError::MissingApiKey)?;

        let model = env::var("GRAPHE_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let base_url = env::var("GRAPHE_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let max_subject_length = parse_var("GRAPHE_MAX_SUBJECT", 50)?;
        let max_attempts: u32 = parse_var("GRAPHE_MAX_ATTEMPTS", 3)?;
        if max_attempts == 0 {
            return Err(EnvError::InvalidValue {
                var: "GRAPHE_MAX_ATTEMPTS",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        let max_regenerates = parse_var("GRAPHE_MAX_REGENERATES", 3)?;
        let timeout_secs: u64 = parse_var("GRAPHE_TIMEOUT_SECS", 30)?;

        Ok(Self {
            api_key,
            model,
            base_url,
            generation: GenerationParams::default(),
            max_subject_length,
            max_attempts,
            max_regenerates,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// Parse an optional numeric env var, falling back to a default when unset.
fn parse_var<T>(var: &'static str, default: T) -> Result<T, EnvError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(raw) => raw.trim().parse().map_err(|e: T::Err| EnvError::InvalidValue {
            var,
            value: raw.clone(),
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}
