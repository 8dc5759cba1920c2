use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

pub const SOURCE_URL_VAR: &str = "BOOKS_URL";
pub const ENRICH_VAR: &str = "BOOKS_ENRICH";
pub const OUTPUT_VAR: &str = "BOOKS_OUTPUT";

pub const DEFAULT_OUTPUT_PATH: &str = "books.json";
pub const DEFAULT_ITEM_DELAY: Duration = Duration::from_secs(5);
pub const DEFAULT_VOLUMES_ENDPOINT: &str = "https://www.googleapis.com/books/v1/volumes";
pub const DEFAULT_DETAIL_BASE_URL: &str = "https://www.goodreads.com";

/// Errors raised while loading configuration. All of them are fatal before any fetch.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set in the environment or a .env file")]
    Missing(&'static str),

    #[error("{var} is not a valid URL ({value}): {source}")]
    InvalidUrl {
        var: &'static str,
        value: String,
        #[source]
        source: url::ParseError,
    },

    #[error("{var} has unrecognized value: {value}")]
    InvalidValue { var: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineMode {
    /// Extract listing fields only; `image` and `publicationDate` stay empty.
    ListingOnly,
    /// Extract listing fields, then look up cover image and publication date per row.
    Enriched,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub source_url: Url,
    pub mode: PipelineMode,
    pub output_path: PathBuf,
    /// Pause after every row in enriched mode.
    pub item_delay: Duration,
    pub volumes_endpoint: Url,
    pub detail_base_url: Url,
}

impl Config {
    /// Configuration with defaults for everything except the listing URL.
    pub fn new(source_url: Url) -> Self {
        Self {
            source_url,
            mode: PipelineMode::Enriched,
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            item_delay: DEFAULT_ITEM_DELAY,
            volumes_endpoint: Url::parse(DEFAULT_VOLUMES_ENDPOINT)
                .expect("default volumes endpoint is a valid URL"),
            detail_base_url: Url::parse(DEFAULT_DETAIL_BASE_URL)
                .expect("default detail base URL is a valid URL"),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let raw_url = lookup(SOURCE_URL_VAR).ok_or(ConfigError::Missing(SOURCE_URL_VAR))?;
        let source_url = Url::parse(&raw_url).map_err(|source| ConfigError::InvalidUrl {
            var: SOURCE_URL_VAR,
            value: raw_url.clone(),
            source,
        })?;

        let mut config = Self::new(source_url);

        if let Some(value) = lookup(ENRICH_VAR) {
            config.mode = parse_mode(&value)?;
        }
        if let Some(path) = lookup(OUTPUT_VAR) {
            config.output_path = PathBuf::from(path);
        }

        Ok(config)
    }
}

fn parse_mode(value: &str) -> Result<PipelineMode, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(PipelineMode::Enriched),
        "0" | "false" | "no" | "off" => Ok(PipelineMode::ListingOnly),
        _ => Err(ConfigError::InvalidValue {
            var: ENRICH_VAR,
            value: value.to_owned(),
        }),
    }
}
