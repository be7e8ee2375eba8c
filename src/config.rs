use std::env;
use std::path::PathBuf;

pub const API_KEY_VAR: &str = "OPENAI_KEY";
const FALLBACK_API_KEY_VAR: &str = "OPENAI_API_KEY";
const DEFAULT_OUTPUT_DIR: &str = "export";

#[derive(Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_key: None,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    // A missing key is not an error here; the request reports it.
    pub fn from_env() -> Self {
        let api_key = env::var(API_KEY_VAR)
            .or_else(|_| env::var(FALLBACK_API_KEY_VAR))
            .ok()
            .filter(|key| !key.is_empty());
        Config {
            api_key,
            ..Self::default()
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("output_dir", &self.output_dir)
            .finish()
    }
}
