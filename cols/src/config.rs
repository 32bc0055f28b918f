//! Run configuration.
//!
//! Options are resolved once per run: built-in defaults, then environment
//! variables (a `.env` file is honoured by the binary), then CLI flags.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{RunError, RunResult};

/// Environment variable for [`RunOptions::default_projection`]
pub const ENV_DEFAULT_PROJECTION: &str = "COLS_DEFAULT_PROJECTION";

/// Environment variable for [`RunOptions::header_policy`]
pub const ENV_HEADER_POLICY: &str = "COLS_HEADER_POLICY";

/// Columns written when a script has no `use` line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DefaultProjection {
    /// Every column, in header order
    #[default]
    All,
    /// Only columns targeted by a mutating operation, in first-touch order
    Touched,
}

/// How often the header line is written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum HeaderPolicy {
    /// Once per run, by the first input that writes anything
    #[default]
    Once,
    /// Once for every input that writes anything
    PerFile,
}

/// Options for a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOptions {
    /// Fallback projection without `use`
    pub default_projection: DefaultProjection,

    /// Header repetition across inputs
    pub header_policy: HeaderPolicy,

    /// Output field separator
    pub output_delimiter: u8,

    /// Quote output fields that need it instead of joining them raw
    pub quote: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            default_projection: DefaultProjection::All,
            header_policy: HeaderPolicy::Once,
            output_delimiter: b',',
            quote: false,
        }
    }
}

impl RunOptions {
    /// Defaults overridden by `COLS_*` environment variables.
    pub fn from_env() -> RunResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for the `COLS_*` keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> RunResult<Self> {
        let mut options = Self::default();
        if let Some(raw) = lookup(ENV_DEFAULT_PROJECTION) {
            options.default_projection = parse_choice(ENV_DEFAULT_PROJECTION, &raw)?;
        }
        if let Some(raw) = lookup(ENV_HEADER_POLICY) {
            options.header_policy = parse_choice(ENV_HEADER_POLICY, &raw)?;
        }
        Ok(options)
    }
}

fn parse_choice<T: ValueEnum>(key: &str, raw: &str) -> RunResult<T> {
    T::from_str(raw.trim(), true)
        .map_err(|_| RunError::InvalidOption(format!("{}={}", key, raw)))
}
