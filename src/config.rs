//! Runtime configuration for the vanity address generator.

use clap::Parser;

use crate::matcher::SearchPattern;
use crate::worker::DEFAULT_BATCH_SIZE;

/// The base58 alphabet used for Solana addresses.
pub const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Longest base58 rendering of a 32-byte public key.
pub const MAX_ADDRESS_LEN: usize = 44;

/// Upper bound for the default worker count.
pub const MAX_DEFAULT_WORKERS: usize = 16;

/// Solana Vanity Address Generator
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Prefix the address must start with (base58 characters)
    #[arg(short, long)]
    pub prefix: Option<String>,

    /// Suffix the address must end with (base58 characters)
    #[arg(short, long)]
    pub suffix: Option<String>,

    /// Case sensitive matching
    #[arg(short = 'c', long, default_value = "false")]
    pub case_sensitive: bool,

    /// Number of worker threads (default: number of CPU cores, at most 16)
    #[arg(short = 'w', long)]
    pub workers: Option<usize>,

    /// Keys each worker tests between progress reports
    #[arg(short = 'b', long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: u64,

    /// Progress report interval in seconds
    #[arg(short = 'r', long, default_value = "5")]
    pub report_interval: u64,
}

impl Config {
    /// Returns the number of workers, defaulting to CPU count
    pub fn worker_count(&self) -> usize {
        self.workers
            .unwrap_or_else(|| num_cpus::get().min(MAX_DEFAULT_WORKERS))
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let prefix = self.prefix.as_deref().unwrap_or("");
        let suffix = self.suffix.as_deref().unwrap_or("");

        if prefix.is_empty() && suffix.is_empty() {
            return Err(ConfigError::InvalidPattern(
                "A prefix or a suffix is required".into(),
            ));
        }

        for (name, affix) in [("Prefix", prefix), ("Suffix", suffix)] {
            if let Some(c) = affix.chars().find(|&c| !self.is_valid_char(c)) {
                return Err(ConfigError::InvalidPattern(format!(
                    "{} contains '{}', which never appears in a base58 address",
                    name, c
                )));
            }
        }

        if prefix.len() + suffix.len() > MAX_ADDRESS_LEN {
            return Err(ConfigError::InvalidPattern(format!(
                "Combined prefix + suffix cannot be longer than {} characters",
                MAX_ADDRESS_LEN
            )));
        }

        if self.workers == Some(0) {
            return Err(ConfigError::InvalidWorkers("at least one worker is required".into()));
        }

        if self.batch_size == 0 {
            return Err(ConfigError::InvalidBatchSize);
        }

        if self.report_interval == 0 {
            return Err(ConfigError::InvalidReportInterval);
        }

        Ok(())
    }

    /// Whether `c` can appear in an address under the configured case policy.
    fn is_valid_char(&self, c: char) -> bool {
        if self.case_sensitive {
            BASE58_ALPHABET.contains(c)
        } else {
            BASE58_ALPHABET.contains(c.to_ascii_lowercase())
                || BASE58_ALPHABET.contains(c.to_ascii_uppercase())
        }
    }

    /// Builds the search pattern from the configured affixes.
    pub fn pattern(&self) -> SearchPattern {
        SearchPattern::new(
            self.prefix.clone().unwrap_or_default(),
            self.suffix.clone().unwrap_or_default(),
            self.case_sensitive,
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("Invalid worker count: {0}")]
    InvalidWorkers(String),

    #[error("Batch size must be at least 1")]
    InvalidBatchSize,

    #[error("Report interval must be at least 1 second")]
    InvalidReportInterval,
}
