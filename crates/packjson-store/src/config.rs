//! Store configuration and its validation.
//!
//! [`StoreConfig`] sets the starting geometry of a [`JsonStore`](crate::JsonStore)
//! and how it grows. [`validate()`](StoreConfig::validate) runs once at
//! construction; a store never re-checks its config afterwards.

use std::error::Error;
use std::fmt;

use packjson_arena::layout::{required_size, MAX_BUFFER_SIZE};

/// Default initial buffer size in bytes.
pub const DEFAULT_INITIAL_BUFFER_SIZE: usize = 256;

/// Default initial table size (slots).
pub const DEFAULT_INITIAL_TABLE_SIZE: usize = 4;

/// Default minimum growth step in bytes when the buffer fills.
pub const DEFAULT_BUFFER_GROWTH: usize = 32;

// ── StoreConfig ────────────────────────────────────────────────────

/// Configuration for a [`JsonStore`](crate::JsonStore).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    /// Bytes allocated for the first buffer. Default: 256.
    pub initial_buffer_size: usize,
    /// Slots in the first table. Must be a power of two. Default: 4.
    pub initial_table_size: usize,
    /// Minimum number of bytes added on each buffer growth. A growth step
    /// is never smaller than the shortfall the engine reported. Default: 32.
    pub buffer_growth: usize,
    /// Hard cap on the buffer size. `None` = bounded only by the layout's
    /// 32-bit offsets.
    pub max_buffer_size: Option<usize>,
    /// Byte limit for the scratch region used by deletes and table
    /// doubling. `None` = unbounded.
    pub scratch_limit: Option<usize>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            initial_buffer_size: DEFAULT_INITIAL_BUFFER_SIZE,
            initial_table_size: DEFAULT_INITIAL_TABLE_SIZE,
            buffer_growth: DEFAULT_BUFFER_GROWTH,
            max_buffer_size: None,
            scratch_limit: None,
        }
    }
}

impl StoreConfig {
    /// Check the structural invariants of this configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let table_size = self.initial_table_size;
        if table_size == 0 || !table_size.is_power_of_two() {
            return Err(ConfigError::InvalidTableSize {
                configured: table_size,
            });
        }
        let required = required_size(table_size);
        if self.initial_buffer_size < required {
            return Err(ConfigError::BufferTooSmall {
                configured: self.initial_buffer_size,
                required,
            });
        }
        if self.buffer_growth == 0 {
            return Err(ConfigError::ZeroGrowth);
        }
        let cap = self.buffer_cap();
        if cap > MAX_BUFFER_SIZE {
            return Err(ConfigError::CapTooLarge {
                configured: cap,
                limit: MAX_BUFFER_SIZE,
            });
        }
        if self.initial_buffer_size > cap {
            return Err(ConfigError::CapBelowInitial {
                cap,
                initial: self.initial_buffer_size,
            });
        }
        Ok(())
    }

    /// The effective buffer cap: `max_buffer_size`, or the layout limit.
    pub fn buffer_cap(&self) -> usize {
        self.max_buffer_size.unwrap_or(MAX_BUFFER_SIZE)
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`StoreConfig::validate()`].
#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Initial table size is zero or not a power of two.
    InvalidTableSize {
        /// The configured table size.
        configured: usize,
    },
    /// Initial buffer cannot hold the header and table.
    BufferTooSmall {
        /// The configured buffer size.
        configured: usize,
        /// Bytes needed for the header and an empty table.
        required: usize,
    },
    /// `buffer_growth` is zero, so a full buffer could never grow.
    ZeroGrowth,
    /// `max_buffer_size` exceeds what 32-bit offsets can address.
    CapTooLarge {
        /// The configured cap.
        configured: usize,
        /// The layout limit.
        limit: usize,
    },
    /// `max_buffer_size` is smaller than the initial buffer.
    CapBelowInitial {
        /// The configured cap.
        cap: usize,
        /// The configured initial buffer size.
        initial: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTableSize { configured } => {
                write!(f, "initial table size {configured} is not a power of two")
            }
            Self::BufferTooSmall {
                configured,
                required,
            } => write!(
                f,
                "initial buffer of {configured} bytes is below the {required} bytes the table needs"
            ),
            Self::ZeroGrowth => write!(f, "buffer growth must be at least 1 byte"),
            Self::CapTooLarge { configured, limit } => write!(
                f,
                "buffer cap {configured} exceeds the {limit} byte layout limit"
            ),
            Self::CapBelowInitial { cap, initial } => write!(
                f,
                "buffer cap {cap} is smaller than the initial buffer of {initial} bytes"
            ),
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = StoreConfig::default();
        assert_eq!(config.initial_buffer_size, 256);
        assert_eq!(config.initial_table_size, 4);
        assert_eq!(config.buffer_growth, 32);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_non_power_of_two_table() {
        let config = StoreConfig {
            initial_table_size: 6,
            ..StoreConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidTableSize { configured: 6 })
        );
        let config = StoreConfig {
            initial_table_size: 0,
            ..StoreConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_buffer_smaller_than_table() {
        let config = StoreConfig {
            initial_buffer_size: 64,
            initial_table_size: 4,
            ..StoreConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::BufferTooSmall {
                configured: 64,
                required: 104
            })
        );
    }

    #[test]
    fn rejects_zero_growth() {
        let config = StoreConfig {
            buffer_growth: 0,
            ..StoreConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroGrowth));
    }

    #[test]
    fn cap_must_cover_initial_buffer() {
        let config = StoreConfig {
            max_buffer_size: Some(128),
            ..StoreConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::CapBelowInitial {
                cap: 128,
                initial: 256
            })
        );
        let config = StoreConfig {
            max_buffer_size: Some(256),
            ..StoreConfig::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.buffer_cap(), 256);
    }

    #[test]
    fn display_names_the_values() {
        let msg = ConfigError::BufferTooSmall {
            configured: 10,
            required: 44,
        }
        .to_string();
        assert!(msg.contains("10"));
        assert!(msg.contains("44"));
    }
}
