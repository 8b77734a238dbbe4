// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

// Stream configuration with validation.

use crate::error::{Error, Result};

/// Configuration for a [`Stream`](crate::Stream).
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Maximum nesting depth the encoder will follow and the decoder will
    /// accept (default: 1024).
    pub max_depth: usize,
    /// Maximum entries accepted by decode and packet parsing (default: 2^24).
    pub max_entries: usize,
    /// Remember encoded objects by id and hand the live originals back when
    /// decoding on the same stream (default: false).
    pub retain_references: bool,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            max_depth: 1024,
            max_entries: 1 << 24,
            retain_references: false,
        }
    }
}

impl StreamConfig {
    /// Validate configuration. Returns Ok(()) if valid.
    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(Error::Config("max_depth must be > 0".into()));
        }
        if self.max_entries == 0 {
            return Err(Error::Config("max_entries must be > 0".into()));
        }
        // Stream-local ids are u32.
        if self.max_entries > u32::MAX as usize {
            return Err(Error::Config("max_entries must fit in a u32".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(StreamConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_bounds_rejected() {
        let config = StreamConfig {
            max_depth: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let config = StreamConfig {
            max_entries: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }
}
