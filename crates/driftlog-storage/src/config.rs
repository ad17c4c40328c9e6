//! Log configuration.

use serde::{Deserialize, Serialize};

/// Configuration for a [`Log`](crate::Log).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub segment: SegmentConfig,
}

/// Per-segment size caps and the base offset of the first segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentConfig {
    /// Roll the active segment once its store file reaches this many bytes
    /// (default: 1024). A zero value is normalized to the default when the
    /// log opens.
    #[serde(default = "default_max_bytes")]
    pub max_store_bytes: u64,

    /// Bytes preallocated for each segment's index; the segment also rolls
    /// once the index fills (default: 1024). A zero value is normalized to
    /// the default when the log opens.
    #[serde(default = "default_max_bytes")]
    pub max_index_bytes: u64,

    /// Base offset of the first segment when opening an empty directory
    /// (default: 0).
    #[serde(default)]
    pub initial_offset: u64,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            max_store_bytes: default_max_bytes(),
            max_index_bytes: default_max_bytes(),
            initial_offset: 0,
        }
    }
}

fn default_max_bytes() -> u64 {
    1024
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.segment.max_store_bytes, 1024);
        assert_eq!(config.segment.max_index_bytes, 1024);
        assert_eq!(config.segment.initial_offset, 0);
    }

    #[test]
    fn deserialize_fills_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.segment.max_store_bytes, 1024);
        assert_eq!(config.segment.max_index_bytes, 1024);

        let config: Config =
            serde_json::from_str(r#"{"segment":{"max_store_bytes":32}}"#).unwrap();
        assert_eq!(config.segment.max_store_bytes, 32);
        assert_eq!(config.segment.max_index_bytes, 1024);
        assert_eq!(config.segment.initial_offset, 0);
    }
}
