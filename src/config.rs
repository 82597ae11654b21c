//! Parser Configuration
//!
//! Knobs that do not change well-formedness rules, only resource bounds.

/// Buffer size for reading chunks
pub const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Settings for one parse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Initial capacity of the read buffer; grows only for oversized tokens
    pub buffer_capacity: usize,
    /// Maximum element nesting depth (`None` = unlimited)
    pub max_depth: Option<usize>,
}

impl ParserConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        // Need room for at least one UTF-8 sequence
        self.buffer_capacity = capacity.max(4);
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            buffer_capacity: DEFAULT_BUFFER_SIZE,
            max_depth: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ParserConfig::default();
        assert_eq!(config.buffer_capacity, 8192);
        assert_eq!(config.max_depth, None);
    }

    #[test]
    fn test_builders() {
        let config = ParserConfig::new().with_buffer_capacity(1).with_max_depth(3);
        assert_eq!(config.buffer_capacity, 4);
        assert_eq!(config.max_depth, Some(3));
    }
}
