use serde::{Deserialize, Serialize};

/// Options for [`Parser`](crate::Parser).
///
/// Deserializable so hosts can embed it in their own configuration files;
/// missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParserOptions {
    /// Maximum nesting depth of a parsed expression.
    pub max_depth: usize,
}

impl ParserOptions {
    pub const DEFAULT_MAX_DEPTH: usize = 128;
}

impl Default for ParserOptions {
    fn default() -> Self {
        ParserOptions {
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_with_defaults() {
        let opts: ParserOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(opts, ParserOptions::default());
        let opts: ParserOptions = serde_json::from_str(r#"{"maxDepth": 8}"#).unwrap();
        assert_eq!(opts.max_depth, 8);
    }
}
