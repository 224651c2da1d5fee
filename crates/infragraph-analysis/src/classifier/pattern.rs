//! Glob patterns over resource type names (`*_vpc`, `*_iam_role`).

use glob::{MatchOptions, Pattern};
use infragraph_core::errors::AnalysisError;

/// A compiled resource-type pattern.
#[derive(Debug, Clone)]
pub struct TypePattern {
    pattern: Pattern,
}

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

impl TypePattern {
    /// Compile a user-supplied pattern.
    pub fn new(pattern: &str) -> Result<Self, AnalysisError> {
        Pattern::new(pattern)
            .map(|pattern| Self { pattern })
            .map_err(|e| AnalysisError::validation("pattern", format!("{pattern:?}: {e}")))
    }

    /// Compile a pattern from a literal shipped with the crate.
    pub(crate) fn builtin(pattern: &'static str) -> Self {
        Self::new(pattern).expect("built-in type pattern is valid")
    }

    pub fn matches(&self, resource_type: &str) -> bool {
        self.pattern.matches_with(resource_type, MATCH_OPTIONS)
    }

    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }
}
