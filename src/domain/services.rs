use serde::{Deserialize, Serialize};

/// Rules the aggregator applies when reading grade outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationPolicy {
    /// An enrollment only counts as passed when its final grade is published.
    /// Turning this off reads the grade status whether or not it was published.
    ///
    /// Defaults to `true`, so unpublished grades never feed an aggregate. The
    /// legacy registrar's pass count ignored publication; set this to `false`
    /// to reproduce its numbers.
    pub require_published_outcome: bool,
}

impl Default for AggregationPolicy {
    fn default() -> Self {
        Self {
            require_published_outcome: true,
        }
    }
}
