use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// How list endpoints page through their results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginationSettings {
    /// Page size used when `rows` is absent or not a positive integer.
    #[serde(default = "default_rows_default")]
    pub default_rows: u64,
    /// Upper bound for `rows`. Unbounded when absent.
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_rows: Option<u64>,
}

impl PaginationSettings {
    pub fn is_default(&self) -> bool {
        self == &PaginationSettings::default()
    }

    /// Apply the configured bound to a requested page size.
    pub fn clamp(&self, rows: u64) -> u64 {
        match self.max_rows {
            Some(max_rows) => rows.min(max_rows),
            None => rows,
        }
    }
}

impl Default for PaginationSettings {
    fn default() -> Self {
        PaginationSettings {
            default_rows: 10,
            max_rows: None,
        }
    }
}

fn default_rows_default() -> u64 {
    PaginationSettings::default().default_rows
}
