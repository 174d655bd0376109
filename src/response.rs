//! JSON response envelope handed back to the transport layer.

use serde::{Deserialize, Serialize};

/// Status reported once the orchestration loop has run to completion.
pub const SUCCESS_STATUS: &str = "success";

/// The upload response.
///
/// Serializes to exactly three fields, in this order:
///
/// ```json
/// {"status": "success", "tables": ["sales.csv"], "tables_schema_xml": "<tables_schema>..."}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Always [`SUCCESS_STATUS`]; a request that fails outright produces an error instead.
    pub status: String,
    /// Filenames as received, in request order. `None` (JSON `null`) when an upload had none.
    pub tables: Vec<Option<String>>,
    /// Schemas of the created tables, see [`crate::schema_xml`].
    pub tables_schema_xml: String,
}

impl UploadResponse {
    /// Build a successful response.
    pub fn success(tables: Vec<Option<String>>, tables_schema_xml: String) -> Self {
        Self {
            status: SUCCESS_STATUS.to_string(),
            tables,
            tables_schema_xml,
        }
    }

    /// Render as compact JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Render as indented JSON.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
