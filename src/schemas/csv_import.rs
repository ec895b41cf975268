use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct BulkInviteRequest {
    #[serde(default)]
    pub csv_content: String,
}

/// Outcome of a bulk CSV invite import
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BulkInviteResult {
    pub created: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
    pub capped: bool,
}

impl BulkInviteResult {
    pub fn failed(message: &str) -> Self {
        Self {
            errors: vec![message.to_string()],
            ..Default::default()
        }
    }
}

/// One parsed data row
#[derive(Debug, Clone, PartialEq)]
pub struct CsvRow {
    /// 1-based position among the non-blank lines, header included
    pub row_number: usize,
    pub raw_email: String,
    pub name: Option<String>,
}
