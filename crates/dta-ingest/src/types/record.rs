//! Financial record extracted from a PDF report

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::table::NormalizedTable;
use crate::error::Result;

/// One row describing a financial report.
///
/// `revenue` and `profit` are kept as comma-stripped strings; downstream
/// loaders decide on numeric typing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialRecord {
    pub filename: String,
    pub year: Option<String>,
    pub revenue: Option<String>,
    pub profit: Option<String>,
    /// Extraction date, `YYYY-MM-DD`
    pub processed_date: String,
    pub text_content: String,
}

impl FinancialRecord {
    pub const COLUMNS: [&'static str; 6] = [
        "filename",
        "year",
        "revenue",
        "profit",
        "processed_date",
        "text_content",
    ];

    /// Convert into a one-row table
    pub fn into_table(self) -> Result<NormalizedTable> {
        let optional = |v: Option<String>| v.map(Value::String).unwrap_or(Value::Null);
        let row = vec![
            Value::String(self.filename),
            optional(self.year),
            optional(self.revenue),
            optional(self.profit),
            Value::String(self.processed_date),
            Value::String(self.text_content),
        ];
        NormalizedTable::new(
            Self::COLUMNS.iter().map(|c| c.to_string()).collect(),
            vec![row],
        )
    }
}
