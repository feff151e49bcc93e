//! Document extractor for PDF financial reports

use lopdf::Document;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};
use crate::types::{FinancialRecord, NormalizedTable, RawFile};

static REVENUE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)revenue[\s:]*[$]?([0-9,.]+)").expect("valid revenue pattern"));

static PROFIT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(net income|profit)[\s:]*[$]?([0-9,.]+)").expect("valid profit pattern")
});

static YEAR_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(fiscal year|year)[\s:]*([0-9]{4})").expect("valid year pattern")
});

/// Fields pulled out of report text; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinancialFields {
    pub year: Option<String>,
    pub revenue: Option<String>,
    pub profit: Option<String>,
}

/// Extractor for PDF reports
pub struct PdfExtractor;

impl PdfExtractor {
    /// Extract one financial record from a PDF and return it as a one-row table
    pub fn extract(raw: &RawFile) -> Result<NormalizedTable> {
        let filename = raw.filename();
        tracing::info!("Processing PDF data from {}", filename);

        let text = Self::extract_text(&filename, raw.content())?;
        let fields = extract_financial_fields(&text);
        tracing::debug!(
            "Extracted fields from {}: year={:?} revenue={:?} profit={:?}",
            filename,
            fields.year,
            fields.revenue,
            fields.profit
        );

        FinancialRecord {
            filename,
            year: fields.year,
            revenue: fields.revenue,
            profit: fields.profit,
            processed_date: chrono::Local::now().format("%Y-%m-%d").to_string(),
            text_content: text,
        }
        .into_table()
    }

    /// Concatenate the text of every page in page order
    pub fn extract_text(filename: &str, data: &[u8]) -> Result<String> {
        let document = Document::load_mem(data)
            .map_err(|e| Error::parse(filename, format!("failed to load PDF: {}", e)))?;

        let pages = document.get_pages();
        let mut text = String::new();
        for page_number in pages.keys() {
            match document.extract_text(&[*page_number]) {
                Ok(page_text) => text.push_str(&page_text),
                Err(e) => tracing::debug!("No text on page {} of {}: {}", page_number, filename, e),
            }
        }

        tracing::debug!("Extracted {} chars from {} pages of {}", text.len(), pages.len(), filename);
        Ok(text)
    }
}

/// First case-insensitive match of each field; revenue and profit lose their commas
pub fn extract_financial_fields(text: &str) -> FinancialFields {
    let capture = |pattern: &Regex, group: usize| {
        pattern
            .captures(text)
            .and_then(|caps| caps.get(group))
            .map(|m| m.as_str().to_string())
    };

    FinancialFields {
        year: capture(&YEAR_PATTERN, 2),
        revenue: capture(&REVENUE_PATTERN, 1).map(|v| v.replace(',', "")),
        profit: capture(&PROFIT_PATTERN, 2).map(|v| v.replace(',', "")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_pdf;
    use serde_json::{json, Value};

    #[test]
    fn test_fields_extracted() {
        let fields = extract_financial_fields("Fiscal Year 2023\nRevenue: $1,234,567\nNet Income: 89,000");
        assert_eq!(
            fields,
            FinancialFields {
                year: Some("2023".to_string()),
                revenue: Some("1234567".to_string()),
                profit: Some("89000".to_string()),
            }
        );
    }

    #[test]
    fn test_no_matches_all_null() {
        assert_eq!(extract_financial_fields("Quarterly newsletter"), FinancialFields::default());
    }

    #[test]
    fn test_first_match_wins() {
        let fields = extract_financial_fields("profit 10 then PROFIT 20, year 1999 and year 2001");
        assert_eq!(fields.profit.as_deref(), Some("10"));
        assert_eq!(fields.year.as_deref(), Some("1999"));
    }

    #[test]
    fn test_extract_from_pdf() {
        let pdf = sample_pdf(&["Fiscal Year 2022", "Revenue: $5,000", "Profit: 700"]);
        let raw = RawFile::from_bytes("report.pdf", pdf);

        let table = PdfExtractor::extract(&raw).unwrap();
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.column_names(), FinancialRecord::COLUMNS.to_vec());
        assert_eq!(table.cell(0, "filename"), Some(&json!("report.pdf")));
        assert_eq!(table.cell(0, "revenue"), Some(&json!("5000")));
        assert_eq!(table.cell(0, "profit"), Some(&json!("700")));
        assert_eq!(table.cell(0, "year"), Some(&json!("2022")));

        let text = table.cell(0, "text_content").and_then(Value::as_str).unwrap();
        assert!(text.contains("Revenue"));

        let date = table.cell(0, "processed_date").and_then(Value::as_str).unwrap();
        assert!(chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok());
    }

    #[test]
    fn test_pdf_without_fields() {
        let raw = RawFile::from_bytes("memo.pdf", sample_pdf(&["Team offsite notes"]));
        let table = PdfExtractor::extract(&raw).unwrap();
        assert_eq!(table.cell(0, "year"), Some(&Value::Null));
        assert_eq!(table.cell(0, "revenue"), Some(&Value::Null));
        assert_eq!(table.cell(0, "profit"), Some(&Value::Null));
    }

    #[test]
    fn test_corrupt_pdf_is_parse_error() {
        let raw = RawFile::from_bytes("broken.pdf", b"%PDF-1.4 not really".to_vec());
        assert!(matches!(PdfExtractor::extract(&raw), Err(Error::Parse { .. })));
    }
}
