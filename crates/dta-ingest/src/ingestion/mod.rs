//! File discovery and the per-kind handlers that turn raw files into tables

mod columns;
mod csv_cleaner;
mod json_normalizer;
mod parser;
mod pdf_extractor;
mod scanner;

pub use columns::{normalize_column_name, normalize_column_names};
pub use csv_cleaner::{median, CsvCleaner, UNKNOWN_PLACEHOLDER};
pub use json_normalizer::{
    collapse_whitespace, placeholder_sentiment, JsonNormalizer, JsonShape, SENTIMENT_FIELD,
};
pub use parser::FileParser;
pub use pdf_extractor::{extract_financial_fields, FinancialFields, PdfExtractor};
pub use scanner::{load_raw_file, DirectoryScanner};
