//! Tabular cleaner for CSV files
//!
//! Normalizes column names, removes exact duplicate rows and imputes
//! missing values per inferred column type.

use serde_json::{Number, Value};

use super::columns::normalize_column_names;
use crate::error::{Error, Result};
use crate::types::{ColumnType, NormalizedTable, RawFile};

/// Placeholder written into missing text cells
pub const UNKNOWN_PLACEHOLDER: &str = "Unknown";

/// Cell spellings treated as missing (the pandas `read_csv` defaults)
const MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Cleaner for tabular files
pub struct CsvCleaner;

impl CsvCleaner {
    /// Parse and clean a CSV file
    pub fn clean(raw: &RawFile) -> Result<NormalizedTable> {
        tracing::info!("Cleaning CSV data from {}", raw.filename());
        let table = Self::parse(&raw.filename(), raw.content())?;
        Ok(Self::clean_table(table))
    }

    /// Parse CSV bytes into a typed table with normalized column names
    pub fn parse(filename: &str, data: &[u8]) -> Result<NormalizedTable> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(data);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| Error::parse(filename, e.to_string()))?
            .iter()
            .map(str::to_string)
            .collect();

        if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
            return Err(Error::parse(filename, "no columns to parse from file"));
        }

        let names = normalize_column_names(&headers)?;

        let mut raw_rows: Vec<Vec<Option<String>>> = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| Error::parse(filename, e.to_string()))?;
            raw_rows.push(
                record
                    .iter()
                    .map(|field| {
                        if MISSING_MARKERS.contains(&field) {
                            None
                        } else {
                            Some(field.to_string())
                        }
                    })
                    .collect(),
            );
        }

        let rows = coerce_columns(names.len(), raw_rows);
        NormalizedTable::new(names, rows)
    }

    /// Deduplicate rows and impute missing values
    pub fn clean_table(mut table: NormalizedTable) -> NormalizedTable {
        let removed = table.dedup_rows();
        tracing::info!("Removed {} duplicate rows", removed);

        for idx in 0..table.column_count() {
            let missing = table.null_count(idx);
            if missing == 0 {
                continue;
            }

            let column = table.columns()[idx].clone();
            tracing::info!("Column {} has {} missing values", column.name, missing);

            let fill = match column.column_type {
                ColumnType::Numeric => median_fill(table.column_values(idx)),
                ColumnType::String => Some(Value::String(UNKNOWN_PLACEHOLDER.to_string())),
                ColumnType::Boolean | ColumnType::Datetime | ColumnType::Nested | ColumnType::Null => None,
            };

            match fill {
                Some(fill) => table.update_column(idx, |cell| {
                    if cell.is_null() {
                        *cell = fill.clone();
                    }
                }),
                None => tracing::debug!(
                    "Leaving missing values in {:?} column {}",
                    column.column_type,
                    column.name
                ),
            }
        }

        table
    }
}

/// Type each column as a whole: integer if every present cell is an integer,
/// float if every present cell parses as a number, boolean if every present
/// cell is a boolean literal, else text. A float column holds only floats, so
/// `1` and `1.0` in the same column compare equal.
fn coerce_columns(width: usize, raw_rows: Vec<Vec<Option<String>>>) -> Vec<Vec<Value>> {
    let parsers: Vec<CellParser> = (0..width)
        .map(|col| {
            if present_cells(&raw_rows, col).all(|s| parse_integer(s).is_some()) {
                parse_integer as CellParser
            } else if present_cells(&raw_rows, col).all(|s| parse_float(s).is_some()) {
                parse_float as CellParser
            } else if present_cells(&raw_rows, col).all(|s| parse_bool(s).is_some()) {
                parse_bool as CellParser
            } else {
                parse_text as CellParser
            }
        })
        .collect();

    raw_rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .zip(&parsers)
                .map(|(cell, parse)| cell.and_then(|s| parse(&s)).unwrap_or(Value::Null))
                .collect()
        })
        .collect()
}

type CellParser = fn(&str) -> Option<Value>;

fn present_cells(rows: &[Vec<Option<String>>], col: usize) -> impl Iterator<Item = &str> + '_ {
    rows.iter().filter_map(move |row| row[col].as_deref())
}

fn parse_integer(s: &str) -> Option<Value> {
    s.trim().parse::<i64>().ok().map(Value::from)
}

fn parse_float(s: &str) -> Option<Value> {
    s.trim().parse::<f64>().ok().and_then(Number::from_f64).map(Value::Number)
}

fn parse_bool(s: &str) -> Option<Value> {
    match s.trim() {
        "true" | "True" | "TRUE" => Some(Value::Bool(true)),
        "false" | "False" | "FALSE" => Some(Value::Bool(false)),
        _ => None,
    }
}

fn parse_text(s: &str) -> Option<Value> {
    Some(Value::String(s.to_string()))
}

/// Median of the present numeric cells; integral medians of integer columns stay integers
fn median_fill<'a>(values: impl Iterator<Item = &'a Value>) -> Option<Value> {
    let mut all_integers = true;
    let mut numbers: Vec<f64> = values
        .filter_map(|v| {
            all_integers = all_integers && (v.is_i64() || v.is_u64());
            v.as_f64()
        })
        .collect();

    let median = median(&mut numbers)?;
    if all_integers && median.fract() == 0.0 {
        Some(Value::from(median as i64))
    } else {
        Number::from_f64(median).map(Value::Number)
    }
}

/// Median of a slice (sorted in place); None when empty
pub fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn clean(csv: &str) -> NormalizedTable {
        CsvCleaner::clean(&RawFile::from_bytes("orders.csv", csv.as_bytes().to_vec())).unwrap()
    }

    #[test]
    fn test_column_names_normalized() {
        let table = clean("Order ID,Customer Name,Unit Price\n1,Ann,2.5\n");
        assert_eq!(table.column_names(), vec!["order_id", "customer_name", "unit_price"]);
    }

    #[test]
    fn test_colliding_columns_fail() {
        let raw = RawFile::from_bytes("orders.csv", b"Order ID,order_id\n1,2\n".to_vec());
        let err = CsvCleaner::clean(&raw).unwrap_err();
        assert!(matches!(err, Error::SchemaConflict { .. }));
    }

    #[test]
    fn test_duplicates_removed() {
        let table = clean("id,name\n1,a\n2,b\n1,a\n3,c\n2,b\n");
        assert_eq!(table.row_count(), 3);

        let mut rows: Vec<String> = table.rows().iter().map(|r| serde_json::to_string(r).unwrap()).collect();
        rows.sort();
        rows.dedup();
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn test_numeric_median_imputation() {
        let table = clean("qty\n1\n3\nNA\n7\n");
        let values: Vec<f64> = table.column_values(0).map(|v| v.as_f64().unwrap()).collect();
        assert_eq!(values, vec![1.0, 3.0, 3.0, 7.0]);
        assert_eq!(table.cell(2, "qty"), Some(&json!(3)));
    }

    #[test]
    fn test_integral_floats_dedup_with_integers() {
        let table = clean("qty,name\n1,a\n1.0,a\n2,b\n");
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell(0, "qty").and_then(Value::as_f64), Some(1.0));
        assert!(table.column_values(0).all(Value::is_f64));
    }

    #[test]
    fn test_even_count_median_is_fractional() {
        let table = clean("qty\n1\n2\nNA\n");
        assert_eq!(table.cell(2, "qty").and_then(Value::as_f64), Some(1.5));
    }

    #[test]
    fn test_text_imputed_with_placeholder() {
        let table = clean("name,city\nAnn,\nBob,Oslo\n");
        assert_eq!(table.cell(0, "city"), Some(&json!("Unknown")));
        assert_eq!(table.cell(1, "city"), Some(&json!("Oslo")));
    }

    #[test]
    fn test_mixed_column_stays_text() {
        let table = clean("code\n12\nA7\nNA\n");
        assert_eq!(table.columns()[0].column_type, ColumnType::String);
        assert_eq!(table.cell(0, "code"), Some(&json!("12")));
        assert_eq!(table.cell(2, "code"), Some(&json!("Unknown")));
    }

    #[test]
    fn test_boolean_and_datetime_nulls_left_alone() {
        let table = clean("active,shipped_on,note\ntrue,2024-01-02,a\n,,b\nFalse,2024-01-05,c\n");
        assert_eq!(table.columns()[0].column_type, ColumnType::Boolean);
        assert_eq!(table.columns()[1].column_type, ColumnType::Datetime);
        assert_eq!(table.cell(1, "active"), Some(&Value::Null));
        assert_eq!(table.cell(1, "shipped_on"), Some(&Value::Null));
        assert_eq!(table.cell(2, "active"), Some(&json!(false)));
    }

    #[test]
    fn test_ragged_rows_are_parse_errors() {
        let raw = RawFile::from_bytes("bad.csv", b"a,b\n1,2,3\n".to_vec());
        assert!(matches!(CsvCleaner::clean(&raw), Err(Error::Parse { .. })));

        let empty = RawFile::from_bytes("empty.csv", Vec::new());
        assert!(matches!(CsvCleaner::clean(&empty), Err(Error::Parse { .. })));
    }

    #[test]
    fn test_median_helper() {
        assert_eq!(median(&mut []), None);
        assert_eq!(median(&mut [7.0, 1.0, 3.0]), Some(3.0));
        assert_eq!(median(&mut [4.0, 1.0, 3.0, 2.0]), Some(2.5));
    }
}
