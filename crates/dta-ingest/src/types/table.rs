//! Normalized table produced by every handler

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

use crate::error::{Error, Result};

/// Semantic type of a column, inferred from its non-null cells
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Text, or a mix of incompatible scalar types
    String,
    /// Integers and/or floats
    Numeric,
    /// true/false
    Boolean,
    /// Strings that all parse as ISO dates or datetimes
    Datetime,
    /// Arrays or objects
    Nested,
    /// Every cell is missing
    Null,
}

impl ColumnType {
    /// Infer a column type from its cells
    pub fn infer<'a>(values: impl IntoIterator<Item = &'a Value>) -> Self {
        let mut saw_number = false;
        let mut saw_bool = false;
        let mut saw_string = false;
        let mut saw_nested = false;
        let mut all_dates = true;

        for value in values {
            match value {
                Value::Null => {}
                Value::Bool(_) => saw_bool = true,
                Value::Number(_) => saw_number = true,
                Value::String(s) => {
                    saw_string = true;
                    all_dates = all_dates && looks_like_datetime(s);
                }
                Value::Array(_) | Value::Object(_) => saw_nested = true,
            }
        }

        match (saw_string, saw_number, saw_bool, saw_nested) {
            (false, false, false, false) => Self::Null,
            (false, true, false, false) => Self::Numeric,
            (false, false, true, false) => Self::Boolean,
            (false, false, false, true) => Self::Nested,
            (true, false, false, false) if all_dates => Self::Datetime,
            _ => Self::String,
        }
    }
}

/// Check whether a string is an ISO-8601 date or datetime
pub fn looks_like_datetime(s: &str) -> bool {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").is_ok()
        || DateTime::parse_from_rfc3339(s).is_ok()
}

/// A named, typed column
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
}

/// Ordered columns and rows of cells.
///
/// Column names are unique and every row holds exactly one cell per column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedTable {
    columns: Vec<Column>,
    rows: Vec<Vec<Value>>,
}

impl NormalizedTable {
    /// Build a table, inferring column types
    pub fn new(names: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self> {
        let mut seen = HashSet::new();
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(Error::SchemaConflict {
                    column: name.clone(),
                    sources: vec![name.clone(), name.clone()],
                });
            }
        }

        if let Some((idx, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != names.len()) {
            return Err(Error::internal(format!(
                "row {} has {} cells, expected {}",
                idx,
                row.len(),
                names.len()
            )));
        }

        let mut table = Self {
            columns: names
                .into_iter()
                .map(|name| Column {
                    name,
                    column_type: ColumnType::Null,
                })
                .collect(),
            rows,
        };
        for idx in 0..table.columns.len() {
            table.refresh_type(idx);
        }
        Ok(table)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Cells of one column, top to bottom
    pub fn column_values(&self, idx: usize) -> impl Iterator<Item = &Value> + '_ {
        self.rows.iter().map(move |row| &row[idx])
    }

    /// Cell by row index and column name
    pub fn cell(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    /// Number of missing cells in a column
    pub fn null_count(&self, idx: usize) -> usize {
        self.column_values(idx).filter(|v| v.is_null()).count()
    }

    /// Replace a column's cells, or append a new column
    pub fn set_column(&mut self, name: &str, values: Vec<Value>) -> Result<()> {
        if values.len() != self.rows.len() {
            return Err(Error::internal(format!(
                "column '{}' has {} values for {} rows",
                name,
                values.len(),
                self.rows.len()
            )));
        }

        let idx = match self.column_index(name) {
            Some(idx) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
                idx
            }
            None => {
                self.columns.push(Column {
                    name: name.to_string(),
                    column_type: ColumnType::Null,
                });
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
                self.columns.len() - 1
            }
        };
        self.refresh_type(idx);
        Ok(())
    }

    /// Apply `f` to every cell of a column
    pub fn update_column(&mut self, idx: usize, mut f: impl FnMut(&mut Value)) {
        for row in &mut self.rows {
            f(&mut row[idx]);
        }
        self.refresh_type(idx);
    }

    /// Drop rows equal to an earlier row; returns how many were removed
    pub fn dedup_rows(&mut self) -> usize {
        let before = self.rows.len();
        let mut seen = HashSet::new();
        self.rows.retain(|row| {
            let key = serde_json::to_string(row).unwrap_or_default();
            seen.insert(key)
        });
        before - self.rows.len()
    }

    /// Rows as column-name keyed records, in column order
    pub fn records(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .zip(row)
                    .map(|(col, value)| (col.name.clone(), value.clone()))
                    .collect()
            })
            .collect()
    }

    fn refresh_type(&mut self, idx: usize) {
        let column_type = ColumnType::infer(self.rows.iter().map(|row| &row[idx]));
        self.columns[idx].column_type = column_type;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_type_inference() {
        assert_eq!(ColumnType::infer(&[json!(1), json!(2.5), Value::Null]), ColumnType::Numeric);
        assert_eq!(ColumnType::infer(&[json!(true), Value::Null]), ColumnType::Boolean);
        assert_eq!(ColumnType::infer(&[json!("2024-01-31"), json!("2024-02-01T10:00:00")]), ColumnType::Datetime);
        assert_eq!(ColumnType::infer(&[json!("2024-01-31"), json!("soon")]), ColumnType::String);
        assert_eq!(ColumnType::infer(&[json!(1), json!("x")]), ColumnType::String);
        assert_eq!(ColumnType::infer(&[json!({"a": 1})]), ColumnType::Nested);
        assert_eq!(ColumnType::infer(&[Value::Null, Value::Null]), ColumnType::Null);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let err = NormalizedTable::new(names(&["a", "a"]), vec![]).unwrap_err();
        assert!(matches!(err, Error::SchemaConflict { ref column, .. } if column == "a"));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let result = NormalizedTable::new(names(&["a", "b"]), vec![vec![json!(1)]]);
        assert!(result.is_err());
    }

    #[test]
    fn test_set_column_appends_and_replaces() {
        let mut table = NormalizedTable::new(names(&["a"]), vec![vec![json!(1)], vec![json!(2)]]).unwrap();

        table.set_column("b", vec![json!("x"), json!("y")]).unwrap();
        assert_eq!(table.column_names(), vec!["a", "b"]);
        assert_eq!(table.columns()[1].column_type, ColumnType::String);

        table.set_column("a", vec![json!(true), json!(false)]).unwrap();
        assert_eq!(table.column_names(), vec!["a", "b"]);
        assert_eq!(table.columns()[0].column_type, ColumnType::Boolean);

        assert!(table.set_column("c", vec![json!(1)]).is_err());
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let mut table = NormalizedTable::new(
            names(&["id", "v"]),
            vec![
                vec![json!(1), json!("a")],
                vec![json!(2), json!("b")],
                vec![json!(1), json!("a")],
                vec![json!(1), Value::Null],
            ],
        )
        .unwrap();

        assert_eq!(table.dedup_rows(), 1);
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.cell(2, "v"), Some(&Value::Null));
    }

    #[test]
    fn test_records_keep_column_order() {
        let table = NormalizedTable::new(names(&["z", "a"]), vec![vec![json!(1), json!(2)]]).unwrap();
        let records = table.records();
        let keys: Vec<&String> = records[0].keys().collect();
        assert_eq!(keys, vec!["z", "a"]);
    }
}
