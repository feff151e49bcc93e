//! Table serialization for published artifacts

use parquet::{
    basic::{Compression, LogicalType, Repetition, Type as PhysicalType},
    column::writer::ColumnWriter,
    data_type::ByteArray,
    file::{properties::WriterProperties, writer::SerializedFileWriter},
    schema::types::Type,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::types::{ColumnType, NormalizedTable};

/// Serialization format of an artifact
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactEncoding {
    Csv,
    Json,
    Parquet,
}

impl ArtifactEncoding {
    /// File extension used in object keys
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Parquet => "parquet",
        }
    }

    /// MIME type derived from the extension
    pub fn content_type(&self) -> String {
        mime_guess::from_ext(self.extension())
            .first_or_octet_stream()
            .to_string()
    }

    /// Serialize a table in this encoding
    pub fn encode(&self, table: &NormalizedTable) -> Result<Vec<u8>> {
        match self {
            Self::Csv => encode_csv(table),
            Self::Json => encode_json(table),
            Self::Parquet => encode_parquet(table),
        }
    }
}

impl FromStr for ArtifactEncoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "parquet" => Ok(Self::Parquet),
            _ => Err(Error::UnsupportedEncoding(s.to_string())),
        }
    }
}

impl std::fmt::Display for ArtifactEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Header plus one line per row; nulls are empty fields
fn encode_csv(table: &NormalizedTable) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(table.column_names())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(csv_field))?;
    }
    writer
        .into_inner()
        .map_err(|e| Error::encode(format!("csv: {}", e.error())))
}

fn csv_field(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        nested => nested.to_string(),
    }
}

/// Array of records, keys in column order
fn encode_json(table: &NormalizedTable) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(&table.records())?)
}

/// Physical layout chosen for one parquet column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParquetKind {
    Boolean,
    Int64,
    Double,
    Utf8,
}

impl ParquetKind {
    fn for_column(table: &NormalizedTable, idx: usize, column_type: ColumnType) -> Self {
        match column_type {
            ColumnType::Boolean => Self::Boolean,
            ColumnType::Numeric => {
                if table.column_values(idx).all(|v| v.is_null() || v.is_i64()) {
                    Self::Int64
                } else {
                    Self::Double
                }
            }
            ColumnType::String | ColumnType::Datetime | ColumnType::Nested | ColumnType::Null => {
                Self::Utf8
            }
        }
    }
}

fn utf8_cell(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// One row group, SNAPPY, every column optional
fn encode_parquet(table: &NormalizedTable) -> Result<Vec<u8>> {
    if table.column_count() == 0 {
        return Err(Error::encode("parquet: table has no columns"));
    }

    let kinds: Vec<ParquetKind> = table
        .columns()
        .iter()
        .enumerate()
        .map(|(idx, col)| ParquetKind::for_column(table, idx, col.column_type))
        .collect();

    let mut fields = Vec::with_capacity(kinds.len());
    for (col, kind) in table.columns().iter().zip(&kinds) {
        let field = match kind {
            ParquetKind::Boolean => Type::primitive_type_builder(&col.name, PhysicalType::BOOLEAN),
            ParquetKind::Int64 => Type::primitive_type_builder(&col.name, PhysicalType::INT64),
            ParquetKind::Double => Type::primitive_type_builder(&col.name, PhysicalType::DOUBLE),
            ParquetKind::Utf8 => Type::primitive_type_builder(&col.name, PhysicalType::BYTE_ARRAY)
                .with_logical_type(Some(LogicalType::String)),
        }
        .with_repetition(Repetition::OPTIONAL)
        .build()?;
        fields.push(Arc::new(field));
    }

    let schema = Arc::new(Type::group_type_builder("records").with_fields(fields).build()?);
    let props = Arc::new(
        WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .build(),
    );

    let mut buffer = Vec::new();
    let mut writer = SerializedFileWriter::new(&mut buffer, schema, props)?;
    let mut row_group_writer = writer.next_row_group()?;

    for (idx, kind) in kinds.iter().enumerate() {
        let Some(mut column_writer) = row_group_writer.next_column()? else {
            return Err(Error::encode(format!("parquet: missing writer for column {}", idx)));
        };

        let mut defs = vec![0i16; table.row_count()];
        let cells = table.column_values(idx);

        match (column_writer.untyped(), kind) {
            (ColumnWriter::BoolColumnWriter(typed), ParquetKind::Boolean) => {
                let mut vals = Vec::new();
                for (i, v) in cells.enumerate() {
                    if let Some(b) = v.as_bool() {
                        defs[i] = 1;
                        vals.push(b);
                    }
                }
                typed.write_batch(&vals, Some(&defs), None)?;
            }
            (ColumnWriter::Int64ColumnWriter(typed), ParquetKind::Int64) => {
                let mut vals = Vec::new();
                for (i, v) in cells.enumerate() {
                    if let Some(n) = v.as_i64() {
                        defs[i] = 1;
                        vals.push(n);
                    }
                }
                typed.write_batch(&vals, Some(&defs), None)?;
            }
            (ColumnWriter::DoubleColumnWriter(typed), ParquetKind::Double) => {
                let mut vals = Vec::new();
                for (i, v) in cells.enumerate() {
                    if let Some(n) = v.as_f64() {
                        defs[i] = 1;
                        vals.push(n);
                    }
                }
                typed.write_batch(&vals, Some(&defs), None)?;
            }
            (ColumnWriter::ByteArrayColumnWriter(typed), ParquetKind::Utf8) => {
                let mut vals = Vec::new();
                for (i, v) in cells.enumerate() {
                    if let Some(s) = utf8_cell(v) {
                        defs[i] = 1;
                        vals.push(ByteArray::from(s.into_bytes()));
                    }
                }
                typed.write_batch(&vals, Some(&defs), None)?;
            }
            _ => {
                return Err(Error::encode(format!(
                    "parquet: unexpected column writer for column {}",
                    idx
                )))
            }
        }
        column_writer.close()?;
    }

    row_group_writer.close()?;
    writer.close()?;
    Ok(buffer)
}
