//! Column name normalization shared by the tabular and JSON handlers

use std::collections::HashMap;

use crate::error::{Error, Result};

/// Lower-case a name and replace every whitespace character with `_`
pub fn normalize_column_name(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}

/// Normalize a header, failing if two source names collapse into one
pub fn normalize_column_names<S: AsRef<str>>(names: &[S]) -> Result<Vec<String>> {
    let mut first_source: HashMap<String, &str> = HashMap::new();
    let mut normalized = Vec::with_capacity(names.len());

    for name in names {
        let name = name.as_ref();
        let target = normalize_column_name(name);
        if let Some(existing) = first_source.get(&target) {
            return Err(Error::SchemaConflict {
                column: target,
                sources: vec![existing.to_string(), name.to_string()],
            });
        }
        first_source.insert(target.clone(), name);
        normalized.push(target);
    }

    Ok(normalized)
}
