use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 3-letter designator column. The header is misspelled in the national sheets.
pub const DESIGNATOR_COLUMN: &str = "Desginador 3 Letras";
pub const ICAO_COLUMN: &str = "id AP: OACI";
pub const SITE_COLUMN: &str = "Sitio";
pub const LOCATION_NAME_COLUMN: &str = "Ubicacion: Nombre";
pub const REGION_COLUMN: &str = "FIR";
pub const LOCATION_REGION_COLUMN: &str = "Ubicacion: FIR";

/// Site-bearing columns in the order they are tried.
pub const SITE_COLUMNS: [&str; 4] = [
    DESIGNATOR_COLUMN,
    ICAO_COLUMN,
    SITE_COLUMN,
    LOCATION_NAME_COLUMN,
];

pub const REGION_COLUMNS: [&str; 2] = [REGION_COLUMN, LOCATION_REGION_COLUMN];

/// A non-empty site identifier pulled from an import row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteField {
    pub column: String,
    pub value: String,
}

/// # Documentation
/// - One spreadsheet row as handed over by the import layer
/// - Header names are compared after trimming, the sheets carry stray trailing spaces
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRow {
    pub row_number: usize,

    pub columns: HashMap<String, String>,
}

impl ImportRow {
    pub fn new(row_number: usize, columns: HashMap<String, String>) -> Self {
        let columns = columns
            .into_iter()
            .map(|(header, value)| (header.trim().to_string(), value))
            .collect();
        Self {
            row_number,
            columns,
        }
    }

    pub fn from_pairs<I, K, V>(row_number: usize, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::new(
            row_number,
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Trimmed value of a column, `None` when missing or blank.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns
            .get(column.trim())
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    pub fn site_fields(&self) -> Vec<SiteField> {
        SITE_COLUMNS
            .iter()
            .filter_map(|column| {
                self.get(column).map(|value| SiteField {
                    column: column.to_string(),
                    value: value.to_string(),
                })
            })
            .collect()
    }

    pub fn region_hint(&self) -> Option<&str> {
        REGION_COLUMNS.iter().find_map(|column| self.get(column))
    }
}
