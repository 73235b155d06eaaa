use std::collections::HashMap;

use serde::Deserialize;

use crate::catalog::mapping::ColumnMapping;
use crate::catalog::replace::DEFAULT_BATCH_SIZE;

/// Configuration options specific to the catalog sync service.
#[derive(Clone, Debug, Deserialize)]
pub struct ServerConfig {
    /// SQLite database path.
    pub database_url: String,
    /// Interface the HTTP server binds to.
    pub address: String,
    pub port: u16,
    #[serde(default)]
    pub import: ImportSettings,
}

/// Defaults applied to every import run.
#[derive(Clone, Debug, Deserialize)]
pub struct ImportSettings {
    /// Rows per insert batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Canonical field to source column name, e.g. `ref: "Code article"`.
    #[serde(default)]
    pub column_mapping: HashMap<String, String>,
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            column_mapping: HashMap::new(),
        }
    }
}

impl ImportSettings {
    /// Configured mapping, with `overrides` applied on top.
    pub fn mapping(&self, overrides: Option<&ColumnMapping>) -> ColumnMapping {
        let base = ColumnMapping::from_table(&self.column_mapping);
        match overrides {
            Some(overrides) => base.merged_with(overrides),
            None => base,
        }
    }
}
