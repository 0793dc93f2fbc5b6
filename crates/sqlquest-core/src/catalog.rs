//! Dataset catalog: the fixed public-dataset schemas quests run against.

use crate::errors::CatalogError;
use crate::model::Dataset;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub datasets: Vec<Dataset>,
}

impl Catalog {
    /// The catalog shipped with the crate (see `catalog.yaml`).
    pub fn builtin() -> Self {
        let catalog: Catalog = serde_yaml::from_str(include_str!("../catalog.yaml"))
            .expect("built-in catalog is valid YAML");
        catalog
            .validate()
            .expect("built-in catalog passes validation");
        catalog
    }

    /// Load a user-supplied catalog of the same shape.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            CatalogError(format!("failed to read catalog {}: {}", path.display(), e))
        })?;
        let catalog: Catalog = serde_yaml::from_str(&raw)
            .map_err(|e| CatalogError(format!("failed to parse YAML: {}", e)))?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn get(&self, id: &str) -> Option<&Dataset> {
        self.datasets.iter().find(|d| d.id == id)
    }

    /// Table and column names must be unique within their scope; a query
    /// universe with ambiguous names is unusable.
    fn validate(&self) -> Result<(), CatalogError> {
        if self.datasets.is_empty() {
            return Err(CatalogError("catalog has no datasets".into()));
        }
        let mut dataset_ids = HashSet::new();
        for dataset in &self.datasets {
            if !dataset_ids.insert(dataset.id.as_str()) {
                return Err(CatalogError(format!("duplicate dataset id {}", dataset.id)));
            }
            if dataset.tables.is_empty() {
                return Err(CatalogError(format!(
                    "dataset {} has no tables",
                    dataset.id
                )));
            }
            let mut table_names = HashSet::new();
            for table in &dataset.tables {
                if !table_names.insert(table.name.as_str()) {
                    return Err(CatalogError(format!(
                        "duplicate table {} in dataset {}",
                        table.name, dataset.id
                    )));
                }
                let mut column_names = HashSet::new();
                for column in &table.columns {
                    if !column_names.insert(column.name.as_str()) {
                        return Err(CatalogError(format!(
                            "duplicate column {} in table {}.{}",
                            column.name, dataset.id, table.name
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}
