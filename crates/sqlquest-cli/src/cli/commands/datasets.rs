use crate::exit_codes;
use anyhow::Result;
use sqlquest_core::catalog::Catalog;

pub fn execute(catalog: &Catalog) -> Result<i32> {
    for dataset in &catalog.datasets {
        let tables = dataset
            .tables
            .iter()
            .map(|t| t.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        println!("{:<20} {} [{}]", dataset.id, dataset.name, tables);
    }
    Ok(exit_codes::OK)
}
