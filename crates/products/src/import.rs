//! Mapping of bulk-import rows onto products.
//!
//! The spreadsheet reader lives outside this crate; it hands over plain
//! `(id, title, description)` rows. Imported rows carry no price, so one is
//! assigned synthetically: the first row gets `starting_price`, each following
//! row one more.

use serde::{Deserialize, Serialize};

use crate::product::Product;

/// One row produced by the bulk-import reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRow {
    pub id: String,
    pub title: String,
    pub description: String,
}

impl ImportRow {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
        }
    }
}

pub fn products_from_rows<I>(rows: I, starting_price: f64) -> Vec<Product>
where
    I: IntoIterator<Item = ImportRow>,
{
    rows.into_iter()
        .enumerate()
        .map(|(i, row)| Product::new(row.id, row.title, row.description, starting_price + i as f64))
        .collect()
}
