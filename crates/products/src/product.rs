use serde::{Deserialize, Serialize};

use prodsearch_core::ProductId;

use crate::text::{SearchText, normalize};

/// A product record as it crosses the wire and comes back from search.
///
/// Carries only the caller-supplied fields. The derived search text lives in
/// [`IndexedProduct`] and is never serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub description: String,
    pub price: f64,
}

impl Product {
    pub fn new(
        id: impl Into<ProductId>,
        title: impl Into<String>,
        description: impl Into<String>,
        price: f64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            price,
        }
    }

    /// Attach freshly derived search text, producing the record handed to storage.
    pub fn index(self) -> IndexedProduct {
        IndexedProduct::new(self)
    }
}

/// A product together with the search text derived from its current title and
/// description.
///
/// Fields are private and the text is derived on construction, so the pair
/// can never drift apart.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedProduct {
    product: Product,
    text: SearchText,
}

impl IndexedProduct {
    pub fn new(product: Product) -> Self {
        let text = normalize(&product.title, &product.description);
        Self { product, text }
    }

    pub fn product(&self) -> &Product {
        &self.product
    }

    pub fn id(&self) -> &ProductId {
        &self.product.id
    }

    pub fn full_text_with_spaces(&self) -> &str {
        self.text.with_spaces()
    }

    pub fn full_text_without_spaces(&self) -> &str {
        self.text.without_spaces()
    }
}

impl From<Product> for IndexedProduct {
    fn from(product: Product) -> Self {
        Self::new(product)
    }
}
