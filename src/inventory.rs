//! Inventory records and the fixed data the demo runs on.

use crate::sqlite::{Column, Query, QueryOperator, Row, Value};

/// One inventory item, keyed by `product_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub product_id: String,
    pub description: String,
    pub quantity: u32,
}

impl Product {
    pub fn new(product_id: &str, description: &str, quantity: u32) -> Self {
        Self {
            product_id: product_id.to_string(),
            description: description.to_string(),
            quantity,
        }
    }

    /// Column values in table order.
    pub fn to_row(&self) -> Row {
        vec![
            Value::from(self.product_id.as_str()),
            Value::from(self.description.as_str()),
            Value::from(self.quantity),
        ]
    }
}

/// The sample product list loaded on every run.
pub fn sample_products() -> Vec<Product> {
    vec![
        Product::new("85123A", "Blue paisley tissue box", 8),
        Product::new("82578", "Kitchen metal sign", 2),
        Product::new("22111", "Small popcorn holder", 3),
        Product::new("23084", "Rabbit night light", 8),
        Product::new("22776", "Swallows greeting card", 4),
    ]
}

pub fn description_contains(needle: &str) -> Query {
    Query::new().with_condition(Column::Description, QueryOperator::Contains(needle.to_string()))
}

pub fn product_id_equals(product_id: &str) -> Query {
    Query::new().with_condition(Column::ProductId, QueryOperator::Equal(Value::from(product_id)))
}

/// The two lookups the demo prints: a substring match on the description,
/// then an exact match on the product id.
pub fn sample_queries() -> Vec<Query> {
    vec![description_contains("sign"), product_id_equals("22776")]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn sample_ids_are_distinct() {
        let products = sample_products();
        let ids: HashSet<&str> = products.iter().map(|p| p.product_id.as_str()).collect();
        assert_eq!(ids.len(), products.len());
        assert_eq!(products.len(), 5);
    }

    #[test]
    fn row_follows_column_order() {
        let row = Product::new("22776", "Swallows greeting card", 4).to_row();
        assert_eq!(
            row,
            vec![
                Value::Text("22776".into()),
                Value::Text("Swallows greeting card".into()),
                Value::Integer(4),
            ]
        );
    }
}
