//! Replace the table's contents with a given product list.

use tracing::info;

use crate::error::Result;
use crate::inventory::Product;
use crate::sqlite::{SqliteConfig, Store};

/// Open the store, reset the table per `config.drop_policy`, bulk insert
/// `products` in one transaction and close. Returns the number of rows
/// written.
///
/// A failed insert leaves the table freshly created but empty: the drop and
/// create are not part of the insert transaction.
pub fn load_products(config: &SqliteConfig, products: &[Product]) -> Result<usize> {
    let mut store = Store::open(config)?;
    store.reset_table(config.drop_policy)?;
    let inserted = store.insert_all(products.iter().map(Product::to_row))?;
    store.close()?;
    info!(rows = inserted, path = %config.db_path.display(), "load complete");
    Ok(inserted)
}
