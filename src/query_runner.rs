//! Run lookups against a loaded store and print the matches.

use std::io::Write;

use tracing::info;

use crate::error::Result;
use crate::sqlite::{Query, SqliteConfig, Store, Value};

/// Open a fresh connection, run each query in order and write its matching
/// rows to `out`, then close. Returns the number of rows each query matched.
pub fn run_queries<W: Write>(config: &SqliteConfig, queries: &[Query], out: &mut W) -> Result<Vec<usize>> {
    let store = Store::open(config)?;
    let mut counts = Vec::with_capacity(queries.len());
    for (i, query) in queries.iter().enumerate() {
        let sql = query.to_sql(store.table());
        writeln!(out, "Records that match query {}: ", i + 1)?;
        let matched = store.for_each_row(&sql, |row| write_row(&mut *out, row))?;
        info!(query = i + 1, rows = matched, "query complete");
        counts.push(matched);
    }
    store.close()?;
    Ok(counts)
}

fn write_row<W: Write>(out: &mut W, row: &[Value]) -> Result<()> {
    let field = |i: usize| row.get(i).unwrap_or(&Value::Null);
    writeln!(out, "Product ID: {}", field(0))?;
    writeln!(out, "Description: {}", field(1))?;
    writeln!(out, "Quantity: {}", field(2))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_rows_print_null() -> Result<()> {
        let mut out = Vec::new();
        write_row(&mut out, &[Value::from("99999")])?;
        assert_eq!(
            String::from_utf8_lossy(&out),
            "Product ID: 99999\nDescription: NULL\nQuantity: NULL\n"
        );
        Ok(())
    }
}
