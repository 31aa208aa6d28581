use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::{params_from_iter, Connection, ToSql};
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Raw column value as SQLite stores it
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<ValueRef<'_>> for Value {
    fn from(v: ValueRef<'_>) -> Self {
        match v {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(f) => Value::Real(f),
            ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Value::Blob(b.to_vec()),
        }
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let value = match self {
            Value::Null => ValueRef::Null,
            Value::Integer(i) => ValueRef::Integer(*i),
            Value::Real(f) => ValueRef::Real(*f),
            Value::Text(s) => ValueRef::Text(s.as_bytes()),
            Value::Blob(b) => ValueRef::Blob(b),
        };
        Ok(ToSqlOutput::Borrowed(value))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Real(r) => write!(f, "{r}"),
            Value::Text(s) => f.write_str(s),
            Value::Blob(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

/// A result row: one raw value per selected column, in column order.
pub type Row = Vec<Value>;

/// Tables this crate is allowed to touch. Only these names are ever
/// formatted into statement text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableName {
    #[default]
    Products,
}

impl TableName {
    pub fn as_str(self) -> &'static str {
        match self {
            TableName::Products => "products",
        }
    }

    pub fn definition(self) -> TableDefinition {
        match self {
            TableName::Products => TableDefinition {
                name: self,
                columns: vec![
                    ColumnDefinition::new(Column::ProductId, DataType::Text)
                        .with_constraint(ColumnConstraint::PrimaryKey),
                    ColumnDefinition::new(Column::Description, DataType::Text),
                    ColumnDefinition::new(Column::Quantity, DataType::Integer),
                ],
            },
        }
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column identifiers, closed for the same reason as [`TableName`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    ProductId,
    Description,
    Quantity,
}

impl Column {
    pub fn as_str(self) -> &'static str {
        match self {
            Column::ProductId => "productID",
            Column::Description => "description",
            Column::Quantity => "quantity",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Integer,
    Text,
}

impl DataType {
    fn as_sql(self) -> &'static str {
        match self {
            DataType::Integer => "INTEGER",
            DataType::Text => "TEXT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnConstraint {
    PrimaryKey,
}

impl ColumnConstraint {
    fn as_sql(self) -> &'static str {
        match self {
            ColumnConstraint::PrimaryKey => "PRIMARY KEY",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub column: Column,
    pub data_type: DataType,
    pub constraints: Vec<ColumnConstraint>,
}

impl ColumnDefinition {
    pub fn new(column: Column, data_type: DataType) -> Self {
        Self {
            column,
            data_type,
            constraints: Vec::new(),
        }
    }

    pub fn with_constraint(mut self, constraint: ColumnConstraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    fn to_sql(&self) -> String {
        let mut sql = format!("{} {}", self.column, self.data_type.as_sql());
        for constraint in &self.constraints {
            sql.push(' ');
            sql.push_str(constraint.as_sql());
        }
        sql
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableDefinition {
    pub name: TableName,
    pub columns: Vec<ColumnDefinition>,
}

impl TableDefinition {
    /// `CREATE TABLE IF NOT EXISTS` statement for this table.
    pub fn create_sql(&self) -> String {
        let columns: Vec<String> = self.columns.iter().map(ColumnDefinition::to_sql).collect();
        format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            self.name,
            columns.join(", ")
        )
    }

    /// Positional insert covering every column, in definition order.
    pub fn insert_sql(&self) -> String {
        let names: Vec<&str> = self.columns.iter().map(|c| c.column.as_str()).collect();
        let placeholders: Vec<String> = (1..=self.columns.len()).map(|i| format!("?{i}")).collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.name,
            names.join(", "),
            placeholders.join(", ")
        )
    }
}

/// SQL statement with positionally bound parameters
#[derive(Debug, Clone, PartialEq)]
pub struct SqlQuery {
    pub statement: String,
    pub params: Vec<Value>,
}

impl SqlQuery {
    pub fn new(statement: &str) -> Self {
        Self {
            statement: statement.to_string(),
            params: Vec::new(),
        }
    }

    pub fn with_param(mut self, value: impl Into<Value>) -> Self {
        self.params.push(value.into());
        self
    }
}

/// Query operators for building lookups
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOperator {
    Equal(Value),
    /// Raw `LIKE` pattern, wildcards supplied by the caller.
    Like(String),
    /// Substring match anywhere in the column.
    Contains(String),
}

/// Composable read query; conditions are joined with `AND`.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Query {
    pub conditions: Vec<(Column, QueryOperator)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_condition(mut self, column: Column, op: QueryOperator) -> Self {
        self.conditions.push((column, op));
        self
    }

    /// Render against `table`. Every operand becomes a bound parameter.
    pub fn to_sql(&self, table: TableName) -> SqlQuery {
        let mut statement = format!("SELECT * FROM {table}");
        let mut params = Vec::with_capacity(self.conditions.len());
        for (i, (column, op)) in self.conditions.iter().enumerate() {
            statement.push_str(if i == 0 { " WHERE " } else { " AND " });
            let n = i + 1;
            match op {
                QueryOperator::Equal(value) => {
                    statement.push_str(&format!("{column} = ?{n}"));
                    params.push(value.clone());
                }
                QueryOperator::Like(pattern) => {
                    statement.push_str(&format!("{column} LIKE ?{n}"));
                    params.push(Value::Text(pattern.clone()));
                }
                QueryOperator::Contains(needle) => {
                    statement.push_str(&format!("{column} LIKE ?{n}"));
                    params.push(Value::Text(format!("%{needle}%")));
                }
            }
        }
        SqlQuery { statement, params }
    }
}

/// How the loader clears the table before repopulating it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DropPolicy {
    /// Plain `DROP TABLE`; fails when the table does not exist yet.
    Unconditional,
    /// `DROP TABLE IF EXISTS`.
    #[default]
    IfExists,
}

/// SQLite store configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SqliteConfig {
    /// Path to the SQLite database file
    pub db_path: PathBuf,
    /// Table the loader resets and the query runner reads
    pub table: TableName,
    /// How the loader clears the table before repopulating it
    pub drop_policy: DropPolicy,
}

impl SqliteConfig {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            table: TableName::default(),
            drop_policy: DropPolicy::default(),
        }
    }

    pub fn with_drop_policy(mut self, drop_policy: DropPolicy) -> Self {
        self.drop_policy = drop_policy;
        self
    }
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self::new("inventory.db")
    }
}

/// An open connection to the store. Dropping it closes the connection;
/// [`Store::close`] does the same but reports failures.
pub struct Store {
    conn: Connection,
    table: TableName,
    path: PathBuf,
}

impl Store {
    /// Open (creating if absent) the database file named by `config`.
    pub fn open(config: &SqliteConfig) -> Result<Self> {
        let conn = Connection::open(&config.db_path).map_err(|e| {
            Error::StoreUnreachable(format!("{}: {e}", config.db_path.display()))
        })?;
        info!(path = %config.db_path.display(), table = %config.table, "opened store");
        Ok(Self {
            conn,
            table: config.table,
            path: config.db_path.clone(),
        })
    }

    pub fn table(&self) -> TableName {
        self.table
    }

    /// Drop the table and create it again, empty.
    pub fn reset_table(&self, policy: DropPolicy) -> Result<()> {
        let drop_sql = match policy {
            DropPolicy::Unconditional => format!("DROP TABLE {}", self.table),
            DropPolicy::IfExists => format!("DROP TABLE IF EXISTS {}", self.table),
        };
        self.conn
            .execute_batch(&drop_sql)
            .map_err(Error::from_drop)?;
        self.conn
            .execute_batch(&self.table.definition().create_sql())?;
        info!(table = %self.table, ?policy, "table reset");
        Ok(())
    }

    /// Insert every row through one prepared statement inside a single
    /// transaction, then commit. Nothing is committed if any row fails.
    pub fn insert_all<I>(&mut self, rows: I) -> Result<usize>
    where
        I: IntoIterator<Item = Row>,
    {
        let insert_sql = self.table.definition().insert_sql();
        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(&insert_sql)?;
            for row in rows {
                stmt.execute(params_from_iter(row.iter()))
                    .map_err(Error::from_insert)?;
                inserted += 1;
            }
        }
        tx.commit()?;
        info!(table = %self.table, rows = inserted, "committed bulk insert");
        Ok(inserted)
    }

    /// Run `query` and hand each row to `f` as it is stepped. Returns the
    /// number of rows seen.
    pub fn for_each_row<F>(&self, query: &SqlQuery, mut f: F) -> Result<usize>
    where
        F: FnMut(&[Value]) -> Result<()>,
    {
        debug!(statement = %query.statement, params = ?query.params, "executing query");
        let mut stmt = self.conn.prepare(&query.statement)?;
        let column_count = stmt.column_count();
        let mut rows = stmt.query(params_from_iter(query.params.iter()))?;
        let mut seen = 0;
        while let Some(row) = rows.next()? {
            let values = (0..column_count)
                .map(|i| row.get_ref(i).map(Value::from))
                .collect::<rusqlite::Result<Row>>()?;
            f(&values)?;
            seen += 1;
        }
        debug!(rows = seen, "query finished");
        Ok(seen)
    }

    pub fn fetch_all(&self, query: &SqlQuery) -> Result<Vec<Row>> {
        let mut out = Vec::new();
        self.for_each_row(query, |row| {
            out.push(row.to_vec());
            Ok(())
        })?;
        Ok(out)
    }

    pub fn close(self) -> Result<()> {
        let path = self.path;
        self.conn.close().map_err(|(_, e)| Error::Close(e.to_string()))?;
        info!(path = %path.display(), "closed store");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn products_schema_matches_layout() {
        let def = TableName::Products.definition();
        assert_eq!(
            def.create_sql(),
            "CREATE TABLE IF NOT EXISTS products (productID TEXT PRIMARY KEY, description TEXT, quantity INTEGER)"
        );
        assert_eq!(
            def.insert_sql(),
            "INSERT INTO products (productID, description, quantity) VALUES (?1, ?2, ?3)"
        );
    }

    #[test]
    fn contains_wraps_needle_in_wildcards() {
        let sql = Query::new()
            .with_condition(Column::Description, QueryOperator::Contains("sign".into()))
            .to_sql(TableName::Products);
        assert_eq!(sql.statement, "SELECT * FROM products WHERE description LIKE ?1");
        assert_eq!(sql.params, vec![Value::Text("%sign%".into())]);
    }

    #[test]
    fn conditions_are_numbered_and_joined() {
        let sql = Query::new()
            .with_condition(Column::ProductId, QueryOperator::Equal("22776".into()))
            .with_condition(Column::Description, QueryOperator::Like("Swallows%".into()))
            .to_sql(TableName::Products);
        assert_eq!(
            sql.statement,
            "SELECT * FROM products WHERE productID = ?1 AND description LIKE ?2"
        );
        assert_eq!(
            sql.params,
            vec![Value::Text("22776".into()), Value::Text("Swallows%".into())]
        );
    }

    #[test]
    fn empty_query_selects_everything() {
        let sql = Query::new().to_sql(TableName::Products);
        assert_eq!(sql.statement, "SELECT * FROM products");
        assert!(sql.params.is_empty());
    }

    #[test]
    fn values_round_trip_through_sqlite() -> Result<()> {
        let conn = Connection::open_in_memory()?;
        let out: (i64, String, Option<i64>) = conn.query_row(
            "SELECT ?1, ?2, ?3",
            params_from_iter([Value::from(8u32), Value::from("Rabbit night light"), Value::Null]),
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;
        assert_eq!(out, (8, "Rabbit night light".to_string(), None));
        Ok(())
    }

    #[test]
    fn display_prints_raw_value() {
        assert_eq!(Value::Integer(4).to_string(), "4");
        assert_eq!(Value::from("Kitchen metal sign").to_string(), "Kitchen metal sign");
        assert_eq!(Value::Null.to_string(), "NULL");
    }
}
