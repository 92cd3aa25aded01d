//! Unit-of-work helper for multi-statement writes.

use surrealdb::method::Query;
use surrealdb::{Connection, Surreal};

use crate::error::DbError;

/// Run `statements` as one SurrealDB transaction.
///
/// `bind` attaches the parameters the statements reference. Every
/// statement result is checked; a failure anywhere cancels the whole
/// transaction and is reported as [`DbError::Transaction`]. Nothing is
/// returned: callers re-read what they need once the commit succeeded.
pub async fn in_transaction<'r, C, F>(
    db: &'r Surreal<C>,
    statements: &str,
    bind: F,
) -> Result<(), DbError>
where
    C: Connection,
    F: FnOnce(Query<'r, C>) -> Query<'r, C>,
{
    let sql = format!("BEGIN TRANSACTION;\n{statements}\nCOMMIT TRANSACTION;");

    let response = bind(db.query(sql)).await?;
    response
        .check()
        .map_err(|e| DbError::Transaction(e.to_string()))?;

    Ok(())
}
