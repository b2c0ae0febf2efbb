use std::{error::Error, fmt::Debug};

use diesel::{ExpressionMethods, PgConnection, QueryDsl, RunQueryDsl};
use thiserror::Error;
use uuid::Uuid;

use crate::schema::products;
use crate::utils::error_fmt_chain;

// The single place where product availability moves. Both functions take a
// bare connection and are only called from inside an open transaction, so a
// reservation is never observable without its checkout request row.
#[derive(Error)]
pub enum LedgerError {
    #[error("requested quantity must be positive, got {0}")]
    NonPositiveQuantity(i32),
    #[error("product {product_id} has fewer than {requested} units available")]
    InsufficientStock { product_id: Uuid, requested: i32 },
    #[error("product {0} doesn't exist")]
    UnknownProduct(Uuid),
    #[error("Failed to run query")]
    QueryError(#[from] diesel::result::Error),
}

impl Debug for LedgerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

// Reserve units for a checkout request. The guard on the availability
// column makes the check-then-act a single statement, so two concurrent
// reservations can never both succeed past the remaining stock.
#[tracing::instrument("Reserving product units", skip(conn))]
pub fn reserve(
    conn: &mut PgConnection,
    product_id: Uuid,
    quantity: i32,
) -> Result<(), LedgerError> {
    if quantity <= 0 {
        return Err(LedgerError::NonPositiveQuantity(quantity));
    }

    let affected_rows = diesel::update(products::table.filter(products::product_id.eq(product_id)))
        .set(products::quantity.eq(products::quantity - quantity))
        .filter(products::quantity.ge(quantity))
        .execute(conn)?;

    if affected_rows == 0 {
        return Err(stock_or_unknown(conn, product_id, quantity)?);
    }

    Ok(())
}

// Return previously reserved units to availability (request cancellation)
#[tracing::instrument("Releasing product units", skip(conn))]
pub fn release(
    conn: &mut PgConnection,
    product_id: Uuid,
    quantity: i32,
) -> Result<(), LedgerError> {
    if quantity <= 0 {
        return Err(LedgerError::NonPositiveQuantity(quantity));
    }

    let affected_rows = diesel::update(products::table.filter(products::product_id.eq(product_id)))
        .set(products::quantity.eq(products::quantity + quantity))
        .execute(conn)?;

    if affected_rows == 0 {
        return Err(LedgerError::UnknownProduct(product_id));
    }

    Ok(())
}

fn stock_or_unknown(
    conn: &mut PgConnection,
    product_id: Uuid,
    requested: i32,
) -> Result<LedgerError, diesel::result::Error> {
    let exists: i64 = products::table
        .filter(products::product_id.eq(product_id))
        .count()
        .get_result(conn)?;

    if exists > 0 {
        Ok(LedgerError::InsufficientStock {
            product_id,
            requested,
        })
    } else {
        Ok(LedgerError::UnknownProduct(product_id))
    }
}
