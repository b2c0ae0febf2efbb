use std::{error::Error, fmt::Debug};

use anyhow::Context;
use diesel::{ExpressionMethods, OptionalExtension, QueryDsl, RunQueryDsl};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    models::{Product, ProductStatus},
    schema::products,
    telemetry::spawn_blocking_with_tracing,
    utils::{error_fmt_chain, DbConnection},
};

#[derive(Error)]
pub enum ProductInsertError {
    #[error("Failed due to threadpool error")]
    ThreadpoolError(#[from] tokio::task::JoinError),
    #[error("Failed to insert into products table")]
    InsertError(#[from] diesel::result::Error),
}

impl Debug for ProductInsertError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

// Employee check-in: record a received lot
#[tracing::instrument("Inserting checked-in product", skip_all)]
pub async fn insert_product(
    mut conn: DbConnection,
    product: Product,
) -> Result<(), ProductInsertError> {
    spawn_blocking_with_tracing(move || {
        diesel::insert_into(products::table)
            .values(product)
            .execute(&mut conn)
    })
    .await??;

    Ok(())
}

// Listing for the browse pages. Customers only see checked-in lots with
// units left to reserve; employees see the whole inventory.
#[tracing::instrument("Getting products from db", skip(conn))]
pub async fn get_products(
    mut conn: DbConnection,
    page: i64,
    limit: i64,
    available_only: bool,
) -> Result<Vec<Product>, anyhow::Error> {
    let offset_value = (page - 1) * limit;

    let res = spawn_blocking_with_tracing(move || {
        let mut query = products::table.into_boxed();

        if available_only {
            query = query
                .filter(products::status.eq(ProductStatus::CheckedIn.as_str()))
                .filter(products::quantity.gt(0));
        }

        query
            .order(products::checked_in_time.desc())
            .limit(limit)
            .offset(offset_value)
            .load::<Product>(&mut conn)
            .context("Failed to get products")
    })
    .await
    .context("Failed due to threadpool error")??;

    Ok(res)
}

#[tracing::instrument("Getting product by UPC", skip(conn))]
pub async fn get_product_by_upc(
    mut conn: DbConnection,
    upc: String,
) -> Result<Option<Product>, anyhow::Error> {
    let res = spawn_blocking_with_tracing(move || {
        products::table
            .filter(products::upc.eq(upc))
            .first::<Product>(&mut conn)
            .optional()
            .context("Failed to get product by UPC")
    })
    .await
    .context("Failed due to threadpool error")??;

    Ok(res)
}

#[tracing::instrument("Getting product by id", skip(conn))]
pub async fn get_product(
    mut conn: DbConnection,
    product_id: Uuid,
) -> Result<Option<Product>, anyhow::Error> {
    let res = spawn_blocking_with_tracing(move || {
        products::table
            .filter(products::product_id.eq(product_id))
            .first::<Product>(&mut conn)
            .optional()
            .context("Failed to get product by id")
    })
    .await
    .context("Failed due to threadpool error")??;

    Ok(res)
}
