use std::{error::Error, fmt::Debug};

use anyhow::Context;
use diesel::{QueryDsl, RunQueryDsl};
use thiserror::Error;

use crate::{
    models::Warehouse,
    schema::warehouses,
    telemetry::spawn_blocking_with_tracing,
    utils::{error_fmt_chain, DbConnection},
};

#[derive(Error)]
pub enum WarehouseInsertError {
    #[error("Failed due to threadpool error")]
    ThreadpoolError(#[from] tokio::task::JoinError),
    #[error("Failed to insert into warehouses table")]
    InsertError(#[from] diesel::result::Error),
}

impl Debug for WarehouseInsertError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

#[tracing::instrument("Inserting warehouse", skip_all)]
pub async fn insert_warehouse(
    mut conn: DbConnection,
    warehouse: Warehouse,
) -> Result<(), WarehouseInsertError> {
    spawn_blocking_with_tracing(move || {
        diesel::insert_into(warehouses::table)
            .values(warehouse)
            .execute(&mut conn)
    })
    .await??;

    Ok(())
}

#[tracing::instrument("Getting warehouses from db", skip(conn))]
pub async fn get_warehouses(
    mut conn: DbConnection,
    page: i64,
    limit: i64,
) -> Result<Vec<Warehouse>, anyhow::Error> {
    let offset_value = (page - 1) * limit;

    let res = spawn_blocking_with_tracing(move || {
        warehouses::table
            .limit(limit)
            .offset(offset_value)
            .load::<Warehouse>(&mut conn)
            .context("Failed to get warehouses")
    })
    .await
    .context("Failed due to threadpool error")??;

    Ok(res)
}
