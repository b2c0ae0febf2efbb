use std::{error::Error, fmt::Debug};

use actix_web::{web, HttpResponse, ResponseError};
use anyhow::Context;
use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    auth::extractors::IsEmployee,
    db_interaction::{insert_warehouse, WarehouseInsertError},
    models::Warehouse,
    utils::{error_fmt_chain, get_pooled_connection, DbPool},
};

#[derive(Deserialize, Debug)]
pub struct WarehouseForm {
    name: String,
    address: String,
}

#[derive(Error)]
pub enum PostWarehouseError {
    #[error("{0}")]
    ValidationError(String),
    #[error("Failed to insert warehouse")]
    InsertError(#[from] WarehouseInsertError),
    #[error("Failed due to internal server error")]
    UnexpectedError(#[from] anyhow::Error),
}

impl Debug for PostWarehouseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

impl ResponseError for PostWarehouseError {
    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        match self {
            PostWarehouseError::ValidationError(_) => {
                HttpResponse::BadRequest().body(format!("{}", self))
            }
            _ => HttpResponse::InternalServerError().body(format!("{}", self)),
        }
    }
}

#[tracing::instrument("Creating warehouse", skip(pool))]
pub async fn post_warehouse(
    pool: web::Data<DbPool>,
    form: web::Form<WarehouseForm>,
    _: IsEmployee,
) -> Result<HttpResponse, PostWarehouseError> {
    if form.name.trim().is_empty() {
        return Err(PostWarehouseError::ValidationError(
            "Name is required".to_string(),
        ));
    }

    if form.address.trim().is_empty() {
        return Err(PostWarehouseError::ValidationError(
            "Address is required".to_string(),
        ));
    }

    let warehouse = Warehouse {
        warehouse_id: Uuid::new_v4(),
        name: form.name.clone(),
        address: form.address.clone(),
        created_at: Utc::now(),
    };

    let warehouse_id = warehouse.warehouse_id;

    let conn = get_pooled_connection(&pool)
        .await
        .context("Failed to get connection from pool")?;

    insert_warehouse(conn, warehouse).await?;

    Ok(HttpResponse::Ok().json(warehouse_id))
}
