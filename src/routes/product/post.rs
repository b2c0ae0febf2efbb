use std::{error::Error, fmt::Debug};

use actix_web::{web, HttpResponse, ResponseError};
use anyhow::Context;
use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    auth::extractors::IsEmployee,
    db_interaction::{get_user_by_id, insert_product, ProductInsertError},
    domain::{tracking::generate_upc, user_email::UserEmail},
    email_client::EmailClient,
    models::{Condition, Product, ProductStatus},
    utils::{error_fmt_chain, get_pooled_connection, DbPool},
};

#[derive(Deserialize, Debug)]
pub struct CheckInForm {
    customer_id: Uuid,
    warehouse_id: Uuid,
    name: String,
    upc: Option<String>,
    quantity: i32,
    condition: Condition,
    memo: Option<String>,
    return_flag: Option<bool>,
}

#[derive(Error)]
pub enum CheckInError {
    #[error("{0}")]
    ValidationError(String),
    #[error("customer doesn't exist")]
    UnknownCustomer,
    #[error("Failed to insert product")]
    InsertError(#[from] ProductInsertError),
    #[error("Failed due to internal server error")]
    UnexpectedError(#[from] anyhow::Error),
}

impl Debug for CheckInError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

impl ResponseError for CheckInError {
    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        match self {
            CheckInError::ValidationError(_) => HttpResponse::BadRequest().body(format!("{}", self)),
            CheckInError::UnknownCustomer => HttpResponse::NotFound().body(format!("{}", self)),
            _ => HttpResponse::InternalServerError().body(format!("{}", self)),
        }
    }
}

// Employee records a received lot as checked in, custodied for a customer.
// The UPC is taken from the label when supplied, generated otherwise.
#[tracing::instrument("Checking in product", skip(pool, email_client))]
pub async fn check_in_product(
    pool: web::Data<DbPool>,
    form: web::Form<CheckInForm>,
    email_client: web::Data<EmailClient>,
    _: IsEmployee,
) -> Result<HttpResponse, CheckInError> {
    if form.name.trim().is_empty() {
        return Err(CheckInError::ValidationError("Name is required".to_string()));
    }

    if form.quantity <= 0 {
        return Err(CheckInError::ValidationError(
            "Quantity must be positive".to_string(),
        ));
    }

    let conn = get_pooled_connection(&pool)
        .await
        .context("Failed to get connection from pool")?;

    let customer = get_user_by_id(conn, form.customer_id)
        .await?
        .ok_or(CheckInError::UnknownCustomer)?;

    let upc = match &form.upc {
        Some(upc) if !upc.trim().is_empty() => upc.clone(),
        _ => generate_upc(&mut rand::thread_rng()),
    };

    let product = Product {
        product_id: Uuid::new_v4(),
        name: form.name.clone(),
        upc: upc.clone(),
        quantity: form.quantity,
        status: ProductStatus::CheckedIn.as_str().to_string(),
        condition: form.condition.as_str().to_string(),
        memo: form.memo.clone(),
        return_flag: form.return_flag.unwrap_or(false),
        checked_in_time: Utc::now(),
        user_id: customer.user_id,
        warehouse_id: form.warehouse_id,
    };

    let product_id = product.product_id;

    let conn = get_pooled_connection(&pool)
        .await
        .context("Failed to get connection from pool")?;

    insert_product(conn, product).await?;

    // Best effort: a failed notification must not fail the check-in
    if let Ok(customer_email) = UserEmail::parse(customer.email) {
        let body = format!(
            "{} units of {} (UPC {}) have been checked in to the warehouse under your account.",
            form.quantity, form.name, upc
        );
        if let Err(e) = email_client
            .send_email(&customer_email, "Product Checked In", &body, &body)
            .await
        {
            tracing::error!("Failed to send check-in notification: {:?}", e);
        }
    }

    Ok(HttpResponse::Ok().json(product_id))
}
