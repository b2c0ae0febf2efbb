use std::{error::Error, fmt::Debug};

use actix_web::{web, HttpResponse, ResponseError};
use anyhow::Context;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    auth::extractors::IsUser,
    db_interaction::{cancel_request_and_release_stock, get_user_by_id, CancelRequestError},
    domain::user_email::UserEmail,
    email_client::EmailClient,
    utils::{error_fmt_chain, get_pooled_connection, DbPool},
};

#[derive(Deserialize, Debug)]
pub struct CancelRequestForm {
    pub request_id: Uuid,
}

#[derive(Error)]
pub enum CancelError {
    #[error("request doesn't exist")]
    NotFound,
    #[error("request already processed")]
    AlreadyProcessed,
    #[error("request already cancelled")]
    AlreadyCancelled,
    #[error("Failed due to internal server error")]
    UnexpectedError(#[from] anyhow::Error),
}

impl Debug for CancelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

impl ResponseError for CancelError {
    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        match self {
            CancelError::NotFound => HttpResponse::NotFound().body(format!("{}", self)),
            CancelError::AlreadyProcessed | CancelError::AlreadyCancelled => {
                HttpResponse::Conflict().body(format!("{}", self))
            }
            CancelError::UnexpectedError(_) => {
                HttpResponse::InternalServerError().body(format!("{}", self))
            }
        }
    }
}

// Customer withdraws a pending request; the reserved units go back to the
// product's availability in the same transaction. Fulfilled requests can't
// be cancelled.
#[tracing::instrument("Cancelling checkout request", skip(pool, email_client, uid))]
pub async fn post_cancel_request(
    pool: web::Data<DbPool>,
    form: web::Form<CancelRequestForm>,
    email_client: web::Data<EmailClient>,
    uid: IsUser,
) -> Result<HttpResponse, CancelError> {
    let customer_id = uid.0;

    let conn = get_pooled_connection(&pool)
        .await
        .context("Failed to get connection from pool")?;

    let cancelled = cancel_request_and_release_stock(conn, form.request_id, customer_id)
        .await
        .map_err(|e| match e {
            CancelRequestError::NotFound(_) => CancelError::NotFound,
            CancelRequestError::AlreadyProcessed => CancelError::AlreadyProcessed,
            CancelRequestError::AlreadyCancelled => CancelError::AlreadyCancelled,
            other => CancelError::UnexpectedError(other.into()),
        })?;

    notify_cancelled(&pool, &email_client, customer_id, &cancelled.product_name, &cancelled.product_upc)
        .await;

    Ok(HttpResponse::Ok().body("Request cancelled"))
}

async fn notify_cancelled(
    pool: &web::Data<DbPool>,
    email_client: &EmailClient,
    customer_id: Uuid,
    product_name: &str,
    product_upc: &str,
) {
    let customer_email = match get_pooled_connection(pool).await {
        Ok(conn) => get_user_by_id(conn, customer_id)
            .await
            .ok()
            .flatten()
            .and_then(|u| UserEmail::parse(u.email).ok()),
        Err(_) => None,
    };

    if let Some(email) = customer_email {
        let body = format!(
            "Your request for {} with UPC {} has been cancelled.",
            product_name, product_upc
        );
        if let Err(e) = email_client
            .send_email(&email, "Request Cancelled", &body, &body)
            .await
        {
            tracing::error!("Failed to send cancellation notification: {:?}", e);
        }
    }
}
