use std::{error::Error, fmt::Debug};

use actix_web::{web, HttpResponse, ResponseError};
use anyhow::Context;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    auth::extractors::IsEmployee,
    db_interaction::{approve_request, ApproveRequestError},
    domain::user_email::UserEmail,
    email_client::EmailClient,
    utils::{error_fmt_chain, get_pooled_connection, DbPool},
};

#[derive(Deserialize, Debug)]
pub struct ApproveRequestForm {
    pub request_id: Uuid,
}

#[derive(Error)]
pub enum ApproveError {
    #[error("request doesn't exist")]
    NotFound,
    #[error("request is not pending")]
    NotPending,
    #[error("Failed due to internal server error")]
    UnexpectedError(#[from] anyhow::Error),
}

impl Debug for ApproveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

impl ResponseError for ApproveError {
    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        match self {
            ApproveError::NotFound => HttpResponse::NotFound().body(format!("{}", self)),
            ApproveError::NotPending => HttpResponse::Conflict().body(format!("{}", self)),
            ApproveError::UnexpectedError(_) => {
                HttpResponse::InternalServerError().body(format!("{}", self))
            }
        }
    }
}

// Employee fulfils a pending request. Stock stays where the reservation put
// it; only the status moves, and the shipped notification fires once.
#[tracing::instrument("Approving checkout request", skip(pool, email_client))]
pub async fn post_approve_request(
    pool: web::Data<DbPool>,
    form: web::Form<ApproveRequestForm>,
    email_client: web::Data<EmailClient>,
    _: IsEmployee,
) -> Result<HttpResponse, ApproveError> {
    let conn = get_pooled_connection(&pool)
        .await
        .context("Failed to get connection from pool")?;

    let approved = approve_request(conn, form.request_id)
        .await
        .map_err(|e| match e {
            ApproveRequestError::NotFound(_) => ApproveError::NotFound,
            ApproveRequestError::NotPending { .. } => ApproveError::NotPending,
            other => ApproveError::UnexpectedError(other.into()),
        })?;

    // Best effort: the transition is already committed
    if let Ok(customer_email) = UserEmail::parse(approved.customer_email.clone()) {
        let body = format!(
            "Your order for {} has been shipped. Tracking ID: {}",
            approved.product_name, approved.tracking_id
        );
        if let Err(e) = email_client
            .send_email(&customer_email, "Your order has been shipped", &body, &body)
            .await
        {
            tracing::error!("Failed to send shipped notification: {:?}", e);
        }
    }

    Ok(HttpResponse::Ok().finish())
}
