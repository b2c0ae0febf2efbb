use std::{error::Error, fmt::Debug};

use anyhow::Context;
use chrono::Utc;
use diesel::prelude::Queryable;
use diesel::{
    Connection, ExpressionMethods, JoinOnDsl, OptionalExtension, QueryDsl, RunQueryDsl,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    db_interaction::ledger::{self, LedgerError},
    models::{CheckoutRequest, CheckoutStatus},
    schema::{checkout_requests, products, users},
    telemetry::spawn_blocking_with_tracing,
    utils::{error_fmt_chain, DbConnection},
};

// Summary handed back to the create handler for the notification emails
pub struct CreatedRequest {
    pub request_id: Uuid,
    pub product_name: String,
    pub product_upc: String,
    pub remaining_quantity: i32,
}

pub struct ApprovedRequest {
    pub request_id: Uuid,
    pub tracking_id: String,
    pub product_name: String,
    pub customer_email: String,
}

pub struct CancelledRequest {
    pub request_id: Uuid,
    pub quantity: i32,
    pub product_name: String,
    pub product_upc: String,
}

// Error associated with creating a checkout request and reserving stock
#[derive(Error)]
pub enum CreateRequestError {
    #[error("Tokio threadpool error occured")]
    ThreadpoolError(#[from] tokio::task::JoinError),
    #[error("Failed to reserve stock")]
    Ledger(#[from] LedgerError),
    #[error("Failed to run query")]
    RunQueryError(#[from] diesel::result::Error),
}

impl Debug for CreateRequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

// Insert the PENDING request row and reserve its units as one transaction.
// Either both halves commit or neither does; an insufficient-stock ledger
// error rolls the whole thing back untouched.
#[tracing::instrument(
    "Creating checkout request and reserving stock",
    skip(conn, request)
)]
pub async fn create_request_and_reserve_stock(
    mut conn: DbConnection,
    request: CheckoutRequest,
) -> Result<CreatedRequest, CreateRequestError> {
    let res = spawn_blocking_with_tracing(move || {
        conn.transaction::<CreatedRequest, CreateRequestError, _>(|conn| {
            ledger::reserve(conn, request.product_id, request.quantity)?;

            diesel::insert_into(checkout_requests::table)
                .values(&request)
                .execute(conn)?;

            let (product_name, product_upc, remaining_quantity) = products::table
                .filter(products::product_id.eq(request.product_id))
                .select((products::name, products::upc, products::quantity))
                .get_result::<(String, String, i32)>(conn)?;

            Ok(CreatedRequest {
                request_id: request.request_id,
                product_name,
                product_upc,
                remaining_quantity,
            })
        })
    })
    .await??;

    Ok(res)
}

// Error associated with approving a checkout request
#[derive(Error)]
pub enum ApproveRequestError {
    #[error("Tokio threadpool error occured")]
    ThreadpoolError(#[from] tokio::task::JoinError),
    #[error("Failed to run query")]
    RunQueryError(#[from] diesel::result::Error),
    #[error("request {0} doesn't exist")]
    NotFound(Uuid),
    #[error("request {request_id} is not pending (status: {status})")]
    NotPending { request_id: Uuid, status: String },
}

impl Debug for ApproveRequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

// PENDING -> CHECKED_OUT. The status guard in the update statement keeps the
// transition single-shot: a second approval affects zero rows and surfaces
// as a conflict instead of re-notifying the customer. Reserved units stay
// reserved, so availability does not move here.
#[tracing::instrument("Approving checkout request", skip(conn))]
pub async fn approve_request(
    mut conn: DbConnection,
    request_id: Uuid,
) -> Result<ApprovedRequest, ApproveRequestError> {
    let res = spawn_blocking_with_tracing(move || {
        conn.transaction::<ApprovedRequest, ApproveRequestError, _>(|conn| {
            let affected_rows =
                diesel::update(checkout_requests::table.filter(checkout_requests::request_id.eq(request_id)))
                    .set((
                        checkout_requests::status.eq(CheckoutStatus::CheckedOut.as_str()),
                        checkout_requests::updated_at.eq(Utc::now()),
                    ))
                    .filter(checkout_requests::status.eq(CheckoutStatus::Pending.as_str()))
                    .execute(conn)?;

            if affected_rows == 0 {
                let status = checkout_requests::table
                    .filter(checkout_requests::request_id.eq(request_id))
                    .select(checkout_requests::status)
                    .get_result::<String>(conn)
                    .optional()?;

                return match status {
                    Some(status) => Err(ApproveRequestError::NotPending { request_id, status }),
                    None => Err(ApproveRequestError::NotFound(request_id)),
                };
            }

            let (tracking_id, product_name, customer_email) = checkout_requests::table
                .inner_join(products::table.on(products::product_id.eq(checkout_requests::product_id)))
                .inner_join(users::table.on(users::user_id.eq(checkout_requests::user_id)))
                .filter(checkout_requests::request_id.eq(request_id))
                .select((
                    checkout_requests::tracking_id,
                    products::name,
                    users::email,
                ))
                .get_result::<(String, String, String)>(conn)?;

            Ok(ApprovedRequest {
                request_id,
                tracking_id,
                product_name,
                customer_email,
            })
        })
    })
    .await??;

    Ok(res)
}

// Error associated with cancelling a checkout request
#[derive(Error)]
pub enum CancelRequestError {
    #[error("Tokio threadpool error occured")]
    ThreadpoolError(#[from] tokio::task::JoinError),
    #[error("Failed to run query")]
    RunQueryError(#[from] diesel::result::Error),
    #[error("Failed to release stock")]
    Ledger(#[from] LedgerError),
    #[error("request {0} doesn't exist")]
    NotFound(Uuid),
    #[error("request already processed")]
    AlreadyProcessed,
    #[error("request already cancelled")]
    AlreadyCancelled,
}

impl Debug for CancelRequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

// PENDING -> CANCELLED, returning the reserved units to availability in the
// same transaction. The request row is locked first so the status check and
// the release cannot interleave with a concurrent approval.
#[tracing::instrument("Cancelling checkout request", skip(conn))]
pub async fn cancel_request_and_release_stock(
    mut conn: DbConnection,
    request_id: Uuid,
    customer_id: Uuid,
) -> Result<CancelledRequest, CancelRequestError> {
    let res = spawn_blocking_with_tracing(move || {
        conn.transaction::<CancelledRequest, CancelRequestError, _>(|conn| {
            let request = checkout_requests::table
                .filter(checkout_requests::request_id.eq(request_id))
                .filter(checkout_requests::user_id.eq(customer_id))
                .for_update()
                .get_result::<CheckoutRequest>(conn)
                .optional()?
                .ok_or(CancelRequestError::NotFound(request_id))?;

            match CheckoutStatus::parse(&request.status) {
                Ok(CheckoutStatus::CheckedOut) => return Err(CancelRequestError::AlreadyProcessed),
                Ok(CheckoutStatus::Cancelled) => return Err(CancelRequestError::AlreadyCancelled),
                Ok(CheckoutStatus::Pending) => {}
                Err(_) => return Err(CancelRequestError::NotFound(request_id)),
            }

            diesel::update(checkout_requests::table.filter(checkout_requests::request_id.eq(request_id)))
                .set((
                    checkout_requests::status.eq(CheckoutStatus::Cancelled.as_str()),
                    checkout_requests::updated_at.eq(Utc::now()),
                ))
                .execute(conn)?;

            ledger::release(conn, request.product_id, request.quantity)?;

            let (product_name, product_upc) = products::table
                .filter(products::product_id.eq(request.product_id))
                .select((products::name, products::upc))
                .get_result::<(String, String)>(conn)?;

            Ok(CancelledRequest {
                request_id,
                quantity: request.quantity,
                product_name,
                product_upc,
            })
        })
    })
    .await??;

    Ok(res)
}

// Row shape for request listings (file blob deliberately left out)
#[derive(Serialize, Deserialize, Queryable)]
pub struct RequestWithProduct {
    pub request_id: Uuid,
    pub status: String,
    pub quantity: i32,
    pub tracking_id: String,
    pub customer_name: String,
    pub created_at: chrono::DateTime<Utc>,
    pub updated_at: chrono::DateTime<Utc>,
    pub product_id: Uuid,
    pub product_name: String,
    pub product_upc: String,
}

// Employees see every request; customers only their own history
#[tracing::instrument("Listing checkout requests", skip(conn))]
pub async fn get_requests(
    mut conn: DbConnection,
    requester_id: Uuid,
    is_employee: bool,
    page: i64,
    limit: i64,
) -> Result<Vec<RequestWithProduct>, anyhow::Error> {
    let offset_value = (page - 1) * limit;

    let res = spawn_blocking_with_tracing(move || {
        let mut query = checkout_requests::table
            .inner_join(products::table.on(products::product_id.eq(checkout_requests::product_id)))
            .into_boxed();

        if !is_employee {
            query = query.filter(checkout_requests::user_id.eq(requester_id));
        }

        query
            .order(checkout_requests::updated_at.desc())
            .limit(limit)
            .offset(offset_value)
            .select((
                checkout_requests::request_id,
                checkout_requests::status,
                checkout_requests::quantity,
                checkout_requests::tracking_id,
                checkout_requests::customer_name,
                checkout_requests::created_at,
                checkout_requests::updated_at,
                checkout_requests::product_id,
                products::name,
                products::upc,
            ))
            .load::<RequestWithProduct>(&mut conn)
            .context("Failed to load checkout requests")
    })
    .await
    .context("Failed due to threadpool error")??;

    Ok(res)
}
