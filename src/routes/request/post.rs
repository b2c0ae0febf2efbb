use std::{error::Error, fmt::Debug};

use actix_multipart::form::{bytes::Bytes, text::Text, MultipartForm};
use actix_web::{web, HttpResponse, ResponseError};
use anyhow::Context;
use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    auth::extractors::IsUser,
    db_interaction::{
        create_request_and_reserve_stock, find_employee_email, get_user_by_id,
        CreateRequestError, LedgerError,
    },
    domain::{
        nested_text::find_reference_number, phone_number::PhoneNumberDomain,
        tracking::mock_tracking_id, user_email::UserEmail,
    },
    email_client::EmailClient,
    models::{CheckoutRequest, CheckoutStatus, UserRole},
    ocr_client::OcrClient,
    utils::{error_fmt_chain, get_pooled_connection, DbPool},
};

// Customer checkout submission: shipping details plus the uploaded label
#[derive(MultipartForm)]
pub struct CheckoutForm {
    pub product_id: Text<Uuid>,
    pub quantity: Text<i32>,
    pub customer_name: Text<String>,
    pub customer_phone: Text<String>,
    pub customer_address1: Text<String>,
    pub customer_address2: Option<Text<String>>,
    pub customer_city: Text<String>,
    pub customer_state: Text<String>,
    pub customer_zip: Text<String>,
    #[multipart(limit = "10MB")]
    pub file: Bytes,
}

#[derive(Error)]
pub enum PostRequestError {
    #[error("{field}: {message}")]
    ValidationError { field: String, message: String },
    #[error("product doesn't exist")]
    ProductNotFound,
    #[error("requested quantity exceeds available stock")]
    InsufficientStock,
    #[error("only customers can file checkout requests")]
    NotACustomer,
    #[error("unexpected error occured")]
    UnexpectedError(#[from] anyhow::Error),
}

impl Debug for PostRequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

impl ResponseError for PostRequestError {
    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        match self {
            PostRequestError::ValidationError { .. } | PostRequestError::InsufficientStock => {
                HttpResponse::BadRequest().body(format!("{}", self))
            }
            PostRequestError::ProductNotFound => HttpResponse::NotFound().body(format!("{}", self)),
            PostRequestError::NotACustomer => HttpResponse::Forbidden().body(format!("{}", self)),
            PostRequestError::UnexpectedError(_) => {
                HttpResponse::InternalServerError().body(format!("{}", self))
            }
        }
    }
}

fn validation_error(field: &str, message: &str) -> PostRequestError {
    PostRequestError::ValidationError {
        field: field.to_string(),
        message: message.to_string(),
    }
}

// Create a checkout request: resolve a tracking id from the uploaded label
// (OCR is best effort, synthetic fallback guarantees a non-null id), then
// insert the PENDING row and reserve stock in one transaction. Emails go
// out only after the transaction commits.
#[tracing::instrument(
    "Creating checkout request",
    skip(pool, form, email_client, ocr_client)
)]
pub async fn post_request(
    pool: web::Data<DbPool>,
    MultipartForm(form): MultipartForm<CheckoutForm>,
    email_client: web::Data<EmailClient>,
    ocr_client: web::Data<OcrClient>,
    uid: IsUser,
) -> Result<HttpResponse, PostRequestError> {
    let IsUser(customer_id, role) = uid;
    if role != UserRole::Customer {
        return Err(PostRequestError::NotACustomer);
    }

    let quantity = form.quantity.0;
    if quantity <= 0 {
        return Err(validation_error("quantity", "Quantity must be positive"));
    }

    if form.customer_name.trim().is_empty() {
        return Err(validation_error("customer_name", "Name is required"));
    }

    let phone = PhoneNumberDomain::parse(form.customer_phone.0.clone())
        .map_err(|e| validation_error("customer_phone", &e))?;

    if form.file.data.is_empty() {
        return Err(validation_error("file", "File is required"));
    }

    let file_name = form
        .file
        .file_name
        .clone()
        .unwrap_or_else(|| "label".to_string());

    let tracking_id = resolve_tracking_id(&ocr_client, &file_name, form.file.data.to_vec()).await;

    let request = CheckoutRequest {
        request_id: Uuid::new_v4(),
        status: CheckoutStatus::Pending.as_str().to_string(),
        quantity,
        tracking_id: tracking_id.clone(),
        customer_name: form.customer_name.0.clone(),
        customer_phone: phone.inner(),
        customer_address1: form.customer_address1.0,
        customer_address2: form.customer_address2.map(|t| t.0),
        customer_city: form.customer_city.0,
        customer_state: form.customer_state.0,
        customer_zip: form.customer_zip.0,
        file_name: Some(file_name),
        file_blob: Some(form.file.data.to_vec()),
        product_id: form.product_id.0,
        user_id: customer_id,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    let conn = get_pooled_connection(&pool)
        .await
        .context("Failed to get connection from pool")?;

    let created = create_request_and_reserve_stock(conn, request)
        .await
        .map_err(|e| match e {
            CreateRequestError::Ledger(LedgerError::InsufficientStock { .. }) => {
                PostRequestError::InsufficientStock
            }
            CreateRequestError::Ledger(LedgerError::UnknownProduct(_)) => {
                PostRequestError::ProductNotFound
            }
            CreateRequestError::Ledger(LedgerError::NonPositiveQuantity(_)) => {
                validation_error("quantity", "Quantity must be positive")
            }
            other => PostRequestError::UnexpectedError(other.into()),
        })?;

    notify_request_created(
        &pool,
        &email_client,
        customer_id,
        &form.customer_name.0,
        quantity,
        &created.product_upc,
    )
    .await;

    Ok(HttpResponse::Ok().json(created.request_id))
}

async fn resolve_tracking_id(
    ocr_client: &OcrClient,
    file_name: &str,
    content: Vec<u8>,
) -> String {
    let extracted = match ocr_client.parse_image(file_name.to_string(), content).await {
        Some(nested) => find_reference_number(&nested),
        None => None,
    };

    extracted.unwrap_or_else(|| mock_tracking_id(&mut rand::thread_rng()))
}

// Notify an employee and the requesting customer. Failures are logged and
// swallowed: the request row is already committed at this point.
async fn notify_request_created(
    pool: &web::Data<DbPool>,
    email_client: &EmailClient,
    customer_id: Uuid,
    customer_name: &str,
    quantity: i32,
    product_upc: &str,
) {
    let employee_email = match get_pooled_connection(pool).await {
        Ok(conn) => find_employee_email(conn).await.unwrap_or(None),
        Err(_) => None,
    };

    if let Some(email) = employee_email.and_then(|e| UserEmail::parse(e).ok()) {
        let body = format!(
            "A new check out request has been made by {} for {} units of product {}",
            customer_name, quantity, product_upc
        );
        if let Err(e) = email_client
            .send_email(&email, "New Check Out Request", &body, &body)
            .await
        {
            tracing::error!("Failed to notify employee of new request: {:?}", e);
        }
    } else {
        tracing::warn!("No employee found to notify of new checkout request");
    }

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
            "Your check out request for {} units of product {} has been received. \
             You will be notified once it is approved.",
            quantity, product_upc
        );
        if let Err(e) = email_client
            .send_email(&email, "Check Out Request", &body, &body)
            .await
        {
            tracing::error!("Failed to notify customer of new request: {:?}", e);
        }
    }
}
