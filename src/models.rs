use chrono::{DateTime, Utc};
use diesel::prelude::{Insertable, Queryable};
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::schema::checkout_requests;
use crate::schema::confirmation;
use crate::schema::products;
use crate::schema::users;
use crate::schema::warehouses;

// Role of a registered user, stored as text in the users table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Employee,
    Customer,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Employee => "employee",
            UserRole::Customer => "customer",
        }
    }

    pub fn parse(role: &str) -> Result<UserRole, String> {
        match role {
            "employee" => Ok(UserRole::Employee),
            "customer" => Ok(UserRole::Customer),
            other => Err(format!("{} is not a valid user role", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductStatus {
    NotCheckedIn,
    CheckedIn,
    Pending,
    CheckedOut,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::NotCheckedIn => "NOT_CHECKED_IN",
            ProductStatus::CheckedIn => "CHECKED_IN",
            ProductStatus::Pending => "PENDING",
            ProductStatus::CheckedOut => "CHECKED_OUT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Condition {
    New,
    Used,
    Damaged,
}

impl Condition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::New => "NEW",
            Condition::Used => "USED",
            Condition::Damaged => "DAMAGED",
        }
    }
}

// Lifecycle of a checkout request. PENDING is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckoutStatus {
    Pending,
    CheckedOut,
    Cancelled,
}

impl CheckoutStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutStatus::Pending => "PENDING",
            CheckoutStatus::CheckedOut => "CHECKED_OUT",
            CheckoutStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(status: &str) -> Result<CheckoutStatus, String> {
        match status {
            "PENDING" => Ok(CheckoutStatus::Pending),
            "CHECKED_OUT" => Ok(CheckoutStatus::CheckedOut),
            "CANCELLED" => Ok(CheckoutStatus::Cancelled),
            other => Err(format!("{} is not a valid checkout status", other)),
        }
    }
}

#[derive(Queryable, Insertable, Clone)]
#[diesel(table_name = users)]
pub struct User {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub is_active: bool,
    pub phone_number: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Queryable, Insertable, Serialize, Deserialize)]
#[diesel(table_name = users)]
pub struct UserProfileInfo {
    pub name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
}

#[derive(Queryable, Insertable)]
#[diesel(table_name = confirmation)]
pub struct ConfirmationMap {
    pub confirmation_id: Uuid,
    pub user_id: Option<Uuid>,
}

#[derive(Queryable, Insertable, Serialize, Deserialize)]
#[diesel(table_name = warehouses)]
pub struct Warehouse {
    pub warehouse_id: Uuid,
    pub name: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Queryable, Insertable, Serialize, Deserialize, Clone)]
#[diesel(table_name = products)]
pub struct Product {
    pub product_id: Uuid,
    pub name: String,
    pub upc: String,
    pub quantity: i32,
    pub status: String,
    pub condition: String,
    pub memo: Option<String>,
    pub return_flag: bool,
    pub checked_in_time: DateTime<Utc>,
    pub user_id: Uuid,
    pub warehouse_id: Uuid,
}

#[derive(Queryable, Insertable, Clone)]
#[diesel(table_name = checkout_requests)]
pub struct CheckoutRequest {
    pub request_id: Uuid,
    pub status: String,
    pub quantity: i32,
    pub tracking_id: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address1: String,
    pub customer_address2: Option<String>,
    pub customer_city: String,
    pub customer_state: String,
    pub customer_zip: String,
    pub file_name: Option<String>,
    pub file_blob: Option<Vec<u8>>,
    pub product_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
