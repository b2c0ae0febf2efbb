pub mod nested_text;
pub mod phone_number;
pub mod tracking;
pub mod user_email;
