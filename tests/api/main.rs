mod health_check;
mod login;
mod product;
mod registration;
mod request;
