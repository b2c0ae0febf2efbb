pub mod authentication;
mod confirm;
mod health_check;
pub mod product;
pub mod profile;
pub mod request;
pub mod warehouse;

pub use confirm::*;
pub use health_check::*;
