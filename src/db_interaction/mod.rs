mod ledger;
mod product;
mod request;
mod user;
mod warehouse;

pub use ledger::*;
pub use product::*;
pub use request::*;
pub use user::*;
pub use warehouse::*;
