mod approve;
mod cancel;
mod get;
mod post;

pub use approve::*;
pub use cancel::*;
pub use get::*;
pub use post::*;
