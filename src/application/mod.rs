mod auth;
mod error;
mod reporting;
mod service;

pub use auth::*;
pub use error::*;
pub use reporting::*;
pub use service::*;
