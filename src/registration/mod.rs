//! Student registration core: field validation and the write path.

mod service;
mod validator;

pub use service::*;
pub use validator::*;
