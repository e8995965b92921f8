pub mod base_uri;
pub mod error;
pub mod handlers;
pub mod routes;

pub use base_uri::*;
pub use handlers::*;
pub use routes::*;
