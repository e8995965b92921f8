pub mod class;
pub mod common;
pub mod event;
pub mod instance;
pub mod resource;
pub mod schema;

pub use class::*;
pub use common::*;
pub use event::*;
pub use instance::*;
pub use resource::*;
pub use schema::*;
