pub mod error;
pub mod events;
pub mod lookup;
pub mod references;
pub mod render;

pub use error::*;
pub use events::*;
pub use lookup::*;
pub use references::*;
pub use render::*;
