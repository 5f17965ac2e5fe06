pub mod api;
pub mod channel;
pub mod directory;

pub use api::*;
pub use channel::*;
pub use directory::*;
