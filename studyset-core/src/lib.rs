pub mod codec;
pub mod editor;
pub mod errors;
pub mod filters;
pub mod import;
pub mod models;
pub mod overview;
pub mod repo;

pub use codec::*;
pub use editor::*;
pub use errors::*;
pub use filters::*;
pub use import::*;
pub use models::*;
pub use overview::*;
pub use repo::*;
