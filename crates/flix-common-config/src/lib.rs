//! Configuration types for Flix.
//!
//! A client's configuration (endpoint, connection options, middleware
//! stack and credentials) is resolved once, at construction, from
//! [`ClientOptions`] layered over the process-wide [`defaults`].

pub mod credentials;
pub mod defaults;
pub mod env;
pub mod loader;
pub mod types;

pub use credentials::*;
pub use env::*;
pub use loader::*;
pub use types::*;
