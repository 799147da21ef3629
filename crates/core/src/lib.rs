//! Domain primitives shared by the database and API crates.
//!
//! Nothing in here touches the network or the database.

pub mod error;
pub mod pagination;
pub mod session;
pub mod types;
