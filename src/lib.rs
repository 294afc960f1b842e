pub mod batch;
pub mod cli;
pub mod error;
pub mod logging;
pub mod schema;
pub mod writer;

pub use cli::{Cli, Commands};
pub use error::{IdentifierRole, SchemaError, Violation};
