pub mod connector;
pub mod postgresql;
pub mod schema_gen;
pub mod script;
pub mod sqlite;

pub use connector::*;
pub use postgresql::*;
pub use schema_gen::*;
pub use script::*;
pub use sqlite::*;
