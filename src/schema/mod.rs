pub mod dependencies;
pub mod loader;
pub mod types;

pub use dependencies::*;
pub use loader::*;
pub use types::*;
