pub mod error;
pub mod filesystem;
pub mod loader;
pub mod result;
pub mod visitor;

pub use error::*;
pub use filesystem::*;
pub use loader::*;
pub use result::*;
pub use visitor::*;
