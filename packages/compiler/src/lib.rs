mod compiler;
mod context;
mod error;
pub mod expr;
pub mod references;

pub use compiler::{generate, helper_name, Generator, HelperCollision};
pub use context::{CompileOptions, CompilerContext};
pub use error::{CompileError, CompileResult};
