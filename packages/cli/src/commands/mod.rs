pub mod compile;
pub mod inspect;

pub use compile::{compile, CompileArgs};
pub use inspect::{inspect, InspectArgs};
