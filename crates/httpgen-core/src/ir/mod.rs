pub mod environment;
pub mod request;
pub mod types;

pub use environment::*;
pub use request::*;
pub use types::*;
