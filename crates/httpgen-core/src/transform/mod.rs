pub mod body;
pub mod environment;
pub mod naming;
pub mod params;
pub mod policy;
pub mod request;
pub mod security;
pub mod spec_to_http;

pub use environment::EnvironmentBuilder;
pub use request::RequestAssembler;
pub use security::SecurityResolver;
pub use spec_to_http::{GenerateOptions, generate, generate_with_options, generate_with_sampler};
