//! Model backend providers.

pub mod http_gateway;

pub use http_gateway::HttpLlmGateway;
