//! Ports: the application layer's view of the outside world.

pub mod llm_gateway;
pub mod observer;
pub mod session_store;
pub mod tool_executor;
