//! Tool subdomain: the canonical tool-calling vocabulary.
//!
//! Adapters translate backend-native call shapes into [`entities::ToolCall`];
//! the evidence toolkit answers with [`value_objects::ToolResult`].

pub mod entities;
pub mod value_objects;
