//! Symbiosika Nodes: workflow nodes over the ephemeral stores.
//!
//! This crate contains:
//! - **base**: the `Node` trait, request/item types, and param helpers
//! - **registry**: name → node lookup and dispatch
//! - **chat_session**: the chat-session store node
//! - **key_value**: the key-value store node

pub mod base;
pub mod chat_session;
pub mod key_value;
pub mod registry;

pub use base::{Node, NodeItem, NodeRequest};
pub use chat_session::ChatSessionStoreNode;
pub use key_value::KeyValueStoreNode;
pub use registry::NodeRegistry;
