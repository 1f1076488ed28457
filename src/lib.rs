// Library root: exposes the store, adapter and server for the binary and
// for integration tests. The binary entry point is src/main.rs.

pub mod config;
pub mod draft;
pub mod error;
pub mod llm;
pub mod logger;
pub mod server;
pub mod social;
pub mod store;
