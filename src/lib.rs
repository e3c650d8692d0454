// Supporting modules
pub mod config;
pub mod error;

// Domain layer (template engine)
pub mod template;

// Application layer
pub mod api;
pub mod server;
