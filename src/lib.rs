// Infrastructure layer (shared components)
pub mod auth;
pub mod config;
pub mod error;

// Domain layer (request-to-message pipeline)
pub mod chat;
pub mod extract;
pub mod reload;
pub mod template;

// Application layer
pub mod server;
