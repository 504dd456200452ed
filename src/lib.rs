// Platform-neutral object model: listing, records, CRUD errors
pub mod object;

// Connector abstraction shared by the actions and OAuth layers
pub mod connector;

// OAuth2 clients, providers and code exchange
pub mod oauth;

// HTTP actions (OAuth start/callback, webhook reconciliation)
pub mod api;

// Browser sessions and flash messages
pub mod session;

// Encrypted per-webservice connector parameters
pub mod parameters;

// Configuration loading
pub mod config;
