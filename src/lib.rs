pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod journey;
pub mod pipeline;
pub mod routes;
pub mod state;
pub mod types;
