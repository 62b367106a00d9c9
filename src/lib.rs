pub mod access;
pub mod auth;
pub mod bulletin;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod location;
pub mod middleware;
pub mod server;
pub mod services;
pub mod state;
