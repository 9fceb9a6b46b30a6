pub mod compat;
pub mod config;
pub mod consumer;
pub mod database;
pub mod entity;
pub mod error;
pub mod keys;
pub mod models;
pub mod signals;
pub mod state;
pub mod utils;
