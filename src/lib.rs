pub mod config;
pub mod database;
pub mod enrollment;
pub mod error;
pub mod handlers;
pub mod state;
