// src/lib.rs

pub mod client;
pub mod config;
pub mod docs;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod routes;
pub mod seed;
pub mod services;
pub mod state;
pub mod utils;

pub use routes::create_router;
