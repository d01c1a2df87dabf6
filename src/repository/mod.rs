// src/repository/mod.rs

//! Database access. Each function takes the pool and returns domain models.

pub mod quiz;
pub mod result;
pub mod stats;
pub mod user;
