// src/models/mod.rs

pub mod quiz;
pub mod result;
pub mod stats;
pub mod user;
