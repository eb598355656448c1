// src/handlers.rs

pub mod dashboard;
