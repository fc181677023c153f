// src/lib.rs
pub mod api;
pub mod backend;
pub mod banner;
pub mod config;
pub mod errors;
pub mod executor;
pub mod runner;
pub mod targets;
pub mod template;
pub mod workbench;
