// src/lib.rs

//! tube-indexer library
//!
//! Synchronizes the uploads of YouTube channels into Meilisearch indexes.

pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod utils;

#[cfg(test)]
mod testing;
