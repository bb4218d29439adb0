//! IPL ball-by-ball ingestion and batting analytics.
//!
//! Cricsheet match files are flattened into a delivery store by [`ingest`],
//! aggregated by [`repository`] and [`services`], and served read-only over
//! HTTP by [`server`].

pub mod cli;
pub mod config;
pub mod ingest;
pub mod models;
pub mod repository;
pub mod schema;
pub mod server;
pub mod services;
