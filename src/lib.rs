//! Backend for a real-estate dashboard: price estimation from a pre-trained
//! pipeline, sector analysis, and similarity-based property recommendations.

pub mod api;
pub mod artifacts;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
