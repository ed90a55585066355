pub mod colour;
pub mod config;
pub mod error;
pub mod live;
pub mod models;
pub mod routes;
pub mod state;
pub mod stats;
