//! Backend for a personal period tracker: owner-scoped cycle records plus
//! the predictions and symptom statistics derived from them.

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod stats;
pub mod store;

pub use routes::app;
