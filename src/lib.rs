//! Secretkeeper: a small web application with local and federated (Google)
//! login, in-memory sessions, and one protected per-user secret.

pub mod auth;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod settings;
pub mod views;
