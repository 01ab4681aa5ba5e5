pub mod api;
pub mod bootstrap;
pub mod config;
pub mod database;
pub mod domain;
pub mod models;
pub mod providers;
pub mod services;
pub mod workers;

pub use api::*;
pub use config::*;
pub use database::*;
pub use models::*;
pub use services::*;
