pub mod cli;
pub mod configuration;
pub mod connectors;
pub mod console;
pub mod forms;
pub mod helpers;
pub mod models;
pub mod services;
pub mod telemetry;
