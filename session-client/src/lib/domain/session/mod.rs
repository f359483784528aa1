pub mod errors;
pub mod models;
pub mod observers;
pub mod ports;
pub mod service;
