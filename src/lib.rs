pub mod client_state;
pub mod config;
pub mod error;
pub mod extract;
pub mod format;
pub mod matching;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod storage;
