pub mod config;
pub mod content;
pub mod db;
pub mod domain;
pub mod filter;
pub mod handlers;
pub mod session;
pub mod srs;
pub mod state;
pub mod validation;
