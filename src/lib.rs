pub mod api;
pub mod auth;
pub mod db;
pub mod mcp;
pub mod serde_utils;
pub mod service;
