pub mod api;
pub mod auth;
pub mod export;
pub mod pdf;
