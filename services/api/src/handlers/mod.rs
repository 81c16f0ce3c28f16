pub mod app;
pub mod auth;
pub mod extract;
pub mod health;
pub mod item;
pub mod one_time_token;
pub mod server;
