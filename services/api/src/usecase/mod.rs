pub mod app;
pub mod auth;
pub mod item;
pub mod one_time_token;
pub mod password;
pub mod server;
pub mod token;
