pub mod apps;
pub mod items;
pub mod one_time_tokens;
pub mod servers;
pub mod users;
