mod helpers;

mod auth_test;
mod one_time_token_test;
