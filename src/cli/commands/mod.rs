pub mod auth;
pub mod dashboard;
pub mod project;
pub mod seed;
pub mod server;
pub mod supply;
