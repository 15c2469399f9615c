pub mod config;
pub mod errors;
pub mod handlers;
pub mod locations;
pub mod log;
pub mod routes;
pub mod server;
pub mod session;
pub mod storage;
pub mod vfs;
pub mod wm;
