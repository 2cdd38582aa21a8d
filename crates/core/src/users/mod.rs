//! User management: ports, password hashing and the user service

pub mod password;
pub mod ports;
pub mod service;

pub use service::UserService;
