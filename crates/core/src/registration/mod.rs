//! Registration: membership rules and the coordinating service

pub mod rules;
pub mod service;

pub use service::RegistrationService;
