//! Event lifecycle: ports, validation and the event service

pub mod ports;
pub mod service;
pub mod validation;

pub use service::EventService;
