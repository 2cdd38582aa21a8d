//! Reporting: aggregate ports and the dashboard/analytics service

pub mod ports;
pub mod service;

pub use service::ReportingService;
