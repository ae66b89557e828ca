//! Domain layer: business rules, repository traits (the data access facade)
//! and ports to external services.
//!
//! The domain layer uses SDK contract types as its models and never imports
//! `api::*` or SeaORM.

pub mod error;
pub mod money;
pub mod ports;
pub mod repos;
pub mod service;
