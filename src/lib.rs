//! Controllable periodic worker ("beep" service) library

pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod worker;

pub use config::schema::ServiceConfig;
pub use lifecycle::{ServiceHost, Shutdown};
pub use worker::LifecycleController;
