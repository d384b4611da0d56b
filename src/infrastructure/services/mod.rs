//! Infrastructure services

mod dispatch_service;
mod health_probe;
mod plugin_instance;

pub use dispatch_service::{DispatchService, Dispatched};
pub use health_probe::{HealthProbe, ProbeTarget};
pub use plugin_instance::PluginInstance;
