/*!
# Pulsar 3D Engine - Headless Renderer Backend

Headless (CPU-memory) implementation of the Pulsar3D backend contracts.

This crate provides a backend that executes command streams against plain
host state and backs streaming buffers with host memory. It is used by
integration tests and by tools that replay command streams without a GPU
(command capture, regression diffing, CI).

The backend is registered as a plugin and can be selected at runtime.
*/

// Headless implementation modules
mod headless;
mod headless_buffers;

pub use headless::HeadlessBackend;
pub use headless_buffers::{HeadlessBufferProvider, HEADLESS_LIMITS};

use pulsar_3d_engine::pulsar3d::backend::register_backend_plugin;

/// Register the headless backend with the plugin system
///
/// # Example
///
/// ```
/// use pulsar_3d_engine::pulsar3d::backend::{backend_plugin_registry, BackendConfig};
///
/// pulsar_3d_engine_renderer_headless::register();
///
/// let registry = backend_plugin_registry().lock().unwrap();
/// let backend = registry
///     .as_ref()
///     .unwrap()
///     .create_backend("headless", BackendConfig::default())
///     .unwrap();
/// assert_eq!(backend.lock().unwrap().name(), "headless");
/// ```
pub fn register() {
    register_backend_plugin("headless", |_config| {
        Ok(std::sync::Arc::new(std::sync::Mutex::new(HeadlessBackend::new()))
            as std::sync::Arc<std::sync::Mutex<dyn pulsar_3d_engine::pulsar3d::RenderBackend>>)
    });
}
