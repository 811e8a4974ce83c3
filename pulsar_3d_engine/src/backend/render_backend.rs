//! RenderBackend trait - the command executor contract
//!
//! A backend receives each replayed command as one method call. The core
//! supplies the dispatch mechanism (see `command::dispatch`); the backend
//! supplies the implementations.

use std::sync::{Arc, Mutex};
use std::collections::HashMap;

use crate::error::{Result, Error};
use crate::command::{ShaderStage, TextureHandle, RasterStateHandle, BlendStateHandle};
use crate::backend::StreamBufferHandle;

// ============================================================================
// Common types
// ============================================================================

/// Backend configuration
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Enable validation/debug layers
    pub enable_validation: bool,
    /// Application name
    pub app_name: String,
    /// Application version (major, minor, patch)
    pub app_version: (u32, u32, u32),
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            enable_validation: cfg!(debug_assertions),
            app_name: "Pulsar3D Application".to_string(),
            app_version: (1, 0, 0),
        }
    }
}

/// Backend statistics
#[derive(Debug, Clone, Copy, Default)]
pub struct BackendStats {
    /// Number of commands executed so far
    pub commands_executed: u64,
    /// Number of draw calls issued
    pub draw_calls: u32,
    /// Number of shader buffer binds issued
    pub buffer_binds: u32,
}

// ============================================================================
// RenderBackend trait
// ============================================================================

/// Command executor trait
///
/// One method per command type. Implemented by backend-specific executors
/// (e.g., HeadlessBackend). Replay order is the recording order; the
/// dispatch table guarantees it.
pub trait RenderBackend: Send + Sync {
    /// Human-readable backend name (e.g., "headless")
    fn name(&self) -> &str;

    /// Bind a streaming buffer range to a shader-visible slot
    ///
    /// # Arguments
    ///
    /// * `stage` - Consumer stage that reads the buffer
    /// * `slot` - Bind slot (manager-reserved slots below, material slots above)
    /// * `buffer` - Buffer handle minted by the buffer provider
    /// * `offset_bytes` - Start of the bound range
    /// * `size_bytes` - Length of the bound range
    fn bind_shader_buffer(
        &mut self,
        stage: ShaderStage,
        slot: u16,
        buffer: StreamBufferHandle,
        offset_bytes: u32,
        size_bytes: u32,
    ) -> Result<()>;

    /// Bind a texture to a texture unit
    fn bind_texture(&mut self, unit: u16, texture: TextureHandle) -> Result<()>;

    /// Unbind every texture unit from `unit` upward
    fn disable_textures_from(&mut self, unit: u16) -> Result<()>;

    /// Switch the active rasterizer state block
    fn set_raster_state(&mut self, state: RasterStateHandle) -> Result<()>;

    /// Switch the active blend state block
    fn set_blend_state(&mut self, state: BlendStateHandle) -> Result<()>;

    /// Issue a non-indexed draw
    fn draw(&mut self, vertex_count: u32, first_vertex: u32) -> Result<()>;

    /// Issue an indexed draw
    fn draw_indexed(&mut self, index_count: u32, first_index: u32, vertex_offset: i32) -> Result<()>;

    /// Get statistics about the backend
    fn stats(&self) -> BackendStats;
}

// ============================================================================
// Plugin system for registering backend implementations
// ============================================================================

/// Backend plugin factory function type
type BackendPluginFactory = Box<dyn Fn(BackendConfig) -> Result<Arc<Mutex<dyn RenderBackend>>> + Send + Sync>;

/// Plugin registry for render backends
pub struct BackendPluginRegistry {
    plugins: HashMap<&'static str, BackendPluginFactory>,
}

impl BackendPluginRegistry {
    /// Create a new plugin registry
    fn new() -> Self {
        Self {
            plugins: HashMap::new(),
        }
    }

    /// Register a plugin
    ///
    /// # Arguments
    ///
    /// * `name` - Plugin name (e.g., "headless")
    /// * `factory` - Factory function to create the plugin
    pub fn register_plugin<F>(&mut self, name: &'static str, factory: F)
    where
        F: Fn(BackendConfig) -> Result<Arc<Mutex<dyn RenderBackend>>> + Send + Sync + 'static,
    {
        self.plugins.insert(name, Box::new(factory));
    }

    /// Create a backend using a registered plugin
    ///
    /// # Arguments
    ///
    /// * `plugin_name` - Name of the plugin to use
    /// * `config` - Backend configuration
    ///
    /// # Returns
    ///
    /// A shared, thread-safe backend instance
    pub fn create_backend(&self, plugin_name: &str, config: BackendConfig) -> Result<Arc<Mutex<dyn RenderBackend>>> {
        self.plugins
            .get(plugin_name)
            .ok_or_else(|| Error::InitializationFailed(format!("Plugin '{}' not found", plugin_name)))?
            (config)
    }
}

static BACKEND_REGISTRY: Mutex<Option<BackendPluginRegistry>> = Mutex::new(None);

/// Get the global backend plugin registry
pub fn backend_plugin_registry() -> &'static Mutex<Option<BackendPluginRegistry>> {
    // Initialize on first access
    let mut registry = BACKEND_REGISTRY.lock().unwrap();
    if registry.is_none() {
        *registry = Some(BackendPluginRegistry::new());
    }
    drop(registry);
    &BACKEND_REGISTRY
}

/// Register a backend plugin in the global registry
///
/// # Arguments
///
/// * `name` - Plugin name
/// * `factory` - Factory function
pub fn register_backend_plugin<F>(name: &'static str, factory: F)
where
    F: Fn(BackendConfig) -> Result<Arc<Mutex<dyn RenderBackend>>> + Send + Sync + 'static,
{
    backend_plugin_registry()
        .lock()
        .unwrap()
        .as_mut()
        .unwrap()
        .register_plugin(name, factory);
}
