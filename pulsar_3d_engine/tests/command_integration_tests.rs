//! Integration tests for the command buffer workflow with the headless
//! backend
//!
//! These tests verify the complete record/patch/execute cycle against a
//! real backend implementation instead of the in-crate mocks.

use pulsar_3d_engine::pulsar3d::Engine;
use pulsar_3d_engine::pulsar3d::backend::{BufferProvider, RenderBackend, StreamBufferUsage};
use pulsar_3d_engine::pulsar3d::command::{
    Command, CommandBuffer, RasterStateHandle, ShaderStage, TextureHandle,
};
use pulsar_3d_engine_renderer_headless::{HeadlessBackend, HeadlessBufferProvider};
use serial_test::serial;

// ============================================================================
// COMMAND WORKFLOW TESTS
// ============================================================================

#[test]
fn test_integration_record_and_execute_mixed_stream() {
    let mut backend = HeadlessBackend::new();
    let mut provider = HeadlessBufferProvider::new();
    let buffer = provider.create(1024, StreamBufferUsage::Constant).unwrap();

    let mut cmds = CommandBuffer::new();
    cmds.add(Command::SetRasterState { state: RasterStateHandle(1) });
    cmds.add(Command::BindShaderBuffer {
        stage: ShaderStage::Vertex,
        slot: 2,
        buffer,
        offset_bytes: 0,
        size_bytes: 1024,
    });
    cmds.add(Command::BindTexture { unit: 0, texture: TextureHandle(7) });
    cmds.add(Command::DrawIndexed { index_count: 36, first_index: 0, vertex_offset: 0 });

    cmds.execute(&mut backend).unwrap();

    // Replay happened in recording order
    let journal = backend.take_journal();
    assert_eq!(journal.len(), 4);
    assert!(journal[0].starts_with("set_raster_state"));
    assert!(journal[1].starts_with("bind_shader_buffer"));
    assert!(journal[2].starts_with("bind_texture"));
    assert!(journal[3].starts_with("draw_indexed"));

    // The buffer is consumed
    assert!(cmds.is_empty());

    // The shadow state reflects the stream
    assert_eq!(backend.bound_buffer(ShaderStage::Vertex, 2).unwrap().buffer, buffer);
    assert_eq!(backend.bound_texture(0), Some(TextureHandle(7)));
    assert_eq!(backend.current_raster_state(), Some(RasterStateHandle(1)));
    assert_eq!(backend.stats().draw_calls, 1);
}

#[test]
fn test_integration_patched_bind_reaches_backend() {
    let mut backend = HeadlessBackend::new();
    let mut provider = HeadlessBufferProvider::new();
    let buffer = provider.create(4096, StreamBufferUsage::Texture).unwrap();

    let mut cmds = CommandBuffer::new();

    // Open the bind with a placeholder size
    let open = cmds.add(Command::BindShaderBuffer {
        stage: ShaderStage::Vertex,
        slot: 0,
        buffer,
        offset_bytes: 0,
        size_bytes: 0,
    });
    cmds.add(Command::Draw { vertex_count: 3, first_vertex: 0 });

    // Close it once the true size is known
    match cmds.command_at_mut(open) {
        Some(Command::BindShaderBuffer { size_bytes, .. }) => *size_bytes = 192,
        other => panic!("expected a shader buffer bind, got {:?}", other),
    }

    cmds.execute(&mut backend).unwrap();

    assert_eq!(backend.bound_buffer(ShaderStage::Vertex, 0).unwrap().size_bytes, 192);
}

#[test]
fn test_integration_cleared_buffer_executes_nothing() {
    let mut backend = HeadlessBackend::new();

    let mut cmds = CommandBuffer::new();
    cmds.add(Command::Draw { vertex_count: 3, first_vertex: 0 });
    cmds.clear();

    cmds.execute(&mut backend).unwrap();

    assert!(backend.journal().is_empty());
    assert_eq!(backend.stats().draw_calls, 0);
}

// ============================================================================
// ENGINE SINGLETON TESTS
// ============================================================================

#[test]
#[serial]
fn test_integration_execute_through_engine_singleton() {
    Engine::initialize().unwrap();
    Engine::create_backend(HeadlessBackend::new()).unwrap();

    let mut cmds = CommandBuffer::new();
    cmds.add(Command::BindTexture { unit: 3, texture: TextureHandle(12) });
    cmds.add(Command::Draw { vertex_count: 6, first_vertex: 0 });

    {
        let backend = Engine::backend().unwrap();
        let mut guard = backend.lock().unwrap();
        cmds.execute(&mut *guard).unwrap();
        assert_eq!(guard.stats().draw_calls, 1);
        assert_eq!(guard.name(), "headless");
    }

    Engine::destroy_backend().unwrap();
}

#[test]
#[serial]
fn test_integration_registry_plugin_round_trip() {
    pulsar_3d_engine_renderer_headless::register();

    let registry = pulsar_3d_engine::pulsar3d::backend::backend_plugin_registry()
        .lock()
        .unwrap();
    let backend = registry
        .as_ref()
        .unwrap()
        .create_backend(
            "headless",
            pulsar_3d_engine::pulsar3d::backend::BackendConfig::default(),
        )
        .unwrap();
    drop(registry);

    let mut cmds = CommandBuffer::new();
    cmds.add(Command::Draw { vertex_count: 3, first_vertex: 0 });

    let mut guard = backend.lock().unwrap();
    cmds.execute(&mut *guard).unwrap();
    assert_eq!(guard.stats().draw_calls, 1);
}
