use super::*;
use crate::error::Error;

// ============================================================================
// MockBackend tests
// ============================================================================

#[test]
fn test_backend_journals_in_order() {
    let mut backend = MockBackend::new();

    backend.bind_texture(0, TextureHandle(1)).unwrap();
    backend.disable_textures_from(1).unwrap();
    backend.draw(3, 0).unwrap();

    assert_eq!(backend.journal, vec![
        "bind_texture unit=0 texture=TextureHandle(1)".to_string(),
        "disable_textures_from unit=1".to_string(),
        "draw count=3 first=0".to_string(),
    ]);
}

#[test]
fn test_backend_stats_accumulate() {
    let mut backend = MockBackend::new();

    backend.draw(3, 0).unwrap();
    backend.draw_indexed(6, 0, 0).unwrap();
    backend
        .bind_shader_buffer(ShaderStage::Vertex, 0, StreamBufferHandle::default(), 0, 64)
        .unwrap();

    let stats = backend.stats();
    assert_eq!(stats.commands_executed, 3);
    assert_eq!(stats.draw_calls, 2);
    assert_eq!(stats.buffer_binds, 1);
}

#[test]
fn test_take_journal_drains() {
    let mut backend = MockBackend::new();
    backend.draw(3, 0).unwrap();

    let journal = backend.take_journal();
    assert_eq!(journal.len(), 1);
    assert!(backend.journal.is_empty());
}

// ============================================================================
// MockBufferProvider tests
// ============================================================================

#[test]
fn test_create_respects_limits() {
    let mut provider = MockBufferProvider::new();

    let handle = provider.create(64, StreamBufferUsage::Constant).unwrap();
    assert_eq!(provider.buffer_usage(handle), Some(StreamBufferUsage::Constant));
    assert_eq!(provider.buffer_count(), 1);

    let result = provider.create(65, StreamBufferUsage::Constant);
    match result {
        Err(Error::CapacityExceeded(_)) => {}
        other => panic!("expected CapacityExceeded, got {:?}", other),
    }
}

#[test]
fn test_map_write_unmap_round_trip() {
    let mut provider = MockBufferProvider::new();
    let handle = provider.create(64, StreamBufferUsage::Constant).unwrap();

    let ptr = provider.map(handle, 16, 32).unwrap();
    assert!(provider.is_mapped(handle));

    unsafe {
        std::ptr::copy_nonoverlapping([9u8, 8, 7, 6].as_ptr(), ptr.as_ptr(), 4);
    }

    provider.unmap(handle, UnmapMode::KeepPersistent, 0..4).unwrap();
    assert!(!provider.is_mapped(handle));

    // Flushed range is absolute within the buffer
    assert_eq!(provider.flushed, vec![(handle, 16..20)]);
    assert_eq!(&provider.buffer_contents(handle).unwrap()[16..20], &[9, 8, 7, 6]);
}

#[test]
fn test_double_map_fails() {
    let mut provider = MockBufferProvider::new();
    let handle = provider.create(64, StreamBufferUsage::Constant).unwrap();

    provider.map(handle, 0, 64).unwrap();
    let result = provider.map(handle, 0, 16);
    match result {
        Err(Error::InvalidResource(_)) => {}
        Err(other) => panic!("expected InvalidResource, got {:?}", other),
        Ok(_) => panic!("expected InvalidResource, got a mapping"),
    }
}

#[test]
fn test_map_out_of_range_fails() {
    let mut provider = MockBufferProvider::new();
    let handle = provider.create(64, StreamBufferUsage::Constant).unwrap();

    match provider.map(handle, 32, 64) {
        Err(Error::InvalidResource(_)) => {}
        Err(other) => panic!("expected InvalidResource, got {:?}", other),
        Ok(_) => panic!("expected InvalidResource, got a mapping"),
    }
}

#[test]
fn test_destroy_while_mapped_fails() {
    let mut provider = MockBufferProvider::new();
    let handle = provider.create(64, StreamBufferUsage::Constant).unwrap();
    provider.map(handle, 0, 64).unwrap();

    match provider.destroy(handle) {
        Err(Error::InvalidResource(_)) => {}
        other => panic!("expected InvalidResource, got {:?}", other),
    }

    provider.unmap(handle, UnmapMode::UnmapAll, 0..0).unwrap();
    provider.destroy(handle).unwrap();
    assert_eq!(provider.buffer_count(), 0);
}

#[test]
fn test_operations_on_unknown_handle_fail() {
    let mut provider = MockBufferProvider::new();

    assert!(provider.destroy(StreamBufferHandle::default()).is_err());
    assert!(provider.map(StreamBufferHandle::default(), 0, 1).is_err());
    assert!(provider
        .unmap(StreamBufferHandle::default(), UnmapMode::KeepPersistent, 0..0)
        .is_err());
}

#[test]
fn test_limits_are_reported() {
    let provider = MockBufferProvider::new();
    let limits = provider.limits();

    assert_eq!(limits.max_constant_buffer_size, 64);
    assert_eq!(limits.max_texture_buffer_size, 256);
    assert_eq!(limits.texture_buffer_alignment, 16);
}
