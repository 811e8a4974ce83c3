use super::*;
use glam::{Mat4, Vec3};

#[test]
fn test_new_pass_is_identity() {
    let pass = PreparedPass::new();

    assert_eq!(*pass.view_projection(false), Mat4::IDENTITY);
    assert_eq!(*pass.view_projection(true), Mat4::IDENTITY);
    assert_eq!(pass.passes_prepared(), 0);
}

#[test]
fn test_prepare_combines_view_and_projection() {
    let mut pass = PreparedPass::new();
    let view = Mat4::from_translation(Vec3::new(0.0, 1.0, -10.0));
    let projection = Mat4::perspective_rh(1.2, 1.5, 0.1, 500.0);

    pass.prepare(view, projection);

    assert_eq!(*pass.view_projection(false), projection * view);
    // The identity-projection variant bypasses the projection entirely
    assert_eq!(*pass.view_projection(true), view);
    assert_eq!(pass.passes_prepared(), 1);
}

#[test]
fn test_prepare_invalidates_previous_pass() {
    let mut pass = PreparedPass::new();
    let shadow_view = Mat4::from_translation(Vec3::new(5.0, 5.0, 5.0));
    let main_view = Mat4::from_translation(Vec3::new(0.0, 0.0, -2.0));
    let projection = Mat4::perspective_rh(1.0, 1.0, 0.1, 100.0);

    pass.prepare(shadow_view, projection);
    let shadow_view_proj = *pass.view_projection(false);

    pass.prepare(main_view, projection);

    assert_ne!(*pass.view_projection(false), shadow_view_proj);
    assert_eq!(*pass.view_projection(false), projection * main_view);
    assert_eq!(pass.passes_prepared(), 2);
}
