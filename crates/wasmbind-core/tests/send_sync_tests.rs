//! Tests to verify that the public types can cross thread boundaries.

use wasmbind_core::*;

const fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn test_model_types_are_send_sync() {
    assert_send_sync::<Package>();
    assert_send_sync::<PackageName>();
    assert_send_sync::<TypeDecl>();
    assert_send_sync::<FunctionDecl>();
    assert_send_sync::<TypeRef>();
}

#[test]
fn test_config_and_diagnostics_are_send_sync() {
    assert_send_sync::<BindgenConfig>();
    assert_send_sync::<Diagnostic>();
}

#[test]
fn test_error_is_send_sync() {
    assert_send_sync::<Error>();
}
