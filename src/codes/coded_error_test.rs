use serial_test::serial;

use super::*;
use crate::debug_mode_overrides;
use crate::facility_overrides;
use crate::ComponentIdentity;

fn component(name: &str) -> ComponentIdentity {
    ComponentIdentity::new(name).expect("test component name")
}

#[test]
#[serial]
fn for_component_should_fall_back_to_compiled_in_facility() {
    let error = CodedError::for_component(&component("Acme.Unmapped"), 7, 0x0001, "boom").unwrap();

    assert_eq!(error.code().facility(), 7);
    assert_eq!(error.code().error_id(), 0x0001);
}

#[test]
#[serial]
fn for_component_should_use_the_deployed_override() {
    facility_overrides().add(component("Acme.Remapped"), 1200).unwrap();

    let error = CodedError::for_component(&component("Acme.Remapped"), 7, 0x0002, "boom").unwrap();

    assert_eq!(error.code().facility(), 1200);

    facility_overrides().remove(&component("Acme.Remapped")).unwrap();
}

#[test]
#[serial]
fn detailed_message_should_stay_terse_without_debug_mode() {
    let error = CodedError::for_component(&component("Acme.Quiet"), 7, 3, "disk offline").unwrap();

    assert_eq!(error.detailed_message(&component("Acme.Quiet")), "disk offline");
}

#[test]
#[serial]
fn detailed_message_should_append_code_and_cause_chain_in_debug_mode() {
    debug_mode_overrides().add(component("Acme.Verbose"), true).unwrap();

    let cause = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
    let error = CodedError::for_component(&component("Acme.Verbose"), 7, 3, "disk offline")
        .unwrap()
        .with_source(cause);

    let rendered = error.detailed_message(&component("Acme.Verbose"));
    assert!(rendered.starts_with("disk offline [0x"));
    assert!(rendered.ends_with("<- file missing"));

    debug_mode_overrides().remove(&component("Acme.Verbose")).unwrap();
}

#[test]
#[serial]
fn error_display_should_include_the_status_code() {
    let error = CodedError::new(crate::StatusCode::new(7, 3).unwrap(), "boom");

    assert_eq!(error.to_string(), "boom [0xA0070003]");
}
