use super::*;
use crate::CacheError;
use crate::MAX_FACILITY_ID;

#[test]
fn new_should_pack_marker_bits_facility_and_error_id() {
    let code = StatusCode::new(42, 0x1234).unwrap();

    assert_eq!(code.value(), 0xA02A_1234);
    assert_eq!(code.facility(), 42);
    assert_eq!(code.error_id(), 0x1234);
    assert!(code.is_vendor_defined());
}

#[test]
fn facility_should_be_range_checked_at_assembly() {
    assert!(matches!(
        StatusCode::new(MAX_FACILITY_ID + 1, 1),
        Err(CacheError::FacilityOutOfRange { value: 2048 })
    ));

    // Boundary facilities are accepted
    assert!(StatusCode::new(0, 1).is_ok());
    assert!(StatusCode::new(MAX_FACILITY_ID, 1).is_ok());
}

#[test]
fn display_should_render_fixed_width_hex() {
    let code = StatusCode::new(1, 1).unwrap();

    assert_eq!(code.to_string(), "0xA0010001");
}
