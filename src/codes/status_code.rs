use std::fmt;
use std::fmt::Display;

use crate::constants::CUSTOMER_FLAG;
use crate::constants::ERROR_ID_MASK;
use crate::constants::FACILITY_SHIFT;
use crate::constants::SEVERITY_ERROR;
use crate::CacheError;
use crate::MAX_FACILITY_ID;

/// A 32-bit HRESULT-style status value: severity-error and customer bits,
/// an 11-bit facility id and a 16-bit error id.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusCode(u32);

impl StatusCode {
    /// Assembles a vendor-defined error status. The facility id shares the
    /// 0..=2047 bound enforced by the facility override cache.
    pub fn new(
        facility: u16,
        error_id: u16,
    ) -> std::result::Result<Self, CacheError> {
        if facility > MAX_FACILITY_ID {
            return Err(CacheError::FacilityOutOfRange { value: facility });
        }
        Ok(Self(
            SEVERITY_ERROR | CUSTOMER_FLAG | ((facility as u32) << FACILITY_SHIFT) | error_id as u32,
        ))
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    pub fn facility(&self) -> u16 {
        ((self.0 >> FACILITY_SHIFT) & MAX_FACILITY_ID as u32) as u16
    }

    pub fn error_id(&self) -> u16 {
        (self.0 & ERROR_ID_MASK) as u16
    }

    /// Whether the customer bit marks this code as vendor-defined.
    pub fn is_vendor_defined(&self) -> bool {
        self.0 & CUSTOMER_FLAG != 0
    }
}

impl Display for StatusCode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

impl fmt::Debug for StatusCode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "StatusCode(0x{:08X})", self.0)
    }
}
