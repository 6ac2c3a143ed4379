use lazy_static::lazy_static;

use super::DebugModeOverrides;
use super::FacilityOverrides;
use super::OverrideCache;

lazy_static! {
    static ref GLOBAL_FACILITY_OVERRIDES: FacilityOverrides = OverrideCache::new();
    static ref GLOBAL_DEBUG_MODE_OVERRIDES: DebugModeOverrides = OverrideCache::new();
}

/// Process-wide facility-id override cache.
///
/// Created on first access, never disposed; error-construction call sites
/// consult it so cache instances need not be threaded through every
/// constructor. Prefer passing a cache explicitly where feasible and fall
/// back to this instance only at the outermost call sites.
pub fn facility_overrides() -> &'static FacilityOverrides {
    &GLOBAL_FACILITY_OVERRIDES
}

/// Process-wide debug-mode override cache. Same lifecycle as
/// [`facility_overrides`].
pub fn debug_mode_overrides() -> &'static DebugModeOverrides {
    &GLOBAL_DEBUG_MODE_OVERRIDES
}
