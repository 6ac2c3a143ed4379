//! End-to-end flow: parse a deployed override file, feed the cache, then
//! resolve codes on concurrent error-construction paths.

use std::io::Write;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;

use facility_overrides::debug_mode_overrides;
use facility_overrides::facility_overrides;
use facility_overrides::CodedError;
use facility_overrides::ComponentIdentity;
use facility_overrides::ComponentVersion;
use facility_overrides::DebugModeOverrides;
use facility_overrides::FacilityOverrides;
use facility_overrides::FileOverrideSource;
use serial_test::serial;

fn deployed_config(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("overrides.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(
        br#"
        [[facility]]
        pattern = "Acme.Widgets"
        value = 42

        [[facility]]
        pattern = "Acme.Gadgets, Version=1.0.0.0"
        value = 17

        [[debug]]
        pattern = "Acme.Widgets"
        value = true
        "#,
    )
    .unwrap();
    path
}

/// # Case 1: one deployed file feeds both caches and the matching rules
/// hold end to end
#[test]
fn deployed_file_should_drive_lookups_through_both_caches() {
    let dir = tempfile::tempdir().unwrap();
    let path = deployed_config(&dir);

    // Step 1: loaders parse, caches swallow the batches
    let facilities = FacilityOverrides::new();
    let debug_flags = DebugModeOverrides::new();
    facilities.reload_from(&FileOverrideSource::new(&path, "facility")).unwrap();
    debug_flags.reload_from(&FileOverrideSource::new(&path, "debug")).unwrap();

    // Step 2: version unset in the Widgets pattern, so any version matches
    let widgets = ComponentIdentity::new("Acme.Widgets")
        .unwrap()
        .with_version(ComponentVersion::new(2, 0, 0, 0));
    assert_eq!(facilities.try_get_override(&widgets).unwrap(), Some(42));
    assert_eq!(debug_flags.try_get_override(&widgets).unwrap(), Some(true));

    // Step 3: the Gadgets pattern pins 1.0.0.0, so 2.0.0.0 misses
    let gadgets = ComponentIdentity::new("Acme.Gadgets")
        .unwrap()
        .with_version(ComponentVersion::new(2, 0, 0, 0));
    assert_eq!(facilities.try_get_override(&gadgets).unwrap(), None);
}

/// # Case 2: a reload during live lookups is observed as one atomic swap
#[test]
fn reload_should_race_safely_with_hot_lookups() {
    let dir = tempfile::tempdir().unwrap();
    let path = deployed_config(&dir);

    let cache = Arc::new(FacilityOverrides::new());
    cache.reload_from(&FileOverrideSource::new(&path, "facility")).unwrap();

    let swaps = Arc::new(AtomicUsize::new(0));
    let subscriber_swaps = swaps.clone();
    cache
        .subscribe(move || {
            subscriber_swaps.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..4 {
        let reader = cache.clone();
        handles.push(thread::spawn(move || {
            let widgets = ComponentIdentity::new("Acme.Widgets").unwrap();
            for _ in 0..500 {
                // Either generation of the record is acceptable; a torn or
                // absent record is not
                let value = reader.try_get_override(&widgets).unwrap();
                assert!(value == Some(42) || value == Some(99));
            }
        }));
    }

    let writer = cache.clone();
    let writer_path = path.clone();
    handles.push(thread::spawn(move || {
        let mut file = std::fs::File::create(&writer_path).unwrap();
        file.write_all(
            br#"
            [[facility]]
            pattern = "Acme.Widgets"
            value = 99
            "#,
        )
        .unwrap();
        writer.reload_from(&FileOverrideSource::new(&writer_path, "facility")).unwrap();
    }));

    for handle in handles {
        handle.join().unwrap();
    }

    let widgets = ComponentIdentity::new("Acme.Widgets").unwrap();
    assert_eq!(cache.try_get_override(&widgets).unwrap(), Some(99));
    // One notification per content-changing reload
    assert_eq!(swaps.load(Ordering::SeqCst), 1);
}

/// # Case 3: error construction consults the ambient caches
///
/// ## Setup
/// 1. Deployed file loaded into the process-wide instances
///
/// ## Validation criteria
/// 1. A Widgets error carries facility 42 and renders debug detail
/// 2. An unconfigured component falls back to its compiled-in facility
#[test]
#[serial]
fn ambient_caches_should_drive_error_construction() {
    let dir = tempfile::tempdir().unwrap();
    let path = deployed_config(&dir);

    facility_overrides().reload_from(&FileOverrideSource::new(&path, "facility")).unwrap();
    debug_mode_overrides().reload_from(&FileOverrideSource::new(&path, "debug")).unwrap();

    let widgets = ComponentIdentity::new("Acme.Widgets").unwrap();
    let error = CodedError::for_component(&widgets, 7, 0x0005, "spline reticulation failed")
        .unwrap()
        .with_source(std::io::Error::new(std::io::ErrorKind::Other, "spline db gone"));

    assert_eq!(error.code().facility(), 42);
    assert_eq!(error.code().error_id(), 0x0005);
    let rendered = error.detailed_message(&widgets);
    assert!(rendered.contains("0xA02A0005"));
    assert!(rendered.ends_with("<- spline db gone"));

    let unconfigured = ComponentIdentity::new("Acme.Elsewhere").unwrap();
    let fallback = CodedError::for_component(&unconfigured, 7, 0x0006, "boom").unwrap();
    assert_eq!(fallback.code().facility(), 7);
    assert_eq!(fallback.detailed_message(&unconfigured), "boom");

    // Leave the process-wide instances clean for other tests
    facility_overrides().clear().unwrap();
    debug_mode_overrides().clear().unwrap();
}
