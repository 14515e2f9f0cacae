//! Plugin registry loading against temporary plugin trees.

mod common;

use common::{mock_library, write_unit, BlinkerType, MOCK_UNIT};
use rig_core::interface::{InterfaceCatalog, DIMMER_INTERFACE, MOTOR_INTERFACE, SWITCH_INTERFACE, VALVE_INTERFACE};
use rig_core::RigError;
use rig_hardware::{PluginRegistry, UnitScanner};
use tempfile::TempDir;

fn interfaces() -> InterfaceCatalog {
    InterfaceCatalog::new([
        &SWITCH_INTERFACE,
        &DIMMER_INTERFACE,
        &VALVE_INTERFACE,
        &MOTOR_INTERFACE,
    ])
}

fn load(dir: &TempDir) -> Result<PluginRegistry, RigError> {
    PluginRegistry::initialize(&UnitScanner::new(dir.path()), &interfaces(), &mock_library())
}

#[test]
fn test_every_mock_class_registered_and_indexed() {
    let dir = TempDir::new().unwrap();
    write_unit(dir.path(), "bench.yaml", MOCK_UNIT);
    let registry = load(&dir).unwrap();

    assert_eq!(registry.len(), 6);
    for plugin in registry.plugins() {
        let found = registry.get_plugin_by_class_name(&plugin.class_name).unwrap();
        assert_eq!(found.class_name, plugin.class_name);
        // Repeated lookups hand back the same registration
        let again = registry.get_plugin_by_class_name(&plugin.class_name).unwrap();
        assert!(std::sync::Arc::ptr_eq(&found, &again));
    }

    assert_eq!(
        registry.get_plugin_names_by_interface("DimmerPluginInterface"),
        vec!["SimDimmer"]
    );
    assert_eq!(
        registry.get_plugin_names_by_interface("ChannelPluginInterface"),
        vec!["SimSerial"]
    );
    assert!(registry.get_plugins_by_interface("NoSuchInterface").is_empty());
}

#[test]
fn test_interface_index_is_exact() {
    let dir = TempDir::new().unwrap();
    write_unit(dir.path(), "bench.yaml", MOCK_UNIT);
    let registry = load(&dir).unwrap();
    let catalog = interfaces();

    let mut indexed = 0;
    for iface in catalog.iter() {
        for plugin in registry.get_plugins_by_interface(iface.name) {
            assert!(iface.is_satisfied_by(plugin.plugin_type.operations()));
            assert_eq!(plugin.interface, iface.name);
            indexed += 1;
        }
    }
    assert_eq!(indexed, registry.len());
}

#[test]
fn test_duplicate_class_earlier_unit_wins() {
    let dir = TempDir::new().unwrap();
    write_unit(
        dir.path(),
        "b_vendor/lights.yaml",
        "exports:\n  - class_name: Lamp\n    symbol: mock.dimmer\n",
    );
    write_unit(
        dir.path(),
        "a_vendor/lights.yaml",
        "unit: acme\nexports:\n  - class_name: Lamp\n    symbol: mock.relay\n",
    );

    for _ in 0..3 {
        let registry = load(&dir).unwrap();
        let lamp = registry.get_plugin_by_class_name("Lamp").unwrap();
        assert_eq!(lamp.unit, "acme");
        assert_eq!(lamp.interface, "SwitchPluginInterface");
        assert_eq!(registry.len(), 1);
        assert!(registry
            .get_plugin_names_by_interface("DimmerPluginInterface")
            .is_empty());
    }
}

#[test]
fn test_malformed_unit_aborts() {
    let dir = TempDir::new().unwrap();
    write_unit(dir.path(), "bench.yaml", MOCK_UNIT);
    write_unit(dir.path(), "broken.yaml", "exports: [this is: not valid");

    let err = load(&dir).unwrap_err();
    assert!(err.is_fatal());
    match err {
        RigError::PluginLoadFailure { path, .. } => assert!(path.ends_with("broken.yaml")),
        other => panic!("expected PluginLoadFailure, got {other:?}"),
    }
}

#[test]
fn test_unknown_symbol_aborts() {
    let dir = TempDir::new().unwrap();
    write_unit(
        dir.path(),
        "ghost.yaml",
        "exports:\n  - class_name: Ghost\n    symbol: vendor.ghost\n",
    );

    let err = load(&dir).unwrap_err();
    assert!(matches!(err, RigError::PluginLoadFailure { .. }));
    assert!(err.to_string().contains("vendor.ghost"));
}

#[test]
fn test_missing_root_aborts() {
    let dir = TempDir::new().unwrap();
    let scanner = UnitScanner::new(dir.path().join("absent"));
    let err = PluginRegistry::initialize(&scanner, &interfaces(), &mock_library()).unwrap_err();
    assert!(err.is_fatal());
}

#[test]
fn test_nonconforming_type_skipped() {
    let dir = TempDir::new().unwrap();
    write_unit(
        dir.path(),
        "mixed.yaml",
        "exports:\n  - class_name: Blinky\n    symbol: test.blinker\n  - class_name: SimRelay\n    symbol: mock.relay\n",
    );
    let mut library = mock_library();
    library.register(BlinkerType).unwrap();

    let registry =
        PluginRegistry::initialize(&UnitScanner::new(dir.path()), &interfaces(), &library).unwrap();
    assert!(registry.get_plugin_by_class_name("Blinky").is_none());
    assert!(registry.get_plugin_by_class_name("SimRelay").is_some());
}

#[test]
fn test_non_manifest_files_ignored() {
    let dir = TempDir::new().unwrap();
    write_unit(dir.path(), "bench.yml", MOCK_UNIT);
    write_unit(dir.path(), "README.md", "# not a unit");

    let registry = load(&dir).unwrap();
    assert_eq!(registry.len(), 6);
    assert_eq!(registry.plugins()[0].unit, "bench");
}
