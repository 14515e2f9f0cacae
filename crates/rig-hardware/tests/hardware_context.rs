//! Context construction from settings and the introspection surface.

mod common;

use common::{context_with, mock_library, write_unit, MOCK_UNIT};
use rig_core::{EntityKind, ParamType, RigError};
use rig_hardware::config::PluginSettings;
use rig_hardware::{HardwareContext, RigSettings};
use tempfile::TempDir;

#[test]
fn test_initialize_from_settings_file() {
    let dir = TempDir::new().unwrap();
    let plugins = dir.path().join("units");
    write_unit(&plugins, "bench.yaml", MOCK_UNIT);
    // Filtered out by the configured extension list
    write_unit(&plugins, "legacy.yml", "exports: [broken");

    let settings_path = dir.path().join("rig.toml");
    std::fs::write(
        &settings_path,
        format!(
            "[plugins]\nroot = {:?}\nextensions = [\"yaml\"]\n",
            plugins.display().to_string()
        ),
    )
    .unwrap();

    let settings = RigSettings::load_from(&settings_path).unwrap();
    settings.validate().unwrap();
    let context = HardwareContext::initialize(&settings.plugins, &mock_library()).unwrap();
    assert_eq!(context.plugins().len(), 6);
}

#[test]
fn test_initialize_missing_root_is_fatal() {
    let dir = TempDir::new().unwrap();
    let settings = PluginSettings {
        root: dir.path().join("nowhere"),
        ..PluginSettings::default()
    };
    let err = HardwareContext::initialize(&settings, &mock_library()).unwrap_err();
    assert!(matches!(err, RigError::PluginLoadFailure { .. }));
}

#[test]
fn test_interface_names_in_matching_order() {
    let library = mock_library();
    let (_dir, ctx) = context_with(&library, &[]);
    assert_eq!(
        ctx.interface_names(),
        vec![
            "ChannelPluginInterface",
            "SensorPluginInterface",
            "SwitchPluginInterface",
            "DimmerPluginInterface",
            "ValvePluginInterface",
            "MotorPluginInterface",
        ]
    );
}

#[test]
fn test_plugin_names_by_interface_and_category() {
    let library = mock_library();
    let extra = "unit: extra\nexports:\n  - class_name: SpareDimmer\n    symbol: mock.dimmer\n";
    let (_dir, ctx) = context_with(&library, &[("extra.yaml", extra)]);

    assert_eq!(
        ctx.plugin_names_by_interface("DimmerPluginInterface"),
        vec!["SimDimmer", "SpareDimmer"]
    );
    assert_eq!(
        ctx.plugin_names_by_category("dimmer"),
        vec!["SimDimmer", "SpareDimmer"]
    );
    assert_eq!(ctx.plugin_names_by_category("valve"), vec!["SimValve"]);
    assert!(ctx.plugin_names_by_category("heater").is_empty());
    assert!(ctx.plugin_names_by_interface("HeaterPluginInterface").is_empty());
}

#[test]
fn test_plugin_configuration_params() {
    let library = mock_library();
    let (_dir, ctx) = context_with(&library, &[]);

    let params = ctx.plugin_configuration_params("SimSerial").unwrap();
    assert!(params.contains_key("port"));
    assert!(params.contains_key("baud_rate"));
    assert!(!params["port"].is_empty());

    let err = ctx.plugin_configuration_params("Nope").unwrap_err();
    assert!(err.is_not_found(EntityKind::Plugin));
}

#[test]
fn test_list_operations_schema() {
    let library = mock_library();
    let (_dir, ctx) = context_with(&library, &[]);

    let ops = ctx.list_operations("valve").unwrap();
    let names: Vec<_> = ops.keys().copied().collect();
    assert_eq!(names, vec!["close", "open", "position", "set_position"]);
    let params = ops["set_position"];
    assert_eq!(params.len(), 1);
    assert_eq!(params[0].name, "percent");
    assert_eq!(params[0].ty, ParamType::Float);

    let err = ctx.list_operations("heater").unwrap_err();
    assert!(matches!(err, RigError::UnknownCategory(_)));
}
