//! Integration tests for the mock driver set
//!
//! These tests verify that every mock plugin type registers, binds to the
//! interface it claims, and builds a working driver on a shared channel.

use std::sync::Arc;

use rig_core::capabilities::ChannelDriver;
use rig_core::driver::{ActuatorDriver, DriverLibrary, PluginConfig, PluginInstance};
use rig_core::interface::{
    InterfaceCatalog, DIMMER_INTERFACE, MOTOR_INTERFACE, SWITCH_INTERFACE, VALVE_INTERFACE,
};
use rig_core::{DriverError, DriverErrorKind, RigError};
use rig_driver_mock::*;
use serde_json::json;

fn config(value: serde_json::Value) -> PluginConfig {
    value.as_object().cloned().unwrap()
}

fn catalog() -> InterfaceCatalog {
    InterfaceCatalog::new([
        &SWITCH_INTERFACE,
        &DIMMER_INTERFACE,
        &VALVE_INTERFACE,
        &MOTOR_INTERFACE,
    ])
}

async fn open_channel(library: &DriverLibrary) -> Arc<dyn ChannelDriver> {
    let ty = library.resolve("mock.serial_channel").unwrap();
    let channel = match ty.build(config(json!({"port": "sim0"})), None).await.unwrap() {
        PluginInstance::Channel(channel) => channel,
        other => panic!("expected channel, got {other:?}"),
    };
    channel.open().await.unwrap();
    channel
}

/// Test that every mock registers exactly once
#[test]
fn test_register_all() {
    let mut library = DriverLibrary::new();
    register_all(&mut library).unwrap();
    assert_eq!(library.symbols(), symbols().to_vec());

    let err = register_all(&mut library).unwrap_err();
    assert!(matches!(err, RigError::Configuration(_)));
}

/// Test that each mock binds to the interface its driver implements
#[test]
fn test_each_type_matches_its_interface() {
    let mut library = DriverLibrary::new();
    register_all(&mut library).unwrap();
    let catalog = catalog();

    let expected = [
        ("mock.serial_channel", "ChannelPluginInterface"),
        ("mock.thermometer", "SensorPluginInterface"),
        ("mock.relay", "SwitchPluginInterface"),
        ("mock.dimmer", "DimmerPluginInterface"),
        ("mock.valve", "ValvePluginInterface"),
        ("mock.motor", "MotorPluginInterface"),
    ];
    for (symbol, interface) in expected {
        let ty = library.resolve(symbol).unwrap();
        let matched = catalog.first_match(ty.operations()).unwrap();
        assert_eq!(matched.name, interface, "{symbol}");
        assert!(!ty.params().is_empty(), "{symbol} declares no params");
    }
}

/// Test building every actuator on one shared channel
#[tokio::test]
async fn test_build_all_on_shared_channel() {
    let mut library = DriverLibrary::new();
    register_all(&mut library).unwrap();
    let channel = open_channel(&library).await;

    let shapes: Vec<_> = ["mock.relay", "mock.dimmer", "mock.valve", "mock.motor"]
        .into_iter()
        .map(|symbol| library.resolve(symbol).unwrap())
        .collect();

    let mut built = Vec::new();
    for ty in shapes {
        let instance = ty
            .build(config(json!({})), Some(Arc::clone(&channel)))
            .await
            .unwrap();
        built.push(instance.kind());
    }
    assert_eq!(built, vec!["switch", "dimmer", "valve", "motor"]);

    let sensor = library
        .resolve("mock.thermometer")
        .unwrap()
        .build(config(json!({"base_celsius": 4.0})), Some(channel))
        .await
        .unwrap();
    match sensor {
        PluginInstance::Sensor(sensor) => assert_eq!(sensor.read().await.unwrap().value, 4.0),
        other => panic!("expected sensor, got {other:?}"),
    }
}

/// Test that chaos mode surfaces structured driver errors
#[tokio::test]
async fn test_chaos_dimmer_fails_with_driver_error() {
    let mut library = DriverLibrary::new();
    register_all(&mut library).unwrap();
    let channel = open_channel(&library).await;

    let instance = library
        .resolve("mock.dimmer")
        .unwrap()
        .build(
            config(json!({"mode": "chaos", "failure_rate": 1.0, "seed": 9})),
            Some(channel),
        )
        .await
        .unwrap();
    let PluginInstance::Actuator(ActuatorDriver::Dimmer(dimmer)) = instance else {
        panic!("expected dimmer");
    };

    let err = dimmer.set_level(10).await.unwrap_err();
    let driver_err = err.downcast_ref::<DriverError>().unwrap();
    assert_eq!(driver_err.driver, "mock.dimmer");
    assert_eq!(driver_err.kind, DriverErrorKind::Hardware);
}

/// Test that unknown configuration keys are rejected by every type
#[test]
fn test_unknown_keys_rejected() {
    let mut library = DriverLibrary::new();
    register_all(&mut library).unwrap();

    for symbol in symbols() {
        let ty = library.resolve(symbol).unwrap();
        let err = ty
            .validate(&config(json!({"port": "sim0", "bogus": true})))
            .unwrap_err();
        assert!(err.to_string().contains("invalid configuration"), "{symbol}: {err}");
    }
}
