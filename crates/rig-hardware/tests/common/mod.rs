//! Shared fixtures for rig-hardware integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use rig_core::capabilities::{ChannelDriver, DimmerDriver, SwitchDriver};
use rig_core::driver::{
    ActuatorDriver, DriverLibrary, PluginConfig, PluginInstance, PluginType,
};
use rig_core::interface::{
    CapabilityInterface, OperationSpec, CHANNEL_INTERFACE, DIMMER_INTERFACE, SENSOR_INTERFACE,
};
use rig_hardware::{ActuatorTypeCatalog, HardwareContext, UnitScanner};
use serde_json::json;
use tempfile::TempDir;

/// Unit exporting one plugin class per mock type.
pub const MOCK_UNIT: &str = r#"
unit: bench
description: Simulated bench hardware
exports:
  - class_name: SimSerial
    symbol: mock.serial_channel
  - class_name: SimThermometer
    symbol: mock.thermometer
  - class_name: SimRelay
    symbol: mock.relay
  - class_name: SimDimmer
    symbol: mock.dimmer
  - class_name: SimValve
    symbol: mock.valve
  - class_name: SimMotor
    symbol: mock.motor
"#;

/// Write `content` to `rel` under `root`, creating parent directories.
pub fn write_unit(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

/// Library holding every mock type.
pub fn mock_library() -> DriverLibrary {
    let mut library = DriverLibrary::new();
    rig_driver_mock::register_all(&mut library).unwrap();
    library
}

/// Plugin config from a JSON object literal.
pub fn config(value: serde_json::Value) -> PluginConfig {
    value.as_object().cloned().unwrap()
}

/// Channel config accepted by `SimSerial`.
pub fn serial_config() -> PluginConfig {
    config(json!({"port": "sim0"}))
}

/// Context over a temp plugin tree holding [`MOCK_UNIT`] plus `extra` units.
pub fn context_with(library: &DriverLibrary, extra: &[(&str, &str)]) -> (TempDir, HardwareContext) {
    let dir = TempDir::new().unwrap();
    write_unit(dir.path(), "bench.yaml", MOCK_UNIT);
    for (rel, content) in extra {
        write_unit(dir.path(), rel, content);
    }
    let context = HardwareContext::with_catalog(
        &UnitScanner::new(dir.path()),
        library,
        ActuatorTypeCatalog::standard(),
    )
    .unwrap();
    (dir, context)
}

// =============================================================================
// Recording dimmer
// =============================================================================

/// Dimmer that records every `set_level` call it receives.
pub struct RecordingDimmer {
    calls: Arc<Mutex<Vec<i64>>>,
}

#[async_trait]
impl DimmerDriver for RecordingDimmer {
    async fn set_level(&self, level: i64) -> Result<()> {
        self.calls.lock().push(level);
        Ok(())
    }

    async fn level(&self) -> Result<i64> {
        Ok(self.calls.lock().last().copied().unwrap_or(0))
    }

    async fn turn_off(&self) -> Result<()> {
        self.set_level(0).await
    }
}

/// Plugin type building [`RecordingDimmer`]s that share one call log.
#[derive(Clone, Default)]
pub struct RecordingDimmerType {
    pub calls: Arc<Mutex<Vec<i64>>>,
}

impl PluginType for RecordingDimmerType {
    fn symbol(&self) -> &'static str {
        "test.recording_dimmer"
    }

    fn name(&self) -> &'static str {
        "Recording Dimmer"
    }

    fn operations(&self) -> &'static [OperationSpec] {
        DIMMER_INTERFACE.operations
    }

    fn validate(&self, _config: &PluginConfig) -> Result<()> {
        Ok(())
    }

    fn build(
        &self,
        _config: PluginConfig,
        _channel: Option<Arc<dyn ChannelDriver>>,
    ) -> BoxFuture<'static, Result<PluginInstance>> {
        let calls = Arc::clone(&self.calls);
        Box::pin(async move {
            Ok(PluginInstance::Actuator(ActuatorDriver::Dimmer(Arc::new(
                RecordingDimmer { calls },
            ))))
        })
    }
}

/// Type whose surface matches no capability interface.
pub struct BlinkerType;

static BLINK_OPERATIONS: &[OperationSpec] = &[OperationSpec::new("blink", &[])];

impl PluginType for BlinkerType {
    fn symbol(&self) -> &'static str {
        "test.blinker"
    }

    fn name(&self) -> &'static str {
        "Blinker"
    }

    fn operations(&self) -> &'static [OperationSpec] {
        BLINK_OPERATIONS
    }

    fn validate(&self, _config: &PluginConfig) -> Result<()> {
        Ok(())
    }

    fn build(
        &self,
        _config: PluginConfig,
        _channel: Option<Arc<dyn ChannelDriver>>,
    ) -> BoxFuture<'static, Result<PluginInstance>> {
        Box::pin(async { Err(anyhow::anyhow!("blinker cannot be built")) })
    }
}

// =============================================================================
// Wrong-shape builders
// =============================================================================

/// Switch with no behavior, used as the wrong instance for [`MisbuiltType`].
pub struct IdleSwitch;

#[async_trait]
impl SwitchDriver for IdleSwitch {
    async fn turn_on(&self) -> Result<()> {
        Ok(())
    }

    async fn turn_off(&self) -> Result<()> {
        Ok(())
    }

    async fn is_on(&self) -> Result<bool> {
        Ok(false)
    }
}

/// Type that declares `declared`'s surface but always builds a switch.
pub struct MisbuiltType {
    symbol: &'static str,
    declared: &'static CapabilityInterface,
}

impl MisbuiltType {
    /// Declares the channel surface.
    pub fn channel() -> Self {
        Self { symbol: "test.misbuilt_channel", declared: &CHANNEL_INTERFACE }
    }

    /// Declares the sensor surface.
    pub fn sensor() -> Self {
        Self { symbol: "test.misbuilt_sensor", declared: &SENSOR_INTERFACE }
    }

    /// Declares the dimmer surface.
    pub fn dimmer() -> Self {
        Self { symbol: "test.misbuilt_dimmer", declared: &DIMMER_INTERFACE }
    }
}

impl PluginType for MisbuiltType {
    fn symbol(&self) -> &'static str {
        self.symbol
    }

    fn name(&self) -> &'static str {
        "Misbuilt"
    }

    fn operations(&self) -> &'static [OperationSpec] {
        self.declared.operations
    }

    fn validate(&self, _config: &PluginConfig) -> Result<()> {
        Ok(())
    }

    fn build(
        &self,
        _config: PluginConfig,
        _channel: Option<Arc<dyn ChannelDriver>>,
    ) -> BoxFuture<'static, Result<PluginInstance>> {
        Box::pin(async {
            Ok(PluginInstance::Actuator(ActuatorDriver::Switch(Arc::new(IdleSwitch))))
        })
    }
}

/// Unit exporting one class per [`MisbuiltType`] constructor.
pub const MISBUILT_UNIT: &str = r#"
unit: misbuilt
exports:
  - class_name: FakeChannel
    symbol: test.misbuilt_channel
  - class_name: FakeSensor
    symbol: test.misbuilt_sensor
  - class_name: FakeDimmer
    symbol: test.misbuilt_dimmer
"#;

/// Mock library plus the three [`MisbuiltType`]s.
pub fn misbuilt_library() -> DriverLibrary {
    let mut library = mock_library();
    library.register(MisbuiltType::channel()).unwrap();
    library.register(MisbuiltType::sensor()).unwrap();
    library.register(MisbuiltType::dimmer()).unwrap();
    library
}
