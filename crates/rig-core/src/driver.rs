//! Plugin Types and Instances
//!
//! This module provides the plugin API. A driver crate implements
//! [`PluginType`] once per kind of hardware it supports and registers those
//! types with a [`DriverLibrary`] at startup. Plugin unit manifests then name
//! the types they export by symbol, and the plugin registry resolves each
//! symbol against the library.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Composition Root (rigd)                     │
//! │  rig_driver_mock::register_all(&mut library)?;                  │
//! └─────────────────────────────────────────────────────────────────┘
//!                                   │
//!                                   ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         DriverLibrary                           │
//! │  types: HashMap<symbol, Arc<dyn PluginType>>                    │
//! └─────────────────────────────────────────────────────────────────┘
//!                                   │  unit manifest: symbol -> class
//!                                   ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    PluginType::build()                          │
//! │  Parses JSON config, instantiates driver, returns PluginInstance│
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example: Implementing a Plugin Type
//!
//! ```rust,ignore
//! pub struct BenchRelayType;
//!
//! impl PluginType for BenchRelayType {
//!     fn symbol(&self) -> &'static str { "bench.relay" }
//!     fn name(&self) -> &'static str { "Bench Relay" }
//!     fn operations(&self) -> &'static [OperationSpec] { SWITCH_INTERFACE.operations }
//!
//!     fn validate(&self, config: &PluginConfig) -> anyhow::Result<()> {
//!         parse_config::<BenchRelayConfig>(config).map(|_| ())
//!     }
//!
//!     fn build(
//!         &self,
//!         config: PluginConfig,
//!         channel: Option<Arc<dyn ChannelDriver>>,
//!     ) -> BoxFuture<'static, anyhow::Result<PluginInstance>> {
//!         Box::pin(async move {
//!             let cfg: BenchRelayConfig = parse_config(&config)?;
//!             let channel = channel.ok_or_else(|| anyhow::anyhow!("relay needs a channel"))?;
//!             let relay = Arc::new(BenchRelay::new(channel, cfg.output));
//!             Ok(PluginInstance::Actuator(ActuatorDriver::Switch(relay)))
//!         })
//!     }
//! }
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::capabilities::{
    ChannelDriver, DimmerDriver, MotorDriver, SensorDriver, SwitchDriver, ValveDriver,
};
use crate::error::{RigError, RigResult};
use crate::interface::OperationSpec;

// =============================================================================
// Configuration
// =============================================================================

/// Free-form plugin configuration as supplied by the operator.
pub type PluginConfig = serde_json::Map<String, serde_json::Value>;

/// Deserialize a plugin configuration into a typed config struct.
///
/// Plugin types call this from both `validate()` and `build()` so the two
/// never disagree.
pub fn parse_config<T: DeserializeOwned>(config: &PluginConfig) -> Result<T> {
    let value = serde_json::Value::Object(config.clone());
    serde_json::from_value(value).map_err(|e| anyhow::anyhow!("invalid configuration: {}", e))
}

/// One entry of a plugin type's configuration schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConfigParam {
    /// Key in the configuration map.
    pub name: &'static str,
    /// Human-readable description shown by introspection.
    pub description: &'static str,
}

impl ConfigParam {
    /// Const constructor for static tables.
    pub const fn new(name: &'static str, description: &'static str) -> Self {
        Self { name, description }
    }
}

// =============================================================================
// Instances
// =============================================================================

/// Actuator shapes the rig knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActuatorShape {
    /// On/off output.
    Switch,
    /// Integer level output.
    Dimmer,
    /// Positioned flow valve.
    Valve,
    /// Positioning motor.
    Motor,
}

impl ActuatorShape {
    /// Lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActuatorShape::Switch => "switch",
            ActuatorShape::Dimmer => "dimmer",
            ActuatorShape::Valve => "valve",
            ActuatorShape::Motor => "motor",
        }
    }
}

impl std::fmt::Display for ActuatorShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A built actuator driver, tagged by shape.
#[derive(Clone)]
pub enum ActuatorDriver {
    /// Switch driver.
    Switch(Arc<dyn SwitchDriver>),
    /// Dimmer driver.
    Dimmer(Arc<dyn DimmerDriver>),
    /// Valve driver.
    Valve(Arc<dyn ValveDriver>),
    /// Motor driver.
    Motor(Arc<dyn MotorDriver>),
}

impl ActuatorDriver {
    /// Shape of the wrapped driver.
    pub fn shape(&self) -> ActuatorShape {
        match self {
            ActuatorDriver::Switch(_) => ActuatorShape::Switch,
            ActuatorDriver::Dimmer(_) => ActuatorShape::Dimmer,
            ActuatorDriver::Valve(_) => ActuatorShape::Valve,
            ActuatorDriver::Motor(_) => ActuatorShape::Motor,
        }
    }
}

impl std::fmt::Debug for ActuatorDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ActuatorDriver::{:?}", self.shape())
    }
}

/// What [`PluginType::build`] produces.
#[derive(Clone)]
pub enum PluginInstance {
    /// A communication channel.
    Channel(Arc<dyn ChannelDriver>),
    /// A sensor.
    Sensor(Arc<dyn SensorDriver>),
    /// An actuator of some shape.
    Actuator(ActuatorDriver),
}

impl PluginInstance {
    /// Short label for logs and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            PluginInstance::Channel(_) => "channel",
            PluginInstance::Sensor(_) => "sensor",
            PluginInstance::Actuator(a) => a.shape().as_str(),
        }
    }
}

impl std::fmt::Debug for PluginInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PluginInstance({})", self.kind())
    }
}

// =============================================================================
// Plugin Type Trait
// =============================================================================

/// A kind of hardware driver that plugin units can export.
///
/// Implementations are registered once in a [`DriverLibrary`] and live for
/// the program's lifetime. They must be `Send + Sync + 'static` because they
/// may be called from any task.
///
/// # Thread Safety
///
/// `build()` takes `&self` and returns a `BoxFuture<'static, ...>`, so the
/// type must not hold mutable state across builds.
pub trait PluginType: Send + Sync + 'static {
    /// Symbol that unit manifests use to export this type (e.g. `mock.dimmer`).
    fn symbol(&self) -> &'static str;

    /// Human-readable name.
    fn name(&self) -> &'static str;

    /// Declared operation surface.
    ///
    /// The plugin registry matches this against the capability interfaces;
    /// it must describe what `build()` actually returns.
    fn operations(&self) -> &'static [OperationSpec];

    /// Configuration schema (name and description per key).
    fn params(&self) -> &'static [ConfigParam] {
        &[]
    }

    /// Validate configuration without instantiating.
    fn validate(&self, config: &PluginConfig) -> Result<()>;

    /// Build a live driver.
    ///
    /// `channel` is the equipment's channel for sensors and actuators, and
    /// `None` when building a channel itself.
    fn build(
        &self,
        config: PluginConfig,
        channel: Option<Arc<dyn ChannelDriver>>,
    ) -> BoxFuture<'static, Result<PluginInstance>>;
}

// =============================================================================
// Driver Library
// =============================================================================

/// Plugin types linked into this binary, keyed by symbol.
#[derive(Default)]
pub struct DriverLibrary {
    types: HashMap<&'static str, Arc<dyn PluginType>>,
}

impl DriverLibrary {
    /// Empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plugin type. Symbols must be unique.
    pub fn register<T: PluginType>(&mut self, plugin_type: T) -> RigResult<()> {
        self.register_arc(Arc::new(plugin_type))
    }

    /// Add an already shared plugin type.
    pub fn register_arc(&mut self, plugin_type: Arc<dyn PluginType>) -> RigResult<()> {
        let symbol = plugin_type.symbol();
        if self.types.contains_key(symbol) {
            return Err(RigError::Configuration(format!(
                "plugin symbol '{}' registered twice",
                symbol
            )));
        }
        tracing::debug!(symbol, name = plugin_type.name(), "Registered plugin type");
        self.types.insert(symbol, plugin_type);
        Ok(())
    }

    /// Resolve a symbol.
    pub fn resolve(&self, symbol: &str) -> Option<Arc<dyn PluginType>> {
        self.types.get(symbol).cloned()
    }

    /// Registered symbols, sorted.
    pub fn symbols(&self) -> Vec<&'static str> {
        let mut symbols: Vec<_> = self.types.keys().copied().collect();
        symbols.sort_unstable();
        symbols
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl std::fmt::Debug for DriverLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriverLibrary")
            .field("symbols", &self.symbols())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::Reading;
    use crate::interface::SENSOR_INTERFACE;
    use async_trait::async_trait;
    use serde::Deserialize;

    struct Fixed(f64);

    #[async_trait]
    impl SensorDriver for Fixed {
        async fn read(&self) -> Result<Reading> {
            Ok(Reading::new(self.0, "V"))
        }
    }

    #[derive(Deserialize)]
    #[serde(deny_unknown_fields)]
    struct FixedConfig {
        value: f64,
    }

    struct FixedType;

    impl PluginType for FixedType {
        fn symbol(&self) -> &'static str {
            "test.fixed"
        }

        fn name(&self) -> &'static str {
            "Fixed Voltage"
        }

        fn operations(&self) -> &'static [OperationSpec] {
            SENSOR_INTERFACE.operations
        }

        fn params(&self) -> &'static [ConfigParam] {
            const { &[ConfigParam::new("value", "Constant reading in volts")] }
        }

        fn validate(&self, config: &PluginConfig) -> Result<()> {
            parse_config::<FixedConfig>(config).map(|_| ())
        }

        fn build(
            &self,
            config: PluginConfig,
            _channel: Option<Arc<dyn ChannelDriver>>,
        ) -> BoxFuture<'static, Result<PluginInstance>> {
            Box::pin(async move {
                let cfg: FixedConfig = parse_config(&config)?;
                Ok(PluginInstance::Sensor(Arc::new(Fixed(cfg.value))))
            })
        }
    }

    fn config(json: serde_json::Value) -> PluginConfig {
        match json {
            serde_json::Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_duplicate_symbol_rejected() {
        let mut library = DriverLibrary::new();
        library.register(FixedType).unwrap();
        let err = library.register(FixedType).unwrap_err();
        assert!(matches!(err, RigError::Configuration(_)));
        assert_eq!(library.symbols(), vec!["test.fixed"]);
    }

    #[test]
    fn test_parse_config_rejects_unknown_fields() {
        let ty = FixedType;
        assert!(ty.validate(&config(serde_json::json!({"value": 1.5}))).is_ok());
        let err = ty
            .validate(&config(serde_json::json!({"value": 1.5, "gain": 2})))
            .unwrap_err();
        assert!(err.to_string().contains("invalid configuration"));
    }

    #[tokio::test]
    async fn test_build_resolved_type() {
        let mut library = DriverLibrary::new();
        library.register(FixedType).unwrap();
        let ty = library.resolve("test.fixed").unwrap();
        let instance = ty
            .build(config(serde_json::json!({"value": 3.3})), None)
            .await
            .unwrap();
        assert_eq!(instance.kind(), "sensor");
        match instance {
            PluginInstance::Sensor(sensor) => {
                assert_eq!(sensor.read().await.unwrap(), Reading::new(3.3, "V"));
            }
            other => panic!("unexpected instance {other:?}"),
        }
    }
}
