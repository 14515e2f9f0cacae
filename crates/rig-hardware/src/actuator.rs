//! Actuator categories and per-shape operation tables.
//!
//! Every [`ActuatorShape`] has a static operation table: operation name,
//! typed parameter list, and a handler that drives the shape's capability
//! trait. The tables are the only operations the dispatcher will ever call,
//! and `list_operations` reads them directly.
//!
//! [`ActuatorTypeCatalog`] binds category names (`switch`, `dimmer`, ...) to a
//! shape and to the capability interface a plugin must satisfy to drive it.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use anyhow::Result;
use futures::future::BoxFuture;
use rig_core::capabilities::{ChannelDriver, DimmerDriver, MotorDriver, SwitchDriver, ValveDriver};
use rig_core::driver::{ActuatorDriver, ActuatorShape, PluginConfig, PluginInstance};
use rig_core::error::{DriverError, DriverErrorKind, RigError, RigResult};
use rig_core::interface::{
    CapabilityInterface, OperationSpec, ParamSpec, ParamType, DIMMER_INTERFACE, MOTOR_INTERFACE,
    SWITCH_INTERFACE, VALVE_INTERFACE,
};
use rig_core::parameter::OperationArgs;
use serde_json::Value;

use crate::plugin::Plugin;

// =============================================================================
// Operation Tables
// =============================================================================

/// Typed handler for one operation on a driver of type `D`.
pub type OperationHandler<D> = fn(Arc<D>, OperationArgs) -> OperationFuture;

/// Future returned by an operation handler.
pub type OperationFuture = BoxFuture<'static, Result<Value>>;

/// One row of a shape's operation table.
pub struct ShapeOperation<D: ?Sized + 'static> {
    /// Name and parameter schema.
    pub spec: OperationSpec,
    /// Handler invoked with validated arguments.
    pub handler: OperationHandler<D>,
}

const NO_PARAMS: &[ParamSpec] = &[];

fn done() -> Result<Value> {
    Ok(Value::Null)
}

fn switch_turn_on(d: Arc<dyn SwitchDriver>, _: OperationArgs) -> OperationFuture {
    Box::pin(async move {
        d.turn_on().await?;
        done()
    })
}

fn switch_turn_off(d: Arc<dyn SwitchDriver>, _: OperationArgs) -> OperationFuture {
    Box::pin(async move {
        d.turn_off().await?;
        done()
    })
}

fn switch_is_on(d: Arc<dyn SwitchDriver>, _: OperationArgs) -> OperationFuture {
    Box::pin(async move { Ok(Value::Bool(d.is_on().await?)) })
}

fn switch_toggle(d: Arc<dyn SwitchDriver>, _: OperationArgs) -> OperationFuture {
    Box::pin(async move {
        let on = d.is_on().await?;
        if on {
            d.turn_off().await?;
        } else {
            d.turn_on().await?;
        }
        Ok(Value::Bool(!on))
    })
}

/// Operations of the switch shape.
pub static SWITCH_OPERATIONS: &[ShapeOperation<dyn SwitchDriver>] = &[
    ShapeOperation {
        spec: OperationSpec::new("turn_on", NO_PARAMS),
        handler: switch_turn_on,
    },
    ShapeOperation {
        spec: OperationSpec::new("turn_off", NO_PARAMS),
        handler: switch_turn_off,
    },
    ShapeOperation {
        spec: OperationSpec::new("is_on", NO_PARAMS),
        handler: switch_is_on,
    },
    ShapeOperation {
        spec: OperationSpec::new("toggle", NO_PARAMS),
        handler: switch_toggle,
    },
];

fn dimmer_set_level(d: Arc<dyn DimmerDriver>, args: OperationArgs) -> OperationFuture {
    Box::pin(async move {
        d.set_level(args.int("level")?).await?;
        done()
    })
}

fn dimmer_level(d: Arc<dyn DimmerDriver>, _: OperationArgs) -> OperationFuture {
    Box::pin(async move { Ok(Value::from(d.level().await?)) })
}

fn dimmer_turn_on(d: Arc<dyn DimmerDriver>, _: OperationArgs) -> OperationFuture {
    Box::pin(async move {
        d.set_level(100).await?;
        done()
    })
}

fn dimmer_turn_off(d: Arc<dyn DimmerDriver>, _: OperationArgs) -> OperationFuture {
    Box::pin(async move {
        d.turn_off().await?;
        done()
    })
}

/// Operations of the dimmer shape.
pub static DIMMER_OPERATIONS: &[ShapeOperation<dyn DimmerDriver>] = &[
    ShapeOperation {
        spec: OperationSpec::new("set_level", &[ParamSpec::new("level", ParamType::Int)]),
        handler: dimmer_set_level,
    },
    ShapeOperation {
        spec: OperationSpec::new("level", NO_PARAMS),
        handler: dimmer_level,
    },
    ShapeOperation {
        spec: OperationSpec::new("turn_on", NO_PARAMS),
        handler: dimmer_turn_on,
    },
    ShapeOperation {
        spec: OperationSpec::new("turn_off", NO_PARAMS),
        handler: dimmer_turn_off,
    },
];

fn valve_open(d: Arc<dyn ValveDriver>, _: OperationArgs) -> OperationFuture {
    Box::pin(async move {
        d.open().await?;
        done()
    })
}

fn valve_close(d: Arc<dyn ValveDriver>, _: OperationArgs) -> OperationFuture {
    Box::pin(async move {
        d.close().await?;
        done()
    })
}

fn valve_set_position(d: Arc<dyn ValveDriver>, args: OperationArgs) -> OperationFuture {
    Box::pin(async move {
        d.set_position(args.float("percent")?).await?;
        done()
    })
}

fn valve_position(d: Arc<dyn ValveDriver>, _: OperationArgs) -> OperationFuture {
    Box::pin(async move { Ok(Value::from(d.position().await?)) })
}

/// Operations of the valve shape.
pub static VALVE_OPERATIONS: &[ShapeOperation<dyn ValveDriver>] = &[
    ShapeOperation {
        spec: OperationSpec::new("open", NO_PARAMS),
        handler: valve_open,
    },
    ShapeOperation {
        spec: OperationSpec::new("close", NO_PARAMS),
        handler: valve_close,
    },
    ShapeOperation {
        spec: OperationSpec::new(
            "set_position",
            &[ParamSpec::new("percent", ParamType::Float)],
        ),
        handler: valve_set_position,
    },
    ShapeOperation {
        spec: OperationSpec::new("position", NO_PARAMS),
        handler: valve_position,
    },
];

fn motor_move_to(d: Arc<dyn MotorDriver>, args: OperationArgs) -> OperationFuture {
    Box::pin(async move {
        d.move_to(args.float("position")?).await?;
        done()
    })
}

fn motor_move_by(d: Arc<dyn MotorDriver>, args: OperationArgs) -> OperationFuture {
    Box::pin(async move {
        let target = d.position().await? + args.float("distance")?;
        d.move_to(target).await?;
        Ok(Value::from(target))
    })
}

fn motor_stop(d: Arc<dyn MotorDriver>, _: OperationArgs) -> OperationFuture {
    Box::pin(async move {
        d.stop().await?;
        done()
    })
}

fn motor_position(d: Arc<dyn MotorDriver>, _: OperationArgs) -> OperationFuture {
    Box::pin(async move { Ok(Value::from(d.position().await?)) })
}

/// Operations of the motor shape.
pub static MOTOR_OPERATIONS: &[ShapeOperation<dyn MotorDriver>] = &[
    ShapeOperation {
        spec: OperationSpec::new("move_to", &[ParamSpec::new("position", ParamType::Float)]),
        handler: motor_move_to,
    },
    ShapeOperation {
        spec: OperationSpec::new("move_by", &[ParamSpec::new("distance", ParamType::Float)]),
        handler: motor_move_by,
    },
    ShapeOperation {
        spec: OperationSpec::new("stop", NO_PARAMS),
        handler: motor_stop,
    },
    ShapeOperation {
        spec: OperationSpec::new("position", NO_PARAMS),
        handler: motor_position,
    },
];

fn specs<D: ?Sized + 'static>(table: &'static [ShapeOperation<D>]) -> Vec<&'static OperationSpec> {
    table.iter().map(|op| &op.spec).collect()
}

fn find<D: ?Sized + 'static>(
    table: &'static [ShapeOperation<D>],
    name: &str,
) -> Option<&'static ShapeOperation<D>> {
    table.iter().find(|op| op.spec.name == name)
}

/// Operation specs of a shape, in table order.
pub fn shape_operations(shape: ActuatorShape) -> Vec<&'static OperationSpec> {
    match shape {
        ActuatorShape::Switch => specs(SWITCH_OPERATIONS),
        ActuatorShape::Dimmer => specs(DIMMER_OPERATIONS),
        ActuatorShape::Valve => specs(VALVE_OPERATIONS),
        ActuatorShape::Motor => specs(MOTOR_OPERATIONS),
    }
}

/// Look up one operation spec of a shape.
pub fn find_operation(shape: ActuatorShape, name: &str) -> Option<&'static OperationSpec> {
    shape_operations(shape).into_iter().find(|spec| spec.name == name)
}

/// Run `name` on `driver` with already validated arguments.
///
/// Returns `None` if the driver's shape has no such operation.
pub fn call_operation(
    driver: &ActuatorDriver,
    name: &str,
    args: OperationArgs,
) -> Option<OperationFuture> {
    match driver {
        ActuatorDriver::Switch(d) => {
            find(SWITCH_OPERATIONS, name).map(|op| (op.handler)(Arc::clone(d), args))
        }
        ActuatorDriver::Dimmer(d) => {
            find(DIMMER_OPERATIONS, name).map(|op| (op.handler)(Arc::clone(d), args))
        }
        ActuatorDriver::Valve(d) => {
            find(VALVE_OPERATIONS, name).map(|op| (op.handler)(Arc::clone(d), args))
        }
        ActuatorDriver::Motor(d) => {
            find(MOTOR_OPERATIONS, name).map(|op| (op.handler)(Arc::clone(d), args))
        }
    }
}

// =============================================================================
// Actuator Type Catalog
// =============================================================================

/// A registered actuator category.
#[derive(Debug, Clone)]
pub struct ActuatorCategory {
    /// Category name, e.g. `dimmer`.
    pub name: String,
    /// Shape of the actuators in this category.
    pub shape: ActuatorShape,
    /// Interface a plugin must satisfy to drive this category.
    pub required_interface: &'static CapabilityInterface,
}

/// Category name to shape and required interface.
///
/// Seeded at startup and immutable afterwards.
#[derive(Debug, Default, Clone)]
pub struct ActuatorTypeCatalog {
    categories: Vec<ActuatorCategory>,
    index: HashMap<String, usize>,
}

impl ActuatorTypeCatalog {
    /// Empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// The fixed seed table: switch, dimmer, valve, motor.
    pub fn standard() -> Self {
        let mut catalog = Self::new();
        let seed = [
            ("switch", ActuatorShape::Switch, &SWITCH_INTERFACE),
            ("dimmer", ActuatorShape::Dimmer, &DIMMER_INTERFACE),
            ("valve", ActuatorShape::Valve, &VALVE_INTERFACE),
            ("motor", ActuatorShape::Motor, &MOTOR_INTERFACE),
        ];
        for (name, shape, iface) in seed {
            catalog.categories.push(ActuatorCategory {
                name: name.to_string(),
                shape,
                required_interface: iface,
            });
            catalog.index.insert(name.to_string(), catalog.categories.len() - 1);
        }
        catalog
    }

    /// Add a category. Names must be unique.
    pub fn register_category(
        &mut self,
        name: impl Into<String>,
        shape: ActuatorShape,
        required_interface: &'static CapabilityInterface,
    ) -> RigResult<()> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(RigError::Configuration(format!(
                "actuator category '{}' registered twice",
                name
            )));
        }
        tracing::debug!(
            category = %name,
            %shape,
            interface = required_interface.name,
            "Registered actuator category"
        );
        self.index.insert(name.clone(), self.categories.len());
        self.categories.push(ActuatorCategory {
            name,
            shape,
            required_interface,
        });
        Ok(())
    }

    /// Category by name.
    pub fn get(&self, category: &str) -> Option<&ActuatorCategory> {
        self.index.get(category).map(|&i| &self.categories[i])
    }

    /// Categories in registration order.
    pub fn categories(&self) -> &[ActuatorCategory] {
        &self.categories
    }

    /// Required interfaces in registration order (may repeat).
    pub fn required_interfaces(&self) -> Vec<&'static CapabilityInterface> {
        self.categories.iter().map(|c| c.required_interface).collect()
    }

    /// Operation name to parameter schema for a category.
    pub fn list_operations(
        &self,
        category: &str,
    ) -> RigResult<BTreeMap<&'static str, &'static [ParamSpec]>> {
        let entry = self
            .get(category)
            .ok_or_else(|| RigError::UnknownCategory(category.to_string()))?;
        Ok(shape_operations(entry.shape)
            .into_iter()
            .map(|spec| (spec.name, spec.params))
            .collect())
    }

    /// Build an actuator of `category` from `plugin`, bound to `channel`.
    ///
    /// # Errors
    /// - [`RigError::UnknownCategory`] for an unregistered category
    /// - [`RigError::CapabilityMismatch`] if the plugin does not satisfy the
    ///   category's interface, or builds something of a different shape
    /// - [`RigError::InvalidConfiguration`] if the plugin rejects `configuration`
    /// - [`RigError::Driver`] if the build itself fails
    pub async fn create(
        &self,
        category: &str,
        plugin: &Plugin,
        configuration: PluginConfig,
        channel: Arc<dyn ChannelDriver>,
    ) -> RigResult<ActuatorDriver> {
        let entry = self
            .get(category)
            .ok_or_else(|| RigError::UnknownCategory(category.to_string()))?;

        let mismatch = || RigError::CapabilityMismatch {
            plugin: plugin.class_name.clone(),
            required: entry.required_interface.name.to_string(),
        };

        if !entry
            .required_interface
            .is_satisfied_by(plugin.plugin_type.operations())
        {
            return Err(mismatch());
        }

        plugin
            .plugin_type
            .validate(&configuration)
            .map_err(|e| RigError::InvalidConfiguration {
                plugin: plugin.class_name.clone(),
                reason: format!("{:#}", e),
            })?;

        let instance = plugin
            .plugin_type
            .build(configuration, Some(channel))
            .await
            .map_err(|e| {
                DriverError::from_anyhow(&plugin.class_name, DriverErrorKind::Initialization, e)
            })?;

        match instance {
            PluginInstance::Actuator(driver) if driver.shape() == entry.shape => Ok(driver),
            other => {
                tracing::warn!(
                    class_name = %plugin.class_name,
                    category,
                    built = other.kind(),
                    "Plugin built an instance of the wrong shape"
                );
                Err(mismatch())
            }
        }
    }
}
