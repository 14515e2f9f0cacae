//! Operation dispatch.
//!
//! [`OperationDispatcher`] runs a named operation on a device by id, without
//! the caller knowing the device's category. Each step that can fail returns
//! its own error, so "no such device" and "no such operation" are never
//! confused:
//!
//! 1. resolve the device (`NotFound`, `NotAnActuator`)
//! 2. resolve the operation in the category's table (`UnknownOperation`)
//! 3. validate keyword parameters (`InvalidParameters`)
//! 4. run the typed handler (`Driver` on plugin failure)
//!
//! There is no retry, timeout, or post-condition check; side effects belong
//! to the plugin.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use rig_core::capabilities::Reading;
use rig_core::error::{DriverError, DriverErrorKind, EntityKind, RigError, RigResult};
use rig_core::id::DeviceId;
use rig_core::interface::ParamSpec;
use rig_core::parameter::OperationArgs;
use serde_json::Value;

use crate::actuator::{call_operation, find_operation, ActuatorTypeCatalog};
use crate::directory::DeviceDirectory;

/// Invokes schema-checked operations on devices.
#[derive(Debug, Clone)]
pub struct OperationDispatcher {
    directory: Arc<DeviceDirectory>,
    actuators: Arc<ActuatorTypeCatalog>,
}

impl OperationDispatcher {
    /// Dispatcher over a directory and actuator catalog.
    pub fn new(directory: Arc<DeviceDirectory>, actuators: Arc<ActuatorTypeCatalog>) -> Self {
        Self {
            directory,
            actuators,
        }
    }

    /// Operation name to parameter schema for `category`.
    pub fn list_operations(
        &self,
        category: &str,
    ) -> RigResult<BTreeMap<&'static str, &'static [ParamSpec]>> {
        self.actuators.list_operations(category)
    }

    /// Invoke `operation` on actuator `device_id` with keyword `params`.
    ///
    /// Returns the operation's result value: `null` for commands, the
    /// current state for queries such as `is_on` or `position`.
    pub async fn invoke(
        &self,
        device_id: DeviceId,
        operation: &str,
        params: HashMap<String, Value>,
    ) -> RigResult<Value> {
        let device = self
            .directory
            .get_device(device_id)
            .ok_or_else(|| RigError::not_found(EntityKind::Device, device_id))?;
        let driver = device
            .as_actuator()
            .ok_or_else(|| RigError::NotAnActuator(device_id.to_string()))?;

        let unknown = || RigError::UnknownOperation {
            device: device_id.to_string(),
            operation: operation.to_string(),
        };
        let spec = find_operation(driver.shape(), operation).ok_or_else(unknown)?;
        let args = OperationArgs::validate(spec, params)?;

        tracing::debug!(
            device_id = %device_id,
            operation,
            category = device.category().unwrap_or_default(),
            "Invoking operation"
        );

        let call = call_operation(driver, operation, args).ok_or_else(unknown)?;
        call.await.map_err(|e| {
            tracing::warn!(device_id = %device_id, operation, error = %e, "Operation failed");
            DriverError::from_anyhow(&device.plugin.class_name, DriverErrorKind::Hardware, e)
                .into()
        })
    }

    /// Take a reading from sensor `device_id`.
    pub async fn read_sensor(&self, device_id: DeviceId) -> RigResult<Reading> {
        let device = self
            .directory
            .get_device(device_id)
            .ok_or_else(|| RigError::not_found(EntityKind::Device, device_id))?;
        let sensor = device
            .as_sensor()
            .ok_or_else(|| RigError::NotASensor(device_id.to_string()))?;

        sensor.read().await.map_err(|e| {
            DriverError::from_anyhow(&device.plugin.class_name, DriverErrorKind::Hardware, e)
                .into()
        })
    }
}
