//! Capability interfaces and structural conformance.
//!
//! A [`CapabilityInterface`] is a named list of operations, each with a typed
//! parameter list. Plugin types declare the operation surface they provide
//! (see [`PluginType::operations`](crate::driver::PluginType::operations));
//! a type satisfies an interface when every required operation appears in its
//! surface with an identical parameter signature. Extra operations are allowed.
//!
//! The [`InterfaceCatalog`] is the ordered set of interfaces the plugin
//! registry matches against: Channel, Sensor, then one interface per actuator
//! category in registration order, deduplicated by name.

use serde::Serialize;

// =============================================================================
// Parameter and Operation Schemas
// =============================================================================

/// Type of a single operation parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    /// Signed integer. JSON integers only.
    Int,
    /// Floating point. JSON integers are accepted and widened.
    Float,
    /// Boolean.
    Bool,
    /// UTF-8 string.
    Str,
}

impl ParamType {
    /// Lowercase name used in listings and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::Int => "int",
            ParamType::Float => "float",
            ParamType::Bool => "bool",
            ParamType::Str => "str",
        }
    }
}

impl std::fmt::Display for ParamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, typed operation parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ParamSpec {
    /// Keyword name.
    pub name: &'static str,
    /// Expected type.
    #[serde(rename = "type")]
    pub ty: ParamType,
}

impl ParamSpec {
    /// Const constructor for static tables.
    pub const fn new(name: &'static str, ty: ParamType) -> Self {
        Self { name, ty }
    }
}

/// A named operation with its ordered parameter list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct OperationSpec {
    /// Operation name.
    pub name: &'static str,
    /// Declared parameters, in declaration order.
    pub params: &'static [ParamSpec],
}

impl OperationSpec {
    /// Const constructor for static tables.
    pub const fn new(name: &'static str, params: &'static [ParamSpec]) -> Self {
        Self { name, params }
    }

    /// Look up a declared parameter by name.
    pub fn param(&self, name: &str) -> Option<&'static ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Same name and same parameter list (names, types, order).
    pub fn same_signature(&self, other: &OperationSpec) -> bool {
        self.name == other.name && self.params == other.params
    }
}

// =============================================================================
// Capability Interfaces
// =============================================================================

/// A named contract of required operations.
///
/// Identity is the name: two interfaces with the same name are the same
/// interface.
#[derive(Debug, Serialize)]
pub struct CapabilityInterface {
    /// Interface name (e.g. `DimmerPluginInterface`).
    pub name: &'static str,
    /// Operations a conforming plugin type must declare.
    pub operations: &'static [OperationSpec],
}

impl CapabilityInterface {
    /// True if every required operation is present in `surface` with an
    /// identical parameter signature.
    pub fn is_satisfied_by(&self, surface: &[OperationSpec]) -> bool {
        self.operations.iter().all(|required| {
            surface
                .iter()
                .any(|provided| provided.same_signature(required))
        })
    }

    /// Required operations missing from `surface`, for diagnostics.
    pub fn missing_from(&self, surface: &[OperationSpec]) -> Vec<&'static str> {
        self.operations
            .iter()
            .filter(|required| !surface.iter().any(|p| p.same_signature(required)))
            .map(|required| required.name)
            .collect()
    }
}

impl PartialEq for CapabilityInterface {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for CapabilityInterface {}

const NO_PARAMS: &[ParamSpec] = &[];

/// Communication channels.
pub static CHANNEL_INTERFACE: CapabilityInterface = CapabilityInterface {
    name: "ChannelPluginInterface",
    operations: &[
        OperationSpec::new("open", NO_PARAMS),
        OperationSpec::new("close", NO_PARAMS),
        OperationSpec::new("transact", &[ParamSpec::new("request", ParamType::Str)]),
    ],
};

/// Sensors.
pub static SENSOR_INTERFACE: CapabilityInterface = CapabilityInterface {
    name: "SensorPluginInterface",
    operations: &[OperationSpec::new("read", NO_PARAMS)],
};

/// Two-state switches.
pub static SWITCH_INTERFACE: CapabilityInterface = CapabilityInterface {
    name: "SwitchPluginInterface",
    operations: &[
        OperationSpec::new("turn_on", NO_PARAMS),
        OperationSpec::new("turn_off", NO_PARAMS),
        OperationSpec::new("is_on", NO_PARAMS),
    ],
};

/// Level-controlled dimmers.
pub static DIMMER_INTERFACE: CapabilityInterface = CapabilityInterface {
    name: "DimmerPluginInterface",
    operations: &[
        OperationSpec::new("set_level", &[ParamSpec::new("level", ParamType::Int)]),
        OperationSpec::new("level", NO_PARAMS),
        OperationSpec::new("turn_off", NO_PARAMS),
    ],
};

/// Flow valves.
pub static VALVE_INTERFACE: CapabilityInterface = CapabilityInterface {
    name: "ValvePluginInterface",
    operations: &[
        OperationSpec::new("open", NO_PARAMS),
        OperationSpec::new("close", NO_PARAMS),
        OperationSpec::new(
            "set_position",
            &[ParamSpec::new("percent", ParamType::Float)],
        ),
        OperationSpec::new("position", NO_PARAMS),
    ],
};

/// Positioning motors.
pub static MOTOR_INTERFACE: CapabilityInterface = CapabilityInterface {
    name: "MotorPluginInterface",
    operations: &[
        OperationSpec::new("move_to", &[ParamSpec::new("position", ParamType::Float)]),
        OperationSpec::new("stop", NO_PARAMS),
        OperationSpec::new("position", NO_PARAMS),
    ],
};

// =============================================================================
// Interface Catalog
// =============================================================================

/// Ordered, deduplicated set of interfaces plugins are matched against.
///
/// Order matters: a plugin type is bound to the first interface it
/// satisfies.
#[derive(Debug, Clone)]
pub struct InterfaceCatalog {
    interfaces: Vec<&'static CapabilityInterface>,
}

impl InterfaceCatalog {
    /// Channel and Sensor first, then the given actuator interfaces in order.
    pub fn new<I>(actuator_interfaces: I) -> Self
    where
        I: IntoIterator<Item = &'static CapabilityInterface>,
    {
        let mut interfaces: Vec<&'static CapabilityInterface> =
            vec![&CHANNEL_INTERFACE, &SENSOR_INTERFACE];
        for iface in actuator_interfaces {
            if !interfaces.iter().any(|known| known.name == iface.name) {
                interfaces.push(iface);
            }
        }
        Self { interfaces }
    }

    /// Interfaces in matching order.
    pub fn iter(&self) -> impl Iterator<Item = &'static CapabilityInterface> + '_ {
        self.interfaces.iter().copied()
    }

    /// Interface names in matching order.
    pub fn names(&self) -> Vec<&'static str> {
        self.interfaces.iter().map(|i| i.name).collect()
    }

    /// Look up an interface by name.
    pub fn get(&self, name: &str) -> Option<&'static CapabilityInterface> {
        self.iter().find(|i| i.name == name)
    }

    /// First interface satisfied by `surface`.
    pub fn first_match(&self, surface: &[OperationSpec]) -> Option<&'static CapabilityInterface> {
        self.iter().find(|i| i.is_satisfied_by(surface))
    }

    /// Number of interfaces.
    pub fn len(&self) -> usize {
        self.interfaces.len()
    }

    /// Never true in practice; Channel and Sensor are always present.
    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty()
    }
}
