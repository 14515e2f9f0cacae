//! Mock Hardware Drivers for rig
//!
//! Simulated plugin types for every capability interface, so a rig can be
//! assembled and exercised without hardware. All mock devices use async-safe
//! operations (`tokio::time::sleep`, never `std::thread::sleep`).
//!
//! # Available Plugin Types
//!
//! | Symbol                | Driver                 | Interface                |
//! |-----------------------|------------------------|--------------------------|
//! | `mock.serial_channel` | [`MockSerialChannel`]  | `ChannelPluginInterface` |
//! | `mock.thermometer`    | [`MockThermometer`]    | `SensorPluginInterface`  |
//! | `mock.relay`          | [`MockRelay`]          | `SwitchPluginInterface`  |
//! | `mock.dimmer`         | [`MockDimmer`]         | `DimmerPluginInterface`  |
//! | `mock.valve`          | [`MockValve`]          | `ValvePluginInterface`   |
//! | `mock.motor`          | [`MockMotor`]          | `MotorPluginInterface`   |
//!
//! Devices other than the channel talk through their equipment's channel, so
//! [`MockSerialChannel::history`] shows every command a rig sent.
//!
//! # Modes
//!
//! Every type accepts `mode` (`instant`, `realistic`, `chaos`), plus
//! `failure_rate` and `seed` for chaos mode.
//!
//! # Registration
//!
//! ```rust,ignore
//! let mut library = DriverLibrary::new();
//! rig_driver_mock::register_all(&mut library)?;
//! ```

pub mod common;
mod mock_channel;
mod mock_dimmer;
mod mock_motor;
mod mock_relay;
mod mock_thermometer;
mod mock_valve;

use rig_core::driver::DriverLibrary;
use rig_core::error::RigResult;

pub use common::{ErrorConfig, MockBehavior, MockMode, MockRng, TimingConfig};

pub use mock_channel::{MockSerialChannel, MockSerialChannelConfig, MockSerialChannelType};
pub use mock_dimmer::{MockDimmer, MockDimmerConfig, MockDimmerType};
pub use mock_motor::{MockMotor, MockMotorConfig, MockMotorType};
pub use mock_relay::{MockRelay, MockRelayConfig, MockRelayType};
pub use mock_thermometer::{MockThermometer, MockThermometerConfig, MockThermometerType};
pub use mock_valve::{MockValve, MockValveConfig, MockValveType};

/// Register every mock plugin type with `library`.
///
/// Fails if any mock symbol is already present.
pub fn register_all(library: &mut DriverLibrary) -> RigResult<()> {
    library.register(MockSerialChannelType)?;
    library.register(MockThermometerType)?;
    library.register(MockRelayType)?;
    library.register(MockDimmerType)?;
    library.register(MockValveType)?;
    library.register(MockMotorType)?;
    Ok(())
}

/// Symbols registered by [`register_all`], sorted.
pub fn symbols() -> [&'static str; 6] {
    [
        mock_dimmer::SYMBOL,
        mock_motor::SYMBOL,
        mock_relay::SYMBOL,
        mock_channel::SYMBOL,
        mock_thermometer::SYMBOL,
        mock_valve::SYMBOL,
    ]
}
