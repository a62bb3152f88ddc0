/*
 * This file is part of Hyperfan.
 *
 * Copyright (C) 2025 Hyperfan contributors
 *
 * Hyperfan is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Hyperfan is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Hyperfan. If not, see <https://www.gnu.org/licenses/>.
 */

//! thermal-sysfs - Introspectable state of thermal zones and cooling devices
//!
//! This library keeps the property catalogue of a thermal zone (fixed,
//! conditional and per-trip properties), the bindings between trips and
//! cooling devices, and per cooling device transition statistics. Drivers
//! and the policy engine are reached only through the traits in [`ops`].

pub mod attrs;
pub mod clock;
pub mod config;
pub mod cooling;
pub mod error;
pub mod instance;
pub mod logger;
pub mod ops;
pub mod parse;
pub mod snapshot;
pub mod stats;
pub mod trips;
pub mod zone;

#[cfg(test)]
pub mod test_utils;

pub use config::{SysfsConfig, ZoneParams};
pub use cooling::{CoolingDevice, CoolingDeviceId};
pub use error::{Result, ThermalError};
pub use instance::ThermalInstance;
pub use ops::{CoolingOps, DeviceMode, PolicyHost, ZoneCaps, ZoneEvent, ZoneOps};
pub use snapshot::ConfigSnapshot;
pub use stats::CoolingStats;
pub use trips::{TripKind, TripPoint};
pub use zone::{ThermalZone, ThermalZoneId, ZoneDescriptor};
