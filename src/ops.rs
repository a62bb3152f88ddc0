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

//! Interfaces to the collaborators that sit outside this crate: the zone
//! driver, the cooling device driver and the policy host that re-evaluates
//! zones and devices when their configuration changes.

use crate::cooling::CoolingDevice;
use crate::error::{Result, ThermalError};
use crate::trips::TripKind;
use crate::zone::ThermalZoneId;

/// Temperature reported for a zone that has not been sampled.
pub const THERMAL_TEMP_INVALID: i32 = -274_000;

/// Upper bound on zone, device and policy names, terminator included.
pub const THERMAL_NAME_LENGTH: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceMode {
    Enabled,
    Disabled,
}

impl DeviceMode {
    pub fn as_str(self) -> &'static str {
        match self {
            DeviceMode::Enabled => "enabled",
            DeviceMode::Disabled => "disabled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ZoneEvent {
    Unspecified,
}

/// Which optional accessors a zone driver implements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZoneCaps {
    pub get_mode: bool,
    pub set_mode: bool,
    pub get_trip_type: bool,
    pub get_trip_temp: bool,
    pub set_trip_temp: bool,
    pub get_trip_hyst: bool,
    pub set_trip_hyst: bool,
    pub set_emul_temp: bool,
}

impl ZoneCaps {
    /// Type and temperature readers for trips, nothing else.
    pub fn trips_read_only() -> Self {
        Self { get_trip_type: true, get_trip_temp: true, ..Self::default() }
    }

    pub fn with_mode(mut self) -> Self {
        self.get_mode = true;
        self.set_mode = true;
        self
    }

    pub fn with_hysteresis(mut self, writable: bool) -> Self {
        self.get_trip_hyst = true;
        self.set_trip_hyst = writable;
        self
    }

    pub fn with_writable_trips(mut self) -> Self {
        self.set_trip_temp = true;
        self
    }
}

fn absent(what: &str) -> ThermalError {
    ThermalError::not_supported(format!("driver has no {} accessor", what))
}

/// Driver side of a thermal zone. Accessors the driver lacks keep the default
/// body and must be left out of `capabilities()`.
#[cfg_attr(test, mockall::automock)]
pub trait ZoneOps: Send + Sync {
    fn capabilities(&self) -> ZoneCaps;

    fn get_temp(&self) -> Result<i32>;

    fn get_mode(&self) -> Result<DeviceMode> {
        Err(absent("get_mode"))
    }

    fn set_mode(&self, _mode: DeviceMode) -> Result<()> {
        Err(absent("set_mode"))
    }

    fn get_trip_type(&self, _trip: usize) -> Result<TripKind> {
        Err(absent("get_trip_type"))
    }

    fn get_trip_temp(&self, _trip: usize) -> Result<i32> {
        Err(absent("get_trip_temp"))
    }

    fn set_trip_temp(&self, _trip: usize, _temp: i32) -> Result<()> {
        Err(absent("set_trip_temp"))
    }

    fn get_trip_hyst(&self, _trip: usize) -> Result<i32> {
        Err(absent("get_trip_hyst"))
    }

    fn set_trip_hyst(&self, _trip: usize, _hyst: i32) -> Result<()> {
        Err(absent("set_trip_hyst"))
    }

    fn set_emul_temp(&self, _temp: i32) -> Result<()> {
        Err(absent("set_emul_temp"))
    }
}

/// Driver side of a cooling device.
#[cfg_attr(test, mockall::automock)]
pub trait CoolingOps: Send + Sync {
    fn get_max_state(&self) -> Result<u64>;
    fn get_cur_state(&self) -> Result<u64>;
    fn set_cur_state(&self, state: u64) -> Result<()>;
}

/// Policy collaborator. Callbacks may arrive with the zone lock held, so
/// implementations must not call back into the zone that notified them.
pub trait PolicyHost: Send + Sync {
    /// Re-evaluate the zone against its trips.
    fn zone_update(&self, zone: ThermalZoneId, event: ZoneEvent);
    /// Recompute the effective trip window after a hysteresis change.
    fn zone_set_trips(&self, zone: ThermalZoneId);
    /// Re-evaluate the target state of a cooling device.
    fn cdev_update(&self, cdev: &CoolingDevice);
    /// Names of the registered policies, in registration order.
    fn available_policies(&self) -> Vec<String>;
}
