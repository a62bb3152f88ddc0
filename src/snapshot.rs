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

//! Consolidated, read-only view of a zone's configuration.
//!
//! The snapshot is assembled from several short reads and never holds the
//! zone lock across all of them, so concurrent writers may leave it torn
//! across fields.

use std::fmt::{self, Write as _};

use serde::Serialize;

use crate::error::Result;
use crate::ops::THERMAL_NAME_LENGTH;
use crate::trips::TripPointRegistry;
use crate::zone::ThermalZone;

/// Widest rendering of one `i32` plus its separator.
const INT_FIELD_CHARS: usize = 11;

/// Space separated per-trip columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TripLists {
    pub trip: String,
    pub set_temp: String,
    /// Absent when the zone has no hysteresis accessor.
    pub clr_temp: Option<String>,
}

/// Bound devices grouped by trip: the first device of a trip is prefixed
/// with a space, further ones with `+`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceLists {
    pub device: String,
    pub upper_limit: String,
    pub lower_limit: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigSnapshot {
    pub sensor: String,
    pub algo_type: String,
    pub polling_delay: u32,
    pub passive_delay: u32,
    pub trips: Option<TripLists>,
    pub devices: Option<DeviceLists>,
}

fn scratch(capacity: usize) -> Result<String> {
    let mut buf = String::new();
    buf.try_reserve_exact(capacity)?;
    Ok(buf)
}

fn capture_trips(trips: &TripPointRegistry) -> Result<Option<TripLists>> {
    let count = trips.len();
    if count == 0 || !trips.supports_temperature() {
        return Ok(None);
    }

    let size = count.saturating_mul(INT_FIELD_CHARS);
    let mut trip = scratch(size)?;
    let mut set_temp = scratch(size)?;
    let mut clr_temp = if trips.supports_hysteresis() { Some(scratch(size)?) } else { None };

    for i in 0..count {
        let _ = write!(trip, "{} ", i);
        let _ = write!(set_temp, "{} ", trips.temperature(i)?);
        if let Some(buf) = clr_temp.as_mut() {
            let _ = write!(buf, "{} ", trips.hysteresis(i)?);
        }
    }
    Ok(Some(TripLists { trip, set_temp, clr_temp }))
}

fn capture_devices(zone: &ThermalZone) -> Result<Option<DeviceLists>> {
    let count = zone.trips().len();
    let instances = zone.instances();
    if !instances.iter().any(|i| i.trip().map_or(false, |t| t < count)) {
        return Ok(None);
    }

    let size = instances.len().saturating_mul(THERMAL_NAME_LENGTH);
    let mut lists = DeviceLists {
        device: scratch(size)?,
        upper_limit: scratch(size)?,
        lower_limit: scratch(size)?,
    };
    for trip in 0..count {
        let mut first = true;
        for inst in instances.iter().filter(|i| i.trip() == Some(trip)) {
            let sep = if first { ' ' } else { '+' };
            first = false;
            let _ = write!(lists.device, "{}{}", sep, inst.cdev().type_name());
            let _ = write!(lists.upper_limit, "{}{}", sep, inst.upper());
            let _ = write!(lists.lower_limit, "{}{}", sep, inst.lower());
        }
    }
    Ok(Some(lists))
}

/// Gather the snapshot. Any driver failure aborts the whole report.
pub fn capture(zone: &ThermalZone) -> Result<ConfigSnapshot> {
    let trips = capture_trips(zone.trips())?;
    // devices are only reported alongside the trip columns
    let devices = match trips {
        Some(_) => capture_devices(zone)?,
        None => None,
    };
    Ok(ConfigSnapshot {
        sensor: zone.type_name().to_string(),
        algo_type: zone.policy(),
        polling_delay: zone.polling_delay(),
        passive_delay: zone.passive_delay(),
        trips,
        devices,
    })
}

impl ConfigSnapshot {
    /// Text form, cut short to fit below `page_size` bytes.
    pub fn render(&self, page_size: usize) -> Result<String> {
        let mut out = self.to_string();
        let limit = page_size.saturating_sub(1);
        if out.len() > limit {
            let mut end = limit;
            while !out.is_char_boundary(end) {
                end -= 1;
            }
            out.truncate(end);
        }
        Ok(out)
    }
}

impl fmt::Display for ConfigSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "sensor {}", self.sensor)?;
        writeln!(f, "algo_type {}", self.algo_type)?;
        writeln!(f, "polling_delay {}", self.polling_delay)?;
        writeln!(f, "passive_delay {}", self.passive_delay)?;
        if let Some(trips) = &self.trips {
            writeln!(f, "trip {}", trips.trip)?;
            writeln!(f, "set_temp {}", trips.set_temp)?;
            if let Some(clr) = &trips.clr_temp {
                writeln!(f, "clr_temp {}", clr)?;
            }
        }
        if let Some(devices) = &self.devices {
            writeln!(f, "device {}", devices.device)?;
            writeln!(f, "upper_limit {}", devices.upper_limit)?;
            writeln!(f, "lower_limit {}", devices.lower_limit)?;
        }
        Ok(())
    }
}
