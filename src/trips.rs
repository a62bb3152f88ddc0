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

//! Trip point registry of a thermal zone.
//!
//! The registry owns no temperatures itself: every read and write goes through
//! the zone driver. It only remembers how many trips the zone has and which of
//! them may be rewritten from outside.

use std::fmt;
use std::sync::Arc;

use crate::error::{Result, ThermalError};
use crate::ops::{ZoneCaps, ZoneOps};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TripKind {
    Critical,
    Hot,
    Passive,
    Active,
    Unknown,
}

impl TripKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TripKind::Critical => "critical",
            TripKind::Hot => "hot",
            TripKind::Passive => "passive",
            TripKind::Active => "active",
            TripKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TripKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripPoint {
    pub index: usize,
    pub kind: TripKind,
    /// Millidegrees Celsius
    pub temperature: i32,
    /// None when the driver has no hysteresis accessor
    pub hysteresis: Option<i32>,
    pub writable: bool,
}

pub struct TripPointRegistry {
    ops: Arc<dyn ZoneOps>,
    caps: ZoneCaps,
    count: usize,
    writable_mask: u32,
    writable_trips: bool,
}

impl fmt::Debug for TripPointRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TripPointRegistry")
            .field("count", &self.count)
            .field("writable_mask", &format_args!("{:#x}", self.writable_mask))
            .field("writable_trips", &self.writable_trips)
            .finish()
    }
}

impl TripPointRegistry {
    /// `writable_mask` bit `n` marks trip `n` as settable; it only takes
    /// effect when `writable_trips` is on.
    pub fn new(ops: Arc<dyn ZoneOps>, count: usize, writable_mask: u32, writable_trips: bool) -> Self {
        let caps = ops.capabilities();
        Self { ops, caps, count, writable_mask, writable_trips }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn caps(&self) -> ZoneCaps {
        self.caps
    }

    pub fn supports_temperature(&self) -> bool {
        self.caps.get_trip_temp
    }

    pub fn supports_hysteresis(&self) -> bool {
        self.caps.get_trip_hyst
    }

    pub fn hysteresis_writable(&self) -> bool {
        self.caps.get_trip_hyst && self.caps.set_trip_hyst
    }

    pub fn is_writable(&self, index: usize) -> bool {
        self.writable_trips
            && self.caps.set_trip_temp
            && index < self.count
            && index < u32::BITS as usize
            && self.writable_mask & (1 << index) != 0
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.count {
            return Err(ThermalError::TripOutOfRange { index, count: self.count });
        }
        Ok(())
    }

    pub fn kind(&self, index: usize) -> Result<TripKind> {
        if !self.caps.get_trip_type {
            return Err(ThermalError::not_supported("trip type"));
        }
        self.check_index(index)?;
        self.ops.get_trip_type(index)
    }

    pub fn temperature(&self, index: usize) -> Result<i32> {
        if !self.caps.get_trip_temp {
            return Err(ThermalError::not_supported("trip temperature"));
        }
        self.check_index(index)?;
        self.ops.get_trip_temp(index)
    }

    pub fn hysteresis(&self, index: usize) -> Result<i32> {
        if !self.caps.get_trip_hyst {
            return Err(ThermalError::not_supported("trip hysteresis"));
        }
        self.check_index(index)?;
        self.ops.get_trip_hyst(index)
    }

    pub fn describe(&self, index: usize) -> Result<TripPoint> {
        let kind = self.kind(index)?;
        let temperature = self.temperature(index)?;
        let hysteresis = if self.caps.get_trip_hyst {
            Some(self.ops.get_trip_hyst(index)?)
        } else {
            None
        };
        Ok(TripPoint {
            index,
            kind,
            temperature,
            hysteresis,
            writable: self.is_writable(index),
        })
    }

    /// True if any trip reports the passive kind. Trips whose type cannot be
    /// read are skipped.
    pub fn has_passive(&self) -> bool {
        if !self.caps.get_trip_type {
            return false;
        }
        (0..self.count).any(|i| matches!(self.ops.get_trip_type(i), Ok(TripKind::Passive)))
    }

    /// Caller holds the zone lock and fires the re-evaluation afterwards.
    pub fn set_temperature(&self, index: usize, value: i32) -> Result<()> {
        self.check_index(index)?;
        if !self.is_writable(index) {
            return Err(ThermalError::not_supported(format!("trip {} temperature is read-only", index)));
        }
        self.ops.set_trip_temp(index, value)
    }

    /// No range check here: the driver owns hysteresis semantics.
    pub fn set_hysteresis(&self, index: usize, value: i32) -> Result<()> {
        if !self.hysteresis_writable() {
            return Err(ThermalError::not_supported("trip hysteresis is read-only"));
        }
        self.check_index(index)?;
        self.ops.set_trip_hyst(index, value)
    }
}
