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

//! Binding between one trip of a zone and one cooling device.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU64, Ordering};
use std::sync::Arc;

use crate::cooling::{CoolingDevice, CoolingDeviceId};
use crate::zone::ThermalZoneId;

/// Target value meaning "the policy has not picked a state".
pub const THERMAL_NO_TARGET: u64 = u64::MAX;

pub const THERMAL_WEIGHT_DEFAULT: i32 = 0;

pub struct ThermalInstance {
    id: u32,
    zone: ThermalZoneId,
    cdev: Arc<CoolingDevice>,
    trip: Option<usize>,
    upper: u64,
    lower: u64,
    weight: AtomicI32,
    initialized: AtomicBool,
    target: AtomicU64,
    eligible: AtomicBool,
}

impl fmt::Debug for ThermalInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThermalInstance")
            .field("id", &self.id)
            .field("zone", &self.zone)
            .field("cdev", &self.cdev.id())
            .field("trip", &self.trip)
            .field("upper", &self.upper)
            .field("lower", &self.lower)
            .field("weight", &self.weight())
            .field("initialized", &self.is_initialized())
            .field("target", &self.target())
            .finish()
    }
}

impl ThermalInstance {
    /// Bounds are validated by the zone before construction.
    pub(crate) fn new(
        id: u32,
        zone: ThermalZoneId,
        cdev: Arc<CoolingDevice>,
        trip: Option<usize>,
        upper: u64,
        lower: u64,
        weight: i32,
    ) -> Self {
        Self {
            id,
            zone,
            cdev,
            trip,
            upper,
            lower,
            weight: AtomicI32::new(weight),
            initialized: AtomicBool::new(false),
            target: AtomicU64::new(THERMAL_NO_TARGET),
            eligible: AtomicBool::new(true),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn zone(&self) -> ThermalZoneId {
        self.zone
    }

    pub fn cdev(&self) -> &Arc<CoolingDevice> {
        &self.cdev
    }

    pub fn cdev_id(&self) -> CoolingDeviceId {
        self.cdev.id()
    }

    /// `None` for a binding that is not tied to any trip.
    pub fn trip(&self) -> Option<usize> {
        self.trip
    }

    pub fn upper(&self) -> u64 {
        self.upper
    }

    pub fn lower(&self) -> u64 {
        self.lower
    }

    pub fn weight(&self) -> i32 {
        self.weight.load(Ordering::Relaxed)
    }

    pub fn set_weight(&self, weight: i32) {
        self.weight.store(weight, Ordering::Relaxed);
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    pub fn set_initialized(&self, initialized: bool) {
        self.initialized.store(initialized, Ordering::Release);
    }

    pub fn target(&self) -> Option<u64> {
        match self.target.load(Ordering::Acquire) {
            THERMAL_NO_TARGET => None,
            t => Some(t),
        }
    }

    /// Record the policy's choice, clamped into this binding's bounds.
    pub fn set_target(&self, target: Option<u64>) {
        let raw = match target {
            Some(t) => t.clamp(self.lower, self.upper),
            None => THERMAL_NO_TARGET,
        };
        self.target.store(raw, Ordering::Release);
    }

    /// Forget what the policy decided; the next evaluation starts over.
    pub fn invalidate(&self) {
        self.set_initialized(false);
        self.target.store(THERMAL_NO_TARGET, Ordering::Release);
    }

    /// Whether the policy may drive this binding. Cleared and set by
    /// device-name matching when forced passive is toggled.
    pub fn is_eligible(&self) -> bool {
        self.eligible.load(Ordering::Acquire)
    }

    pub fn set_eligible(&self, eligible: bool) {
        self.eligible.store(eligible, Ordering::Release);
    }

    pub fn matches_type(&self, filter: &str) -> bool {
        self.cdev.type_name() == filter
    }

    pub fn trip_point_attr_name(&self) -> String {
        format!("cdev{}_trip_point", self.id)
    }

    pub fn weight_attr_name(&self) -> String {
        format!("cdev{}_weight", self.id)
    }

    pub fn render_trip_point(&self) -> String {
        match self.trip {
            Some(trip) => format!("{}\n", trip),
            None => "-1\n".to_string(),
        }
    }
}
