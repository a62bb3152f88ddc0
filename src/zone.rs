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

//! Thermal zone: trip registry, bindings, the exposed property catalogue and
//! the zone-wide control state (mode, forced passive, policy, emulation).

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::attrs::{build_zone_catalogue, teardown, AttrMode, ZoneAttr, ZoneCatalogue};
use crate::config::{Coefficient, SysfsConfig, ZoneParams};
use crate::cooling::{CoolingDevice, CoolingDeviceId};
use crate::error::{Result, ThermalError};
use crate::instance::ThermalInstance;
use crate::logger;
use crate::ops::{DeviceMode, PolicyHost, ZoneEvent, ZoneOps, THERMAL_NAME_LENGTH, THERMAL_TEMP_INVALID};
use crate::parse;
use crate::snapshot;
use crate::trips::{TripKind, TripPoint, TripPointRegistry};

/// Most trips a single zone may declare.
pub const THERMAL_MAX_TRIPS: usize = 12;

/// Device type whose bindings follow the forced passive switch.
pub const PASSIVE_DEVICE_TYPE: &str = "Processor";

/// Forced passive thresholds below this (other than 0) are refused.
const MIN_PASSIVE_THRESHOLD: i32 = 1000;
/// Passive polling interval applied when forcing passive on a zone without one.
const DEFAULT_PASSIVE_DELAY_MS: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ThermalZoneId(pub u32);

impl fmt::Display for ThermalZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "thermal_zone{}", self.0)
    }
}

/// Registration parameters of a zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ZoneDescriptor {
    pub id: ThermalZoneId,
    pub type_name: String,
    #[serde(default)]
    pub trips: usize,
    /// Bit `n` set: trip `n` temperature may be written.
    #[serde(default)]
    pub writable_mask: u32,
    /// Milliseconds; 0 means interrupt driven.
    #[serde(default)]
    pub polling_delay: u32,
    #[serde(default)]
    pub passive_delay: u32,
    /// Falls back to the first policy the host offers.
    #[serde(default)]
    pub policy: Option<String>,
    #[serde(default)]
    pub params: Option<ZoneParams>,
}

impl ZoneDescriptor {
    pub fn new(id: u32, type_name: &str, trips: usize) -> Self {
        Self {
            id: ThermalZoneId(id),
            type_name: type_name.to_string(),
            trips,
            writable_mask: 0,
            polling_delay: 0,
            passive_delay: 0,
            policy: None,
            params: None,
        }
    }
}

#[derive(Debug)]
struct ZoneState {
    temperature: i32,
    emul_temperature: i32,
    forced_passive: i32,
    polling_delay: u32,
    passive_delay: u32,
    policy: String,
    params: Option<ZoneParams>,
    instances: Vec<Arc<ThermalInstance>>,
}

impl ZoneState {
    fn next_instance_id(&self) -> u32 {
        // lowest id not held by a live binding
        let mut id = 0;
        while self.instances.iter().any(|i| i.id() == id) {
            id += 1;
        }
        id
    }

    /// Undo what forcing passive set up. No-op when passive is not forced.
    fn end_forced_passive(&mut self) {
        if self.forced_passive == 0 {
            return;
        }
        self.passive_delay = 0;
        self.set_eligible_matching(PASSIVE_DEVICE_TYPE, false);
        self.forced_passive = 0;
    }

    fn set_eligible_matching(&self, filter: &str, eligible: bool) -> usize {
        let mut touched = 0;
        for inst in self.instances.iter().filter(|i| i.matches_type(filter)) {
            inst.set_eligible(eligible);
            touched += 1;
        }
        touched
    }
}

/// Per-binding property kinds exposed next to the catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BindingAttr {
    TripPoint(u32),
    Weight(u32),
}

fn parse_binding_attr(name: &str) -> Option<BindingAttr> {
    let rest = name.strip_prefix("cdev")?;
    let (id, kind) = rest.split_once('_')?;
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let id = id.parse().ok()?;
    match kind {
        "trip_point" => Some(BindingAttr::TripPoint(id)),
        "weight" => Some(BindingAttr::Weight(id)),
        _ => None,
    }
}

pub struct ThermalZone {
    id: ThermalZoneId,
    type_name: String,
    ops: Arc<dyn ZoneOps>,
    host: Arc<dyn PolicyHost>,
    trips: TripPointRegistry,
    state: Mutex<ZoneState>,
    catalogue: RwLock<Option<ZoneCatalogue>>,
    page_size: usize,
}

impl fmt::Debug for ThermalZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThermalZone")
            .field("id", &self.id)
            .field("type_name", &self.type_name)
            .field("trips", &self.trips)
            .finish()
    }
}

impl ThermalZone {
    /// Create a zone and build its property catalogue.
    pub fn register(
        desc: ZoneDescriptor,
        ops: Arc<dyn ZoneOps>,
        host: Arc<dyn PolicyHost>,
        config: &SysfsConfig,
    ) -> Result<Arc<Self>> {
        if desc.type_name.is_empty() || desc.type_name.len() >= THERMAL_NAME_LENGTH {
            return Err(ThermalError::invalid(format!("bad zone type {:?}", desc.type_name)));
        }
        if desc.trips > THERMAL_MAX_TRIPS {
            return Err(ThermalError::invalid(format!(
                "{} trips requested, at most {} supported",
                desc.trips, THERMAL_MAX_TRIPS
            )));
        }

        let available = host.available_policies();
        let policy = match desc.policy {
            Some(name) if available.contains(&name) => name,
            Some(name) => return Err(ThermalError::invalid(format!("unknown policy {:?}", name))),
            None => available
                .first()
                .cloned()
                .ok_or_else(|| ThermalError::NotFound("thermal policy".to_string()))?,
        };

        let trips = TripPointRegistry::new(Arc::clone(&ops), desc.trips, desc.writable_mask, config.writable_trips);
        let catalogue = build_zone_catalogue(&trips, config)?;

        logger::log_event(
            "zone_registered",
            json!({
                "zone": desc.id.0,
                "type": desc.type_name,
                "trips": desc.trips,
                "attributes": catalogue.len(),
                "policy": policy,
            }),
        );

        Ok(Arc::new(Self {
            id: desc.id,
            type_name: desc.type_name,
            ops,
            host,
            trips,
            state: Mutex::new(ZoneState {
                temperature: THERMAL_TEMP_INVALID,
                emul_temperature: 0,
                forced_passive: 0,
                polling_delay: desc.polling_delay,
                passive_delay: desc.passive_delay,
                policy,
                params: desc.params,
                instances: Vec::new(),
            }),
            catalogue: RwLock::new(Some(catalogue)),
            page_size: config.page_size,
        }))
    }

    /// Tear down the catalogue and drop every binding. Safe to call twice.
    pub fn unregister(&self) -> bool {
        let torn_down = {
            let mut slot = match self.catalogue.write() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            teardown(&mut *slot)
        };
        let dropped = {
            let mut state = self.lock_state();
            std::mem::take(&mut state.instances).len()
        };
        if torn_down {
            logger::log_event("zone_unregistered", json!({ "zone": self.id.0, "bindings": dropped }));
        }
        torn_down
    }

    fn lock_state(&self) -> MutexGuard<'_, ZoneState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn lookup(&self, name: &str) -> Option<(AttrMode, ZoneAttr)> {
        let slot = match self.catalogue.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        slot.as_ref().and_then(|c| c.lookup(name))
    }

    pub fn is_registered(&self) -> bool {
        match self.catalogue.read() {
            Ok(guard) => guard.is_some(),
            Err(poisoned) => poisoned.into_inner().is_some(),
        }
    }

    pub fn id(&self) -> ThermalZoneId {
        self.id
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn trips(&self) -> &TripPointRegistry {
        &self.trips
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    // ------------------------------------------------------------------
    // Temperature
    // ------------------------------------------------------------------

    fn critical_temperature(&self) -> Option<i32> {
        (0..self.trips.len())
            .find(|&i| matches!(self.trips.kind(i), Ok(TripKind::Critical)))
            .and_then(|i| self.trips.temperature(i).ok())
    }

    /// Current temperature from the sensor. A stored emulated value replaces
    /// it unless the real reading has reached the critical trip.
    pub fn temperature(&self) -> Result<i32> {
        let sensor = self.ops.get_temp()?;
        let emul = self.lock_state().emul_temperature;
        if emul == 0 {
            return Ok(sensor);
        }
        match self.critical_temperature() {
            Some(crit) if sensor >= crit => Ok(sensor),
            _ => Ok(emul),
        }
    }

    /// Last temperature recorded by an evaluation, `None` while invalid.
    pub fn last_temperature(&self) -> Option<i32> {
        match self.lock_state().temperature {
            THERMAL_TEMP_INVALID => None,
            t => Some(t),
        }
    }

    pub fn update_temperature(&self) -> Result<i32> {
        let temp = self.temperature()?;
        self.lock_state().temperature = temp;
        Ok(temp)
    }

    pub fn set_emul_temp(&self, temp: i32) -> Result<()> {
        if self.trips.caps().set_emul_temp {
            self.ops.set_emul_temp(temp)?;
        } else {
            self.lock_state().emul_temperature = temp;
        }
        logger::log_event("emul_temp_set", json!({ "zone": self.id.0, "temp": temp }));
        self.host.zone_update(self.id, ZoneEvent::Unspecified);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Mode
    // ------------------------------------------------------------------

    pub fn mode(&self) -> Result<DeviceMode> {
        if !self.trips.caps().get_mode {
            return Err(ThermalError::not_supported("zone mode"));
        }
        self.ops.get_mode()
    }

    pub fn set_mode(&self, mode: DeviceMode) -> Result<()> {
        if !self.trips.caps().set_mode {
            return Err(ThermalError::not_supported("zone mode"));
        }
        match mode {
            DeviceMode::Enabled => self.ops.set_mode(DeviceMode::Enabled)?,
            DeviceMode::Disabled => self.clear()?,
        }
        logger::log_event("mode_set", json!({ "zone": self.id.0, "mode": mode.as_str() }));
        Ok(())
    }

    /// Disable the zone and invalidate everything the policy derived from it.
    /// The sweep runs even when the driver refuses the mode change; that
    /// error is returned afterwards.
    pub fn clear(&self) -> Result<()> {
        let result = self.ops.set_mode(DeviceMode::Disabled);

        let mut state = self.lock_state();
        state.temperature = THERMAL_TEMP_INVALID;
        state.end_forced_passive();
        for inst in &state.instances {
            inst.invalidate();
            inst.cdev().mark_stale();
            self.host.cdev_update(inst.cdev());
        }
        let bindings = state.instances.len();
        drop(state);

        logger::log_event("zone_cleared", json!({ "zone": self.id.0, "bindings": bindings }));
        result
    }

    // ------------------------------------------------------------------
    // Forced passive
    // ------------------------------------------------------------------

    pub fn passive(&self) -> i32 {
        self.lock_state().forced_passive
    }

    /// Set the forced passive threshold in millidegrees; 0 turns it off.
    pub fn set_passive(&self, threshold: i32) -> Result<()> {
        if threshold != 0 && threshold < MIN_PASSIVE_THRESHOLD {
            return Err(ThermalError::invalid(format!(
                "passive threshold {} below {}",
                threshold, MIN_PASSIVE_THRESHOLD
            )));
        }

        {
            let mut state = self.lock_state();
            if threshold != 0 && state.forced_passive == 0 {
                if state.passive_delay == 0 {
                    state.passive_delay = DEFAULT_PASSIVE_DELAY_MS;
                }
                state.set_eligible_matching(PASSIVE_DEVICE_TYPE, true);
            } else if threshold == 0 {
                state.end_forced_passive();
            }
            state.forced_passive = threshold;
        }

        logger::log_event("passive_set", json!({ "zone": self.id.0, "threshold": threshold }));
        self.host.zone_update(self.id, ZoneEvent::Unspecified);
        Ok(())
    }

    pub fn polling_delay(&self) -> u32 {
        self.lock_state().polling_delay
    }

    pub fn passive_delay(&self) -> u32 {
        self.lock_state().passive_delay
    }

    // ------------------------------------------------------------------
    // Policy and tuning parameters
    // ------------------------------------------------------------------

    pub fn policy(&self) -> String {
        self.lock_state().policy.clone()
    }

    pub fn set_policy(&self, name: &str) -> Result<()> {
        let name = parse::parse_name(name, THERMAL_NAME_LENGTH);
        if !self.host.available_policies().contains(&name) {
            return Err(ThermalError::invalid(format!("unknown policy {:?}", name)));
        }
        self.lock_state().policy = name.clone();
        logger::log_event("policy_set", json!({ "zone": self.id.0, "policy": name }));
        Ok(())
    }

    pub fn available_policies(&self) -> Vec<String> {
        self.host.available_policies()
    }

    pub fn params(&self) -> Option<ZoneParams> {
        self.lock_state().params
    }

    pub fn sustainable_power(&self) -> Result<u32> {
        self.params()
            .map(|p| p.sustainable_power)
            .ok_or(ThermalError::IoUnavailable("sustainable_power"))
    }

    pub fn set_sustainable_power(&self, value: u32) -> Result<()> {
        let mut state = self.lock_state();
        let params = state.params.as_mut().ok_or(ThermalError::IoUnavailable("sustainable_power"))?;
        params.sustainable_power = value;
        Ok(())
    }

    pub fn coefficient(&self, c: Coefficient) -> Result<i32> {
        self.params()
            .map(|p| p.coefficient(c))
            .ok_or(ThermalError::IoUnavailable(c.name()))
    }

    pub fn set_coefficient(&self, c: Coefficient, value: i32) -> Result<()> {
        let mut state = self.lock_state();
        let params = state.params.as_mut().ok_or(ThermalError::IoUnavailable(c.name()))?;
        params.set_coefficient(c, value);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Trip points
    // ------------------------------------------------------------------

    pub fn trip_point(&self, index: usize) -> Result<TripPoint> {
        let _guard = self.lock_state();
        self.trips.describe(index)
    }

    pub fn set_trip_temp(&self, index: usize, temp: i32) -> Result<()> {
        {
            let _guard = self.lock_state();
            self.trips.set_temperature(index, temp)?;
        }
        logger::log_event("trip_temp_set", json!({ "zone": self.id.0, "trip": index, "temp": temp }));
        self.host.zone_update(self.id, ZoneEvent::Unspecified);
        Ok(())
    }

    pub fn set_trip_hyst(&self, index: usize, hyst: i32) -> Result<()> {
        {
            let _guard = self.lock_state();
            self.trips.set_hysteresis(index, hyst)?;
        }
        logger::log_event("trip_hyst_set", json!({ "zone": self.id.0, "trip": index, "hyst": hyst }));
        self.host.zone_set_trips(self.id);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Bindings
    // ------------------------------------------------------------------

    /// Bind `cdev` to `trip` (`None` for a binding tied to no trip). Missing
    /// bounds default to the device's full range.
    pub fn bind(
        &self,
        cdev: &Arc<CoolingDevice>,
        trip: Option<usize>,
        upper: Option<u64>,
        lower: Option<u64>,
        weight: i32,
    ) -> Result<Arc<ThermalInstance>> {
        if let Some(index) = trip {
            if index >= self.trips.len() {
                return Err(ThermalError::TripOutOfRange { index, count: self.trips.len() });
            }
        }
        let max = cdev.max_state()?;
        let upper = upper.unwrap_or(max);
        let lower = lower.unwrap_or(0);
        if lower > upper || upper > max {
            return Err(ThermalError::invalid(format!(
                "bounds {}..={} outside 0..={}",
                lower, upper, max
            )));
        }

        let mut state = self.lock_state();
        if state.instances.iter().any(|i| i.cdev_id() == cdev.id() && i.trip() == trip) {
            return Err(ThermalError::AlreadyExists(format!("{} on trip {:?}", cdev.id(), trip)));
        }
        let inst = Arc::new(ThermalInstance::new(
            state.next_instance_id(),
            self.id,
            Arc::clone(cdev),
            trip,
            upper,
            lower,
            weight,
        ));
        state.instances.push(Arc::clone(&inst));
        drop(state);

        logger::log_event(
            "cdev_bound",
            json!({
                "zone": self.id.0,
                "cdev": cdev.id().0,
                "instance": inst.id(),
                "trip": trip,
                "upper": upper,
                "lower": lower,
            }),
        );
        Ok(inst)
    }

    pub fn unbind(&self, cdev: CoolingDeviceId, trip: Option<usize>) -> Result<()> {
        let removed = {
            let mut state = self.lock_state();
            let pos = state
                .instances
                .iter()
                .position(|i| i.cdev_id() == cdev && i.trip() == trip)
                .ok_or_else(|| ThermalError::NotFound(format!("{} on trip {:?}", cdev, trip)))?;
            state.instances.remove(pos)
        };
        logger::log_event(
            "cdev_unbound",
            json!({ "zone": self.id.0, "cdev": cdev.0, "instance": removed.id(), "trip": trip }),
        );
        Ok(())
    }

    /// Drop every binding of `cdev`; returns how many were removed.
    pub fn unbind_device(&self, cdev: CoolingDeviceId) -> usize {
        let removed = {
            let mut state = self.lock_state();
            let before = state.instances.len();
            state.instances.retain(|i| i.cdev_id() != cdev);
            before - state.instances.len()
        };
        if removed > 0 {
            logger::log_event(
                "cdev_unbound",
                json!({ "zone": self.id.0, "cdev": cdev.0, "bindings": removed }),
            );
        }
        removed
    }

    /// Bindings in creation order.
    pub fn instances(&self) -> Vec<Arc<ThermalInstance>> {
        self.lock_state().instances.clone()
    }

    pub fn instance(&self, id: u32) -> Option<Arc<ThermalInstance>> {
        self.lock_state().instances.iter().find(|i| i.id() == id).cloned()
    }

    /// Mark every binding whose device type equals `filter` eligible.
    pub fn rebind_all_matching(&self, filter: &str) -> usize {
        self.lock_state().set_eligible_matching(filter, true)
    }

    pub fn unbind_all_matching(&self, filter: &str) -> usize {
        self.lock_state().set_eligible_matching(filter, false)
    }

    // ------------------------------------------------------------------
    // Property access
    // ------------------------------------------------------------------

    pub fn config_snapshot(&self) -> Result<snapshot::ConfigSnapshot> {
        snapshot::capture(self)
    }

    /// Catalogue names followed by the per-binding properties. Empty once
    /// the zone is unregistered.
    pub fn attribute_names(&self) -> Vec<String> {
        let mut names = {
            let slot = match self.catalogue.read() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            match slot.as_ref() {
                Some(c) => c.names(),
                None => return Vec::new(),
            }
        };
        for inst in self.instances() {
            names.push(inst.trip_point_attr_name());
            names.push(inst.weight_attr_name());
        }
        names
    }

    fn binding(&self, id: u32, name: &str) -> Result<Arc<ThermalInstance>> {
        self.instance(id)
            .ok_or_else(|| ThermalError::NotFound(format!("{}/{}", self.id, name)))
    }

    fn show_binding(&self, attr: BindingAttr, name: &str) -> Result<String> {
        match attr {
            BindingAttr::TripPoint(id) => Ok(self.binding(id, name)?.render_trip_point()),
            BindingAttr::Weight(id) => Ok(format!("{}\n", self.binding(id, name)?.weight())),
        }
    }

    pub fn show(&self, name: &str) -> Result<String> {
        let (mode, attr) = match self.lookup(name) {
            Some(found) => found,
            None if self.is_registered() => match parse_binding_attr(name) {
                Some(b) => return self.show_binding(b, name),
                None => return Err(ThermalError::NotFound(format!("{}/{}", self.id, name))),
            },
            None => return Err(ThermalError::NotFound(format!("{}/{}", self.id, name))),
        };
        if !mode.readable() {
            return Err(ThermalError::not_supported(format!("{} is write-only", name)));
        }

        match attr {
            ZoneAttr::Type => Ok(format!("{}\n", self.type_name)),
            ZoneAttr::Config => self.config_snapshot()?.render(self.page_size),
            ZoneAttr::Temp => Ok(format!("{}\n", self.temperature()?)),
            ZoneAttr::Policy => Ok(format!("{}\n", self.policy())),
            ZoneAttr::AvailablePolicies => {
                let mut out = String::new();
                for p in self.available_policies() {
                    out.push_str(&p);
                    out.push(' ');
                }
                out.push('\n');
                Ok(out)
            }
            ZoneAttr::SustainablePower => Ok(format!("{}\n", self.sustainable_power()?)),
            ZoneAttr::Coefficient(c) => Ok(format!("{}\n", self.coefficient(c)?)),
            ZoneAttr::Mode => Ok(format!("{}\n", self.mode()?.as_str())),
            ZoneAttr::Passive => Ok(format!("{}\n", self.passive())),
            ZoneAttr::TripType(i) => {
                let _guard = self.lock_state();
                Ok(format!("{}\n", self.trips.kind(i)?))
            }
            ZoneAttr::TripTemp(i) => {
                let _guard = self.lock_state();
                Ok(format!("{}\n", self.trips.temperature(i)?))
            }
            ZoneAttr::TripHyst(i) => {
                let _guard = self.lock_state();
                Ok(format!("{}\n", self.trips.hysteresis(i)?))
            }
            ZoneAttr::EmulTemp => Err(ThermalError::not_supported("emul_temp is write-only")),
        }
    }

    /// Returns the number of bytes consumed.
    pub fn store(&self, name: &str, buf: &str) -> Result<usize> {
        let (mode, attr) = match self.lookup(name) {
            Some(found) => found,
            None if self.is_registered() => match parse_binding_attr(name) {
                Some(BindingAttr::Weight(id)) => {
                    let weight = parse::parse_i32_auto(buf)?;
                    self.binding(id, name)?.set_weight(weight);
                    return Ok(buf.len());
                }
                Some(BindingAttr::TripPoint(_)) => {
                    return Err(ThermalError::not_supported(format!("{} is read-only", name)));
                }
                None => return Err(ThermalError::NotFound(format!("{}/{}", self.id, name))),
            },
            None => return Err(ThermalError::NotFound(format!("{}/{}", self.id, name))),
        };
        if !mode.writable() {
            return Err(ThermalError::not_supported(format!("{} is read-only", name)));
        }

        match attr {
            ZoneAttr::Mode => {
                let mode = if buf.starts_with("enabled") {
                    DeviceMode::Enabled
                } else if buf.starts_with("disabled") {
                    DeviceMode::Disabled
                } else {
                    return Err(ThermalError::invalid(format!("unknown mode {:?}", buf)));
                };
                self.set_mode(mode)?;
            }
            ZoneAttr::Passive => self.set_passive(parse::scan_i32(buf)?)?,
            ZoneAttr::Policy => self.set_policy(buf)?,
            ZoneAttr::SustainablePower => {
                if self.params().is_none() {
                    return Err(ThermalError::IoUnavailable("sustainable_power"));
                }
                self.set_sustainable_power(parse::parse_u32(buf)?)?;
            }
            ZoneAttr::Coefficient(c) => {
                if self.params().is_none() {
                    return Err(ThermalError::IoUnavailable(c.name()));
                }
                self.set_coefficient(c, parse::parse_i32(buf)?)?;
            }
            ZoneAttr::TripTemp(i) => self.set_trip_temp(i, parse::parse_i32(buf)?)?,
            ZoneAttr::TripHyst(i) => self.set_trip_hyst(i, parse::parse_i32(buf)?)?,
            ZoneAttr::EmulTemp => self.set_emul_temp(parse::parse_i32(buf)?)?,
            _ => return Err(ThermalError::not_supported(format!("{} is read-only", name))),
        }
        Ok(buf.len())
    }
}
