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

//! Cooling device: driver state, its property set and optional statistics.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::json;

use crate::attrs::{build_cdev_catalogue, AttrMode, CdevAttr, CdevCatalogue};
use crate::clock::{Clock, MonotonicClock};
use crate::config::SysfsConfig;
use crate::error::{Result, ThermalError};
use crate::logger;
use crate::ops::{CoolingOps, THERMAL_NAME_LENGTH};
use crate::parse;
use crate::stats::CoolingStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CoolingDeviceId(pub u32);

impl fmt::Display for CoolingDeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cooling_device{}", self.0)
    }
}

#[derive(Debug)]
struct DeviceState {
    // false once a zone asks for this device to be re-evaluated
    updated: bool,
}

pub struct CoolingDevice {
    id: CoolingDeviceId,
    type_name: String,
    ops: Arc<dyn CoolingOps>,
    state: Mutex<DeviceState>,
    stats: Option<CoolingStats>,
    catalogue: CdevCatalogue,
    page_size: usize,
}

impl fmt::Debug for CoolingDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoolingDevice")
            .field("id", &self.id)
            .field("type_name", &self.type_name)
            .field("stats", &self.stats.is_some())
            .finish()
    }
}

impl CoolingDevice {
    pub fn register(
        id: CoolingDeviceId,
        type_name: &str,
        ops: Arc<dyn CoolingOps>,
        config: &SysfsConfig,
    ) -> Result<Arc<Self>> {
        Self::register_with_clock(id, type_name, ops, config, Arc::new(MonotonicClock::new()))
    }

    /// Statistics are set up only when enabled and the driver reports its
    /// maximum state; otherwise the device simply has none.
    pub fn register_with_clock(
        id: CoolingDeviceId,
        type_name: &str,
        ops: Arc<dyn CoolingOps>,
        config: &SysfsConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Arc<Self>> {
        if type_name.is_empty() {
            return Err(ThermalError::invalid("cooling device type is empty"));
        }
        let type_name = parse::parse_name(type_name, THERMAL_NAME_LENGTH);

        let stats = if config.statistics {
            match ops.get_max_state().and_then(|max| CoolingStats::new(max, clock)) {
                Ok(stats) => Some(stats),
                Err(e) => {
                    logger::log_event(
                        "cdev_stats_unavailable",
                        json!({ "cdev": id.0, "reason": e.to_string() }),
                    );
                    None
                }
            }
        } else {
            None
        };
        let catalogue = build_cdev_catalogue(stats.is_some())?;

        logger::log_event(
            "cdev_registered",
            json!({ "cdev": id.0, "type": type_name, "stats": stats.is_some() }),
        );
        Ok(Arc::new(Self {
            id,
            type_name,
            ops,
            state: Mutex::new(DeviceState { updated: true }),
            stats,
            catalogue,
            page_size: config.page_size,
        }))
    }

    fn lock_state(&self) -> MutexGuard<'_, DeviceState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn id(&self) -> CoolingDeviceId {
        self.id
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn stats(&self) -> Option<&CoolingStats> {
        self.stats.as_ref()
    }

    fn stats_or_err(&self) -> Result<&CoolingStats> {
        self.stats.as_ref().ok_or(ThermalError::NoDevice(self.id.0))
    }

    pub fn max_state(&self) -> Result<u64> {
        self.ops.get_max_state()
    }

    pub fn cur_state(&self) -> Result<u64> {
        self.ops.get_cur_state()
    }

    /// Drive the device to `state` and account the transition. Holds the
    /// device lock across the driver call and the statistics update.
    pub fn set_cur_state(&self, state: u64) -> Result<()> {
        let _guard = self.lock_state();
        let max = self.ops.get_max_state()?;
        if state > max {
            return Err(ThermalError::invalid(format!("state {} above max state {}", state, max)));
        }
        self.ops.set_cur_state(state)?;
        if let Some(stats) = &self.stats {
            // a driver whose max grew after registration has states stats cannot hold
            if let Err(e) = stats.record_transition(state as usize) {
                logger::log_event(
                    "cdev_stats_dropped",
                    json!({ "cdev": self.id.0, "state": state, "reason": e.to_string() }),
                );
            }
        }
        logger::log_event("cur_state_set", json!({ "cdev": self.id.0, "state": state }));
        Ok(())
    }

    /// Flag the device for re-evaluation. Callers holding a zone lock take
    /// this (inner) lock only for the flag update.
    pub fn mark_stale(&self) {
        self.lock_state().updated = false;
    }

    pub fn mark_updated(&self) {
        self.lock_state().updated = true;
    }

    pub fn is_updated(&self) -> bool {
        self.lock_state().updated
    }

    pub fn reset_stats(&self) -> Result<()> {
        self.stats_or_err()?.reset();
        logger::log_event("stats_reset", json!({ "cdev": self.id.0 }));
        Ok(())
    }

    pub fn attribute_names(&self) -> Vec<String> {
        self.catalogue.names()
    }

    fn lookup(&self, name: &str) -> Result<(AttrMode, CdevAttr)> {
        self.catalogue
            .lookup(name)
            .ok_or_else(|| ThermalError::NotFound(format!("{}/{}", self.id, name)))
    }

    pub fn show(&self, name: &str) -> Result<String> {
        let (mode, attr) = self.lookup(name)?;
        if !mode.readable() {
            return Err(ThermalError::not_supported(format!("{} is write-only", name)));
        }
        match attr {
            CdevAttr::Type => Ok(format!("{}\n", self.type_name)),
            CdevAttr::MaxState => Ok(format!("{}\n", self.max_state()?)),
            CdevAttr::CurState => Ok(format!("{}\n", self.cur_state()?)),
            CdevAttr::TotalTrans => Ok(self.stats_or_err()?.render_total_trans()),
            CdevAttr::TimeInStateMs => Ok(self.stats_or_err()?.render_time_in_state()),
            CdevAttr::TransTable => self.stats_or_err()?.render_trans_table(self.page_size),
            CdevAttr::Reset => Err(ThermalError::not_supported("reset is write-only")),
        }
    }

    /// Returns the number of bytes consumed.
    pub fn store(&self, name: &str, buf: &str) -> Result<usize> {
        let (mode, attr) = self.lookup(name)?;
        if !mode.writable() {
            return Err(ThermalError::not_supported(format!("{} is read-only", name)));
        }
        match attr {
            CdevAttr::CurState => {
                let state = parse::scan_i64(buf)?;
                let state = u64::try_from(state)
                    .map_err(|_| ThermalError::invalid(format!("negative state {}", state)))?;
                self.set_cur_state(state)?;
            }
            CdevAttr::Reset => self.reset_stats()?,
            _ => return Err(ThermalError::not_supported(format!("{} is read-only", name))),
        }
        Ok(buf.len())
    }
}
