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

//! Property catalogues for zones and cooling devices.
//!
//! A catalogue is built once when the object is registered and never
//! rebuilt; what changes afterwards are the values behind the properties,
//! which are always resolved through the owning zone or device. Each trip
//! property carries its trip index, so no name parsing happens on access.

use crate::config::{Coefficient, SysfsConfig};
use crate::error::{Result, ThermalError};
use crate::trips::TripPointRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrMode {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

impl AttrMode {
    pub fn readable(self) -> bool {
        matches!(self, AttrMode::ReadOnly | AttrMode::ReadWrite)
    }

    pub fn writable(self) -> bool {
        matches!(self, AttrMode::WriteOnly | AttrMode::ReadWrite)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute<T> {
    pub name: String,
    pub mode: AttrMode,
    pub target: T,
}

impl<T> Attribute<T> {
    fn new(name: impl Into<String>, mode: AttrMode, target: T) -> Self {
        Self { name: name.into(), mode, target }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeGroup<T> {
    /// Subdirectory name; `None` for the object's own directory.
    pub name: Option<&'static str>,
    pub attrs: Vec<Attribute<T>>,
}

impl<T: Copy> AttributeGroup<T> {
    fn lookup(&self, name: &str) -> Option<(AttrMode, T)> {
        let local = match (self.name, name.split_once('/')) {
            (Some(group), Some((prefix, rest))) if group == prefix => rest,
            (None, None) => name,
            _ => return None,
        };
        self.attrs
            .iter()
            .find(|a| a.name == local)
            .map(|a| (a.mode, a.target))
    }

    fn full_names(&self) -> impl Iterator<Item = String> + '_ {
        self.attrs.iter().map(move |a| match self.name {
            Some(group) => format!("{}/{}", group, a.name),
            None => a.name.clone(),
        })
    }
}

fn reserved_group<T>(name: Option<&'static str>, capacity: usize) -> Result<AttributeGroup<T>> {
    let mut attrs = Vec::new();
    attrs
        .try_reserve_exact(capacity)
        .map_err(|_| ThermalError::OutOfMemory("attribute group"))?;
    Ok(AttributeGroup { name, attrs })
}

// ============================================================================
// Thermal zone
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneAttr {
    Type,
    Config,
    Temp,
    EmulTemp,
    Policy,
    AvailablePolicies,
    SustainablePower,
    Coefficient(Coefficient),
    Mode,
    Passive,
    TripType(usize),
    TripTemp(usize),
    TripHyst(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneCatalogue {
    fixed: AttributeGroup<ZoneAttr>,
    mode: Option<AttributeGroup<ZoneAttr>>,
    passive: Option<AttributeGroup<ZoneAttr>>,
    trips: Option<AttributeGroup<ZoneAttr>>,
}

impl ZoneCatalogue {
    fn groups(&self) -> impl Iterator<Item = &AttributeGroup<ZoneAttr>> {
        std::iter::once(&self.fixed)
            .chain(self.mode.iter())
            .chain(self.passive.iter())
            .chain(self.trips.iter())
    }

    pub fn lookup(&self, name: &str) -> Option<(AttrMode, ZoneAttr)> {
        self.groups().find_map(|g| g.lookup(name))
    }

    /// Every property name, in exposure order.
    pub fn names(&self) -> Vec<String> {
        self.groups().flat_map(|g| g.full_names()).collect()
    }

    pub fn len(&self) -> usize {
        self.groups().map(|g| g.attrs.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_mode(&self) -> bool {
        self.mode.is_some()
    }

    pub fn has_passive(&self) -> bool {
        self.passive.is_some()
    }

    /// Entries of the per-trip group: 3 per trip with hysteresis, 2 without.
    pub fn trip_attr_count(&self) -> usize {
        self.trips.as_ref().map_or(0, |g| g.attrs.len())
    }
}

fn build_fixed_group(config: &SysfsConfig) -> Result<AttributeGroup<ZoneAttr>> {
    let mut group = reserved_group(None, 7 + Coefficient::ALL.len())?;
    let attrs = &mut group.attrs;
    attrs.push(Attribute::new("type", AttrMode::ReadOnly, ZoneAttr::Type));
    attrs.push(Attribute::new("config", AttrMode::ReadOnly, ZoneAttr::Config));
    attrs.push(Attribute::new("temp", AttrMode::ReadOnly, ZoneAttr::Temp));
    if config.emulation {
        attrs.push(Attribute::new("emul_temp", AttrMode::WriteOnly, ZoneAttr::EmulTemp));
    }
    attrs.push(Attribute::new("policy", AttrMode::ReadWrite, ZoneAttr::Policy));
    attrs.push(Attribute::new("available_policies", AttrMode::ReadOnly, ZoneAttr::AvailablePolicies));
    attrs.push(Attribute::new("sustainable_power", AttrMode::ReadWrite, ZoneAttr::SustainablePower));
    for c in Coefficient::ALL {
        attrs.push(Attribute::new(c.name(), AttrMode::ReadWrite, ZoneAttr::Coefficient(c)));
    }
    Ok(group)
}

fn build_trip_group(trips: &TripPointRegistry) -> Result<Option<AttributeGroup<ZoneAttr>>> {
    let count = trips.len();
    if count == 0 || !trips.supports_temperature() {
        return Ok(None);
    }
    let with_hyst = trips.supports_hysteresis();
    let per_trip = if with_hyst { 3 } else { 2 };
    let total = count
        .checked_mul(per_trip)
        .ok_or(ThermalError::OutOfMemory("trip attributes"))?;
    let mut group = reserved_group(None, total)
        .map_err(|_| ThermalError::OutOfMemory("trip attributes"))?;

    let attrs = &mut group.attrs;
    for i in 0..count {
        attrs.push(Attribute::new(format!("trip_point_{}_type", i), AttrMode::ReadOnly, ZoneAttr::TripType(i)));
    }
    for i in 0..count {
        let mode = if trips.is_writable(i) { AttrMode::ReadWrite } else { AttrMode::ReadOnly };
        attrs.push(Attribute::new(format!("trip_point_{}_temp", i), mode, ZoneAttr::TripTemp(i)));
    }
    if with_hyst {
        let mode = if trips.hysteresis_writable() { AttrMode::ReadWrite } else { AttrMode::ReadOnly };
        for i in 0..count {
            attrs.push(Attribute::new(format!("trip_point_{}_hyst", i), mode, ZoneAttr::TripHyst(i)));
        }
    }
    Ok(Some(group))
}

/// Build the full zone catalogue. Visibility of `mode` and `passive` is
/// decided here, once.
pub fn build_zone_catalogue(trips: &TripPointRegistry, config: &SysfsConfig) -> Result<ZoneCatalogue> {
    let fixed = build_fixed_group(config)?;

    let mode = if trips.caps().get_mode {
        let mut g = reserved_group(None, 1)?;
        g.attrs.push(Attribute::new("mode", AttrMode::ReadWrite, ZoneAttr::Mode));
        Some(g)
    } else {
        None
    };

    let passive = if trips.has_passive() {
        let mut g = reserved_group(None, 1)?;
        g.attrs.push(Attribute::new("passive", AttrMode::ReadWrite, ZoneAttr::Passive));
        Some(g)
    } else {
        None
    };

    let trips = build_trip_group(trips)?;
    Ok(ZoneCatalogue { fixed, mode, passive, trips })
}

/// Drop a catalogue if one is installed. Returns whether anything was torn down.
pub fn teardown<T>(slot: &mut Option<T>) -> bool {
    slot.take().is_some()
}

// ============================================================================
// Cooling device
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CdevAttr {
    Type,
    MaxState,
    CurState,
    TotalTrans,
    TimeInStateMs,
    Reset,
    TransTable,
}

const STATS_GROUP: &str = "stats";
const OPTIONAL_SLOTS: usize = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CdevCatalogue {
    base: AttributeGroup<CdevAttr>,
    optional: [Option<AttributeGroup<CdevAttr>>; OPTIONAL_SLOTS],
}

impl CdevCatalogue {
    fn groups(&self) -> impl Iterator<Item = &AttributeGroup<CdevAttr>> {
        std::iter::once(&self.base).chain(self.optional.iter().flatten())
    }

    pub fn lookup(&self, name: &str) -> Option<(AttrMode, CdevAttr)> {
        self.groups().find_map(|g| g.lookup(name))
    }

    pub fn names(&self) -> Vec<String> {
        self.groups().flat_map(|g| g.full_names()).collect()
    }

    pub fn has_stats(&self) -> bool {
        self.optional[0].is_some()
    }
}

pub fn build_cdev_catalogue(with_stats: bool) -> Result<CdevCatalogue> {
    let mut base = reserved_group(None, 3)?;
    base.attrs.push(Attribute::new("type", AttrMode::ReadOnly, CdevAttr::Type));
    base.attrs.push(Attribute::new("max_state", AttrMode::ReadOnly, CdevAttr::MaxState));
    base.attrs.push(Attribute::new("cur_state", AttrMode::ReadWrite, CdevAttr::CurState));

    let stats = if with_stats {
        let mut g = reserved_group(Some(STATS_GROUP), 4)?;
        g.attrs.push(Attribute::new("total_trans", AttrMode::ReadOnly, CdevAttr::TotalTrans));
        g.attrs.push(Attribute::new("time_in_state_ms", AttrMode::ReadOnly, CdevAttr::TimeInStateMs));
        g.attrs.push(Attribute::new("reset", AttrMode::WriteOnly, CdevAttr::Reset));
        g.attrs.push(Attribute::new("trans_table", AttrMode::ReadOnly, CdevAttr::TransTable));
        Some(g)
    } else {
        None
    };

    Ok(CdevCatalogue { base, optional: [stats] })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::{MockZoneOps, ZoneCaps};
    use crate::test_utils::test_utils::FakeZoneOps;
    use crate::trips::TripKind;
    use std::sync::Arc;

    fn registry(ops: FakeZoneOps, mask: u32) -> TripPointRegistry {
        let count = ops.trip_count();
        TripPointRegistry::new(Arc::new(ops), count, mask, true)
    }

    #[test]
    fn test_attr_mode_access() {
        assert!(AttrMode::ReadWrite.readable() && AttrMode::ReadWrite.writable());
        assert!(!AttrMode::WriteOnly.readable());
        assert!(!AttrMode::ReadOnly.writable());
    }

    #[test]
    fn test_fixed_group_order() {
        let cat = build_zone_catalogue(&registry(FakeZoneOps::no_trips(), 0), &SysfsConfig::default()).unwrap();
        assert_eq!(
            cat.names(),
            [
                "type", "config", "temp", "policy", "available_policies", "sustainable_power",
                "k_po", "k_pu", "k_i", "k_d", "integral_cutoff", "slope", "offset", "mode",
            ]
        );
        assert_eq!(cat.trip_attr_count(), 0);
    }

    #[test]
    fn test_emul_temp_only_with_emulation() {
        let config = SysfsConfig { emulation: true, ..SysfsConfig::default() };
        let cat = build_zone_catalogue(&registry(FakeZoneOps::no_trips(), 0), &config).unwrap();
        assert_eq!(cat.lookup("emul_temp"), Some((AttrMode::WriteOnly, ZoneAttr::EmulTemp)));

        let cat = build_zone_catalogue(&registry(FakeZoneOps::no_trips(), 0), &SysfsConfig::default()).unwrap();
        assert_eq!(cat.lookup("emul_temp"), None);
    }

    #[test]
    fn test_trip_group_three_per_trip_with_hysteresis() {
        for t in 0..6usize {
            let specs = vec![(TripKind::Active, 50_000, 1_000); t];
            let cat = build_zone_catalogue(&registry(FakeZoneOps::with_trips(specs), 0), &SysfsConfig::default()).unwrap();
            assert_eq!(cat.trip_attr_count(), 3 * t);
        }
    }

    fn oversized_registry(with_hyst: bool) -> TripPointRegistry {
        let mut ops = MockZoneOps::new();
        ops.expect_capabilities().returning(move || ZoneCaps {
            get_trip_temp: true,
            get_trip_hyst: with_hyst,
            ..ZoneCaps::default()
        });
        TripPointRegistry::new(Arc::new(ops), usize::MAX / 2, 0, false)
    }

    #[test]
    fn test_oversized_trip_table_is_out_of_memory() {
        let config = SysfsConfig::default();
        // three attributes per trip overflow the count
        assert_eq!(
            build_zone_catalogue(&oversized_registry(true), &config).unwrap_err(),
            ThermalError::OutOfMemory("trip attributes")
        );
        // two per trip fit in usize but not in memory
        assert_eq!(
            build_zone_catalogue(&oversized_registry(false), &config).unwrap_err(),
            ThermalError::OutOfMemory("trip attributes")
        );

        let cat = build_zone_catalogue(&registry(FakeZoneOps::two_trips(), 0), &config).unwrap();
        assert_eq!(cat.trip_attr_count(), 6);
    }

    #[test]
    fn test_trip_group_two_per_trip_without_hysteresis() {
        for t in 0..6usize {
            let specs = vec![(TripKind::Hot, 90_000, 0); t];
            let ops = FakeZoneOps::with_trips(specs).without_hysteresis();
            let cat = build_zone_catalogue(&registry(ops, 0), &SysfsConfig::default()).unwrap();
            assert_eq!(cat.trip_attr_count(), 2 * t);
        }
    }

    #[test]
    fn test_trip_group_layout_and_modes() {
        let cat = build_zone_catalogue(&registry(FakeZoneOps::two_trips(), 0b10), &SysfsConfig::default()).unwrap();
        let names = cat.names();
        let trips: Vec<&str> = names.iter().map(String::as_str).filter(|n| n.starts_with("trip_point_")).collect();
        assert_eq!(
            trips,
            [
                "trip_point_0_type", "trip_point_1_type",
                "trip_point_0_temp", "trip_point_1_temp",
                "trip_point_0_hyst", "trip_point_1_hyst",
            ]
        );
        assert_eq!(cat.lookup("trip_point_0_temp"), Some((AttrMode::ReadOnly, ZoneAttr::TripTemp(0))));
        assert_eq!(cat.lookup("trip_point_1_temp"), Some((AttrMode::ReadWrite, ZoneAttr::TripTemp(1))));
        assert_eq!(cat.lookup("trip_point_1_hyst"), Some((AttrMode::ReadWrite, ZoneAttr::TripHyst(1))));
        assert_eq!(cat.lookup("trip_point_1_type"), Some((AttrMode::ReadOnly, ZoneAttr::TripType(1))));
    }

    #[test]
    fn test_read_only_hysteresis() {
        let ops = FakeZoneOps::two_trips().with_hysteresis_read_only();
        let cat = build_zone_catalogue(&registry(ops, 0), &SysfsConfig::default()).unwrap();
        assert_eq!(cat.lookup("trip_point_0_hyst"), Some((AttrMode::ReadOnly, ZoneAttr::TripHyst(0))));
    }

    #[test]
    fn test_trip_group_needs_temperature_accessor() {
        let ops = FakeZoneOps::two_trips().without_trip_temperature();
        let cat = build_zone_catalogue(&registry(ops, 0), &SysfsConfig::default()).unwrap();
        assert_eq!(cat.trip_attr_count(), 0);
    }

    #[test]
    fn test_conditional_groups() {
        let cat = build_zone_catalogue(&registry(FakeZoneOps::two_trips(), 0), &SysfsConfig::default()).unwrap();
        assert!(cat.has_mode());
        assert!(cat.has_passive());

        let ops = FakeZoneOps::critical_only().without_mode();
        let cat = build_zone_catalogue(&registry(ops, 0), &SysfsConfig::default()).unwrap();
        assert!(!cat.has_mode());
        assert!(!cat.has_passive());
        assert_eq!(cat.lookup("mode"), None);
        assert_eq!(cat.lookup("passive"), None);
    }

    #[test]
    fn test_teardown_is_idempotent() {
        let reg = registry(FakeZoneOps::two_trips(), 0);
        let mut slot = Some(build_zone_catalogue(&reg, &SysfsConfig::default()).unwrap());
        assert!(teardown(&mut slot));
        assert!(slot.is_none());
        assert!(!teardown(&mut slot));

        let mut never_built: Option<ZoneCatalogue> = None;
        assert!(!teardown(&mut never_built));
    }

    #[test]
    fn test_rebuild_after_teardown_is_identical() {
        let reg = registry(FakeZoneOps::two_trips(), 0b01);
        let first = build_zone_catalogue(&reg, &SysfsConfig::default()).unwrap();
        let mut slot = Some(first.clone());
        teardown(&mut slot);
        let second = build_zone_catalogue(&reg, &SysfsConfig::default()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_cdev_catalogue_with_stats() {
        let cat = build_cdev_catalogue(true).unwrap();
        assert!(cat.has_stats());
        assert_eq!(
            cat.names(),
            [
                "type", "max_state", "cur_state",
                "stats/total_trans", "stats/time_in_state_ms", "stats/reset", "stats/trans_table",
            ]
        );
        assert_eq!(cat.lookup("stats/reset"), Some((AttrMode::WriteOnly, CdevAttr::Reset)));
        assert_eq!(cat.lookup("reset"), None);
        assert_eq!(cat.lookup("stats/type"), None);
    }

    #[test]
    fn test_cdev_catalogue_without_stats() {
        let cat = build_cdev_catalogue(false).unwrap();
        assert!(!cat.has_stats());
        assert_eq!(cat.names(), ["type", "max_state", "cur_state"]);
        assert_eq!(cat.lookup("stats/total_trans"), None);
    }
}
