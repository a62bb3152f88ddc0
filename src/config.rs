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

use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: usize = 4096;
const MIN_PAGE_SIZE: usize = 256;
const MAX_PAGE_SIZE: usize = 1 << 20;

fn default_true() -> bool { true }
fn default_page_size() -> usize { DEFAULT_PAGE_SIZE }

/// Build-wide switches for the exposed property set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SysfsConfig {
    /// Allow `trip_point_<n>_temp` to be writable for trips in the zone's mask.
    #[serde(default = "default_true")]
    pub writable_trips: bool,
    /// Expose `emul_temp`.
    #[serde(default)]
    pub emulation: bool,
    /// Create per-device transition statistics and the `stats` group.
    #[serde(default = "default_true")]
    pub statistics: bool,
    /// Output buffer limit for rendered reports.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for SysfsConfig {
    fn default() -> Self {
        Self {
            writable_trips: true,
            emulation: false,
            statistics: true,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Tuning parameters consumed by power-allocating policies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ZoneParams {
    #[serde(default)]
    pub sustainable_power: u32,
    #[serde(default)]
    pub k_po: i32,
    #[serde(default)]
    pub k_pu: i32,
    #[serde(default)]
    pub k_i: i32,
    #[serde(default)]
    pub k_d: i32,
    #[serde(default)]
    pub integral_cutoff: i32,
    #[serde(default)]
    pub slope: i32,
    #[serde(default)]
    pub offset: i32,
}

/// The seven signed coefficients of `ZoneParams`, in exposure order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Coefficient {
    KPo,
    KPu,
    KI,
    KD,
    IntegralCutoff,
    Slope,
    Offset,
}

impl Coefficient {
    pub const ALL: [Coefficient; 7] = [
        Coefficient::KPo,
        Coefficient::KPu,
        Coefficient::KI,
        Coefficient::KD,
        Coefficient::IntegralCutoff,
        Coefficient::Slope,
        Coefficient::Offset,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Coefficient::KPo => "k_po",
            Coefficient::KPu => "k_pu",
            Coefficient::KI => "k_i",
            Coefficient::KD => "k_d",
            Coefficient::IntegralCutoff => "integral_cutoff",
            Coefficient::Slope => "slope",
            Coefficient::Offset => "offset",
        }
    }
}

impl ZoneParams {
    pub fn coefficient(&self, c: Coefficient) -> i32 {
        match c {
            Coefficient::KPo => self.k_po,
            Coefficient::KPu => self.k_pu,
            Coefficient::KI => self.k_i,
            Coefficient::KD => self.k_d,
            Coefficient::IntegralCutoff => self.integral_cutoff,
            Coefficient::Slope => self.slope,
            Coefficient::Offset => self.offset,
        }
    }

    pub fn set_coefficient(&mut self, c: Coefficient, value: i32) {
        let slot = match c {
            Coefficient::KPo => &mut self.k_po,
            Coefficient::KPu => &mut self.k_pu,
            Coefficient::KI => &mut self.k_i,
            Coefficient::KD => &mut self.k_d,
            Coefficient::IntegralCutoff => &mut self.integral_cutoff,
            Coefficient::Slope => &mut self.slope,
            Coefficient::Offset => &mut self.offset,
        };
        *slot = value;
    }
}

pub fn validate_config(cfg: &SysfsConfig) -> Result<(), String> {
    if cfg.page_size < MIN_PAGE_SIZE || cfg.page_size > MAX_PAGE_SIZE {
        return Err(format!(
            "page_size {} out of range ({}..={})",
            cfg.page_size, MIN_PAGE_SIZE, MAX_PAGE_SIZE
        ));
    }
    Ok(())
}

pub fn parse_config(data: &str) -> anyhow::Result<SysfsConfig> {
    let cfg: SysfsConfig = serde_json::from_str(data).context("parse error")?;
    if let Err(e) = validate_config(&cfg) {
        bail!("invalid config: {}", e);
    }
    Ok(cfg)
}

pub fn load_config(path: &Path) -> anyhow::Result<SysfsConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_config(&data).with_context(|| format!("in {}", path.display()))
}
