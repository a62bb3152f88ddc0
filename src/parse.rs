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

//! Parsing of values written to properties.
//!
//! Two flavours exist: strict parsing, where the whole buffer (minus one
//! trailing newline) must be a number, and scanning, which skips leading
//! whitespace and ignores whatever follows the digits.

use crate::error::{Result, ThermalError};

fn strip_newline(buf: &str) -> &str {
    buf.strip_suffix('\n').unwrap_or(buf)
}

fn split_sign(s: &str) -> (bool, &str) {
    if let Some(rest) = s.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = s.strip_prefix('+') {
        (false, rest)
    } else {
        (false, s)
    }
}

fn parse_magnitude(digits: &str, radix: u32, buf: &str) -> Result<i64> {
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(ThermalError::invalid(format!("not a number: {:?}", buf)));
    }
    i64::from_str_radix(digits, radix)
        .map_err(|_| ThermalError::invalid(format!("out of range: {:?}", buf)))
}

fn narrow_i32(v: i64, buf: &str) -> Result<i32> {
    i32::try_from(v).map_err(|_| ThermalError::invalid(format!("out of range: {:?}", buf)))
}

/// Strict base-10 signed 32-bit integer.
pub fn parse_i32(buf: &str) -> Result<i32> {
    let (neg, digits) = split_sign(strip_newline(buf));
    let v = parse_magnitude(digits, 10, buf)?;
    narrow_i32(if neg { -v } else { v }, buf)
}

/// Strict base-10 unsigned 32-bit integer.
pub fn parse_u32(buf: &str) -> Result<u32> {
    let s = strip_newline(buf);
    let digits = s.strip_prefix('+').unwrap_or(s);
    let v = parse_magnitude(digits, 10, buf)?;
    u32::try_from(v).map_err(|_| ThermalError::invalid(format!("out of range: {:?}", buf)))
}

/// Strict signed 32-bit integer with the base taken from the prefix:
/// `0x` hexadecimal, a leading `0` octal, decimal otherwise.
pub fn parse_i32_auto(buf: &str) -> Result<i32> {
    let (neg, body) = split_sign(strip_newline(buf));
    let (radix, digits) = if let Some(hex) = body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        (16, hex)
    } else if body.len() > 1 && body.starts_with('0') {
        (8, &body[1..])
    } else {
        (10, body)
    };
    let v = parse_magnitude(digits, radix, buf)?;
    narrow_i32(if neg { -v } else { v }, buf)
}

/// Leading signed integer after optional whitespace; trailing text is ignored.
pub fn scan_i64(buf: &str) -> Result<i64> {
    let s = buf.trim_start();
    let (neg, rest) = split_sign(s);
    let end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    let v = parse_magnitude(&rest[..end], 10, buf)?;
    Ok(if neg { -v } else { v })
}

pub fn scan_i32(buf: &str) -> Result<i32> {
    narrow_i32(scan_i64(buf)?, buf)
}

/// Policy and device names are single words; keep the first line, bounded.
pub fn parse_name(buf: &str, max_len: usize) -> String {
    let line = buf.split('\n').next().unwrap_or("");
    line.chars().take(max_len.saturating_sub(1)).collect()
}
