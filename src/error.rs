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

//! Error type shared by every thermal zone and cooling device operation.
//!
//! Each variant maps onto the negative errno the transport glue hands back to
//! the reader or writer of a property.

/// Result type alias using ThermalError
pub type Result<T> = std::result::Result<T, ThermalError>;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ThermalError {
    // ============================================================================
    // Capability Errors
    // ============================================================================
    #[error("Operation not supported: {0}")]
    NotSupported(String),

    #[error("No statistics for cooling device {0}")]
    NoDevice(u32),

    // ============================================================================
    // Input Errors
    // ============================================================================
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Trip index {index} out of range (zone has {count} trips)")]
    TripOutOfRange {
        index: usize,
        count: usize,
    },

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Not found: {0}")]
    NotFound(String),

    // ============================================================================
    // Resource Errors
    // ============================================================================
    #[error("Out of memory while building {0}")]
    OutOfMemory(&'static str),

    #[error("{0} not configured for this zone")]
    IoUnavailable(&'static str),

    #[error("Rendered {what} needs {len} bytes (max {max} bytes)")]
    OverCapacity {
        what: &'static str,
        len: usize,
        max: usize,
    },

    // ============================================================================
    // Driver Errors
    // ============================================================================
    #[error("Driver error: {0}")]
    Driver(i32),
}

impl ThermalError {
    /// Create a not-supported error from a string
    pub fn not_supported(msg: impl Into<String>) -> Self {
        Self::NotSupported(msg.into())
    }

    /// Create an invalid argument error from a string
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Negative errno reported to the property reader or writer.
    pub fn errno(&self) -> i32 {
        let code = match self {
            Self::NotSupported(_) => libc::EPERM,
            Self::NoDevice(_) => libc::ENODEV,
            Self::InvalidArgument(_) | Self::TripOutOfRange { .. } => libc::EINVAL,
            Self::AlreadyExists(_) => libc::EEXIST,
            Self::NotFound(_) => libc::ENOENT,
            Self::OutOfMemory(_) => libc::ENOMEM,
            Self::IoUnavailable(_) => libc::EIO,
            Self::OverCapacity { .. } => libc::EFBIG,
            Self::Driver(code) => return -code.abs(),
        };
        -code
    }

    /// Whether this error rejects the caller's input rather than the zone state.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidArgument(_) | Self::TripOutOfRange { .. })
    }
}

impl From<std::collections::TryReserveError> for ThermalError {
    fn from(_: std::collections::TryReserveError) -> Self {
        Self::OutOfMemory("property storage")
    }
}
