// SPDX-FileCopyrightText: 2021 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: MIT

//! A thin but safe Rust layer around the Linux GPIO uAPI.
//!
//! Only the subset of the ABI needed to locate, request and drive single
//! lines is provided.

pub(crate) mod common;

pub use common::{Error, Name, Offset, Offsets, Result, LINES_MAX, NAME_MAX};

/// This module implements GPIO ABI v1 which was released in Linux v4.8.
///
/// ABI v1 is deprecated in favour of v2, but it is the ABI available on every
/// kernel providing the GPIO character device.
pub mod v1;
