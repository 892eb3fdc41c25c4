// SPDX-FileCopyrightText: 2021 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::driver::Driver;
use crate::line::{self, Config, Offset};
use crate::Result;
use gpioline_uapi::{v1, Name};
use std::path::Path;

/// A request for exclusive use of a single line.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LineRequest {
    /// The offset of the line on its chip.
    pub offset: Offset,

    /// The flags to request the line with.
    pub flags: v1::HandleRequestFlags,

    /// The logical value of an output line once requested.
    ///
    /// The kernel applies the active-low flag, so this is never inverted here.
    pub value: u8,

    /// The consumer label reported for the line while it is held.
    pub consumer: Name,
}

impl LineRequest {
    /// Build the request for a line with the given configuration.
    ///
    /// The consumer is silently truncated to fit the kernel buffer, leaving
    /// at most 31 significant bytes.
    pub fn new(offset: Offset, config: &Config, as_is: bool, active: bool, consumer: &str) -> Self {
        LineRequest {
            offset,
            flags: config.handle_request_flags(as_is),
            value: u8::from(active),
            consumer: Name::from(consumer),
        }
    }

    /// The equivalent uAPI request.
    pub fn to_uapi(&self) -> v1::HandleRequest {
        v1::HandleRequest {
            offsets: v1::Offsets::from_slice(&[self.offset]),
            flags: self.flags,
            values: v1::LineValues::from_slice(&[self.value]),
            consumer: self.consumer.clone(),
            num_lines: 1,
            fd: 0,
        }
    }
}

/// Acquire a handle to the line from the chip at `path`.
///
/// The chip is only open for the duration of the request.
pub(crate) fn acquire<D: Driver>(driver: &D, path: &Path, req: &LineRequest) -> Result<D::Handle> {
    driver.with_chip(path, |chip| driver.request(chip, req))
}

/// Read back the kernel's view of a line.
pub(crate) fn read_back<D: Driver>(driver: &D, path: &Path, offset: Offset) -> Result<line::Info> {
    driver.with_chip(path, |chip| {
        driver.chip_info(chip)?;
        driver.line_info(chip, offset)
    })
}
