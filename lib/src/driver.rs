// SPDX-FileCopyrightText: 2021 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::line::{self, Offset};
use crate::request::LineRequest;
use crate::{chip, Error, Result, UapiCall};
use gpioline_uapi::v1 as uapi;
use std::fs::File;
use std::os::unix::prelude::{AsRawFd, IntoRawFd};
use std::path::Path;

/// The kernel operations needed to locate, request and drive a line.
///
/// Every call is a blocking system call that either completes or fails
/// immediately.
pub trait Driver {
    /// An open chip.
    type Chip;

    /// Exclusive ownership of a requested line.
    type Handle;

    /// Open the chip at the given path.
    fn open(&self, path: &Path) -> Result<Self::Chip>;

    /// Close an open chip.
    fn close(&self, chip: Self::Chip) -> Result<()>;

    /// Get the information for the chip.
    fn chip_info(&self, chip: &Self::Chip) -> Result<chip::Info>;

    /// Get the information for a line on the chip.
    fn line_info(&self, chip: &Self::Chip, offset: Offset) -> Result<line::Info>;

    /// Request a line for exclusive use.
    fn request(&self, chip: &Self::Chip, req: &LineRequest) -> Result<Self::Handle>;

    /// Read the logical value of a requested line.
    fn value(&self, handle: &Self::Handle) -> Result<u8>;

    /// Set the logical value of a requested line.
    fn set_value(&self, handle: &Self::Handle, value: u8) -> Result<()>;

    /// Release a requested line.
    ///
    /// The handle is consumed whether the release succeeds or not.
    fn release(&self, handle: Self::Handle) -> Result<()>;

    /// Open a chip, apply `f` to it, and close it again.
    ///
    /// The chip is closed no matter what `f` returns.  A failure to close is
    /// logged but does not replace the result of `f`.
    fn with_chip<T, F>(&self, path: &Path, f: F) -> Result<T>
    where
        Self: Sized,
        F: FnOnce(&Self::Chip) -> Result<T>,
    {
        let chip = self.open(path).map_err(|e| {
            log::warn!("failed to open {:?}: {}", path, e);
            e
        })?;
        let res = f(&chip);
        if let Err(e) = self.close(chip) {
            log::warn!("failed to close GPIO character device {:?}: {}", path, e);
        }
        res
    }
}

/// The [`Driver`] for the GPIO character devices of the running kernel.
///
/// Uses the GPIO uAPI ABI v1.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Cdev;

impl Driver for Cdev {
    type Chip = File;
    type Handle = File;

    fn open(&self, path: &Path) -> Result<File> {
        Ok(File::open(path)?)
    }

    fn close(&self, chip: File) -> Result<()> {
        Ok(nix::unistd::close(chip.into_raw_fd())?)
    }

    fn chip_info(&self, chip: &File) -> Result<chip::Info> {
        uapi::get_chip_info(chip.as_raw_fd())
            .map(|ci| chip::Info::from(&ci))
            .map_err(|e| Error::Uapi(UapiCall::GetChipInfo, e))
    }

    fn line_info(&self, chip: &File, offset: Offset) -> Result<line::Info> {
        uapi::get_line_info(chip.as_raw_fd(), offset)
            .map(|li| line::Info::from(&li))
            .map_err(|e| Error::Uapi(UapiCall::GetLineInfo, e))
    }

    fn request(&self, chip: &File, req: &LineRequest) -> Result<File> {
        uapi::get_line_handle(chip.as_raw_fd(), req.to_uapi())
            .map_err(|e| Error::Uapi(UapiCall::GetLineHandle, e))
    }

    fn value(&self, handle: &File) -> Result<u8> {
        let mut vals = uapi::LineValues::default();
        uapi::get_line_values(handle.as_raw_fd(), &mut vals)
            .map_err(|e| Error::Uapi(UapiCall::GetLineValues, e))?;
        Ok(vals.get(0))
    }

    fn set_value(&self, handle: &File, value: u8) -> Result<()> {
        let vals = uapi::LineValues::from_slice(&[value]);
        uapi::set_line_values(handle.as_raw_fd(), &vals)
            .map_err(|e| Error::Uapi(UapiCall::SetLineValues, e))
    }

    fn release(&self, handle: File) -> Result<()> {
        Ok(nix::unistd::close(handle.into_raw_fd())?)
    }
}
