// SPDX-FileCopyrightText: 2021 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: MIT

//! A library for locating, requesting and driving single GPIO lines on Linux
//! platforms using the GPIO character device.
//!
//! A line is described either by the chip and offset that provide it, or by
//! its name, in which case the chips are searched for an unclaimed line with
//! that name.  The [`GpioPin`] then requests the line for exclusive use and
//! exposes it through the [`IoPin`] trait, so callers need not care which
//! chip or offset is behind the signal.
//!
//! To find and drive a named output line:
//! ```no_run
//! use gpioline::{GpioPin, IoPin};
//!
//! let mut led = GpioPin::from_name(Some("blinker"), "LED0", None);
//! led.prepare_as_active_high(false);
//! if led.configure_as_output(false).is_held() {
//!     led.activate();
//! }
//! ```
//!
//! Failures are not returned from the [`IoPin`] operations.  They are kept
//! in a sticky error state available from [`GpioPin::posix_error`].
//!
//! [`GpioPin`]: pin::GpioPin
//! [`IoPin`]: pin::IoPin
//! [`GpioPin::posix_error`]: pin::GpioPin::posix_error

#[macro_use]
extern crate global_counter;

use gpioline_uapi as uapi;
use nix::errno::Errno;
use std::fmt;

/// Types and functions for finding GPIO chips.
pub mod chip;

/// Process wide defaults for the base path and consumer.
pub mod defaults;
pub use defaults::{set_base_path, set_default_consumer, Defaults};

/// The boundary between the library and the kernel.
pub mod driver;

/// Types describing lines and their configuration.
pub mod line;

/// Locating lines by name.
pub mod locate;

/// The [`IoPin`] trait and the [`GpioPin`] that implements it.
pub mod pin;
pub use pin::{GpioPin, IoPin, Outcome, PosixError};

/// Building line requests.
pub mod request;

#[cfg(feature = "embedded_hal")]
mod hal;

#[cfg(test)]
mod fake;

/// Errors returned by [`gpioline`] functions.
///
/// [`gpioline`]: crate
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A problem scanning the chip directory.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// An error returned from an underlying os call.
    #[error(transparent)]
    Os(#[from] Errno),

    /// An error returned from an underlying uAPI call.
    #[error("uAPI {0} returned: {1}")]
    Uapi(UapiCall, #[source] uapi::Error),

    /// The line has not been resolved to a chip and offset.
    #[error("line is not resolved to a chip and offset")]
    UnresolvedLine,

    /// The operation requires the line to be requested.
    #[error("line has not been requested")]
    NotRequested,
}

impl Error {
    /// The OS error code that best describes the error.
    ///
    /// Errors that did not originate from a system call are mapped to the code
    /// the kernel would return for the equivalent mistake.
    pub fn errno(&self) -> Errno {
        match self {
            Error::Io(e) => e.raw_os_error().map(Errno::from_raw).unwrap_or(Errno::EIO),
            Error::Os(e) => *e,
            Error::Uapi(_, e) => e.errno(),
            Error::UnresolvedLine => Errno::EINVAL,
            Error::NotRequested => Errno::EBADF,
        }
    }
}

/// Identifiers for the underlying uAPI calls.
#[doc(hidden)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UapiCall {
    GetChipInfo,
    GetLineHandle,
    GetLineInfo,
    GetLineValues,
    SetLineValues,
}

impl fmt::Display for UapiCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UapiCall::GetChipInfo => "get_chip_info",
            UapiCall::GetLineHandle => "get_line_handle",
            UapiCall::GetLineInfo => "get_line_info",
            UapiCall::GetLineValues => "get_line_values",
            UapiCall::SetLineValues => "set_line_values",
        };
        write!(f, "{}", name)
    }
}

/// The result for [`gpioline`] functions.
///
/// [`gpioline`]: crate
pub type Result<T> = std::result::Result<T, Error>;
