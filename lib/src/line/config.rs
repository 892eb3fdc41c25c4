// SPDX-FileCopyrightText: 2021 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::{Direction, Drive, Info, Polarity};
use gpioline_uapi::v1;
#[cfg(feature = "serde")]
use serde_derive::{Deserialize, Serialize};

/// The configuration settings for a single line.
///
/// Before a request this is the configuration the caller wants.  After a
/// successful request it is replaced by the configuration the kernel reports,
/// using [`reconcile`](Config::reconcile).
///
/// The drive only applies to outputs.  As the drive is a single setting, open
/// drain and open source are mutually exclusive.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Config {
    /// The direction setting for the line.
    pub direction: Direction,

    /// The polarity setting for the line.
    pub polarity: Polarity,

    /// The drive setting for the line.
    pub drive: Drive,
}

impl Config {
    /// Set the polarity to active high, or to active low if `active_high` is false.
    pub fn prepare_as_active_high(&mut self, active_high: bool) -> &mut Self {
        self.polarity = if active_high {
            Polarity::ActiveHigh
        } else {
            Polarity::ActiveLow
        };
        self
    }

    /// Set the drive to open drain.
    ///
    /// Clearing open drain reverts the drive to push-pull, but only if the
    /// drive is currently open drain.
    pub fn prepare_as_open_drain(&mut self, open_drain: bool) -> &mut Self {
        self.set_drive(Drive::OpenDrain, open_drain)
    }

    /// Set the drive to open source.
    ///
    /// Clearing open source reverts the drive to push-pull, but only if the
    /// drive is currently open source.
    pub fn prepare_as_open_source(&mut self, open_source: bool) -> &mut Self {
        self.set_drive(Drive::OpenSource, open_source)
    }

    fn set_drive(&mut self, drive: Drive, enable: bool) -> &mut Self {
        if enable {
            self.drive = drive;
        } else if self.drive == drive {
            self.drive = Drive::PushPull;
        }
        self
    }

    /// Set the direction to input.
    pub fn as_input(&mut self) -> &mut Self {
        self.direction = Direction::Input;
        self
    }

    /// Set the direction to output.
    pub fn as_output(&mut self) -> &mut Self {
        self.direction = Direction::Output;
        self
    }

    /// Check if the line is an input.
    pub fn is_input(&self) -> bool {
        self.direction == Direction::Input
    }

    /// Check if the line is active high.
    pub fn is_active_high(&self) -> bool {
        self.polarity == Polarity::ActiveHigh
    }

    /// Check if the line is an open drain output.
    ///
    /// The drive of an input line is retained for when it becomes an output.
    pub fn is_open_drain(&self) -> bool {
        self.drive == Drive::OpenDrain
    }

    /// Check if the line is an open source output.
    pub fn is_open_source(&self) -> bool {
        self.drive == Drive::OpenSource
    }

    /// Check if the line is a push-pull output.
    ///
    /// Unlike the other drives, this is only true for outputs.
    pub fn is_push_pull(&self) -> bool {
        self.direction == Direction::Output && self.drive == Drive::PushPull
    }

    /// Replace the configuration with that reported by the kernel.
    pub fn reconcile(&mut self, info: &Info) -> &mut Self {
        *self = Config::from(info);
        self
    }

    /// The flags to request the line with.
    ///
    /// An `as_is` request leaves the direction unchanged, but still requests
    /// any drive other than push-pull, so the kernel rejects the request
    /// rather than silently switching an open drain or open source output to
    /// push-pull.
    /// An input request never carries a drive, as the kernel rejects a drive
    /// on inputs.  The polarity is always requested.
    pub fn handle_request_flags(&self, as_is: bool) -> v1::HandleRequestFlags {
        let mut flags = v1::HandleRequestFlags::default();
        let with_drive = if as_is {
            true
        } else {
            match self.direction {
                Direction::Input => {
                    flags.set(v1::HandleRequestFlags::INPUT, true);
                    false
                }
                Direction::Output => {
                    flags.set(v1::HandleRequestFlags::OUTPUT, true);
                    true
                }
            }
        };
        if with_drive {
            match self.drive {
                Drive::PushPull => {}
                Drive::OpenDrain => flags.set(v1::HandleRequestFlags::OPEN_DRAIN, true),
                Drive::OpenSource => flags.set(v1::HandleRequestFlags::OPEN_SOURCE, true),
            }
        }
        if self.polarity == Polarity::ActiveLow {
            flags.set(v1::HandleRequestFlags::ACTIVE_LOW, true);
        }
        flags
    }
}

impl From<&Info> for Config {
    fn from(info: &Info) -> Self {
        Config {
            direction: info.direction,
            polarity: info.polarity,
            drive: info.drive.unwrap_or_default(),
        }
    }
}
