// SPDX-FileCopyrightText: 2021 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

mod config;
pub use self::config::Config;

mod info;
pub use self::info::Info;

use gpioline_uapi::v1;
#[cfg(feature = "serde")]
use serde_derive::{Deserialize, Serialize};

/// An identifier for a line on a particular chip.
///
/// Valid offsets are in the range 0..`num_lines` as reported in the chip [`Info`](super::chip::Info).
pub type Offset = u32;

/// The direction of a line.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// The line is an input.
    #[default]
    Input,

    /// The line is an output.
    Output,
}

impl From<v1::LineInfoFlags> for Direction {
    fn from(flags: v1::LineInfoFlags) -> Self {
        if flags.contains(v1::LineInfoFlags::OUTPUT) {
            return Direction::Output;
        }
        Direction::Input
    }
}

/// The mapping between the physical level of a line and its logical state.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Polarity {
    /// The line is active when physically high.
    #[default]
    ActiveHigh,

    /// The line is active when physically low.
    ActiveLow,
}

impl From<v1::LineInfoFlags> for Polarity {
    fn from(flags: v1::LineInfoFlags) -> Self {
        if flags.contains(v1::LineInfoFlags::ACTIVE_LOW) {
            return Polarity::ActiveLow;
        }
        Polarity::ActiveHigh
    }
}

/// The drive policy settings for an output line.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Drive {
    /// The line is driven when both active and inactive.
    ///
    /// This is the default if drive is not specified.
    #[default]
    PushPull,

    /// The line is driven when low and set high impedance when high.
    OpenDrain,

    /// The line is driven when high and set high impedance when low.
    OpenSource,
}

impl TryFrom<v1::LineInfoFlags> for Drive {
    type Error = ();

    fn try_from(flags: v1::LineInfoFlags) -> Result<Self, Self::Error> {
        if flags.contains(v1::LineInfoFlags::OPEN_DRAIN) {
            return Ok(Drive::OpenDrain);
        }
        if flags.contains(v1::LineInfoFlags::OPEN_SOURCE) {
            return Ok(Drive::OpenSource);
        }
        if flags.contains(v1::LineInfoFlags::OUTPUT) {
            return Ok(Drive::PushPull);
        }
        Err(())
    }
}

/// The identity of a line: the chip that provides it and its offset there.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Descriptor {
    /// The name or path of the chip.
    ///
    /// Empty until the chip is known.
    pub chip: String,

    /// The offset of the line on the chip.
    ///
    /// None until the line is resolved.
    pub offset: Option<Offset>,

    /// The name the line was found by.
    ///
    /// Empty if the line was identified by offset.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "String::is_empty"))]
    pub name: String,
}

impl Descriptor {
    /// Check if both the chip and offset of the line are known.
    pub fn is_resolved(&self) -> bool {
        !self.chip.is_empty() && self.offset.is_some()
    }
}
