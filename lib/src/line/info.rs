// SPDX-FileCopyrightText: 2021 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::{Direction, Drive, Offset, Polarity};
use gpioline_uapi::v1;
#[cfg(feature = "serde")]
use serde_derive::{Deserialize, Serialize};

/// The publicly available information for a line.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Info {
    /// The line offset on the GPIO chip.
    pub offset: Offset,

    /// The name of this GPIO line, such as the output pin of the line on
    /// the chip, a rail or a pin header name on a board, as specified by the
    /// GPIO chip.
    ///
    /// May be empty.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "String::is_empty"))]
    pub name: String,

    /// A functional name for the consumer of this GPIO line as set
    /// by whatever is using it.
    ///
    /// May be empty if not set by the user or the line is unused.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "String::is_empty"))]
    pub consumer: String,

    /// When true the line is reserved by the kernel, or already requested,
    /// and is not available for request.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "is_false"))]
    pub used: bool,

    /// The direction of the line.
    pub direction: Direction,

    /// The polarity of the line.
    pub polarity: Polarity,

    /// The drive applied to output lines.
    ///
    /// Only relevant for output lines.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub drive: Option<Drive>,
}

#[cfg(feature = "serde")]
fn is_false(b: &bool) -> bool {
    !b
}

impl Info {
    /// Check if the line may be requested.
    ///
    /// A line is available if it has no consumer and is not in use.
    pub fn is_available(&self) -> bool {
        self.consumer.is_empty() && !self.used
    }
}

impl From<&v1::LineInfo> for Info {
    fn from(li: &v1::LineInfo) -> Self {
        Info {
            offset: li.offset,
            name: String::from(&li.name),
            consumer: String::from(&li.consumer),
            used: li.flags.contains(v1::LineInfoFlags::USED),
            direction: Direction::from(li.flags),
            polarity: Polarity::from(li.flags),
            drive: Drive::try_from(li.flags).ok(),
        }
    }
}
