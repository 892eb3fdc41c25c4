// SPDX-FileCopyrightText: 2021 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::{Error, Result};
use gpioline_uapi::v1 as uapi;
#[cfg(feature = "serde")]
use serde_derive::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// The prefix shared by the names of GPIO character devices.
pub const CHIP_PREFIX: &str = "gpiochip";

/// The candidate GPIO chips found in a directory.
///
/// Candidates are identified by name alone, so a candidate may turn out not to
/// be a GPIO chip when it is opened.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Chips {
    base: PathBuf,
}

impl Chips {
    /// Consider the chips found in the `base` directory.
    pub fn new<P: Into<PathBuf>>(base: P) -> Chips {
        Chips { base: base.into() }
    }

    /// The directory being searched.
    pub fn base_path(&self) -> &Path {
        &self.base
    }

    /// Start a scan of the directory.
    ///
    /// Each call starts a fresh scan.  Chips are returned in directory order,
    /// which is filesystem dependent.  Entries that cannot be read are skipped.
    pub fn iter(&self) -> Result<ChipIterator> {
        let dir = fs::read_dir(&self.base).map_err(|e| {
            log::warn!("scanning devices: failed to open {:?}: {}", self.base, e);
            Error::from(e)
        })?;
        Ok(ChipIterator { dir })
    }
}

/// An iterator over the names of the candidate chips in a directory.
#[derive(Debug)]
pub struct ChipIterator {
    dir: fs::ReadDir,
}

impl Iterator for ChipIterator {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        for entry in self.dir.by_ref() {
            let Ok(entry) = entry else {
                continue;
            };
            if let Ok(name) = entry.file_name().into_string() {
                if name.starts_with(CHIP_PREFIX) {
                    return Some(name);
                }
            }
        }
        None
    }
}

/// Return the path of the character device for a chip.
///
/// A `chip` containing a `/` is taken to be a path, otherwise it is the name
/// of a device in the `base` directory.
pub fn chip_path(base: &Path, chip: &str) -> PathBuf {
    if chip.contains('/') {
        PathBuf::from(chip)
    } else {
        base.join(chip)
    }
}

/// The publicly available information for a GPIO chip.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Info {
    /// The system name for the chip, such as "*gpiochip0*".
    pub name: String,

    /// A functional name for the chip.
    ///
    /// This typically identifies the type of GPIO chip.
    pub label: String,

    /// The number of lines provided by the chip.
    pub num_lines: u32,
}

impl From<&uapi::ChipInfo> for Info {
    fn from(ci: &uapi::ChipInfo) -> Self {
        Info {
            name: String::from(&ci.name),
            label: String::from(&ci.label),
            num_lines: ci.num_lines,
        }
    }
}
