// SPDX-FileCopyrightText: 2021 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::driver::Driver;
use crate::line;
use crate::Result;
use std::path::Path;

/// Find the first available line with the given name on the chip at `path`.
///
/// Lines are checked in offset order, and lines that have a consumer or are
/// in use are skipped.  The chip is closed before returning, whether or not
/// a line was found.
///
/// Returns `Ok(None)` if the chip has no available line with that name.
pub fn locate<D: Driver>(driver: &D, path: &Path, name: &str) -> Result<Option<line::Info>> {
    driver.with_chip(path, |chip| {
        let ci = driver.chip_info(chip)?;
        for offset in 0..ci.num_lines {
            let li = driver.line_info(chip, offset)?;
            if li.name == name && li.is_available() {
                log::debug!("found {} at {}:{}", name, ci.name, offset);
                return Ok(Some(li));
            }
        }
        Ok(None)
    })
}
