// SPDX-FileCopyrightText: 2022 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

// Basic example of reading a single line.

use anyhow::Context;
use gpioline::{GpioPin, Outcome};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let offset = 22;
    let mut pin = GpioPin::from_offset(Some("get-line-value"), "gpiochip0", offset);
    if pin.configure_as_input() == Outcome::Failed {
        anyhow::bail!("failed to request line: {:?}", pin.posix_error());
    }
    let active = pin.value().context("failed to read value")?;
    println!("{}={}", offset, if active { "active" } else { "inactive" });
    Ok(())
}
