// SPDX-FileCopyrightText: 2022 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

// Basic example of toggling a single line.

use gpioline::{GpioPin, IoPin, Outcome};
use std::thread;
use std::time::Duration;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let offset = 22;
    let mut pin = GpioPin::from_offset(Some("toggle-line-value"), "gpiochip0", offset);
    if pin.configure_as_output(true) == Outcome::Failed {
        anyhow::bail!("failed to request line: {:?}", pin.posix_error());
    }

    loop {
        println!("{}={}", offset, pin.is_active());
        thread::sleep(Duration::from_millis(500));
        if pin.is_active() {
            pin.deactivate();
        } else {
            pin.activate();
        }
        if let Some(err) = pin.posix_error() {
            anyhow::bail!("failed to set value: {}", err);
        }
    }
}
