// SPDX-FileCopyrightText: 2023 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

// Example of finding a line by name and driving it through the IoPin trait.

use gpioline::{GpioPin, IoPin};
use std::thread;
use std::time::Duration;

fn blink<P: IoPin>(mut led: P, times: usize) {
    for _ in 0..times {
        led.activate();
        thread::sleep(Duration::from_millis(250));
        led.deactivate();
        thread::sleep(Duration::from_millis(250));
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let line_name = "GPIO22";
    let mut led = GpioPin::from_name(Some("blink-named-line"), line_name, None);
    if !led.descriptor().is_resolved() {
        anyhow::bail!("line {} not found", line_name);
    }
    let d = led.descriptor();
    println!("{}: {} {:?}", line_name, d.chip, d.offset);

    led.prepare_as_active_high(false);
    if !led.configure_as_output(false).is_held() {
        anyhow::bail!("failed to request line: {:?}", led.posix_error());
    }
    blink(&mut led, 5);
    Ok(())
}
