// SPDX-FileCopyrightText: 2021 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::chip::{self, Chips};
use crate::defaults::{fallback_consumer, Defaults};
use crate::driver::{Cdev, Driver};
use crate::line::{Config, Descriptor, Offset};
use crate::request::{self, LineRequest};
use crate::{locate, Error, Result};
use nix::errno::Errno;
use std::fmt;

/// A signal that can be activated and deactivated.
///
/// Callers written against `IoPin` need not know what provides the signal.
/// Take a `P: IoPin` to have the calls resolved statically, or a
/// `&mut dyn IoPin` to select the pin at runtime.
pub trait IoPin {
    /// Check if the signal is active.
    fn is_active(&mut self) -> bool;

    /// Check if the signal is passive.
    fn is_passive(&mut self) -> bool {
        !self.is_active()
    }

    /// Make the signal active.
    fn activate(&mut self);

    /// Make the signal passive.
    fn deactivate(&mut self);
}

impl<P: IoPin + ?Sized> IoPin for &mut P {
    fn is_active(&mut self) -> bool {
        (**self).is_active()
    }

    fn is_passive(&mut self) -> bool {
        (**self).is_passive()
    }

    fn activate(&mut self) {
        (**self).activate()
    }

    fn deactivate(&mut self) {
        (**self).deactivate()
    }
}

impl<P: IoPin + ?Sized> IoPin for Box<P> {
    fn is_active(&mut self) -> bool {
        (**self).is_active()
    }

    fn is_passive(&mut self) -> bool {
        (**self).is_passive()
    }

    fn activate(&mut self) {
        (**self).activate()
    }

    fn deactivate(&mut self) {
        (**self).deactivate()
    }
}

/// The result of a configure verb.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[must_use = "a Failed request only reports its error through the Outcome and posix_error"]
pub enum Outcome {
    /// The line could not be requested and is not held.
    Failed,

    /// The line is held, but its configuration could not be read back from the
    /// kernel, so the [`Config`] is the one that was requested.
    Requested,

    /// The line is held and the [`Config`] has been replaced with the
    /// configuration reported by the kernel.
    Confirmed,
}

impl Outcome {
    /// Check if the line is held.
    pub fn is_held(&self) -> bool {
        *self != Outcome::Failed
    }
}

/// The error most recently captured by a [`GpioPin`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PosixError(Errno);

impl PosixError {
    /// The raw OS error code.
    pub fn code(&self) -> i32 {
        self.0 as i32
    }

    /// The description of the error, as per strerror.
    pub fn message(&self) -> &'static str {
        self.0.desc()
    }

    /// The error code as an [`Errno`].
    pub fn errno(&self) -> Errno {
        self.0
    }
}

impl fmt::Display for PosixError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message(), self.code())
    }
}

impl std::error::Error for PosixError {}

/// A single GPIO line, located and requested via a [`Driver`].
///
/// The pin is described either by the chip and offset of its line, using
/// [`in_port`] and [`at_pin`], or by the name of the line, using [`find_pin`].
/// The configuration may then be refined with the `prepare_as_*` methods
/// before it is applied by one of the configure verbs, [`configure_as_is`],
/// [`configure_as_input`] and [`configure_as_output`], which request the line.
///
/// The line is released by [`release`] or when the pin is dropped.
///
/// Failures are never returned by the [`IoPin`] methods, or by the builder and
/// configure methods.  Instead the error is kept until overwritten by the next
/// failure, and is available from [`posix_error`].
///
/// [`in_port`]: GpioPin::in_port
/// [`at_pin`]: GpioPin::at_pin
/// [`find_pin`]: GpioPin::find_pin
/// [`configure_as_is`]: GpioPin::configure_as_is
/// [`configure_as_input`]: GpioPin::configure_as_input
/// [`configure_as_output`]: GpioPin::configure_as_output
/// [`release`]: GpioPin::release
/// [`posix_error`]: GpioPin::posix_error
pub struct GpioPin<D: Driver = Cdev> {
    driver: D,
    defaults: Option<Defaults>,
    consumer: Option<String>,
    fallback: String,
    line: Descriptor,
    config: Config,
    output_is_active: bool,
    handle: Option<D::Handle>,
    errno: Option<Errno>,
}

impl GpioPin<Cdev> {
    /// Create a pin using the process wide defaults.
    pub fn new() -> GpioPin<Cdev> {
        GpioPin::with_driver(Cdev)
    }

    /// Create a pin that uses the given defaults rather than the process wide ones.
    pub fn with_defaults(defaults: Defaults) -> GpioPin<Cdev> {
        let mut pin = GpioPin::with_driver(Cdev);
        pin.defaults = Some(defaults);
        pin
    }

    /// Create a pin for the line with the given name.
    ///
    /// If a `chip` is provided then only that chip is searched, otherwise the
    /// first chip found with an available line of that name wins.
    ///
    /// Check [`descriptor`](GpioPin::descriptor) to see if the line was found.
    pub fn from_name(consumer: Option<&str>, name: &str, chip: Option<&str>) -> GpioPin<Cdev> {
        let mut pin = GpioPin::new();
        if let Some(consumer) = consumer {
            pin.set_consumer(consumer);
        }
        if let Some(chip) = chip {
            pin.in_port(chip);
        }
        pin.find_pin(name);
        pin
    }

    /// Create a pin for the line at `offset` on `chip`.
    pub fn from_offset(consumer: Option<&str>, chip: &str, offset: Offset) -> GpioPin<Cdev> {
        let mut pin = GpioPin::new();
        if let Some(consumer) = consumer {
            pin.set_consumer(consumer);
        }
        pin.in_port(chip).at_pin(offset);
        pin
    }
}

impl Default for GpioPin<Cdev> {
    fn default() -> Self {
        GpioPin::new()
    }
}

impl<D: Driver> GpioPin<D> {
    /// Create a pin that accesses lines through the given driver.
    pub fn with_driver(driver: D) -> GpioPin<D> {
        GpioPin {
            driver,
            defaults: None,
            consumer: None,
            fallback: fallback_consumer(),
            line: Descriptor::default(),
            config: Config::default(),
            output_is_active: false,
            handle: None,
            errno: None,
        }
    }

    /// Use the given defaults rather than the process wide ones.
    pub fn set_defaults(&mut self, defaults: Defaults) -> &mut Self {
        self.defaults = Some(defaults);
        self
    }

    fn current_defaults(&self) -> Defaults {
        match &self.defaults {
            Some(d) => d.clone(),
            None => Defaults::current(),
        }
    }

    /// Set the chip providing the line.
    ///
    /// The chip may be a name, such as `gpiochip0`, or the path to the chip.
    ///
    /// As with all changes to the descriptor, this takes effect at the next request.
    pub fn in_port(&mut self, chip: &str) -> &mut Self {
        self.line.chip = chip.to_string();
        self
    }

    /// Set the offset of the line on its chip.
    pub fn at_pin(&mut self, offset: Offset) -> &mut Self {
        self.line.offset = Some(offset);
        self
    }

    /// Search for an available line with the given name.
    ///
    /// If the chip is already set then only that chip is searched.
    /// Otherwise the chips in the base path are searched in directory order,
    /// and the search stops at the first chip with a match.
    ///
    /// Returns true if the line was found, in which case the descriptor and
    /// configuration are updated to match the line.
    pub fn find_pin(&mut self, name: &str) -> bool {
        if !self.line.chip.is_empty() {
            let chip = self.line.chip.clone();
            return self.locate(&chip, name);
        }
        let chips = Chips::new(self.current_defaults().base_path);
        let names = match chips.iter() {
            Ok(names) => names,
            Err(e) => {
                self.capture(&e);
                return false;
            }
        };
        for chip in names {
            if self.locate(&chip, name) {
                return true;
            }
        }
        false
    }

    /// Search a particular chip for an available line with the given name.
    ///
    /// Returns true if the line was found, in which case the descriptor and
    /// configuration are updated to match the line.  Otherwise the pin is
    /// unchanged apart from the error state.
    pub fn locate(&mut self, chip: &str, name: &str) -> bool {
        let path = chip::chip_path(&self.current_defaults().base_path, chip);
        match locate::locate(&self.driver, &path, name) {
            Ok(Some(info)) => {
                self.line = Descriptor {
                    chip: chip.to_string(),
                    offset: Some(info.offset),
                    name: name.to_string(),
                };
                self.config.reconcile(&info);
                true
            }
            Ok(None) => false,
            Err(e) => {
                log::warn!("searching {:?} for {}: {}", path, name, e);
                self.capture(&e);
                false
            }
        }
    }

    /// Set the consumer label the line is requested with.
    ///
    /// An empty consumer reverts to the default consumer.
    /// If the line is held then it is requested again with its current
    /// configuration so the new consumer is applied.
    pub fn set_consumer(&mut self, consumer: &str) {
        self.consumer = if consumer.is_empty() {
            None
        } else {
            Some(consumer.to_string())
        };
        if self.has_line() {
            _ = self.request_line(false);
        }
    }

    /// The consumer label the line would be requested with at the next request.
    pub fn consumer(&self) -> String {
        self.current_defaults()
            .resolve_consumer(self.consumer.as_deref(), &self.fallback)
    }

    /// The identity of the line.
    pub fn descriptor(&self) -> &Descriptor {
        &self.line
    }

    /// The configuration of the line.
    ///
    /// After a confirmed request this is the configuration reported by the kernel.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Select active high, or active low if `active_high` is false.
    ///
    /// Takes effect at the next request.
    pub fn prepare_as_active_high(&mut self, active_high: bool) -> &mut Self {
        self.config.prepare_as_active_high(active_high);
        self
    }

    /// Select the open drain drive.
    ///
    /// Takes effect at the next request.
    pub fn prepare_as_open_drain(&mut self, open_drain: bool) -> &mut Self {
        self.config.prepare_as_open_drain(open_drain);
        self
    }

    /// Select the open source drive.
    ///
    /// Takes effect at the next request.
    pub fn prepare_as_open_source(&mut self, open_source: bool) -> &mut Self {
        self.config.prepare_as_open_source(open_source);
        self
    }

    /// Request the line without changing its direction.
    pub fn configure_as_is(&mut self) -> Outcome {
        self.request_line(true)
    }

    /// Request the line as an input.
    pub fn configure_as_input(&mut self) -> Outcome {
        self.config.as_input();
        self.request_line(false)
    }

    /// Request the line as an output, initially active if `initial_active`.
    pub fn configure_as_output(&mut self, initial_active: bool) -> Outcome {
        self.config.as_output();
        self.output_is_active = initial_active;
        self.request_line(false)
    }

    // A held line is released before it is requested again, so another
    // process may claim the line in between.
    fn request_line(&mut self, as_is: bool) -> Outcome {
        self.release();
        let offset = match self.line.offset {
            Some(offset) if self.line.is_resolved() => offset,
            _ => {
                self.capture(&Error::UnresolvedLine);
                return Outcome::Failed;
            }
        };
        let defaults = self.current_defaults();
        let path = chip::chip_path(&defaults.base_path, &self.line.chip);
        let consumer = defaults.resolve_consumer(self.consumer.as_deref(), &self.fallback);
        let req = LineRequest::new(offset, &self.config, as_is, self.output_is_active, &consumer);
        match request::acquire(&self.driver, &path, &req) {
            Ok(handle) => {
                log::debug!("requested {}:{} for {}", self.line.chip, offset, consumer);
                self.handle = Some(handle);
            }
            Err(e) => {
                log::warn!("requesting {}:{}: {}", self.line.chip, offset, e);
                self.capture(&e);
                return Outcome::Failed;
            }
        }
        match request::read_back(&self.driver, &path, offset) {
            Ok(info) => {
                self.config.reconcile(&info);
                Outcome::Confirmed
            }
            Err(e) => {
                log::warn!("reading back {}:{}: {}", self.line.chip, offset, e);
                self.capture(&e);
                Outcome::Requested
            }
        }
    }

    /// Release the line, if it is held.
    ///
    /// The line is no longer held after this call, even if the release fails.
    pub fn release(&mut self) {
        if let Some(handle) = self.handle.take() {
            match self.driver.release(handle) {
                Ok(()) => log::debug!("released {}:{:?}", self.line.chip, self.line.offset),
                Err(e) => {
                    log::warn!("releasing {}:{:?}: {}", self.line.chip, self.line.offset, e);
                    self.capture(&e);
                }
            }
        }
    }

    /// Check if the line is held.
    pub fn has_line(&self) -> bool {
        self.handle.is_some()
    }

    /// Check if the line is configured active high.
    pub fn is_active_high(&self) -> bool {
        self.config.is_active_high()
    }

    /// Check if the line is configured as an input.
    pub fn is_input(&self) -> bool {
        self.config.is_input()
    }

    /// Check if the line is configured open drain.
    pub fn is_open_drain(&self) -> bool {
        self.config.is_open_drain()
    }

    /// Check if the line is configured open source.
    pub fn is_open_source(&self) -> bool {
        self.config.is_open_source()
    }

    /// Check if the line is configured as a push-pull output.
    pub fn is_push_pull(&self) -> bool {
        self.config.is_push_pull()
    }

    /// Check if an error has been captured.
    pub fn has_posix_error(&self) -> bool {
        self.errno.is_some()
    }

    /// The most recently captured error.
    pub fn posix_error(&self) -> Option<PosixError> {
        self.errno.map(PosixError)
    }

    /// Read the logical value of the line.
    ///
    /// Unlike [`IoPin::is_active`], this returns the error rather than
    /// capturing it.
    pub fn value(&self) -> Result<bool> {
        let handle = self.handle.as_ref().ok_or(Error::NotRequested)?;
        Ok(self.driver.value(handle)? != 0)
    }

    /// Set the logical value of the line.
    ///
    /// Unlike [`IoPin::activate`], this returns the error rather than
    /// capturing it.
    pub fn set_value(&mut self, active: bool) -> Result<()> {
        let handle = self.handle.as_ref().ok_or(Error::NotRequested)?;
        self.driver.set_value(handle, u8::from(active))?;
        self.output_is_active = active;
        Ok(())
    }

    /// The logical value most recently set, or requested, for the output.
    pub fn output_is_active(&self) -> bool {
        self.output_is_active
    }

    fn capture(&mut self, e: &Error) {
        self.errno = Some(e.errno());
    }

    fn assert_has_line(&self, op: &str) {
        assert!(
            self.has_line(),
            "GpioPin::{} requires a requested line, check has_line() first",
            op
        );
    }
}

impl<D: Driver> IoPin for GpioPin<D> {
    /// # Panics
    ///
    /// If the line is not held.
    fn is_active(&mut self) -> bool {
        self.assert_has_line("is_active");
        match self.value() {
            Ok(v) => v,
            Err(e) => {
                self.capture(&e);
                false
            }
        }
    }

    /// # Panics
    ///
    /// If the line is not held.
    fn activate(&mut self) {
        self.assert_has_line("activate");
        if let Err(e) = self.set_value(true) {
            self.capture(&e);
        }
    }

    /// # Panics
    ///
    /// If the line is not held.
    fn deactivate(&mut self) {
        self.assert_has_line("deactivate");
        if let Err(e) = self.set_value(false) {
            self.capture(&e);
        }
    }
}

impl<D: Driver> Drop for GpioPin<D> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            if let Err(e) = self.driver.release(handle) {
                log::warn!("releasing {}:{:?}: {}", self.line.chip, self.line.offset, e);
            }
        }
    }
}

impl<D: Driver> fmt::Debug for GpioPin<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GpioPin")
            .field("line", &self.line)
            .field("config", &self.config)
            .field("consumer", &self.consumer)
            .field("output_is_active", &self.output_is_active)
            .field("has_line", &self.has_line())
            .field("errno", &self.errno)
            .finish()
    }
}
