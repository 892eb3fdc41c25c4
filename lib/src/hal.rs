// SPDX-FileCopyrightText: 2024 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! [`embedded_hal`] digital traits for [`GpioPin`].
//!
//! The traits deal in physical levels, so the active-low translation applied
//! by the kernel is undone here.  Unlike the [`IoPin`](crate::IoPin) methods,
//! failures are returned and not captured.

use crate::driver::Driver;
use crate::{Error, GpioPin};
use embedded_hal::digital::{self, ErrorKind, ErrorType, InputPin, OutputPin, StatefulOutputPin};

impl digital::Error for Error {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

impl<D: Driver> ErrorType for GpioPin<D> {
    type Error = Error;
}

impl<D: Driver> InputPin for GpioPin<D> {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.value()? == self.is_active_high())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|high| !high)
    }
}

impl<D: Driver> OutputPin for GpioPin<D> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        let active = !self.is_active_high();
        self.set_value(active)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        let active = self.is_active_high();
        self.set_value(active)
    }
}

impl<D: Driver> StatefulOutputPin for GpioPin<D> {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.output_is_active() == self.is_active_high())
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        self.is_set_high().map(|high| !high)
    }

    fn toggle(&mut self) -> Result<(), Self::Error> {
        let active = !self.output_is_active();
        self.set_value(active)
    }
}
