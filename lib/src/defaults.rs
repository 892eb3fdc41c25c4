// SPDX-FileCopyrightText: 2021 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

#[cfg(feature = "serde")]
use serde_derive::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process;
use std::sync::{PoisonError, RwLock};

/// The directory searched for GPIO chips unless configured otherwise.
pub const DEFAULT_BASE_PATH: &str = "/dev";

static PROCESS_DEFAULTS: RwLock<Option<Defaults>> = RwLock::new(None);

/// The settings a [`GpioPin`] falls back on when not given explicitly.
///
/// A pin constructed with a `Defaults` keeps using it.
/// A pin constructed without one takes a fresh snapshot of the process wide
/// defaults each time it locates or requests a line, so changes made with
/// [`set_base_path`] and [`set_default_consumer`] apply from the next request
/// and never disturb a line that is already held.
///
/// [`GpioPin`]: crate::GpioPin
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Defaults {
    /// The directory containing the GPIO character devices.
    pub base_path: PathBuf,

    /// The consumer label used when a pin has none of its own.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub consumer: Option<String>,
}

impl Default for Defaults {
    fn default() -> Self {
        Defaults {
            base_path: PathBuf::from(DEFAULT_BASE_PATH),
            consumer: None,
        }
    }
}

impl Defaults {
    /// A snapshot of the process wide defaults.
    pub fn current() -> Defaults {
        PROCESS_DEFAULTS
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .unwrap_or_default()
    }

    /// Replace the base path.
    pub fn with_base_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.base_path = path.into();
        self
    }

    /// Replace the default consumer.
    ///
    /// An empty consumer clears the default.
    pub fn with_consumer(mut self, consumer: &str) -> Self {
        self.consumer = non_empty(consumer);
        self
    }

    /// Select the consumer label for a request.
    ///
    /// The explicit consumer wins, then the default consumer, then the
    /// fallback unique to the pin.
    pub fn resolve_consumer(&self, explicit: Option<&str>, fallback: &str) -> String {
        explicit
            .filter(|c| !c.is_empty())
            .or(self.consumer.as_deref().filter(|c| !c.is_empty()))
            .unwrap_or(fallback)
            .to_string()
    }
}

/// Set the directory searched for GPIO chips by pins using the process wide defaults.
pub fn set_base_path<P: Into<PathBuf>>(path: P) {
    let path = path.into();
    update(|d| d.base_path = path);
}

/// Set the consumer label used by pins that have no consumer of their own.
///
/// An empty consumer clears the default.
pub fn set_default_consumer(consumer: &str) {
    let consumer = non_empty(consumer);
    update(|d| d.consumer = consumer);
}

fn update<F: FnOnce(&mut Defaults)>(f: F) {
    let mut guard = PROCESS_DEFAULTS
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    f(guard.get_or_insert_with(Defaults::default));
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Generate a consumer label unique to this process and pin.
///
/// The name format is `gpioline-p<pid>-<N>` where N counts the pins created.
pub(crate) fn fallback_consumer() -> String {
    global_counter!(PIN_COUNT, u32, 0);

    format!("gpioline-p{}-{}", process::id(), PIN_COUNT.inc_cloning())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default() {
        let d = Defaults::default();
        assert_eq!(d.base_path, PathBuf::from("/dev"));
        assert!(d.consumer.is_none());
    }

    #[test]
    fn with_consumer() {
        let d = Defaults::default().with_consumer("relay");
        assert_eq!(d.consumer.as_deref(), Some("relay"));
        let d = d.with_consumer("");
        assert!(d.consumer.is_none());
    }

    #[test]
    fn resolve_consumer() {
        let d = Defaults::default();
        assert_eq!(d.resolve_consumer(Some("mine"), "anon"), "mine");
        assert_eq!(d.resolve_consumer(Some(""), "anon"), "anon");
        assert_eq!(d.resolve_consumer(None, "anon"), "anon");

        let d = d.with_consumer("shared");
        assert_eq!(d.resolve_consumer(Some("mine"), "anon"), "mine");
        assert_eq!(d.resolve_consumer(Some(""), "anon"), "shared");
        assert_eq!(d.resolve_consumer(None, "anon"), "shared");
    }

    #[test]
    fn fallback_consumer_is_unique() {
        let a = fallback_consumer();
        let b = fallback_consumer();
        assert_ne!(a, b);
        let prefix = format!("gpioline-p{}-", process::id());
        assert!(a.starts_with(&prefix));
        assert!(b.starts_with(&prefix));
    }
}
