// SPDX-FileCopyrightText: 2021 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: MIT

use nix::errno::Errno;
use std::ffi::OsStr;
use std::mem;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::prelude::RawFd;

pub(crate) const IOCTL_MAGIC: u8 = 0xb4;

#[repr(u8)]
enum Ioctl {
    GetChipInfo = 1,
}

/// Information about a particular GPIO chip.
#[repr(C)]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ChipInfo {
    /// The Linux kernel name of this GPIO chip.
    pub name: Name,

    /// A functional name for this GPIO chip, such as a product number.
    ///
    /// May be empty.
    pub label: Name,

    /// The number of GPIO lines on this chip.
    pub num_lines: u32,
}

/// Get the publicly available information for a chip.
///
/// * `cfd` - The fd of the open chip.
pub fn get_chip_info(cfd: RawFd) -> Result<ChipInfo> {
    let mut chip = ChipInfo::default();
    // SAFETY: returned struct contains raw byte arrays and ints that are safe to decode.
    match unsafe {
        libc::ioctl(
            cfd,
            nix::request_code_read!(IOCTL_MAGIC, Ioctl::GetChipInfo, mem::size_of::<ChipInfo>()),
            &mut chip,
        )
    } {
        0 => Ok(chip),
        _ => Err(Error::from_errno()),
    }
}

/// The result returned by [`gpioline_uapi`] functions.
///
/// [`gpioline_uapi`]: crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by [`gpioline_uapi`] functions.
///
/// [`gpioline_uapi`]: crate
#[derive(Clone, Copy, Debug, thiserror::Error, Eq, PartialEq)]
pub enum Error {
    /// An error returned from an underlying system call.
    #[error(transparent)]
    Os(#[from] Errno),
}

impl Error {
    /// Capture the errno left by the most recent failed system call.
    pub(crate) fn from_errno() -> Error {
        Error::Os(Errno::last())
    }

    /// The OS error code behind the error.
    pub fn errno(&self) -> Errno {
        match self {
            Error::Os(e) => *e,
        }
    }
}

/// The maximum number of bytes stored in a Name, including the terminator.
pub const NAME_MAX: usize = 32;

/// A uAPI name string.
///
/// The kernel always terminates names, so at most `NAME_MAX - 1` bytes are
/// significant.
#[repr(C)]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Name([u8; NAME_MAX]);

impl Name {
    /// Checks whether the Name is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0[0] == 0
    }

    /// The length of the contained name.
    #[inline]
    pub fn strlen(&self) -> usize {
        self.0.iter().position(|&x| x == 0).unwrap_or(self.0.len())
    }

    /// Convert the contained name to a OsStr slice.
    pub fn as_os_str(&self) -> &OsStr {
        OsStr::from_bytes(&self.0[..self.strlen()])
    }

    /// Construct a Name from byte slice.
    ///
    /// Input beyond `NAME_MAX - 1` bytes is silently dropped, which may leave
    /// invalid UTF-8 if the cut lands in the middle of a multi-byte character.
    pub fn from_bytes(s: &[u8]) -> Name {
        let mut d = Name::default();
        for (src, dst) in s.iter().zip(d.0[..NAME_MAX - 1].iter_mut()) {
            *dst = *src;
        }
        d
    }
}

impl From<&str> for Name {
    fn from(s: &str) -> Self {
        Name::from_bytes(s.as_bytes())
    }
}

impl From<&Name> for String {
    fn from(n: &Name) -> Self {
        String::from(n.as_os_str().to_string_lossy())
    }
}

/// An identifier for a line on a particular chip.
///
/// Valid offsets are in the range 0..`num_lines` as reported in the [`ChipInfo`].
pub type Offset = u32;

/// The maximum number of lines that may be requested in a single request.
pub const LINES_MAX: usize = 64;

/// A collection of line offsets.
///
/// Typically used to identify the lines belonging to a particular request.
#[repr(C)]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Offsets([Offset; LINES_MAX]);

impl Offsets {
    /// Create offsets from an iterable list.
    pub fn from_slice(s: &[u32]) -> Self {
        let mut n: Offsets = Default::default();
        for (src, dst) in s.iter().zip(n.0.iter_mut()) {
            *dst = *src;
        }
        n
    }

    /// Get the indexed offset from the set.
    #[inline]
    pub fn get(&self, idx: usize) -> Offset {
        self.0[idx]
    }
}

impl Default for Offsets {
    fn default() -> Self {
        Offsets([0; LINES_MAX])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_chip_info() {
        assert_eq!(
            mem::size_of::<ChipInfo>(),
            68usize,
            concat!("Size of: ", stringify!(ChipInfo))
        );
    }

    #[test]
    fn size_name() {
        assert_eq!(
            mem::size_of::<Name>(),
            NAME_MAX,
            concat!("Size of: ", stringify!(Name))
        );
    }

    #[test]
    fn size_offsets() {
        assert_eq!(
            mem::size_of::<Offsets>(),
            256usize,
            concat!("Size of: ", stringify!(Offsets))
        );
    }

    mod name {
        use super::*;

        #[test]
        fn from_str() {
            let mut x = [0u8; NAME_MAX];
            x[..6].copy_from_slice(b"banana");
            let a = Name::from("banana");
            assert_eq!(a.0, x);
            let a = Name::from("apple");
            x[..6].copy_from_slice(b"apple\0");
            assert_eq!(a.0, x);
        }

        #[test]
        fn is_empty() {
            assert!(Name::default().is_empty());
            assert!(!Name::from("banana").is_empty());
        }

        #[test]
        fn truncates_to_leave_terminator() {
            let a = Name::from("an overly long truncated name -><- cut here");
            assert_eq!(a.strlen(), NAME_MAX - 1);
            assert_eq!(a.0[NAME_MAX - 1], 0);
            assert_eq!(a.as_os_str(), "an overly long truncated name -");
        }

        #[test]
        fn strlen_of_full_kernel_name() {
            // names read back from the kernel may fill the whole buffer
            let a = Name([b'x'; NAME_MAX]);
            assert_eq!(a.strlen(), NAME_MAX);
        }

        #[test]
        fn into_string() {
            assert_eq!(String::from(&Name::default()), "");
            assert_eq!(String::from(&Name::from("banana")), "banana");
        }
    }

    #[test]
    fn offsets_from_slice() {
        let a = Offsets::from_slice(&[1, 2, 3, 0, 5, 6]);
        assert_eq!(a.get(0), 1);
        assert_eq!(a.get(4), 5);
        assert_eq!(a.get(6), 0);
        assert_eq!(Offsets::default().0, [0u32; LINES_MAX]);
    }

    #[test]
    fn error_errno() {
        let e = Error::from(Errno::EBUSY);
        assert_eq!(e.errno(), Errno::EBUSY);
    }
}
