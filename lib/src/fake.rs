// SPDX-FileCopyrightText: 2021 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! An in-memory [`Driver`] that behaves like the v1 uAPI of the kernel.

use crate::driver::Driver;
use crate::line::{self, Offset};
use crate::request::LineRequest;
use crate::{chip, Error, Result, UapiCall};
use gpioline_uapi::{self as uapi, v1, Name};
use nix::errno::Errno;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

/// The state of a simulated line.
#[derive(Clone, Debug, Default)]
pub(crate) struct FakeLine {
    pub name: String,
    pub consumer: String,
    pub flags: v1::LineInfoFlags,
    /// The physical level.
    pub level: bool,
}

/// A simulated chip.
#[derive(Clone, Debug)]
pub(crate) struct FakeChip {
    pub label: String,
    pub lines: Vec<FakeLine>,
}

impl FakeChip {
    pub fn new(label: &str, num_lines: usize) -> FakeChip {
        FakeChip {
            label: label.into(),
            lines: vec![FakeLine::default(); num_lines],
        }
    }

    /// Name a line.
    pub fn name(mut self, offset: usize, name: &str) -> FakeChip {
        self.lines[offset].name = name.into();
        self
    }

    /// Mark a line as held by another consumer.
    pub fn claimed(mut self, offset: usize, consumer: &str) -> FakeChip {
        let line = &mut self.lines[offset];
        line.consumer = consumer.into();
        line.flags |= v1::LineInfoFlags::USED;
        self
    }

    /// Mark a line as reserved by the kernel, without a consumer.
    pub fn reserved(mut self, offset: usize) -> FakeChip {
        self.lines[offset].flags |= v1::LineInfoFlags::USED;
        self
    }

    /// Give the consumer label to a line without marking it used.
    pub fn labelled(mut self, offset: usize, consumer: &str) -> FakeChip {
        self.lines[offset].consumer = consumer.into();
        self
    }

    /// Set the flags reported for an unrequested line.
    pub fn flags(mut self, offset: usize, flags: v1::LineInfoFlags) -> FakeChip {
        self.lines[offset].flags = flags;
        self
    }
}

/// The driver operations that can be made to fail.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) enum Op {
    Open,
    Close,
    ChipInfo,
    LineInfo,
    Request,
    Value,
    SetValue,
    Release,
}

#[derive(Debug)]
pub(crate) struct FakeOpenChip {
    name: String,
}

#[derive(Debug)]
pub(crate) struct FakeHandle {
    chip: String,
    offset: Offset,
    active_low: bool,
}

#[derive(Debug, Default)]
struct State {
    chips: HashMap<String, FakeChip>,
    failures: HashMap<Op, Errno>,
    opened: Vec<String>,
    open_chips: usize,
    live_handles: usize,
}

impl State {
    fn fail(&self, op: Op) -> Option<Errno> {
        self.failures.get(&op).copied()
    }

    fn line_mut(&mut self, chip: &str, offset: Offset) -> Result<&mut FakeLine> {
        self.chips
            .get_mut(chip)
            .and_then(|c| c.lines.get_mut(offset as usize))
            .ok_or(Error::Os(Errno::EINVAL))
    }
}

/// A [`Driver`] over simulated chips addressed by the file name of their path.
///
/// Clones share the same chips.
#[derive(Clone, Debug, Default)]
pub(crate) struct FakeDriver(Rc<RefCell<State>>);

impl FakeDriver {
    pub fn new() -> FakeDriver {
        FakeDriver::default()
    }

    pub fn add_chip(&self, name: &str, chip: FakeChip) {
        self.0.borrow_mut().chips.insert(name.into(), chip);
    }

    /// Make every subsequent call of `op` fail with `errno`.
    pub fn fail(&self, op: Op, errno: Errno) {
        self.0.borrow_mut().failures.insert(op, errno);
    }

    pub fn heal(&self, op: Op) {
        self.0.borrow_mut().failures.remove(&op);
    }

    /// A copy of the current state of a line.
    pub fn line(&self, chip: &str, offset: usize) -> FakeLine {
        self.0.borrow().chips[chip].lines[offset].clone()
    }

    /// Drive the physical level of an input line.
    pub fn set_level(&self, chip: &str, offset: usize, level: bool) {
        if let Some(c) = self.0.borrow_mut().chips.get_mut(chip) {
            c.lines[offset].level = level;
        }
    }

    /// The names of the chips opened so far, in order.
    pub fn opened(&self) -> Vec<String> {
        self.0.borrow().opened.clone()
    }

    pub fn open_chips(&self) -> usize {
        self.0.borrow().open_chips
    }

    pub fn live_handles(&self) -> usize {
        self.0.borrow().live_handles
    }
}

fn uapi_err(call: UapiCall, errno: Errno) -> Error {
    Error::Uapi(call, uapi::Error::Os(errno))
}

impl Driver for FakeDriver {
    type Chip = FakeOpenChip;
    type Handle = FakeHandle;

    fn open(&self, path: &Path) -> Result<FakeOpenChip> {
        let mut s = self.0.borrow_mut();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        s.opened.push(name.clone());
        if let Some(errno) = s.fail(Op::Open) {
            return Err(Error::Os(errno));
        }
        if !s.chips.contains_key(&name) {
            return Err(Error::Os(Errno::ENOENT));
        }
        s.open_chips += 1;
        Ok(FakeOpenChip { name })
    }

    fn close(&self, chip: FakeOpenChip) -> Result<()> {
        let mut s = self.0.borrow_mut();
        s.open_chips -= 1;
        drop(chip);
        match s.fail(Op::Close) {
            Some(errno) => Err(Error::Os(errno)),
            None => Ok(()),
        }
    }

    fn chip_info(&self, chip: &FakeOpenChip) -> Result<chip::Info> {
        let s = self.0.borrow();
        if let Some(errno) = s.fail(Op::ChipInfo) {
            return Err(uapi_err(UapiCall::GetChipInfo, errno));
        }
        let c = &s.chips[&chip.name];
        Ok(chip::Info {
            name: chip.name.clone(),
            label: c.label.clone(),
            num_lines: c.lines.len() as u32,
        })
    }

    fn line_info(&self, chip: &FakeOpenChip, offset: Offset) -> Result<line::Info> {
        let s = self.0.borrow();
        if let Some(errno) = s.fail(Op::LineInfo) {
            return Err(uapi_err(UapiCall::GetLineInfo, errno));
        }
        let fl = s.chips[&chip.name]
            .lines
            .get(offset as usize)
            .ok_or(uapi_err(UapiCall::GetLineInfo, Errno::EINVAL))?;
        let li = v1::LineInfo {
            offset,
            flags: fl.flags,
            name: Name::from(fl.name.as_str()),
            consumer: Name::from(fl.consumer.as_str()),
        };
        Ok(line::Info::from(&li))
    }

    fn request(&self, chip: &FakeOpenChip, req: &LineRequest) -> Result<FakeHandle> {
        let mut s = self.0.borrow_mut();
        if let Some(errno) = s.fail(Op::Request) {
            return Err(uapi_err(UapiCall::GetLineHandle, errno));
        }
        let flags = req.flags;
        let output = flags.contains(v1::HandleRequestFlags::OUTPUT);
        let drive = v1::HandleRequestFlags::OPEN_DRAIN | v1::HandleRequestFlags::OPEN_SOURCE;
        if flags.contains(drive) || (!output && flags.intersects(drive)) {
            return Err(uapi_err(UapiCall::GetLineHandle, Errno::EINVAL));
        }
        let line = s
            .line_mut(&chip.name, req.offset)
            .map_err(|_| uapi_err(UapiCall::GetLineHandle, Errno::EINVAL))?;
        if line.flags.contains(v1::LineInfoFlags::USED) {
            return Err(uapi_err(UapiCall::GetLineHandle, Errno::EBUSY));
        }
        let active_low = flags.contains(v1::HandleRequestFlags::ACTIVE_LOW);
        line.consumer = String::from(&req.consumer);
        line.flags.insert(v1::LineInfoFlags::USED);
        line.flags.set(v1::LineInfoFlags::ACTIVE_LOW, active_low);
        line.flags.set(
            v1::LineInfoFlags::OPEN_DRAIN,
            flags.contains(v1::HandleRequestFlags::OPEN_DRAIN),
        );
        line.flags.set(
            v1::LineInfoFlags::OPEN_SOURCE,
            flags.contains(v1::HandleRequestFlags::OPEN_SOURCE),
        );
        if output {
            line.flags.insert(v1::LineInfoFlags::OUTPUT);
        } else if flags.contains(v1::HandleRequestFlags::INPUT) {
            line.flags.remove(v1::LineInfoFlags::OUTPUT);
        }
        if output {
            line.level = (req.value != 0) ^ active_low;
        }
        s.live_handles += 1;
        Ok(FakeHandle {
            chip: chip.name.clone(),
            offset: req.offset,
            active_low,
        })
    }

    fn value(&self, handle: &FakeHandle) -> Result<u8> {
        let mut s = self.0.borrow_mut();
        if let Some(errno) = s.fail(Op::Value) {
            return Err(uapi_err(UapiCall::GetLineValues, errno));
        }
        let line = s.line_mut(&handle.chip, handle.offset)?;
        Ok(u8::from(line.level ^ handle.active_low))
    }

    fn set_value(&self, handle: &FakeHandle, value: u8) -> Result<()> {
        let mut s = self.0.borrow_mut();
        if let Some(errno) = s.fail(Op::SetValue) {
            return Err(uapi_err(UapiCall::SetLineValues, errno));
        }
        let line = s.line_mut(&handle.chip, handle.offset)?;
        if !line.flags.contains(v1::LineInfoFlags::OUTPUT) {
            return Err(uapi_err(UapiCall::SetLineValues, Errno::EPERM));
        }
        line.level = (value != 0) ^ handle.active_low;
        Ok(())
    }

    fn release(&self, handle: FakeHandle) -> Result<()> {
        let mut s = self.0.borrow_mut();
        s.live_handles -= 1;
        let line = s.line_mut(&handle.chip, handle.offset)?;
        line.consumer.clear();
        line.flags.remove(
            v1::LineInfoFlags::USED
                | v1::LineInfoFlags::ACTIVE_LOW
                | v1::LineInfoFlags::OPEN_DRAIN
                | v1::LineInfoFlags::OPEN_SOURCE,
        );
        match s.fail(Op::Release) {
            Some(errno) => Err(Error::Os(errno)),
            None => Ok(()),
        }
    }
}
