//! Register interface
//!
//! Everything in this crate talks to the hardware through [`RegisterIo`]:
//! 32-bit reads and writes at byte offsets inside the ISP register window.
//! Typed values only turn into integers at this boundary, through [`Reg`].

use core::cell::RefCell;
use core::marker::PhantomData;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::regs::WINDOW_SIZE;

/// 32-bit register access at byte offsets.
///
/// Accesses are assumed immediate and infallible, like memory-mapped I/O.
pub trait RegisterIo {
    fn read32(&self, offset: u32) -> u32;
    fn write32(&self, offset: u32, value: u32);
}

impl<T: RegisterIo + ?Sized> RegisterIo for &T {
    #[inline]
    fn read32(&self, offset: u32) -> u32 {
        (**self).read32(offset)
    }

    #[inline]
    fn write32(&self, offset: u32, value: u32) {
        (**self).write32(offset, value)
    }
}

/// Handle to one register holding a value of type `T`.
///
/// `T` is either a plain `u32` or a `bitfield-struct` value type.
#[derive(Clone, Copy)]
pub struct Reg<'a, T> {
    io: &'a dyn RegisterIo,
    offset: u32,
    _marker: PhantomData<T>,
}

impl<'a, T> Reg<'a, T>
where
    T: Copy + From<u32> + Into<u32>,
{
    #[inline]
    pub(crate) fn new(io: &'a dyn RegisterIo, offset: u32) -> Self {
        Self {
            io,
            offset,
            _marker: PhantomData,
        }
    }

    /// Byte offset inside the register window.
    #[inline]
    pub fn offset(&self) -> u32 {
        self.offset
    }

    #[inline]
    pub fn read(&self) -> T {
        T::from(self.io.read32(self.offset))
    }

    #[inline]
    pub fn write_value(&self, value: T) {
        self.io.write32(self.offset, value.into())
    }

    /// Writes a value built from all-zero bits.
    #[inline]
    pub fn write<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut value = T::from(0);
        let r = f(&mut value);
        self.write_value(value);
        r
    }

    /// Read-modify-write.
    #[inline]
    pub fn modify<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut value = self.read();
        let r = f(&mut value);
        self.write_value(value);
        r
    }
}

/// Volatile access to a mapped ISP register window.
pub struct Mmio {
    base: *mut u8,
}

// The window is device memory; every access is a single volatile load or store.
unsafe impl Send for Mmio {}
unsafe impl Sync for Mmio {}

impl Mmio {
    /// # Safety
    ///
    /// `base` must point to the start of the mapped ISP register window,
    /// valid for [`WINDOW_SIZE`] bytes for as long as this value lives.
    pub const unsafe fn new(base: *mut u8) -> Self {
        Self { base }
    }
}

impl RegisterIo for Mmio {
    #[inline]
    fn read32(&self, offset: u32) -> u32 {
        debug_assert!(offset < WINDOW_SIZE && offset % 4 == 0);
        unsafe { core::ptr::read_volatile(self.base.add(offset as usize) as *const u32) }
    }

    #[inline]
    fn write32(&self, offset: u32, value: u32) {
        debug_assert!(offset < WINDOW_SIZE && offset % 4 == 0);
        unsafe { core::ptr::write_volatile(self.base.add(offset as usize) as *mut u32, value) }
    }
}

const WORDS: usize = (WINDOW_SIZE / 4) as usize;

/// RAM-backed register window.
///
/// Stores whatever is written and reads it back; no side effects such as
/// write-1-to-clear are modelled. Used for dry runs of the configuration
/// sequence and by host tooling.
pub struct RegisterFile {
    words: Mutex<CriticalSectionRawMutex, RefCell<[u32; WORDS]>>,
}

impl RegisterFile {
    pub const fn new() -> Self {
        Self {
            words: Mutex::new(RefCell::new([0; WORDS])),
        }
    }

    /// Calls `f(offset, value)` for every non-zero register, in offset order.
    pub fn for_each_nonzero(&self, mut f: impl FnMut(u32, u32)) {
        self.words.lock(|words| {
            for (i, &value) in words.borrow().iter().enumerate() {
                if value != 0 {
                    f(i as u32 * 4, value);
                }
            }
        })
    }

    /// Zeroes the whole window.
    pub fn clear(&self) {
        self.words.lock(|words| words.borrow_mut().fill(0))
    }
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterIo for RegisterFile {
    fn read32(&self, offset: u32) -> u32 {
        let index = (offset / 4) as usize;
        self.words.lock(|words| words.borrow().get(index).copied().unwrap_or(0))
    }

    fn write32(&self, offset: u32, value: u32) {
        let index = (offset / 4) as usize;
        self.words.lock(|words| {
            if let Some(word) = words.borrow_mut().get_mut(index) {
                *word = value;
            } else {
                warn!("register write outside window: 0x{:04X}", offset);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regs::{IspCtrl, IspMode, Regs};

    #[test]
    fn register_file_round_trips_and_lists() {
        let file = RegisterFile::new();
        file.write32(0x10, 0xdead_beef);
        file.write32(0x400, 1);
        assert_eq!(file.read32(0x10), 0xdead_beef);

        let mut seen = Vec::new();
        file.for_each_nonzero(|offset, value| seen.push((offset, value)));
        assert_eq!(seen, [(0x10, 0xdead_beef), (0x400, 1)]);

        file.clear();
        assert_eq!(file.read32(0x10), 0);
    }

    #[test]
    fn out_of_window_access_is_ignored() {
        let file = RegisterFile::new();
        file.write32(WINDOW_SIZE + 4, 7);
        assert_eq!(file.read32(WINDOW_SIZE + 4), 0);
    }

    #[test]
    fn modify_keeps_other_bits() {
        let file = RegisterFile::new();
        let regs = Regs::new(&file);
        regs.isp_ctrl().write(|w| w.set_mode(IspMode::BayerItu601));
        regs.isp_ctrl().modify(|w| {
            w.set_isp_enable(true);
            w.set_cfg_upd(true);
        });

        let ctrl: IspCtrl = regs.isp_ctrl().read();
        assert_eq!(ctrl.mode(), IspMode::BayerItu601);
        assert_eq!(file.read32(0x400), (3 << 1) | (1 << 0) | (1 << 9));
    }
}
