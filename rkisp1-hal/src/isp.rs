use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use portable_atomic::{AtomicU32, Ordering};

use crate::io::RegisterIo;
use crate::pad::IspSubdev;
use crate::platform::Platform;
use crate::regs::Regs;
use crate::Config;

/// State shared between the control path and the interrupt handlers.
pub(crate) struct Shared<P> {
    pub(crate) platform: P,
    /// Consumers currently streaming: both output paths and the ISP pad itself.
    pub(crate) streamon_count: u32,
    pub(crate) power_on: bool,
}

/// ISP device context.
///
/// Owns the register window, the negotiated pad state and the board
/// collaborators. Pad negotiation needs `&mut self`, so it cannot overlap
/// with streaming calls made through a shared reference. Stream control and
/// the interrupt handlers take `&self` and serialize on an internal
/// critical-section mutex.
pub struct Isp<R: RegisterIo, P: Platform> {
    pub(crate) io: R,
    pub(crate) config: Config,
    pub(crate) subdev: IspSubdev,
    pub(crate) frame_sync_seq: AtomicU32,
    pub(crate) shared: Mutex<CriticalSectionRawMutex, RefCell<Shared<P>>>,
}

impl<R: RegisterIo, P: Platform> Isp<R, P> {
    pub fn new(io: R, platform: P, config: Config) -> Self {
        Self {
            io,
            subdev: IspSubdev::new(config.default_width, config.default_height),
            config,
            frame_sync_seq: AtomicU32::new(0),
            shared: Mutex::new(RefCell::new(Shared {
                platform,
                streamon_count: 0,
                power_on: false,
            })),
        }
    }

    pub fn regs(&self) -> Regs<'_> {
        Regs::new(&self.io)
    }

    pub fn io(&self) -> &R {
        &self.io
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Negotiated pad state.
    pub fn subdev(&self) -> &IspSubdev {
        &self.subdev
    }

    /// Pad state for negotiation. Must not change while a stream is configured.
    pub fn subdev_mut(&mut self) -> &mut IspSubdev {
        &mut self.subdev
    }

    /// Runs `f` with exclusive access to the board collaborators.
    pub fn with_platform<T>(&self, f: impl FnOnce(&mut P) -> T) -> T {
        self.shared.lock(|shared| f(&mut shared.borrow_mut().platform))
    }

    pub fn streamon_count(&self) -> u32 {
        self.shared.lock(|shared| shared.borrow().streamon_count)
    }

    pub fn is_powered(&self) -> bool {
        self.shared.lock(|shared| shared.borrow().power_on)
    }

    /// Sequence number the next frame-sync event will carry.
    pub fn frame_sync_seq(&self) -> u32 {
        self.frame_sync_seq.load(Ordering::Relaxed)
    }

    /// Splits the device into the pieces a sequencer step needs at once.
    pub(crate) fn with_shared<T>(
        &self,
        f: impl FnOnce(&Regs<'_>, &mut Shared<P>) -> T,
    ) -> T {
        let regs = self.regs();
        self.shared.lock(|shared| f(&regs, &mut shared.borrow_mut()))
    }
}
