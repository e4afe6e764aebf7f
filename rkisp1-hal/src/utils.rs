use embassy_time::{Duration, Instant};

/// Blocks until a condition becomes false or a timeout is reached.
#[inline]
pub fn blocking_wait_timeout<F>(mut condition: F, timeout: Duration) -> Result<(), ()>
where
    F: FnMut() -> bool,
{
    let start = Instant::now();

    while condition() {
        if start.elapsed() > timeout {
            return Err(());
        }
        core::hint::spin_loop();
    }

    Ok(())
}

/// Rounds `value` down to a multiple of `align` (a power of two).
#[inline]
pub(crate) const fn align_down(value: u32, align: u32) -> u32 {
    value & !(align - 1)
}

/// Iterates the indices of the set bits of a word, lowest first.
pub(crate) struct BitIter(pub(crate) u32);

impl Iterator for BitIter {
    type Item = u8;

    fn next(&mut self) -> Option<Self::Item> {
        match self.0.trailing_zeros() {
            32 => None,
            b => {
                self.0 &= !(1 << b);
                Some(b as _)
            }
        }
    }
}
