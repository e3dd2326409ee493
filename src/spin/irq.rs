//! Interrupt-safe ticket lock.
//!
//! A trap handler that needs a lock already held by the code it interrupted
//! would spin forever on the same hart. Wrapping the lock so that local
//! interrupts stay disabled while it is held rules that out.

use core::cell::Cell;
use core::marker::PhantomData;

use lock_api::{GuardSend, RawMutex};

use super::ticket::TicketLock;

/// Local interrupt enable state of a hart.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum InterruptState {
    Enabled,
    Disabled,
}

impl From<InterruptState> for bool {
    fn from(value: InterruptState) -> Self {
        match value {
            InterruptState::Enabled => true,
            InterruptState::Disabled => false,
        }
    }
}

impl From<bool> for InterruptState {
    fn from(value: bool) -> Self {
        match value {
            true => InterruptState::Enabled,
            false => InterruptState::Disabled,
        }
    }
}

/// Platform hook for masking local interrupts.
///
/// Implemented by the firmware for its architecture, e.g. by clearing and
/// restoring `mstatus.MIE` on RISC-V. Calls nest per hart: interrupts are
/// restored only when the outermost `push_off` is undone, no matter in which
/// order the held locks are released. [`IrqNest`] carries the bookkeeping.
pub trait IrqControl {
    /// Disables local interrupts and bumps the calling hart's nesting depth.
    fn push_off();

    /// Undoes one `push_off`. At depth zero the state saved by the outermost
    /// `push_off` is put back.
    fn pop_off();
}

/// [`IrqControl`] for contexts without interrupts, such as hosted tests.
pub struct NoIrq;

impl IrqControl for NoIrq {
    #[inline]
    fn push_off() {}

    #[inline]
    fn pop_off() {}
}

/// Per-hart interrupt nesting record.
///
/// One instance lives in each hart's local area and is only touched by its
/// own hart, with interrupts already masked while it changes.
pub struct IrqNest {
    depth: Cell<usize>,
    saved: Cell<InterruptState>,
}

impl IrqNest {
    pub const fn new() -> Self {
        Self {
            depth: Cell::new(0),
            saved: Cell::new(InterruptState::Disabled),
        }
    }

    /// Masks interrupts through `save_and_disable` and records the previous
    /// state if this is the outermost level.
    pub fn push_off(&self, save_and_disable: impl FnOnce() -> InterruptState) {
        let state = save_and_disable();
        let old = self.depth.get();
        self.depth.set(old + 1);
        if old == 0 {
            self.saved.set(state);
        }
    }

    /// Leaves one level; hands the saved state to `restore` when the last
    /// level is left.
    pub fn pop_off(&self, restore: impl FnOnce(InterruptState)) {
        let old = self.depth.get();
        debug_assert!(old > 0, "pop_off without matching push_off");
        if old == 0 {
            return;
        }
        self.depth.set(old - 1);
        if old == 1 {
            restore(self.saved.get());
        }
    }

    /// Current nesting depth.
    pub fn depth(&self) -> usize {
        self.depth.get()
    }
}

impl Default for IrqNest {
    fn default() -> Self {
        Self::new()
    }
}

/// An interrupt-safe variant of [`TicketMutex`](super::TicketMutex).
pub type IrqTicketMutex<I, T> = lock_api::Mutex<RawIrqTicketLock<I>, T>;

/// Guard type for [`IrqTicketMutex`].
pub type IrqTicketMutexGuard<'a, I, T> = lock_api::MutexGuard<'a, RawIrqTicketLock<I>, T>;

/// Ticket lock that keeps local interrupts disabled while held.
pub struct RawIrqTicketLock<I> {
    inner: TicketLock,
    _irq: PhantomData<fn() -> I>,
}

impl<I: IrqControl> RawIrqTicketLock<I> {
    pub const fn new() -> Self {
        Self {
            inner: TicketLock::new(),
            _irq: PhantomData,
        }
    }

    /// The underlying ticket lock.
    pub fn ticket(&self) -> &TicketLock {
        &self.inner
    }
}

impl<I: IrqControl> Default for RawIrqTicketLock<I> {
    fn default() -> Self {
        Self::new()
    }
}

unsafe impl<I: IrqControl> RawMutex for RawIrqTicketLock<I> {
    #[allow(clippy::declare_interior_mutable_const)]
    const INIT: RawIrqTicketLock<I> = RawIrqTicketLock::new();

    type GuardMarker = GuardSend;

    fn lock(&self) {
        I::push_off();
        self.inner.lock();
    }

    fn try_lock(&self) -> bool {
        I::push_off();
        if self.inner.try_lock() {
            true
        } else {
            I::pop_off();
            false
        }
    }

    unsafe fn unlock(&self) {
        self.inner.unlock();
        I::pop_off();
    }

    fn is_locked(&self) -> bool {
        self.inner.check()
    }
}
