//! # Spin Locks Module
//!
//! Low-level mutual exclusion for firmware running on several harts with no
//! scheduler underneath.
//!
//! ## Implementations
//! - [`TicketLock`] - Fair spinlock using the ticket algorithm
//!   ▶ Harts enter in the order they asked, no starvation
//!   ▶ Both counters packed in one 32-bit word (`owner` low, `next` high)
//! - [`TicketMutex`] - RAII wrapper over [`TicketLock`] via `lock_api`
//! - [`IrqTicketMutex`] - Same, with local interrupts masked while held
//!
//! ## Usage Guidelines
//! ```rust
//! use ticket_spinlock::spin::{self, TicketLock, TicketMutex};
//!
//! static LOCK: TicketLock = TicketLock::new();
//! spin::lock(&LOCK);
//! assert!(spin::check(&LOCK));
//! unsafe { spin::unlock(&LOCK) };
//!
//! let counter = TicketMutex::new(0);
//! *counter.lock() += 1;
//! ```
//!
//! ## Safety
//! - Spinlocks MUST NOT be held across long-running operations
//! - No reentrancy, no timeout, no deadlock detection
//! - Fewer than 2^16 harts may hold or wait for one lock at a time
//! - Take [`IrqTicketMutex`] for anything a trap handler also locks

mod irq;
mod ticket;

pub use irq::{
    InterruptState, IrqControl, IrqNest, IrqTicketMutex, IrqTicketMutexGuard, NoIrq,
    RawIrqTicketLock,
};
pub use ticket::{
    check, lock, trylock, unlock, TicketLock, TicketMutex, TicketMutexGuard, TicketState,
};
