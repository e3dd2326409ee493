use core::fmt;
use core::sync::atomic::{fence, AtomicU32, Ordering};

use lock_api::{GuardSend, RawMutex};

use crate::config::{MAX_OUTSTANDING, OWNER_MASK, SPIN_TARGET, TICKET_INC, TICKET_SHIFT};

/// A ticket-based mutex that ensures FIFO ordering for lock acquisition.
///
/// This provides fair synchronization by assigning each hart a "ticket"
/// and only allowing the hart with the matching "now serving" ticket
/// to enter.
pub type TicketMutex<T> = lock_api::Mutex<TicketLock, T>;

/// Guard type for [`TicketMutex`].
pub type TicketMutexGuard<'a, T> = lock_api::MutexGuard<'a, TicketLock, T>;

/// Raw ticket spinlock.
///
/// Both counters live in a single 32-bit word so that issuing a ticket and
/// reading the owner are each one atomic instruction:
///
/// ```text
///  31            16 15             0
/// +----------------+----------------+
/// |      next      |     owner      |
/// +----------------+----------------+
/// ```
///
/// `next - owner` (mod 2^16) is the number of harts holding or waiting for
/// the lock; zero means free. Counters are only compared for equality, so
/// they may wrap freely as long as fewer than 2^16 acquirers are outstanding
/// at any time.
///
/// # Safety Note
/// - This is a **spinlock**: it never sleeps and never yields.
/// - It is not reentrant. Calling [`lock`](Self::lock) while already holding
///   the lock deadlocks the caller.
/// - An issued ticket cannot be abandoned; every `lock` must be followed by
///   exactly one `unlock`.
#[repr(transparent)]
pub struct TicketLock {
    word: AtomicU32,
}

/// Decoded snapshot of a [`TicketLock`] word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TicketState {
    /// Ticket currently permitted to enter.
    pub owner: u16,
    /// Next ticket to be issued.
    pub next: u16,
}

impl TicketState {
    #[inline]
    pub const fn from_bits(word: u32) -> Self {
        Self {
            owner: (word & OWNER_MASK) as u16,
            next: (word >> TICKET_SHIFT) as u16,
        }
    }

    #[inline]
    pub const fn into_bits(self) -> u32 {
        ((self.next as u32) << TICKET_SHIFT) | self.owner as u32
    }

    #[inline]
    pub const fn is_locked(&self) -> bool {
        self.owner != self.next
    }

    /// Holder plus waiters.
    #[inline]
    pub const fn queue_len(&self) -> u16 {
        self.next.wrapping_sub(self.owner)
    }
}

impl TicketLock {
    /// Creates a free lock (`owner == next == 0`).
    pub const fn new() -> Self {
        Self {
            word: AtomicU32::new(0),
        }
    }

    /// Creates a lock with the given counters.
    ///
    /// Mostly useful for placing a lock mid-cycle, e.g. right before the
    /// counters wrap.
    pub const fn with_state(state: TicketState) -> Self {
        Self {
            word: AtomicU32::new(state.into_bits()),
        }
    }

    /// Returns a racy snapshot of both counters.
    #[inline]
    pub fn state(&self) -> TicketState {
        TicketState::from_bits(self.word.load(Ordering::Relaxed))
    }

    /// Raw pointer to the lock word, for callers sharing this layout.
    #[inline]
    pub const fn as_ptr(&self) -> *mut u32 {
        self.word.as_ptr()
    }

    /// Returns `true` if the lock is held by someone.
    ///
    /// The answer may be stale by the time it is returned. Use it for
    /// diagnostics only, never to decide whether touching protected data is
    /// safe.
    #[inline]
    pub fn check(&self) -> bool {
        let word = self.word.load(Ordering::Relaxed);
        // Later reads must not be satisfied before the one above.
        fence(Ordering::Acquire);
        TicketState::from_bits(word).is_locked()
    }

    /// Acquires the lock only if it is free and nobody is queued.
    ///
    /// Never spins on contention: a retry only happens when the word changed
    /// between the load and the conditional store.
    pub fn try_lock(&self) -> bool {
        let mut word = self.word.load(Ordering::Acquire);
        loop {
            if TicketState::from_bits(word).is_locked() {
                return false;
            }
            match self.word.compare_exchange_weak(
                word,
                word.wrapping_add(TICKET_INC),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(current) => word = current,
            }
        }
    }

    /// Takes a ticket and spins until it is served.
    ///
    /// Harts acquire the lock in exactly the order they took their tickets.
    pub fn lock(&self) {
        // Carry out of bit 31 is dropped, which wraps `next` mod 2^16.
        let prev = TicketState::from_bits(self.word.fetch_add(TICKET_INC, Ordering::AcqRel));
        let ticket = prev.next;
        // One more would wrap `next` onto the holder's ticket.
        debug_assert!(
            u32::from(prev.queue_len()) < MAX_OUTSTANDING - 1,
            "too many outstanding tickets"
        );
        if prev.owner == ticket {
            return;
        }

        log::trace!(
            target: SPIN_TARGET,
            "ticket {} waiting behind {} holder(s)",
            ticket,
            prev.queue_len()
        );

        while TicketState::from_bits(self.word.load(Ordering::Acquire)).owner != ticket {
            core::hint::spin_loop();
        }
    }

    /// Serves the next ticket.
    ///
    /// # Safety
    /// The caller must hold the lock, acquired through [`lock`](Self::lock)
    /// or a successful [`try_lock`](Self::try_lock), and must call this
    /// exactly once per acquisition. Anything else corrupts the counters and
    /// can let two harts in at once or stall every later ticket.
    pub unsafe fn unlock(&self) {
        // Only the holder writes `owner`, but `next` may move under us, so
        // the owner half is bumped with a CAS to keep its carry out of `next`.
        let prev = self.word.fetch_update(Ordering::Release, Ordering::Relaxed, |word| {
            let owner = word.wrapping_add(1) & OWNER_MASK;
            Some((word & !OWNER_MASK) | owner)
        });
        // `fetch_update` only fails when the closure returns `None`.
        if let Ok(word) = prev {
            debug_assert!(
                TicketState::from_bits(word).is_locked(),
                "unlock of a free ticket lock"
            );
        }
    }
}

impl Default for TicketLock {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TicketLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("TicketLock")
            .field("owner", &state.owner)
            .field("next", &state.next)
            .finish()
    }
}

unsafe impl RawMutex for TicketLock {
    #[allow(clippy::declare_interior_mutable_const)]
    const INIT: TicketLock = TicketLock::new();

    type GuardMarker = GuardSend;

    fn lock(&self) {
        TicketLock::lock(self)
    }

    fn try_lock(&self) -> bool {
        TicketLock::try_lock(self)
    }

    unsafe fn unlock(&self) {
        TicketLock::unlock(self)
    }

    fn is_locked(&self) -> bool {
        self.check()
    }
}

/// Returns `true` if `lock` is currently held. See [`TicketLock::check`].
#[inline]
pub fn check(lock: &TicketLock) -> bool {
    lock.check()
}

/// Single-attempt acquire. See [`TicketLock::try_lock`].
#[inline]
pub fn trylock(lock: &TicketLock) -> bool {
    lock.try_lock()
}

/// Fair blocking acquire. See [`TicketLock::lock`].
#[inline]
pub fn lock(lock: &TicketLock) {
    lock.lock()
}

/// Releases `lock`.
///
/// # Safety
/// Same contract as [`TicketLock::unlock`].
#[inline]
pub unsafe fn unlock(lock: &TicketLock) {
    lock.unlock()
}
