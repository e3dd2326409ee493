//! Fair ticket spinlock for firmware running on several harts.
//!
//! The lock needs nothing but one 32-bit atomic word: no scheduler, no
//! interrupts, no allocation. See [`spin::TicketLock`] for the algorithm and
//! its memory-ordering contract.
//!
//! Also provided, on top of the lock:
//! - [`spin::TicketMutex`] / [`spin::IrqTicketMutex`] RAII wrappers
//! - [`io::console`] shared console output serialized by a ticket lock
//! - [`io::logging`] `log` backend printing to that console

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod io;
pub mod spin;
