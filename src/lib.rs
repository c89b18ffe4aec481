#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]

//! A contiguous growable array over raw, manually managed memory.
//!
//! The crate is split in two layers:
//!
//! * [`storage::RawBlock`] owns an uninitialized region sized in elements and
//!   knows nothing about which slots are live;
//! * [`DynArray`] tracks a length over one such block and keeps every slot
//!   below it initialized.
//!
//! Growth doubles the capacity and constructs the incoming element in the new
//! block before anything is moved, so a panicking constructor can never
//! corrupt the array. Operations that may allocate come in two flavors: the
//! plain one panics on failure, the `try_` one returns an [`Error`].

extern crate alloc;

mod error;
pub mod storage;
pub mod vec;

#[cfg(test)]
mod test_utils;

pub use crate::error::{Error, Result};
pub use crate::storage::{Capacity, RawBlock};
pub use crate::vec::DynArray;
