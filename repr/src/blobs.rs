//! Slot arithmetic
//!
//! Writers reserve `1 + (len + 1 + OLDNAMESIZE - 1) / RECSIZE` slots for a name of `len` bytes.
//! Names of 16 to 19 bytes get one slot more than they need; existing directory objects were
//! written that way.

use crate::{MAXNAMELEN, OLDNAMESIZE, RECSIZE};
use std::ops::RangeInclusive;

/// Number of slots taken by an entry with a name of `name_len` bytes
#[inline]
pub const fn name_to_records(name_len: usize) -> usize {
    1 + (name_len + 1 + OLDNAMESIZE - 1) / RECSIZE
}

/// Number of slots taken by an entry with the longest possible name
pub const MAX_RECORDS: usize = name_to_records(MAXNAMELEN);

/// The name lengths which take exactly `records` slots, clamped to `1..=MAXNAMELEN`
///
/// Returns `None` if no valid name length maps to `records`.
pub fn records_to_name_range(records: usize) -> Option<RangeInclusive<usize>> {
    if records == 0 {
        return None;
    }
    // name_to_records(n) == k  <=>  (k - 1) * RECSIZE <= n + OLDNAMESIZE < k * RECSIZE
    let min = ((records - 1) * RECSIZE).saturating_sub(OLDNAMESIZE).max(1);
    let max = (records * RECSIZE)
        .checked_sub(OLDNAMESIZE + 1)?
        .min(MAXNAMELEN);
    if min > max {
        return None;
    }
    Some(min..=max)
}
