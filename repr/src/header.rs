//! The directory header
//!
//! Page 0 follows its page header with the page allocation map and the hash table, filling
//! [`DHE`](../constant.DHE.html) slots.

use zerocopy::byteorder::{BigEndian, U16};
use zerocopy::{AsBytes, FromBytes, Unaligned};

use crate::{NHASHENT, OLDMAXPAGES};

/// Size in bytes of the directory header, not including the page header
pub const DIR_HEADER_SIZE: usize = OLDMAXPAGES + NHASHENT * 2;

#[derive(Debug, Copy, Clone, PartialEq, Eq, FromBytes, AsBytes, Unaligned)]
#[repr(C)]
pub struct DirHeader {
    /// Number of allocated slots in each of the first [`OLDMAXPAGES`](../constant.OLDMAXPAGES.html)
    /// pages, as maintained by the writer
    pub page_map: [u8; OLDMAXPAGES],
    /// The slot index of the first entry of each hash chain, 0 for an empty chain.
    ///
    /// Slot indexes count from the start of the directory object, so the page is `index / EPP`
    pub hash_table: [U16<BigEndian>; NHASHENT],
}

impl DirHeader {
    pub fn empty() -> Self {
        DirHeader {
            page_map: [0; OLDMAXPAGES],
            hash_table: [U16::new(0); NHASHENT],
        }
    }

    /// `(page, allocated count)` for every page with a non-zero page map entry
    pub fn used_pages(&self) -> impl Iterator<Item = (usize, u8)> + '_ {
        self.page_map
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count != 0)
            .map(|(i, &count)| (i, count))
    }

    /// `(bucket, head slot)` for every non-empty hash chain
    pub fn chains(&self) -> impl Iterator<Item = (usize, u16)> + '_ {
        self.hash_table
            .iter()
            .map(|head| head.get())
            .enumerate()
            .filter(|&(_, head)| head != 0)
    }
}

static_assertions::assert_eq_size!(DirHeader, [u8; DIR_HEADER_SIZE]);
