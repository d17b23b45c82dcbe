//! The page header
//!
//! Every page of a directory object starts with a 32 byte header, which holds the magic tag and
//! the allocation bitmap for the slots of the page.

use std::fmt;
use zerocopy::byteorder::{BigEndian, U16};
use zerocopy::{AsBytes, FromBytes, Unaligned};

use crate::EPP;

/// The value of [`Header::tag`](struct.Header.html#structfield.tag) in every valid page
pub const MAGIC: u16 = 1234;

/// Size in bytes of the page header
pub const HEADER_SIZE: usize = 32;

#[derive(Debug, Copy, Clone, PartialEq, Eq, FromBytes, AsBytes, Unaligned)]
#[repr(C)]
pub struct Header {
    /// Number of pages in the directory object. Only maintained in page 0 by writers which
    /// support more than [`OLDMAXPAGES`](../constant.OLDMAXPAGES.html) pages
    pub pgcount: U16<BigEndian>,
    /// Must match [`MAGIC`](constant.MAGIC.html)
    pub tag: U16<BigEndian>,
    /// Number of free slots, as recorded by the writer
    pub freecount: u8,
    /// Slot allocation bitmap
    pub freebitmap: Bitmap,
    pub padding: [u8; 19],
}

impl Header {
    pub fn new(pgcount: u16, freebitmap: Bitmap) -> Self {
        Header {
            pgcount: U16::new(pgcount),
            tag: U16::new(MAGIC),
            freecount: freebitmap.free_count() as u8,
            freebitmap,
            padding: [0; 19],
        }
    }

    pub fn is_valid(&self) -> bool {
        self.tag.get() == MAGIC
    }
}

/// The allocation state of the slots of a page, one bit per slot
///
/// Slot `i` is tracked by bit `i % 8` (least significant first) of byte `i / 8`.
/// A set bit means the slot is allocated.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash, FromBytes, AsBytes, Unaligned)]
#[repr(C)]
pub struct Bitmap(pub [u8; EPP / 8]);

impl Bitmap {
    /// A bitmap with only the page header slot allocated
    pub const fn empty_page() -> Self {
        Bitmap([1, 0, 0, 0, 0, 0, 0, 0])
    }

    #[inline]
    pub fn is_allocated(&self, slot: usize) -> bool {
        self.0[slot >> 3] & (1 << (slot & 7)) != 0
    }

    #[inline]
    pub fn set(&mut self, slot: usize, allocated: bool) {
        if allocated {
            self.0[slot >> 3] |= 1 << (slot & 7);
        } else {
            self.0[slot >> 3] &= !(1 << (slot & 7));
        }
    }

    pub fn free_count(&self) -> usize {
        EPP - self.0.iter().map(|b| b.count_ones() as usize).sum::<usize>()
    }

    /// Lengths of the maximal runs of contiguous free slots, in slot order
    pub fn free_runs(&self) -> FreeRuns<'_> {
        FreeRuns {
            bitmap: self,
            slot: 0,
        }
    }

    pub fn largest_free_run(&self) -> usize {
        self.free_runs().max().unwrap_or(0)
    }
}

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Bitmap({})", self)
    }
}

/// Formats as a string of `0`/`1`, slot 0 first
impl fmt::Display for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for slot in 0..EPP {
            f.write_str(if self.is_allocated(slot) { "1" } else { "0" })?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct FreeRuns<'a> {
    bitmap: &'a Bitmap,
    slot: usize,
}

impl Iterator for FreeRuns<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        while self.slot < EPP && self.bitmap.is_allocated(self.slot) {
            self.slot += 1;
        }
        if self.slot == EPP {
            return None;
        }
        let start = self.slot;
        while self.slot < EPP && !self.bitmap.is_allocated(self.slot) {
            self.slot += 1;
        }
        Some(self.slot - start)
    }
}

static_assertions::assert_eq_size!(Header, [u8; HEADER_SIZE]);
