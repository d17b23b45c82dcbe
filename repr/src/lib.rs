//! An AFS directory object is a sequence of fixed size pages, stored in network byte order:
//!
//! * Every page starts with a [page header](page/index.html) occupying the first slot
//! * Page 0 follows its page header with the [directory header](header/index.html)
//! * The remaining slots hold [directory entries](entry/index.html), each taking one base slot
//!   plus a number of continuation slots determined by the [name length](blobs/index.html)
//!
//! A page is divided into [`EPP`](constant.EPP.html) slots of [`RECSIZE`](constant.RECSIZE.html)
//! bytes each. Allocation of the slots is tracked by the bitmap in the page header.

pub mod blobs;
pub mod entry;
pub mod header;
pub mod page;

/// Size in bytes of a single page
pub const PAGE_SIZE: usize = 2048;
/// Size in bytes of a single slot
pub const RECSIZE: usize = 32;
/// Number of slots ("entries per page") in a page
pub const EPP: usize = PAGE_SIZE / RECSIZE;
/// The largest number of pages a directory object may hold
pub const MAX_PAGES: usize = 1023;
/// The page limit of directories predating the large directory format.
///
/// The page map in the directory header still only has this many entries.
pub const OLDMAXPAGES: usize = 128;
/// Number of hash buckets in the directory header
pub const NHASHENT: usize = 128;
/// Number of slots the directory header takes in page 0, after the page header
pub const DHE: usize = 12;
/// Longest name which may be stored in an entry, not including the terminator
pub const MAXNAMELEN: usize = 256;
/// Size of the name field of the base entry record, as laid out in the original structure
pub const OLDNAMESIZE: usize = 16;

/// Number of slots at the start of page `index` which are not available for entries
#[inline]
pub fn reserved_slots(index: usize) -> usize {
    if index == 0 {
        1 + DHE
    } else {
        1
    }
}

static_assertions::const_assert_eq!(EPP, 64);
static_assertions::const_assert_eq!(
    page::HEADER_SIZE + header::DIR_HEADER_SIZE,
    (1 + DHE) * RECSIZE
);
