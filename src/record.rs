//! Decoding of the slots of a page
//!
//! The slots of a page are walked with a single cursor. An allocated slot starts an entry, and
//! the cursor then steps over the continuation slots its name needs. A free slot is decoded as if
//! it held an entry, for diagnostics only, and the cursor steps to the next slot.

use bstr::{BString, ByteSlice};
use repr::blobs::name_to_records;
use repr::entry::{self, Fid, Flags, PREFIX_SIZE};
use repr::{EPP, MAXNAMELEN, PAGE_SIZE, RECSIZE};

use crate::read::{read_struct, Page};

/// A slot which starts an entry, or would start one if the slot were allocated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Index of the base slot within its page
    pub slot: usize,
    pub prefix: entry::Prefix,
    pub name: BString,
    /// Number of slots the entry takes within the page, including the base slot
    pub records: usize,
    /// Bytes left behind by an earlier, longer name: everything after the terminator up to the
    /// end of the slot holding it. For a free slot, the whole slot.
    pub garbage: BString,
}

impl Entry {
    pub fn fid(&self) -> Fid {
        self.prefix.fid()
    }

    pub fn flags(&self) -> Flags {
        self.prefix.flags()
    }

    pub fn next(&self) -> u16 {
        self.prefix.next.get()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record<'a> {
    /// The base slot of an allocated entry
    Entry(Entry),
    /// A slot holding the overflow of the name of the preceding entry
    Continuation { slot: usize, raw: &'a [u8] },
    /// An unallocated slot
    Free(Entry),
}

impl Record<'_> {
    pub fn slot(&self) -> usize {
        match self {
            Record::Entry(entry) | Record::Free(entry) => entry.slot,
            Record::Continuation { slot, .. } => *slot,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Records<'a> {
    page: &'a Page,
    slot: usize,
    /// Continuation slots still owed to the last entry
    pending: usize,
}

impl<'a> Records<'a> {
    pub(crate) fn new(page: &'a Page) -> Self {
        Records {
            page,
            slot: repr::reserved_slots(page.index()),
            pending: 0,
        }
    }

    /// Only the allocated entries
    pub fn entries(self) -> impl Iterator<Item = Entry> + 'a {
        self.filter_map(|record| match record {
            Record::Entry(entry) => Some(entry),
            _ => None,
        })
    }
}

impl<'a> Iterator for Records<'a> {
    type Item = Record<'a>;

    fn next(&mut self) -> Option<Record<'a>> {
        let slot = self.slot;
        if slot >= EPP {
            return None;
        }
        self.slot += 1;

        if self.pending > 0 {
            self.pending -= 1;
            return Some(Record::Continuation {
                slot,
                raw: self.page.slot(slot),
            });
        }

        if self.page.bitmap().is_allocated(slot) {
            let entry = decode_entry(self.page.as_bytes(), slot);
            self.pending = entry.records - 1;
            Some(Record::Entry(entry))
        } else {
            Some(Record::Free(decode_free(self.page.as_bytes(), slot)))
        }
    }
}

/// Decode the allocated entry starting at `slot`; its name may run on past the slot
fn decode_entry(page: &[u8], slot: usize) -> Entry {
    let start = slot * RECSIZE;
    let name_start = start + PREFIX_SIZE;
    let region = &page[name_start..PAGE_SIZE.min(name_start + MAXNAMELEN + 1)];

    let terminator = region.find_byte(0);
    let name_len = terminator.unwrap_or(region.len()).min(MAXNAMELEN);
    let garbage = match terminator {
        Some(pos) => {
            let end = name_start + pos;
            let slot_end = (end / RECSIZE + 1) * RECSIZE;
            &page[end + 1..slot_end]
        }
        None => &[][..],
    };

    Entry {
        slot,
        prefix: read_struct(&page[start..]),
        name: BString::from(&region[..name_len]),
        records: name_to_records(name_len).min(EPP - slot),
        garbage: BString::from(garbage),
    }
}

/// Decode an unallocated slot, looking no further than the slot itself
fn decode_free(page: &[u8], slot: usize) -> Entry {
    let raw = &page[slot * RECSIZE..(slot + 1) * RECSIZE];
    let inline = &raw[PREFIX_SIZE..];
    let name_len = inline.find_byte(0).unwrap_or(inline.len());

    Entry {
        slot,
        prefix: read_struct(raw),
        name: BString::from(&inline[..name_len]),
        records: 1,
        garbage: BString::from(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repr::page::{Bitmap, Header};
    use zerocopy::AsBytes;

    struct Builder {
        data: Vec<u8>,
        bitmap: Bitmap,
    }

    impl Builder {
        fn new() -> Self {
            Builder {
                data: vec![0; PAGE_SIZE],
                bitmap: Bitmap::empty_page(),
            }
        }

        fn entry(mut self, slot: usize, vnode: u32, name: &[u8]) -> Self {
            let fid = Fid { vnode, unique: 1 };
            let start = slot * RECSIZE;
            let prefix = entry::Prefix::new(Flags::FIRST, 0, fid);
            self.data[start..start + PREFIX_SIZE].copy_from_slice(prefix.as_bytes());
            self.data[start + PREFIX_SIZE..start + PREFIX_SIZE + name.len()].copy_from_slice(name);
            self.data[start + PREFIX_SIZE + name.len()] = 0;
            for s in slot..slot + name_to_records(name.len()) {
                self.bitmap.set(s, true);
            }
            self
        }

        fn raw(mut self, offset: usize, bytes: &[u8]) -> Self {
            self.data[offset..offset + bytes.len()].copy_from_slice(bytes);
            self
        }

        fn page(mut self, index: usize) -> Page {
            self.data[..RECSIZE].copy_from_slice(Header::new(1, self.bitmap).as_bytes());
            let mut data = Box::new([0; PAGE_SIZE]);
            data.copy_from_slice(&self.data);
            Page::new(index, data)
        }
    }

    #[test]
    fn steps_over_continuations() {
        let long = [b'x'; 40];
        let page = Builder::new()
            .entry(1, 10, b"short")
            .entry(2, 11, &long)
            .entry(5, 12, b"after")
            .page(1);

        let records: Vec<_> = page.records().collect();
        assert_eq!(records.len(), EPP - 1);
        assert!(matches!(&records[0], Record::Entry(e) if e.name == "short" && e.records == 1));
        assert!(matches!(&records[1], Record::Entry(e) if e.name == &long[..] && e.records == 2));
        assert!(matches!(records[2], Record::Continuation { slot: 3, .. }));
        assert!(matches!(&records[3], Record::Free(e) if e.slot == 4));
        assert!(matches!(&records[4], Record::Entry(e) if e.fid().vnode == 12));
        assert!(records[5..].iter().all(|r| matches!(r, Record::Free(_))));
    }

    #[test]
    fn page_zero_skips_dir_header() {
        let page = Builder::new().entry(13, 1, b"first").page(0);
        let first = page.records().next().unwrap();
        assert_eq!(first.slot(), 13);
        assert_eq!(page.records().entries().count(), 1);
    }

    #[test]
    fn leftover_bytes() {
        let page = Builder::new()
            .raw(RECSIZE + PREFIX_SIZE, b"longername")
            .entry(1, 1, b"ab")
            .page(1);
        let entry = page.records().entries().next().unwrap();
        assert_eq!(entry.name, "ab");
        assert_eq!(entry.garbage.len(), RECSIZE - PREFIX_SIZE - 3);
        assert!(entry.garbage.starts_with(b"gername"));
    }

    #[test]
    fn free_slot_is_raw() {
        let page = Builder::new()
            .raw(2 * RECSIZE + PREFIX_SIZE, b"gone\0junk")
            .entry(1, 1, b"ab")
            .page(1);
        match page.records().nth(1).unwrap() {
            Record::Free(entry) => {
                assert_eq!(entry.name, "gone");
                assert_eq!(entry.garbage.len(), RECSIZE);
                assert_eq!(&entry.garbage[..], page.slot(2));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn entry_clamped_to_page() {
        let page = Builder::new()
            .raw((EPP - 1) * RECSIZE + PREFIX_SIZE, &[b'z'; 20])
            .page(1);
        let mut bitmap_page = page.as_bytes().to_vec();
        // allocate the last slot without a terminator in the page
        bitmap_page[5 + 7] |= 0x80;
        let mut data = Box::new([0; PAGE_SIZE]);
        data.copy_from_slice(&bitmap_page);
        let page = Page::new(1, data);

        let last = page.records().last().unwrap();
        match last {
            Record::Entry(entry) => {
                assert_eq!(entry.slot, EPP - 1);
                assert_eq!(entry.name.len(), 20);
                assert_eq!(entry.records, 1);
                assert!(entry.garbage.is_empty());
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
