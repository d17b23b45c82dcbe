//! Directory entries
//!
//! An entry starts with a fixed 12 byte prefix in its base slot. The name follows the prefix
//! and runs on into as many continuation slots as [`name_to_records`] requires; continuation
//! slots hold nothing but name bytes.
//!
//! [`name_to_records`]: ../blobs/fn.name_to_records.html

use bitflags::bitflags;
use std::fmt;
use zerocopy::byteorder::{BigEndian, U16, U32};
use zerocopy::{AsBytes, FromBytes, Unaligned};

/// Size in bytes of the fixed part of an entry
pub const PREFIX_SIZE: usize = 12;

bitflags! {
    #[derive(Default)]
    pub struct Flags: u8 {
        /// The slot is the first slot of an entry
        const FIRST = 0x01;
        /// The entry is followed by continuation slots
        const NEXT  = 0x02;
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, FromBytes, AsBytes, Unaligned)]
#[repr(C)]
pub struct Prefix {
    /// See [`Flags`](struct.Flags.html)
    pub flag: u8,
    /// Unused
    pub length: u8,
    /// The slot index of the next entry in the same hash chain, 0 at the end of the chain
    pub next: U16<BigEndian>,
    pub vnode: U32<BigEndian>,
    pub vunique: U32<BigEndian>,
}

impl Prefix {
    pub fn new(flags: Flags, next: u16, fid: Fid) -> Self {
        Prefix {
            flag: flags.bits(),
            length: 0,
            next: U16::new(next),
            vnode: U32::new(fid.vnode),
            vunique: U32::new(fid.unique),
        }
    }

    pub fn flags(&self) -> Flags {
        Flags::from_bits_truncate(self.flag)
    }

    pub fn fid(&self) -> Fid {
        Fid {
            vnode: self.vnode.get(),
            unique: self.vunique.get(),
        }
    }
}

/// A file identifier within the volume holding the directory
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fid {
    pub vnode: u32,
    pub unique: u32,
}

impl fmt::Display for Fid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}", self.vnode, self.unique)
    }
}

static_assertions::assert_eq_size!(Prefix, [u8; PREFIX_SIZE]);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_layout() {
        let prefix = Prefix::new(
            Flags::FIRST,
            0x0D,
            Fid {
                vnode: 0x0102_0304,
                unique: 7,
            },
        );
        assert_eq!(
            prefix.as_bytes(),
            &[1, 0, 0, 0x0D, 1, 2, 3, 4, 0, 0, 0, 7]
        );
        assert_eq!(prefix.fid().to_string(), "16909060.7");
        assert_eq!(prefix.flags(), Flags::FIRST);
    }

    #[test]
    fn unknown_flags_ignored() {
        let prefix = Prefix::read_from(&[0xF3u8, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0][..]).unwrap();
        assert_eq!(prefix.flags(), Flags::FIRST | Flags::NEXT);
    }
}
