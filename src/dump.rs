//! Full structural trace of a directory object

use std::io::{self, Write};

use crate::config::Config;
use crate::errors::Result;
use crate::read::{DirReader, Page};
use crate::record::{Entry, Record};
use repr::page::HEADER_SIZE;

pub fn dump<R: io::Read, W: Write>(
    reader: DirReader<R>,
    mut out: W,
    config: &Config,
) -> Result<()> {
    for page in reader {
        dump_page(&page?, &mut out, config)?;
    }
    Ok(())
}

pub fn dump_page<W: Write>(page: &Page, mut out: W, config: &Config) -> io::Result<()> {
    let header = page.header();
    writeln!(
        out,
        "page {}: pgcount {} tag {} freecount {}",
        page.index(),
        header.pgcount.get(),
        header.tag.get(),
        header.freecount
    )?;
    writeln!(out, "  bitmap {}", header.freebitmap)?;
    writeln!(out, "  raw {}", Hex(&page.as_bytes()[..HEADER_SIZE]))?;

    if let Some(dir_header) = page.dir_header() {
        writeln!(out, "  dirheader:")?;
        for (i, count) in dir_header.used_pages() {
            writeln!(out, "    pagemap[{}] = {}", i, count)?;
        }
        for (bucket, head) in dir_header.chains() {
            writeln!(out, "    hash[{}] = {}", bucket, head)?;
        }
    }

    for record in page.records() {
        match record {
            Record::Entry(entry) => dump_entry(&mut out, page, &entry, "dirent", config)?,
            Record::Free(entry) => dump_entry(&mut out, page, &entry, "dirent (free)", config)?,
            Record::Continuation { slot, raw } => {
                writeln!(
                    out,
                    "  slot {}: cont \"{}\"",
                    slot,
                    Printable(raw, config.placeholder)
                )?;
                writeln!(out, "    raw {}", Hex(raw))?;
            }
        }
    }
    Ok(())
}

fn dump_entry<W: Write>(
    mut out: W,
    page: &Page,
    entry: &Entry,
    kind: &str,
    config: &Config,
) -> io::Result<()> {
    writeln!(
        out,
        "  slot {}: {} flags {:#04x} length {} next {} fid {} records {} \
         name \"{}\" leftover \"{}\"",
        entry.slot,
        kind,
        entry.prefix.flag,
        entry.prefix.length,
        entry.next(),
        entry.fid(),
        entry.records,
        Printable(&entry.name, config.placeholder),
        Printable(&entry.garbage, config.placeholder),
    )?;
    writeln!(out, "    raw {}", Hex(page.slot(entry.slot)))
}

/// Renders bytes as text, replacing anything but printable ASCII
pub struct Printable<'a>(pub &'a [u8], pub char);

impl std::fmt::Display for Printable<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use std::fmt::Write;

        for &b in self.0 {
            if b == b' ' || b.is_ascii_graphic() {
                f.write_char(b as char)?;
            } else {
                f.write_char(self.1)?;
            }
        }
        Ok(())
    }
}

/// Renders bytes as hex, in groups of four
pub struct Hex<'a>(pub &'a [u8]);

impl std::fmt::Display for Hex<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for (i, chunk) in self.0.chunks(4).enumerate() {
            if i != 0 {
                f.write_str(" ")?;
            }
            for b in chunk {
                write!(f, "{:02x}", b)?;
            }
        }
        Ok(())
    }
}
