//! Enumerates the entries of a directory object in on-disk slot order

use std::io::{self, Write};

use crate::errors::Result;
use crate::read::DirReader;

pub fn list<R: io::Read, W: Write>(reader: DirReader<R>, mut out: W) -> Result<()> {
    for page in reader {
        let page = page?;
        for entry in page.records().entries() {
            write!(out, "{} ", entry.fid())?;
            out.write_all(&entry.name)?;
            out.write_all(b"\n")?;
        }
    }
    Ok(())
}
