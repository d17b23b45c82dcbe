use std::io;

use crate::errors::Result;
use crate::read::DirReader;
use crate::{dump, list, stats};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Mode {
    /// Trace every page header, the directory header and every slot
    Dump,
    /// One `<vnode>.<uniquifier> <name>` line per entry, in slot order
    List,
    /// Capacity and fragmentation report
    Stats,
}

impl Mode {
    pub fn run<R: io::Read, W: io::Write>(
        self,
        reader: DirReader<R>,
        mut out: W,
        config: &Config,
    ) -> Result<()> {
        match self {
            Mode::Dump => dump::dump(reader, &mut out, config)?,
            Mode::List => list::list(reader, &mut out)?,
            Mode::Stats => stats::Stats::collect(reader, config)?.write_report(&mut out)?,
        }
        out.flush()?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Printed in place of bytes which are not printable ASCII
    pub placeholder: char,
    /// Count the pages which the directory could still grow into (up to `MAX_PAGES`) as empty
    /// pages when reporting free capacity
    pub project_unused_pages: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            placeholder: '.',
            project_unused_pages: true,
        }
    }
}
