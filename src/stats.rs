//! Capacity and fragmentation statistics
//!
//! Free capacity for entries of `k` slots is estimated from the free runs in the page bitmaps:
//! a run of `n` free slots fits `n / k` such entries. This ignores any other constraint the
//! writer places on where entries go, so it is an estimate, not a guarantee.

use std::io::{self, Write};

use repr::blobs::{records_to_name_range, MAX_RECORDS};
use repr::page::Bitmap;
use repr::{EPP, MAX_PAGES};

use crate::config::Config;
use crate::errors::Result;
use crate::read::{DirReader, Page};
use crate::record::Record;

/// Number of rows in the fragmentation table, each covering 10 percentage points
pub const FRAGMENTATION_BUCKETS: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    /// Allocated entries
    pub entries: usize,
    /// Pages present in the directory object
    pub pages: usize,
    /// Slots taken by page headers, the directory header and entries
    pub records_used: usize,
    /// Unallocated slots
    pub records_free: usize,
    /// Number of pages per fragmentation bucket
    pub fragmentation: [usize; FRAGMENTATION_BUCKETS],
    /// Number of entries taking exactly `k` slots, indexed by `k`
    pub used_by_size: [usize; MAX_RECORDS + 1],
    /// Number of entries of `k` slots which would fit in the free runs, indexed by `k`
    pub free_by_size: [usize; MAX_RECORDS + 1],
}

impl Stats {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn collect<R: io::Read>(reader: DirReader<R>, config: &Config) -> Result<Self> {
        let logger = reader.logger().clone();
        let mut stats = Stats::new();
        for page in reader {
            stats.add_page(&page?);
        }
        if config.project_unused_pages {
            stats.project_unused_pages();
        }
        slog::debug!(logger, "Collected directory statistics";
            "entries" => stats.entries,
            "pages" => stats.pages,
            "records_used" => stats.records_used,
            "records_free" => stats.records_free
        );
        Ok(stats)
    }

    pub fn add_page(&mut self, page: &Page) {
        self.pages += 1;
        self.records_used += repr::reserved_slots(page.index());
        for record in page.records() {
            match record {
                Record::Entry(entry) => {
                    self.entries += 1;
                    self.records_used += entry.records;
                    self.used_by_size[entry.records] += 1;
                }
                Record::Free(_) => self.records_free += 1,
                // Counted with their entry
                Record::Continuation { .. } => {}
            }
        }

        let bitmap = page.bitmap();
        let percent = fragmentation(bitmap.free_count(), bitmap.largest_free_run());
        self.fragmentation[bucket(percent)] += 1;
        self.add_free_runs(bitmap, 1);
    }

    /// Count every page the directory could still grow into as an empty page
    pub fn project_unused_pages(&mut self) {
        let unused = MAX_PAGES.saturating_sub(self.pages);
        self.add_free_runs(&Bitmap::empty_page(), unused);
    }

    fn add_free_runs(&mut self, bitmap: &Bitmap, times: usize) {
        for run in bitmap.free_runs() {
            for k in 1..=MAX_RECORDS {
                self.free_by_size[k] += times * (run / k);
            }
        }
    }

    pub fn records_total(&self) -> usize {
        self.pages * EPP
    }

    pub fn write_report<W: Write>(&self, mut out: W) -> io::Result<()> {
        writeln!(out, "entries: {}", self.entries)?;
        writeln!(
            out,
            "pages: used {} of {} ({} available)",
            self.pages,
            MAX_PAGES,
            MAX_PAGES.saturating_sub(self.pages)
        )?;
        writeln!(
            out,
            "records: total {}, used {}, free {}",
            self.records_total(),
            self.records_used,
            self.records_free
        )?;

        writeln!(out, "fragmentation:")?;
        for (i, &count) in self.fragmentation.iter().enumerate() {
            let low = i * 10;
            let high = if i == FRAGMENTATION_BUCKETS - 1 { 100 } else { low + 9 };
            let share = if self.pages == 0 {
                0.0
            } else {
                100.0 * count as f64 / self.pages as f64
            };
            let label = format!("{}-{}%", low, high);
            writeln!(out, "  {:<8} {:>6} ({:>5.1}%)", label, count, share)?;
        }

        writeln!(out, "capacity by records per entry:")?;
        writeln!(
            out,
            "  {:>7}  {:<9} {:>8} {:>8}",
            "records", "names", "used", "free"
        )?;
        for k in 1..=MAX_RECORDS {
            let names = match records_to_name_range(k) {
                Some(range) => format!("{}-{}", range.start(), range.end()),
                None => "-".to_string(),
            };
            writeln!(
                out,
                "  {:>7}  {:<9} {:>8} {:>8}",
                k, names, self.used_by_size[k], self.free_by_size[k]
            )?;
        }
        Ok(())
    }
}

/// How scattered `free` slots are, given the largest contiguous run among them, in percent
///
/// 0 when all free slots form one run (or there are none).
pub fn fragmentation(free: usize, largest_run: usize) -> usize {
    if free == 0 {
        return 0;
    }
    (100.0 * (1.0 - largest_run as f64 / free as f64)).round() as usize
}

fn bucket(percent: usize) -> usize {
    (percent / 10).min(FRAGMENTATION_BUCKETS - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contiguous_is_not_fragmented() {
        assert_eq!(fragmentation(0, 0), 0);
        assert_eq!(fragmentation(51, 51), 0);
    }

    #[test]
    fn singletons_approach_100() {
        assert_eq!(fragmentation(2, 1), 50);
        assert_eq!(fragmentation(32, 1), 97);
        assert!(fragmentation(32, 1) > fragmentation(32, 2));
        assert!(fragmentation(32, 2) > fragmentation(32, 16));
    }

    #[test]
    fn buckets() {
        assert_eq!(bucket(0), 0);
        assert_eq!(bucket(9), 0);
        assert_eq!(bucket(10), 1);
        assert_eq!(bucket(97), 9);
        assert_eq!(bucket(100), 9);
    }

    #[test]
    fn free_runs_by_size() {
        let mut stats = Stats::new();
        let mut bitmap = Bitmap([0xFF; 8]);
        // runs of 5 and 2
        for slot in 10..15 {
            bitmap.set(slot, false);
        }
        bitmap.set(20, false);
        bitmap.set(21, false);
        stats.add_free_runs(&bitmap, 1);
        assert_eq!(stats.free_by_size[1], 7);
        assert_eq!(stats.free_by_size[2], 3);
        assert_eq!(stats.free_by_size[5], 1);
        assert_eq!(stats.free_by_size[6], 0);
    }

    #[test]
    fn projection() {
        let mut stats = Stats::new();
        stats.pages = MAX_PAGES - 2;
        stats.project_unused_pages();
        assert_eq!(stats.free_by_size[1], 2 * (EPP - 1));
        assert_eq!(stats.free_by_size[9], 2 * ((EPP - 1) / 9));
    }
}
