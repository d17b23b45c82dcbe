use crate::errors::*;
use crate::record::Records;
use repr::header::DirHeader;
use repr::page::{self, Bitmap};
use repr::{MAX_PAGES, PAGE_SIZE, RECSIZE};
use slog::Logger;
use std::fs::File;
use std::io;
use std::path::Path;
use zerocopy::{AsBytes, FromBytes};

/// Reads the pages of a directory object from a stream, front to back
#[derive(Debug)]
pub struct DirReader<R> {
    reader: R,
    pages_read: usize,
    failed: bool,
    logger: Logger,
}

impl DirReader<io::BufReader<File>> {
    pub fn open<P: AsRef<Path>>(p: P) -> Result<Self> {
        Self::open_with_logger(p, crate::default_logger())
    }

    pub fn open_with_logger<P: AsRef<Path>>(p: P, logger: Logger) -> Result<Self> {
        Self::_open_with_logger(p.as_ref(), logger)
    }

    fn _open_with_logger(path: &Path, logger: Logger) -> Result<Self> {
        let path_str = path.display().to_string();
        let logger = logger.new(slog::o!("file" => path_str));
        let file = File::open(path)?;
        Ok(Self::with_logger(io::BufReader::new(file), logger))
    }
}

impl<R: io::Read> DirReader<R> {
    pub fn new(reader: R) -> Self {
        Self::with_logger(reader, crate::default_logger())
    }

    pub fn with_logger(reader: R, logger: Logger) -> Self {
        Self {
            reader,
            pages_read: 0,
            failed: false,
            logger,
        }
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// The number of pages returned so far
    pub fn pages_read(&self) -> usize {
        self.pages_read
    }

    /// Read the next page
    ///
    /// Returns `Ok(None)` at the end of the object. Every error is fatal: the reader never tries
    /// to resynchronize after a bad page.
    pub fn next_page(&mut self) -> Result<Option<Page>> {
        let index = self.pages_read;
        let mut data = Box::new([0; PAGE_SIZE]);
        let size = self.fill(&mut data[..])?;
        if size == 0 {
            if index == 0 {
                return Err(Error::Empty);
            }
            slog::debug!(self.logger, "End of directory object"; "pages" => index);
            return Ok(None);
        }
        if size < PAGE_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "truncated page {}: read {} of {} bytes",
                    index, size, PAGE_SIZE
                ),
            )
            .into());
        }
        if index >= MAX_PAGES {
            return Err(Error::TooManyPages { max: MAX_PAGES });
        }

        let page = Page::new(index, data);
        log_page_header(&self.logger, &page);
        let tag = page.header().tag.get();
        if tag != page::MAGIC {
            return Err(Error::BadMagic { page: index, tag });
        }
        self.pages_read += 1;
        Ok(Some(page))
    }

    /// Fill `buf` as far as the stream allows, returning the number of bytes read
    fn fill(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }
}

impl<R: io::Read> Iterator for DirReader<R> {
    type Item = Result<Page>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let result = self.next_page();
        if result.is_err() {
            self.failed = true;
        }
        result.transpose()
    }
}

/// A single page of a directory object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    index: usize,
    header: page::Header,
    dir_header: Option<DirHeader>,
    data: Box<[u8; PAGE_SIZE]>,
}

impl Page {
    /// Decode the headers of the page with the given index. The tag is not checked.
    pub fn new(index: usize, data: Box<[u8; PAGE_SIZE]>) -> Self {
        let header = read_struct(&data[..page::HEADER_SIZE]);
        let dir_header = if index == 0 {
            Some(read_struct(&data[page::HEADER_SIZE..]))
        } else {
            None
        };
        Self {
            index,
            header,
            dir_header,
            data,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn header(&self) -> &page::Header {
        &self.header
    }

    pub fn bitmap(&self) -> &Bitmap {
        &self.header.freebitmap
    }

    /// The directory header, only present in page 0
    pub fn dir_header(&self) -> Option<&DirHeader> {
        self.dir_header.as_ref()
    }

    /// The raw bytes of slot `slot`
    pub fn slot(&self, slot: usize) -> &[u8] {
        &self.data[slot * RECSIZE..(slot + 1) * RECSIZE]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..]
    }

    /// Walk the slots following the page header (and the directory header in page 0)
    pub fn records(&self) -> Records<'_> {
        Records::new(self)
    }
}

/// Read a `T` from the start of `bytes`, zero filling whatever `bytes` is too short to cover
pub(crate) fn read_struct<T: FromBytes + AsBytes>(bytes: &[u8]) -> T {
    T::read_from_prefix(bytes).unwrap_or_else(|| {
        let mut value = T::new_zeroed();
        let len = bytes.len().min(std::mem::size_of::<T>());
        value.as_bytes_mut()[..len].copy_from_slice(&bytes[..len]);
        value
    })
}

fn log_page_header(logger: &Logger, page: &Page) {
    let header = page.header();
    slog::debug!(logger, "Read page header";
        "page" => page.index(),
        "pgcount" => header.pgcount.get(),
        "tag" => header.tag.get(),
        "freecount" => header.freecount,
        "freebitmap" => %header.freebitmap
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use repr::page::Header;

    fn empty_page(index: usize) -> Vec<u8> {
        let mut bitmap = Bitmap::empty_page();
        if index == 0 {
            for slot in 1..repr::reserved_slots(0) {
                bitmap.set(slot, true);
            }
        }
        let mut data = vec![0; PAGE_SIZE];
        data[..page::HEADER_SIZE].copy_from_slice(Header::new(1, bitmap).as_bytes());
        data
    }

    #[test]
    fn reads_until_end() {
        let mut data = empty_page(0);
        data.extend(empty_page(1));
        let mut reader = DirReader::new(&data[..]);

        let first = reader.next_page().unwrap().unwrap();
        assert_eq!(first.index(), 0);
        assert!(first.dir_header().is_some());
        let second = reader.next_page().unwrap().unwrap();
        assert_eq!(second.index(), 1);
        assert!(second.dir_header().is_none());
        assert!(reader.next_page().unwrap().is_none());
        assert_eq!(reader.pages_read(), 2);
    }

    #[test]
    fn empty_input() {
        let mut reader = DirReader::new(io::empty());
        assert!(matches!(reader.next_page(), Err(Error::Empty)));
    }

    #[test]
    fn truncated_page() {
        let data = empty_page(0);
        let mut reader = DirReader::new(&data[..1000]);
        match reader.next_page() {
            Err(Error::Io { source }) => {
                assert_eq!(source.kind(), io::ErrorKind::UnexpectedEof)
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn bad_magic() {
        let mut data = empty_page(0);
        data[3] = 0;
        let mut reader = DirReader::new(&data[..]);
        match reader.next_page() {
            Err(Error::BadMagic { page: 0, tag }) => assert_eq!(tag, 0x0400),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn too_many_pages() {
        let mut data = empty_page(0);
        for i in 1..=MAX_PAGES {
            data.extend(empty_page(i));
        }
        let reader = DirReader::new(&data[..]);
        let results: Vec<_> = reader.collect();
        assert_eq!(results.len(), MAX_PAGES + 1);
        assert!(results[..MAX_PAGES].iter().all(|r| r.is_ok()));
        assert!(matches!(
            results[MAX_PAGES],
            Err(Error::TooManyPages { max: MAX_PAGES })
        ));
    }

    #[test]
    fn short_struct_zero_filled() {
        let header: Header = read_struct(&[0x00, 0x02, 0x04][..]);
        assert_eq!(header.pgcount.get(), 2);
        assert_eq!(header.tag.get(), 0x0400);
        assert_eq!(header.freebitmap, Bitmap::default());
    }
}
