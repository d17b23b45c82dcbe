use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
    #[error("not a directory object: no pages")]
    Empty,
    #[error("not a directory object: page {page} has tag {tag}, expected {}", repr::page::MAGIC)]
    BadMagic { page: usize, tag: u16 },
    #[error("directory object has more than {max} pages")]
    TooManyPages { max: usize },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// True if reading the input failed or it ended mid-page
    pub fn is_io(&self) -> bool {
        matches!(self, Error::Io { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DirReader;

    #[test]
    fn only_read_failures_are_io() {
        let err = DirReader::new(&[0u8; 100][..]).next_page().unwrap_err();
        assert!(err.is_io(), "{}", err);

        let err = DirReader::new(io::empty()).next_page().unwrap_err();
        assert!(!err.is_io());
        assert!(!Error::BadMagic { page: 0, tag: 0 }.is_io());
        assert!(!Error::TooManyPages { max: 1 }.is_io());
    }
}
