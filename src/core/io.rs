//! Input layer for annotation tracks
//!
//! Tracks are read line by line from plain, gzip or bzip2 files. Large plain
//! files are memory mapped; everything else goes through a large `BufReader`.

use bzip2::read::BzDecoder;
use flate2::read::MultiGzDecoder;
use log::debug;
use memmap2::Mmap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

/// Default buffer size for BufReader (128KB)
pub const DEFAULT_BUFFER_SIZE: usize = 128 * 1024;

/// Large buffer size for big inputs (1MB)
pub const LARGE_BUFFER_SIZE: usize = 1024 * 1024;

/// Plain files at least this large are memory mapped (100MB)
pub const MMAP_THRESHOLD: u64 = 100 * 1024 * 1024;

/// Compression of an input file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionFormat {
    Plain,
    Gzip,
    Bzip2,
}

/// Detect compression from the extension, then from magic bytes
pub fn detect_compression(path: &Path) -> io::Result<CompressionFormat> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("gz") | Some("bgz") => return Ok(CompressionFormat::Gzip),
        Some("bz2") => return Ok(CompressionFormat::Bzip2),
        _ => {}
    }

    let mut file = File::open(path)?;
    let mut magic = [0u8; 3];
    let n = file.read(&mut magic)?;
    if n >= 2 && magic[..2] == [0x1f, 0x8b] {
        return Ok(CompressionFormat::Gzip);
    }
    if n >= 3 && &magic == b"BZh" {
        return Ok(CompressionFormat::Bzip2);
    }
    Ok(CompressionFormat::Plain)
}

/// A plain-file reader, buffered or memory mapped depending on size
pub enum SmartReader {
    Buffered(BufReader<File>),
    Mapped(MappedReader),
}

/// Memory-mapped file reader
pub struct MappedReader {
    mmap: Mmap,
    position: usize,
}

impl MappedReader {
    pub fn new(file: &File) -> io::Result<Self> {
        // SAFETY: the track file is not expected to change while it is read
        let mmap = unsafe { Mmap::map(file)? };
        Ok(Self { mmap, position: 0 })
    }

    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }
}

impl Read for MappedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = &self.mmap[self.position..];
        let n = buf.len().min(remaining.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.position += n;
        Ok(n)
    }
}

impl BufRead for MappedReader {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        Ok(&self.mmap[self.position..])
    }

    fn consume(&mut self, amt: usize) {
        self.position = (self.position + amt).min(self.mmap.len());
    }
}

impl SmartReader {
    /// Open a plain file, mapping it when it is at least `MMAP_THRESHOLD` bytes
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path.as_ref())?;
        let size = file.metadata()?.len();
        if size >= MMAP_THRESHOLD {
            return Ok(SmartReader::Mapped(MappedReader::new(&file)?));
        }
        let capacity = if size > 10 * 1024 * 1024 {
            LARGE_BUFFER_SIZE
        } else {
            DEFAULT_BUFFER_SIZE
        };
        Ok(SmartReader::Buffered(BufReader::with_capacity(capacity, file)))
    }

    pub fn is_mapped(&self) -> bool {
        matches!(self, SmartReader::Mapped(_))
    }
}

impl Read for SmartReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            SmartReader::Buffered(reader) => reader.read(buf),
            SmartReader::Mapped(reader) => reader.read(buf),
        }
    }
}

impl BufRead for SmartReader {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        match self {
            SmartReader::Buffered(reader) => reader.fill_buf(),
            SmartReader::Mapped(reader) => reader.fill_buf(),
        }
    }

    fn consume(&mut self, amt: usize) {
        match self {
            SmartReader::Buffered(reader) => reader.consume(amt),
            SmartReader::Mapped(reader) => reader.consume(amt),
        }
    }
}

/// Open a track file for line reading; `-` reads stdin
pub fn open_input<P: AsRef<Path>>(path: P) -> io::Result<Box<dyn BufRead + Send>> {
    let path = path.as_ref();
    if path.as_os_str() == "-" {
        return Ok(Box::new(BufReader::with_capacity(
            DEFAULT_BUFFER_SIZE,
            io::stdin(),
        )));
    }

    let format = detect_compression(path)?;
    debug!("Opening {} ({:?})", path.display(), format);
    Ok(match format {
        CompressionFormat::Plain => Box::new(SmartReader::open(path)?),
        CompressionFormat::Gzip => Box::new(BufReader::with_capacity(
            DEFAULT_BUFFER_SIZE,
            MultiGzDecoder::new(File::open(path)?),
        )),
        CompressionFormat::Bzip2 => Box::new(BufReader::with_capacity(
            DEFAULT_BUFFER_SIZE,
            BzDecoder::new(File::open(path)?),
        )),
    })
}

/// Line iterator over raw bytes that reuses one buffer
pub struct ByteLineIterator<R: BufRead> {
    reader: R,
    buffer: Vec<u8>,
    line_number: usize,
}

impl<R: BufRead> ByteLineIterator<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: Vec::with_capacity(4096),
            line_number: 0,
        }
    }

    /// Next line without its terminator; `None` at EOF
    pub fn next_line(&mut self) -> Option<io::Result<&[u8]>> {
        self.buffer.clear();
        match self.reader.read_until(b'\n', &mut self.buffer) {
            Ok(0) => None,
            Ok(_) => {
                self.line_number += 1;
                if self.buffer.last() == Some(&b'\n') {
                    self.buffer.pop();
                    if self.buffer.last() == Some(&b'\r') {
                        self.buffer.pop();
                    }
                }
                Some(Ok(&self.buffer))
            }
            Err(e) => Some(Err(e)),
        }
    }

    /// 1-based number of the line last returned
    pub fn line_number(&self) -> usize {
        self.line_number
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn read_all(mut reader: Box<dyn BufRead + Send>) -> String {
        let mut out = String::new();
        reader.read_to_string(&mut out).unwrap();
        out
    }

    #[test]
    fn test_detect_plain() -> io::Result<()> {
        let mut temp = NamedTempFile::new()?;
        writeln!(temp, "chr1\t0\t10")?;
        assert_eq!(detect_compression(temp.path())?, CompressionFormat::Plain);
        Ok(())
    }

    #[test]
    fn test_detect_gzip_by_magic() -> io::Result<()> {
        let mut temp = NamedTempFile::new()?;
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"chr1\t0\t10\n")?;
        temp.write_all(&encoder.finish()?)?;
        temp.flush()?;

        assert_eq!(detect_compression(temp.path())?, CompressionFormat::Gzip);
        assert_eq!(read_all(open_input(temp.path())?), "chr1\t0\t10\n");
        Ok(())
    }

    #[test]
    fn test_detect_bzip2_by_magic() -> io::Result<()> {
        let mut temp = NamedTempFile::new()?;
        let mut encoder = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
        encoder.write_all(b"chr2\t5\t9\n")?;
        temp.write_all(&encoder.finish()?)?;
        temp.flush()?;

        assert_eq!(detect_compression(temp.path())?, CompressionFormat::Bzip2);
        assert_eq!(read_all(open_input(temp.path())?), "chr2\t5\t9\n");
        Ok(())
    }

    #[test]
    fn test_small_plain_file_is_buffered() -> io::Result<()> {
        let mut temp = NamedTempFile::new()?;
        writeln!(temp, "small")?;
        assert!(!SmartReader::open(temp.path())?.is_mapped());
        Ok(())
    }

    #[test]
    fn test_mapped_reader() -> io::Result<()> {
        let mut temp = NamedTempFile::new()?;
        temp.write_all(b"a\nb\n")?;
        temp.flush()?;

        let file = File::open(temp.path())?;
        let mut reader = MappedReader::new(&file)?;
        assert_eq!(reader.len(), 4);
        let mut line = String::new();
        reader.read_line(&mut line)?;
        assert_eq!(line, "a\n");
        Ok(())
    }

    #[test]
    fn test_byte_line_iterator_strips_crlf() -> io::Result<()> {
        let data: &[u8] = b"line1\r\nline2\nline3";
        let mut iter = ByteLineIterator::new(data);

        assert_eq!(iter.next_line().unwrap()?, b"line1");
        assert_eq!(iter.next_line().unwrap()?, b"line2");
        assert_eq!(iter.next_line().unwrap()?, b"line3");
        assert_eq!(iter.line_number(), 3);
        assert!(iter.next_line().is_none());
        Ok(())
    }
}
