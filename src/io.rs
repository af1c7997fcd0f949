//! Path-based sources and sinks with transparent gzip support
//!
//! Paths ending in `.gz` are decompressed on read and compressed on write;
//! everything else is plain buffered file I/O.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

/// Whether a path names a gzip-compressed file
pub fn is_gzip_path(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some("gz")
}

/// Open a document for reading, decompressing `.gz` files on the fly
pub fn open_input<P: AsRef<Path>>(path: P, buffer_size: usize) -> io::Result<Box<dyn BufRead + Send>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    if is_gzip_path(path) {
        let decoder = MultiGzDecoder::new(BufReader::new(file));
        Ok(Box::new(BufReader::with_capacity(buffer_size, decoder)))
    } else {
        Ok(Box::new(BufReader::with_capacity(buffer_size, file)))
    }
}

/// Output file, gzip-compressed when the path ends in `.gz`.
///
/// Call [`finalize`](Self::finalize) when done; dropping a gzip sink
/// without it may leave the stream without its trailer.
pub enum OutputFile {
    /// Uncompressed output
    Plain(BufWriter<File>),
    /// Gzip-compressed output (default level)
    Gzip(GzEncoder<BufWriter<File>>),
}

impl OutputFile {
    /// Create (or truncate) the file at `path`
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref();
        let file = BufWriter::new(File::create(path)?);
        if is_gzip_path(path) {
            Ok(Self::Gzip(GzEncoder::new(file, Compression::default())))
        } else {
            Ok(Self::Plain(file))
        }
    }

    /// Flush all buffers and write the gzip trailer if any
    pub fn finalize(self) -> io::Result<()> {
        let mut inner = match self {
            Self::Plain(writer) => writer,
            Self::Gzip(encoder) => encoder.finish()?,
        };
        inner.flush()
    }
}

impl Write for OutputFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Plain(w) => w.write(buf),
            Self::Gzip(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Plain(w) => w.flush(),
            Self::Gzip(w) => w.flush(),
        }
    }
}
