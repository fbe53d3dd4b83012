use std::io::{self, Read, Seek, SeekFrom};

pub const DEFAULT_BUFFER_SIZE: usize = 1 << 16;

/// Buffered byte-at-a-time source.
///
/// Reads the underlying stream in blocks of `capacity` bytes and hands them
/// out one by one. When the stream is seekable the reader can be rewound to
/// the position it started from, which is how the encoder makes its second
/// pass over the input.
pub struct ByteStreamReader<R> {
    inner: R,
    buffer: Box<[u8]>,
    pos: usize,
    filled: usize,
    origin: u64,
    bytes_read: u64,
}

impl<R: Read> ByteStreamReader<R> {
    pub fn new(inner: R) -> Self {
        Self::with_capacity(inner, DEFAULT_BUFFER_SIZE)
    }

    /// A capacity of zero is bumped to one byte.
    pub fn with_capacity(inner: R, capacity: usize) -> Self {
        ByteStreamReader {
            inner,
            buffer: vec![0; capacity.max(1)].into_boxed_slice(),
            pos: 0,
            filled: 0,
            origin: 0,
            bytes_read: 0,
        }
    }

    pub fn read_byte(&mut self) -> io::Result<Option<u8>> {
        if self.pos == self.filled {
            self.fill_buffer()?;
            if self.filled == 0 {
                return Ok(None);
            }
        }
        let byte = self.buffer[self.pos];
        self.pos += 1;
        self.bytes_read += 1;
        Ok(Some(byte))
    }

    /// Bytes handed out since construction or the last reset.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    fn fill_buffer(&mut self) -> io::Result<()> {
        loop {
            match self.inner.read(&mut self.buffer) {
                Ok(filled) => {
                    self.pos = 0;
                    self.filled = filled;
                    return Ok(());
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        }
    }
}

impl<R: Read + Seek> ByteStreamReader<R> {
    /// Like `with_capacity`, but `reset` returns to the stream's current
    /// position instead of offset zero.
    pub fn rewindable(mut inner: R, capacity: usize) -> io::Result<Self> {
        let origin = inner.stream_position()?;
        let mut reader = Self::with_capacity(inner, capacity);
        reader.origin = origin;
        Ok(reader)
    }

    pub fn reset(&mut self) -> io::Result<()> {
        self.inner.seek(SeekFrom::Start(self.origin))?;
        self.pos = 0;
        self.filled = 0;
        self.bytes_read = 0;
        Ok(())
    }
}
