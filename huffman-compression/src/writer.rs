use std::io::{self, Write};

use log::warn;

use crate::reader::DEFAULT_BUFFER_SIZE;

/// Buffered byte-at-a-time sink.
///
/// Bytes are collected until the buffer is full and then written in one
/// call. `finish` flushes and hands back the sink, reporting any error;
/// a writer dropped without `finish` still flushes what it holds.
pub struct ByteStreamWriter<W: Write> {
    inner: Option<W>,
    buffer: Vec<u8>,
    capacity: usize,
    bytes_written: u64,
}

impl<W: Write> ByteStreamWriter<W> {
    pub fn new(inner: W) -> Self {
        Self::with_capacity(inner, DEFAULT_BUFFER_SIZE)
    }

    pub fn with_capacity(inner: W, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        ByteStreamWriter {
            inner: Some(inner),
            buffer: Vec::with_capacity(capacity),
            capacity,
            bytes_written: 0,
        }
    }

    pub fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        self.buffer.push(byte);
        self.bytes_written += 1;
        if self.buffer.len() >= self.capacity {
            self.flush_buffer()?;
        }
        Ok(())
    }

    pub fn write_u32_be(&mut self, value: u32) -> io::Result<()> {
        for byte in value.to_be_bytes() {
            self.write_byte(byte)?;
        }
        Ok(())
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn finish(mut self) -> io::Result<W> {
        self.flush_buffer()?;
        match self.inner.take() {
            Some(mut inner) => {
                inner.flush()?;
                Ok(inner)
            }
            None => Err(io::Error::new(
                io::ErrorKind::Other,
                "byte stream writer already released its sink",
            )),
        }
    }

    fn flush_buffer(&mut self) -> io::Result<()> {
        if let Some(inner) = self.inner.as_mut() {
            inner.write_all(&self.buffer)?;
        }
        self.buffer.clear();
        Ok(())
    }
}

impl<W: Write> Drop for ByteStreamWriter<W> {
    fn drop(&mut self) {
        if self.inner.is_none() {
            return;
        }
        let flushed = self
            .flush_buffer()
            .and_then(|_| self.inner.as_mut().map_or(Ok(()), |inner| inner.flush()));
        if let Err(err) = flushed {
            warn!("failed to flush output on drop: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Write};

    use super::ByteStreamWriter;

    #[test]
    fn test_finish_flushes_everything() {
        let mut writer = ByteStreamWriter::with_capacity(Vec::new(), 4);
        for byte in 0..10_u8 {
            writer.write_byte(byte).unwrap();
        }
        assert_eq!(writer.bytes_written(), 10);

        let output = writer.finish().unwrap();
        assert_eq!(output, (0..10_u8).collect::<Vec<_>>());
    }

    #[test]
    fn test_drop_flushes_partial_buffer() {
        let mut output = Vec::new();
        {
            let mut writer = ByteStreamWriter::with_capacity(&mut output, 1024);
            writer.write_byte(b'a').unwrap();
            writer.write_byte(b'b').unwrap();
        }
        assert_eq!(output, b"ab");
    }

    #[test]
    fn test_drop_flushes_on_early_return() {
        fn write_then_bail(output: &mut Vec<u8>) -> Result<(), &'static str> {
            let mut writer = ByteStreamWriter::new(output);
            writer.write_byte(b'x').map_err(|_| "write failed")?;
            Err("bail out before finish")
        }

        let mut output = Vec::new();
        assert!(write_then_bail(&mut output).is_err());
        assert_eq!(output, b"x");
    }

    #[test]
    fn test_write_u32_be() {
        let mut writer = ByteStreamWriter::new(Vec::new());
        writer.write_u32_be(0x0102_0304).unwrap();
        assert_eq!(writer.finish().unwrap(), vec![1, 2, 3, 4]);
    }

    struct FailingSink;

    impl Write for FailingSink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_errors_surface() {
        let mut writer = ByteStreamWriter::with_capacity(FailingSink, 2);
        writer.write_byte(1).unwrap();
        assert!(writer.write_byte(2).is_err());

        let mut writer = ByteStreamWriter::with_capacity(FailingSink, 8);
        writer.write_byte(1).unwrap();
        assert!(writer.finish().is_err());
    }
}
