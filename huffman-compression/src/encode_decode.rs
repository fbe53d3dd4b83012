use std::{
    io::{self, Read, Seek, Write},
    ptr,
};

use log::{debug, trace};

use crate::{
    error::{Corruption, Result},
    frequency::FrequencyTable,
    prefix_code_table::CodeTable,
    reader::{ByteStreamReader, DEFAULT_BUFFER_SIZE},
    tree::{HuffmanTree, Node},
    writer::ByteStreamWriter,
};

const BITS_IN_BYTE: u8 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Size of the read and write buffers in bytes.
    pub buffer_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

/// Byte counts of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    pub bytes_read: u64,
    pub bytes_written: u64,
}

pub fn encode<R: Read + Seek, W: Write>(input: R, output: W) -> Result<Summary> {
    encode_with(input, output, &Config::default())
}

/// Compresses `input` into `output`.
///
/// The input is read twice, once to count bytes and once to encode them, and
/// is rewound to where it started when encoding finishes.
pub fn encode_with<R: Read + Seek, W: Write>(
    input: R,
    output: W,
    config: &Config,
) -> Result<Summary> {
    let mut reader = ByteStreamReader::rewindable(input, config.buffer_size)?;
    let frequencies = FrequencyTable::build(&mut reader)?;
    let bytes_read = reader.bytes_read();
    reader.reset()?;

    let tree = HuffmanTree::build(&frequencies);
    let codes = CodeTable::from(&tree);
    let last_bits = codes.last_bits(&frequencies);
    debug!(
        "encoding {bytes_read} bytes: longest code = {} bits, last_bits = {last_bits}",
        codes.max_len()
    );

    let mut writer = ByteStreamWriter::with_capacity(output, config.buffer_size);
    frequencies.write_header(&mut writer)?;
    writer.write_byte(last_bits)?;
    trace!("header written");

    write_body(&mut reader, &codes, &mut writer)?;
    if reader.bytes_read() != bytes_read {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "input changed between passes: counted {bytes_read} bytes, then read {}",
                reader.bytes_read()
            ),
        )
        .into());
    }
    reader.reset()?;

    let bytes_written = writer.bytes_written();
    writer.finish()?;
    Ok(Summary {
        bytes_read,
        bytes_written,
    })
}

pub fn decode<R: Read, W: Write>(input: R, output: W) -> Result<Summary> {
    decode_with(input, output, &Config::default())
}

/// Decompresses `input` into `output`, then checks the decoded byte counts
/// against the header.
///
/// On error some output may already have been written; it must be discarded.
pub fn decode_with<R: Read, W: Write>(input: R, output: W, config: &Config) -> Result<Summary> {
    let mut reader = ByteStreamReader::with_capacity(input, config.buffer_size);
    let frequencies = FrequencyTable::read_header(&mut reader)?;
    let last_bits = reader.read_byte()?.ok_or(Corruption::MissingLastBits)?;
    if last_bits >= BITS_IN_BYTE {
        return Err(Corruption::InvalidLastBits(last_bits).into());
    }
    debug!(
        "decoding {} bytes, last_bits = {last_bits}",
        frequencies.total()
    );

    let tree = HuffmanTree::build(&frequencies);
    let mut writer = ByteStreamWriter::with_capacity(output, config.buffer_size);
    let decoded = read_body(&mut reader, &tree, last_bits, &mut writer)?;
    frequencies.verify(&decoded)?;
    trace!("decoded byte counts match the header");

    let bytes_written = writer.bytes_written();
    writer.finish()?;
    Ok(Summary {
        bytes_read: reader.bytes_read(),
        bytes_written,
    })
}

pub(crate) fn write_body<R: Read, W: Write>(
    reader: &mut ByteStreamReader<R>,
    codes: &CodeTable,
    writer: &mut ByteStreamWriter<W>,
) -> Result<()> {
    let mut packer = BitPacker::default();
    while let Some(byte) = reader.read_byte()? {
        for bit in codes[byte].bits() {
            packer.push(bit, writer)?;
        }
    }
    packer.finish(writer)?;
    Ok(())
}

/// Decodes the body with a one byte lag: a byte is only known to be the last
/// one, and so possibly partial, once the next read hits end of stream.
pub(crate) fn read_body<R: Read, W: Write>(
    reader: &mut ByteStreamReader<R>,
    tree: &HuffmanTree,
    last_bits: u8,
    writer: &mut ByteStreamWriter<W>,
) -> Result<FrequencyTable> {
    let mut walker = Walker::new(tree);
    let mut decoded = FrequencyTable::default();
    let mut pending = None;

    while let Some(byte) = reader.read_byte()? {
        if let Some(previous) = pending.replace(byte) {
            walker.feed(previous, BITS_IN_BYTE, writer, &mut decoded)?;
        }
    }

    if let Some(last) = pending {
        let valid_bits = match last_bits {
            0 => BITS_IN_BYTE,
            bits => bits,
        };
        walker.feed(last, valid_bits, writer, &mut decoded)?;
    }

    if !walker.at_root() {
        return Err(Corruption::UnfinishedCode.into());
    }
    Ok(decoded)
}

/// Collects code bits and emits them a byte at a time, first bit in the
/// most significant position.
#[derive(Debug, Default)]
struct BitPacker {
    pending: u8,
    len: u8,
}

impl BitPacker {
    fn push<W: Write>(&mut self, bit: bool, writer: &mut ByteStreamWriter<W>) -> io::Result<()> {
        self.pending = (self.pending << 1) | u8::from(bit);
        self.len += 1;
        if self.len == BITS_IN_BYTE {
            writer.write_byte(self.pending)?;
            self.pending = 0;
            self.len = 0;
        }
        Ok(())
    }

    /// Leftover bits go out right-justified, high bits zero.
    fn finish<W: Write>(self, writer: &mut ByteStreamWriter<W>) -> io::Result<()> {
        if self.len > 0 {
            writer.write_byte(self.pending)?;
        }
        Ok(())
    }
}

struct Walker<'a> {
    root: &'a Node,
    current: &'a Node,
}

impl<'a> Walker<'a> {
    fn new(tree: &'a HuffmanTree) -> Self {
        Walker {
            root: tree.root(),
            current: tree.root(),
        }
    }

    fn at_root(&self) -> bool {
        ptr::eq(self.current, self.root)
    }

    /// Walks the low `bit_count` bits of `byte`, most significant first,
    /// writing a byte every time a leaf is reached.
    fn feed<W: Write>(
        &mut self,
        byte: u8,
        bit_count: u8,
        writer: &mut ByteStreamWriter<W>,
        decoded: &mut FrequencyTable,
    ) -> Result<()> {
        for shift in (0..bit_count).rev() {
            let bit = (byte >> shift) & 1 == 1;
            let next = self.current.child(bit).ok_or(Corruption::InvalidPath)?;
            match next.byte() {
                Some(symbol) => {
                    writer.write_byte(symbol)?;
                    decoded.increment(symbol)?;
                    self.current = self.root;
                }
                None => self.current = next,
            }
        }
        Ok(())
    }
}
