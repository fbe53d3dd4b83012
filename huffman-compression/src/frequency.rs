use std::{io::Read, ops::Index};

use itertools::Itertools;

use crate::{
    error::{Corruption, HuffmanError, Result},
    reader::ByteStreamReader,
    writer::ByteStreamWriter,
};

pub const ALPHABET_SIZE: usize = 256;
pub const HEADER_LEN: usize = ALPHABET_SIZE * COUNTER_LEN;
const COUNTER_LEN: usize = 4;

/// Occurrence count of every byte value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable([u32; ALPHABET_SIZE]);

impl Default for FrequencyTable {
    fn default() -> Self {
        FrequencyTable([0; ALPHABET_SIZE])
    }
}

impl Index<u8> for FrequencyTable {
    type Output = u32;

    fn index(&self, byte: u8) -> &Self::Output {
        &self.0[byte as usize]
    }
}

impl FrequencyTable {
    pub fn from_counts(counts: [u32; ALPHABET_SIZE]) -> Self {
        FrequencyTable(counts)
    }

    /// Counts every remaining byte of `reader`. The reader is left exhausted;
    /// callers that need the bytes again must reset it.
    pub fn build<R: Read>(reader: &mut ByteStreamReader<R>) -> Result<Self> {
        let mut table = FrequencyTable::default();
        while let Some(byte) = reader.read_byte()? {
            table.increment(byte)?;
        }
        Ok(table)
    }

    pub fn increment(&mut self, byte: u8) -> Result<()> {
        let count = &mut self.0[byte as usize];
        *count = count
            .checked_add(1)
            .ok_or(HuffmanError::InputTooLarge { byte })?;
        Ok(())
    }

    /// `(byte, count)` for all 256 byte values in ascending byte order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u32)> + '_ {
        (0..=u8::MAX).zip(self.0.iter().copied())
    }

    pub fn total(&self) -> u64 {
        self.0.iter().map(|&count| u64::from(count)).sum()
    }

    /// 256 big-endian `u32` counters in byte-value order.
    pub fn write_header<W: std::io::Write>(&self, writer: &mut ByteStreamWriter<W>) -> Result<()> {
        for &count in self.0.iter() {
            writer.write_u32_be(count)?;
        }
        Ok(())
    }

    pub fn read_header<R: Read>(reader: &mut ByteStreamReader<R>) -> Result<Self> {
        let mut counts = [0; ALPHABET_SIZE];
        let mut bytes_read = 0;
        for count in counts.iter_mut() {
            let mut counter = [0; COUNTER_LEN];
            for slot in counter.iter_mut() {
                *slot = reader
                    .read_byte()?
                    .ok_or(Corruption::TruncatedHeader { bytes_read })?;
                bytes_read += 1;
            }
            *count = u32::from_be_bytes(counter);
        }
        Ok(FrequencyTable(counts))
    }

    /// Fails on the first byte value whose count in `decoded` differs.
    pub fn verify(&self, decoded: &FrequencyTable) -> Result<()> {
        let mismatch = self
            .0
            .iter()
            .zip(decoded.0.iter())
            .find_position(|(expected, actual)| expected != actual);

        match mismatch {
            Some((byte, (&expected, &actual))) => Err(Corruption::FrequencyMismatch {
                byte: byte as u8,
                expected,
                actual,
            }
            .into()),
            None => Ok(()),
        }
    }
}
