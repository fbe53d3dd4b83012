use std::{fmt, ops::Index};

use bit_vec::BitVec;

use crate::{
    frequency::{FrequencyTable, ALPHABET_SIZE},
    tree::{HuffmanTree, Node},
};

/// Bits of one prefix code, first bit to emit at index 0.
///
/// Codes are bit vectors rather than machine words: a skewed distribution
/// over 256 symbols can produce codes far longer than 32 or 64 bits.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Code(BitVec);

impl Code {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn bits(&self) -> impl Iterator<Item = bool> + '_ {
        self.0.iter()
    }

    pub fn is_prefix_of(&self, other: &Code) -> bool {
        self.len() <= other.len() && self.bits().zip(other.bits()).all(|(a, b)| a == b)
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.bits() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// The code of every byte value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTable(Vec<Code>);

impl Index<u8> for CodeTable {
    type Output = Code;

    fn index(&self, byte: u8) -> &Self::Output {
        &self.0[byte as usize]
    }
}

impl From<&HuffmanTree> for CodeTable {
    fn from(tree: &HuffmanTree) -> Self {
        let mut codes = vec![Code::default(); ALPHABET_SIZE];
        let mut current_code = BitVec::new();
        generate_codes_inner(tree.root(), &mut current_code, &mut codes);
        CodeTable(codes)
    }
}

// left edges append a 0, right edges a 1
fn generate_codes_inner(node: &Node, current_code: &mut BitVec, result: &mut [Code]) {
    match node {
        Node::Leaf { byte, .. } => {
            result[*byte as usize] = Code(current_code.clone());
        }
        Node::Internal { left, right, .. } => {
            current_code.push(false);
            generate_codes_inner(left, current_code, result);
            current_code.pop();

            current_code.push(true);
            generate_codes_inner(right, current_code, result);
            current_code.pop();
        }
    }
}

impl CodeTable {
    pub fn iter(&self) -> impl Iterator<Item = (u8, &Code)> + '_ {
        (0..=u8::MAX).zip(self.0.iter())
    }

    pub fn max_len(&self) -> usize {
        self.0.iter().map(Code::len).max().unwrap_or_default()
    }

    /// Number of valid bits in the final body byte, 0 when the body ends on
    /// a byte boundary.
    pub fn last_bits(&self, frequencies: &FrequencyTable) -> u8 {
        let remainder = frequencies
            .iter()
            .map(|(byte, count)| (self[byte].len() as u64 % 8) * (u64::from(count) % 8))
            .fold(0, |acc, bits| (acc + bits) % 8);
        remainder as u8
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use crate::{
        frequency::{FrequencyTable, ALPHABET_SIZE},
        tree::HuffmanTree,
    };

    use super::CodeTable;

    fn table_from(mapping: &[(u8, u32)]) -> FrequencyTable {
        let mut counts = [0; ALPHABET_SIZE];
        for &(byte, count) in mapping {
            counts[byte as usize] = count;
        }
        FrequencyTable::from_counts(counts)
    }

    fn codes_for(frequencies: &FrequencyTable) -> CodeTable {
        CodeTable::from(&HuffmanTree::build(frequencies))
    }

    // char_mapping test data comes from
    // https://opendsa-server.cs.vt.edu/ODSA/Books/CS3/html/Huffman.html
    // The zero-weight leaves of the other 248 byte values end up merged below Z.
    #[rstest]
    #[case(b'E', "0")]
    #[case(b'U', "100")]
    #[case(b'D', "101")]
    #[case(b'L', "110")]
    #[case(b'C', "1110")]
    #[case(b'M', "11111")]
    #[case(b'K', "111101")]
    #[case(b'Z', "1111001")]
    fn test_code_generation(#[case] byte: u8, #[case] expected_code: &str) {
        let frequencies = table_from(&[
            (b'C', 32),
            (b'D', 42),
            (b'E', 120),
            (b'K', 7),
            (b'L', 42),
            (b'M', 24),
            (b'U', 37),
            (b'Z', 2),
        ]);
        let codes = codes_for(&frequencies);
        assert_eq!(codes[byte].to_string(), expected_code);
    }

    #[test]
    fn test_equal_weights_merge_in_creation_order() {
        // with every weight equal the tree is perfectly balanced and
        // each byte's code is its own binary representation
        let codes = codes_for(&FrequencyTable::default());
        for (byte, code) in codes.iter() {
            assert_eq!(code.to_string(), format!("{byte:08b}"));
        }
    }

    #[test]
    fn test_rebuild_is_deterministic() {
        let frequencies = table_from(&[(1, 5), (2, 5), (3, 5), (200, 1), (201, 1)]);
        assert_eq!(codes_for(&frequencies), codes_for(&frequencies));
    }

    #[rstest]
    #[case(&[])]
    #[case(&[(b'A', 1000)])]
    #[case(&[(0, 1), (255, 1)])]
    #[case(&[(b'a', 5), (b'b', 2), (b'r', 2), (b'c', 1), (b'd', 1)])]
    fn test_codes_are_prefix_free_and_non_empty(#[case] mapping: &[(u8, u32)]) {
        let codes = codes_for(&table_from(mapping));
        for (byte, code) in codes.iter() {
            assert!(!code.is_empty(), "byte {byte} has an empty code");
            for (other, other_code) in codes.iter() {
                if byte != other {
                    assert!(
                        !code.is_prefix_of(other_code),
                        "{byte}: {code} is a prefix of {other}: {other_code}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_codes_longer_than_a_machine_word() {
        // each weight is larger than the sum of all lighter ones, so every
        // symbol sits one level deeper than the next heavier one
        let mapping = (0..32_u8).map(|i| (i, 1_u32 << i)).collect::<Vec<_>>();
        let codes = codes_for(&table_from(&mapping));

        assert_eq!(codes[31].len(), 1);
        assert_eq!(codes[0].len(), 32);
        assert!(codes.max_len() > 32);
    }

    #[rstest]
    #[case(&[], 0)]
    #[case(&[(b'A', 1000)], 0)]
    #[case(&[(b'A', 3)], 3)]
    #[case(&[(0, 1), (255, 1)], 3)]
    fn test_last_bits(#[case] mapping: &[(u8, u32)], #[case] expected: u8) {
        let frequencies = table_from(mapping);
        let codes = codes_for(&frequencies);

        let total_bits = frequencies
            .iter()
            .map(|(byte, count)| codes[byte].len() as u64 * u64::from(count))
            .sum::<u64>();
        assert_eq!(u64::from(codes.last_bits(&frequencies)), total_bits % 8);
        assert_eq!(codes.last_bits(&frequencies), expected);
    }
}
