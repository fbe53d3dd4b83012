//! Static Huffman compression of byte streams.
//!
//! An encoded stream starts with a 1024 byte header holding the occurrence
//! count of every byte value as a big-endian `u32`, followed by one byte
//! giving the number of valid bits in the final body byte (0 when the body
//! ends on a byte boundary). The body is the concatenation of every input
//! byte's code, most significant bit first.
//!
//! ```
//! use std::io::Cursor;
//!
//! let mut encoded = Vec::new();
//! huffman_compression::encode(Cursor::new(b"abracadabra"), &mut encoded).unwrap();
//!
//! let mut decoded = Vec::new();
//! huffman_compression::decode(encoded.as_slice(), &mut decoded).unwrap();
//! assert_eq!(decoded, b"abracadabra");
//! ```

pub mod encode_decode;
pub mod error;
pub mod frequency;
pub mod prefix_code_table;
pub mod reader;
pub mod tree;
pub mod writer;

pub use encode_decode::{decode, decode_with, encode, encode_with, Config, Summary};
pub use error::{Corruption, HuffmanError, Result};
