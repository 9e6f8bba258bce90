//! The various font tables

pub mod cmap;
pub mod glyf;
pub mod head;
pub mod hhea;
pub mod hmtx;
pub mod loca;
pub mod maxp;
pub mod name;

/// Compute the checksum of a table: the wrapping sum of its big-endian
/// `u32` words, with the final word zero padded.
pub fn compute_checksum(table: &[u8]) -> u32 {
    let mut words = table.chunks_exact(4);
    let sum = words.by_ref().fold(0u32, |sum, word| {
        sum.wrapping_add(u32::from_be_bytes([word[0], word[1], word[2], word[3]]))
    });
    let remainder = words.remainder();
    let mut last = [0u8; 4];
    last[..remainder.len()].copy_from_slice(remainder);
    sum.wrapping_add(u32::from_be_bytes(last))
}
