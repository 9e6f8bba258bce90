//! raw font bytes

use std::ops::{Bound, Range, RangeBounds};

use bytemuck::AnyBitPattern;
use types::Scalar;

use crate::read::ReadError;

/// A reference to raw binary font data.
///
/// This is a wrapper around a byte slice, that provides convenience methods
/// for parsing and validating that data.
#[derive(Debug, Default, Clone, Copy)]
pub struct FontData<'a> {
    total_pos: u32,
    bytes: &'a [u8],
}

/// A cursor for validating bytes during parsing.
///
/// Reads advance the position even when they fail, so a sequence of reads
/// can be checked once with [`Cursor::position`] at the end.
#[derive(Clone)]
pub struct Cursor<'a> {
    pos: usize,
    data: FontData<'a>,
}

impl<'a> FontData<'a> {
    /// Create a new `FontData` with these bytes.
    pub const fn new(bytes: &'a [u8]) -> Self {
        FontData {
            total_pos: 0,
            bytes,
        }
    }

    /// The length of the data, in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// `true` if the data has a length of zero bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The position of this data relative to the start of the font file.
    pub fn total_pos(&self) -> u32 {
        self.total_pos
    }

    pub fn split_off(&self, pos: usize) -> Option<FontData<'a>> {
        self.bytes.get(pos..).map(|bytes| FontData {
            bytes,
            total_pos: self.total_pos.saturating_add(pos as u32),
        })
    }

    pub fn slice(&self, range: impl RangeBounds<usize>) -> Option<FontData<'a>> {
        let start = match range.start_bound() {
            Bound::Unbounded => 0,
            Bound::Included(i) => *i,
            Bound::Excluded(i) => i.saturating_add(1),
        };

        let bounds = (range.start_bound().cloned(), range.end_bound().cloned());
        let total_pos = self.total_pos.saturating_add(start as u32);
        self.bytes
            .get(bounds)
            .map(|bytes| FontData { bytes, total_pos })
    }

    pub fn read_at<T: Scalar>(&self, offset: usize) -> Result<T, ReadError> {
        self.bytes
            .get(offset..offset.saturating_add(T::RAW_BYTE_LEN))
            .and_then(T::read)
            .ok_or(ReadError::OutOfBounds)
    }

    /// Interpret the bytes at `offset` as a reference to a record type.
    ///
    /// Records are `repr(C)` structs of [`BigEndian`](types::BigEndian)
    /// fields, so they have an alignment of one and no padding.
    pub fn read_ref_at<T: AnyBitPattern>(&self, offset: usize) -> Result<&'a T, ReadError> {
        let len = std::mem::size_of::<T>();
        let bytes = self
            .bytes
            .get(offset..offset.saturating_add(len))
            .ok_or(ReadError::OutOfBounds)?;
        bytemuck::try_from_bytes(bytes).map_err(|_| ReadError::OutOfBounds)
    }

    /// Interpret the bytes in `range` as a slice of records or scalars.
    pub fn read_array<T: AnyBitPattern>(&self, range: Range<usize>) -> Result<&'a [T], ReadError> {
        let bytes = self.bytes.get(range).ok_or(ReadError::OutOfBounds)?;
        bytemuck::try_cast_slice(bytes).map_err(|_| ReadError::InvalidArrayLen)
    }

    /// Returns an error unless at least `len` bytes are available.
    pub(crate) fn check_len(&self, len: usize) -> Result<(), ReadError> {
        if self.bytes.len() < len {
            Err(ReadError::OutOfBounds)
        } else {
            Ok(())
        }
    }

    pub(crate) fn cursor(&self) -> Cursor<'a> {
        Cursor {
            pos: 0,
            data: *self,
        }
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }
}

impl<'a> Cursor<'a> {
    pub(crate) fn advance_by(&mut self, n_bytes: usize) {
        self.pos = self.pos.saturating_add(n_bytes);
    }

    pub(crate) fn read<T: Scalar>(&mut self) -> Result<T, ReadError> {
        let temp = self.data.read_at(self.pos);
        self.pos = self.pos.saturating_add(T::RAW_BYTE_LEN);
        temp
    }

    pub(crate) fn read_array<T: AnyBitPattern>(&mut self, len: usize) -> Result<&'a [T], ReadError> {
        let len = len.saturating_mul(std::mem::size_of::<T>());
        let end = self.pos.saturating_add(len);
        let temp = self.data.read_array(self.pos..end);
        self.pos = end;
        temp
    }

    /// return the current position, or an error if we are out of bounds
    pub(crate) fn position(&self) -> Result<usize, ReadError> {
        self.data.check_len(self.pos).map(|_| self.pos)
    }
}

impl AsRef<[u8]> for FontData<'_> {
    fn as_ref(&self) -> &[u8] {
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::BigEndian;

    #[test]
    fn scalar_reads() {
        let data = FontData::new(&[0x00, 0x01, 0xFF, 0xFE, 0x5F, 0x0F, 0x3C, 0xF5]);
        assert_eq!(data.read_at::<u16>(0).unwrap(), 1);
        assert_eq!(data.read_at::<i16>(2).unwrap(), -2);
        assert_eq!(data.read_at::<u32>(4).unwrap(), 0x5F0F3CF5);
        assert!(matches!(data.read_at::<u32>(6), Err(ReadError::OutOfBounds)));
        assert!(matches!(data.read_at::<u32>(usize::MAX), Err(ReadError::OutOfBounds)));
    }

    #[test]
    fn slices_track_position() {
        let bytes = [0u8; 16];
        let data = FontData::new(&bytes);
        let sub = data.slice(4..12).unwrap();
        assert_eq!(sub.len(), 8);
        assert_eq!(sub.total_pos(), 4);
        assert_eq!(sub.split_off(2).unwrap().total_pos(), 6);
        assert!(data.slice(10..20).is_none());
    }

    #[test]
    fn arrays() {
        let data = FontData::new(&[0, 1, 0, 2, 0, 3]);
        let arr: &[BigEndian<u16>] = data.read_array(0..6).unwrap();
        assert_eq!(arr.iter().map(|x| x.get()).collect::<Vec<_>>(), [1, 2, 3]);
        assert!(matches!(
            data.read_array::<BigEndian<u16>>(0..5),
            Err(ReadError::InvalidArrayLen)
        ));
    }

    #[test]
    fn cursor_reads_sequentially() {
        let data = FontData::new(&[0, 7, 0, 0, 0, 9, 1]);
        let mut cursor = data.cursor();
        assert_eq!(cursor.read::<u16>().unwrap(), 7);
        assert_eq!(cursor.read::<u32>().unwrap(), 9);
        assert_eq!(cursor.position(), Ok(6));
        cursor.advance_by(4);
        assert!(cursor.position().is_err());
    }
}
