use std::marker::PhantomData;

use byteorder::ByteOrder;

use crate::records::ItemReference;
use crate::status::{StageError, StageResult};
use crate::vector::{Vector3Angle16, Vector3f};

/// Longest name string read through a name offset, in bytes.
pub const MAX_NAME_LEN: usize = 255;

/// Positional cursor over a stage definition buffer.
///
/// `ByteReader` decodes scalars in the byte order `O`, which is fixed for the
/// lifetime of the reader. A decode session picks [`byteorder::BigEndian`] or
/// [`byteorder::LittleEndian`] once, based on the detected game variant, so
/// reads of mixed endianness within one session cannot be expressed.
///
/// Every read checks bounds and fails with [`StageError::OutOfBounds`] instead
/// of fabricating data.
///
/// # Example
///
/// ```
/// use byteorder::BigEndian;
/// use stagedef_core::byte_reader::ByteReader;
///
/// let data = [0x00, 0x00, 0x00, 0x2A, 0x3F, 0x80, 0x00, 0x00];
/// let mut reader = ByteReader::<BigEndian>::new(&data);
///
/// assert_eq!(reader.read_u32().unwrap(), 42);
/// assert_eq!(reader.read_f32().unwrap(), 1.0);
/// assert!(reader.read_u16().is_err());
/// ```
#[derive(Debug, Clone)]
pub struct ByteReader<'a, O: ByteOrder> {
    data: &'a [u8],
    pos: usize,
    order: PhantomData<O>,
}

impl<'a, O: ByteOrder> ByteReader<'a, O> {
    /// Creates a new `ByteReader` positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            order: PhantomData,
        }
    }

    /// Returns the whole underlying buffer.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Returns the buffer length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the current read position in bytes.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Sets the read position.
    ///
    /// # Errors
    ///
    /// Returns `StageError::OutOfBounds` if `pos` lies beyond the end of the
    /// buffer. Seeking to exactly the end is allowed.
    pub fn set_position(&mut self, pos: usize) -> StageResult<()> {
        if pos > self.data.len() {
            return Err(StageError::OutOfBounds {
                offset: pos,
                width: 0,
                len: self.data.len(),
            });
        }
        self.pos = pos;
        Ok(())
    }

    /// Returns the number of bytes remaining in the buffer.
    pub fn remaining_size(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Runs `f` with the cursor moved to `offset` and restores the previous
    /// position afterwards, whether `f` succeeds or fails.
    pub fn with_position<T>(
        &mut self,
        offset: usize,
        f: impl FnOnce(&mut Self) -> StageResult<T>,
    ) -> StageResult<T> {
        let saved = self.pos;
        self.set_position(offset)?;
        let result = f(self);
        self.pos = saved;
        result
    }

    /// Advances the position by `n` bytes without reading.
    ///
    /// # Errors
    ///
    /// Returns `StageError::OutOfBounds` if the skip runs past the end.
    pub fn skip(&mut self, n: usize) -> StageResult<()> {
        self.take(n).map(|_| ())
    }

    fn take(&mut self, width: usize) -> StageResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(width)
            .filter(|&end| end <= self.data.len())
            .ok_or(StageError::OutOfBounds {
                offset: self.pos,
                width,
                len: self.data.len(),
            })?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    /// Reads a single byte.
    pub fn read_u8(&mut self) -> StageResult<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> StageResult<u16> {
        Ok(O::read_u16(self.take(2)?))
    }

    pub fn read_u32(&mut self) -> StageResult<u32> {
        Ok(O::read_u32(self.take(4)?))
    }

    pub fn read_f32(&mut self) -> StageResult<f32> {
        Ok(O::read_f32(self.take(4)?))
    }

    /// Reads four raw bytes without any byte-order interpretation.
    pub fn read_marker(&mut self) -> StageResult<[u8; 4]> {
        let bytes = self.take(4)?;
        Ok([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    /// Reads an x, y, z float triple.
    pub fn read_vector3f(&mut self) -> StageResult<Vector3f> {
        Ok(Vector3f::new(
            self.read_f32()?,
            self.read_f32()?,
            self.read_f32()?,
        ))
    }

    /// Reads an x, y, z fixed-point angle triple, consuming the trailing
    /// 16-bit pad when `consume_padding` is set.
    pub fn read_angles(&mut self, consume_padding: bool) -> StageResult<Vector3Angle16> {
        let angles = Vector3Angle16::new(self.read_u16()?, self.read_u16()?, self.read_u16()?);
        if consume_padding {
            self.skip(2)?;
        }
        Ok(angles)
    }

    /// Reads a count/offset pair.
    pub fn read_item_reference(&mut self) -> StageResult<ItemReference> {
        Ok(ItemReference {
            count: self.read_u32()?,
            offset: self.read_u32()?,
        })
    }

    /// Reads the NUL-terminated ASCII string at `offset` without moving the
    /// cursor.
    ///
    /// Reading stops at the first NUL, after [`MAX_NAME_LEN`] bytes, or at the
    /// end of the buffer, whichever comes first. A zero offset means the record
    /// has no name and yields `None`.
    pub fn read_c_string(&self, offset: u32) -> StageResult<Option<String>> {
        if offset == 0 {
            return Ok(None);
        }
        let start = offset as usize;
        if start > self.data.len() {
            return Err(StageError::OutOfBounds {
                offset: start,
                width: 1,
                len: self.data.len(),
            });
        }
        let bytes: Vec<u8> = self.data[start..]
            .iter()
            .copied()
            .take(MAX_NAME_LEN)
            .take_while(|&b| b != 0)
            .collect();
        Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
    }
}
