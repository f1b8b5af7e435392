//! Bounds-checked little-endian cursor over a byte slice

use crate::{Result, TelemetryError};

/// Read cursor that never reads past the end of its slice.
pub(crate) struct ByteReader<'a> {
    data: &'a [u8],
    start: usize,
    position: usize,
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(data: &'a [u8], offset: usize) -> Self {
        Self { data, start: offset, position: offset }
    }

    pub(crate) fn position(&self) -> usize {
        self.position
    }

    /// Bytes read since construction.
    pub(crate) fn consumed(&self) -> usize {
        self.position - self.start
    }

    pub(crate) fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    pub(crate) fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let bytes = self
            .position
            .checked_add(len)
            .and_then(|end| self.data.get(self.position..end))
            .ok_or_else(|| TelemetryError::out_of_bounds(self.position, len, self.remaining()))?;
        self.position += len;
        Ok(bytes)
    }

    pub(crate) fn skip(&mut self, len: usize) -> Result<()> {
        self.take(len).map(|_| ())
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let offset = self.position;
        self.take(N)?
            .try_into()
            .map_err(|_| TelemetryError::deserialization(offset, format!("expected {} bytes", N)))
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take_array::<1>()?[0])
    }

    /// Flag byte; any non-zero value is true.
    pub(crate) fn read_flag(&mut self) -> Result<bool> {
        Ok(self.read_u8()? > 0)
    }

    pub(crate) fn read_u32(&mut self) -> Result<u32> {
        self.take_array().map(u32::from_le_bytes)
    }

    pub(crate) fn read_i32(&mut self) -> Result<i32> {
        self.take_array().map(i32::from_le_bytes)
    }

    pub(crate) fn read_u64(&mut self) -> Result<u64> {
        self.take_array().map(u64::from_le_bytes)
    }

    pub(crate) fn read_i64(&mut self) -> Result<i64> {
        self.take_array().map(i64::from_le_bytes)
    }

    pub(crate) fn read_f32(&mut self) -> Result<f32> {
        self.take_array().map(f32::from_le_bytes)
    }

    pub(crate) fn read_f64(&mut self) -> Result<f64> {
        self.take_array().map(f64::from_le_bytes)
    }

    /// Null-terminated UTF-8 string. The terminator is consumed.
    pub(crate) fn read_c_string(&mut self) -> Result<String> {
        let offset = self.position;
        let tail = self
            .data
            .get(offset..)
            .filter(|tail| !tail.is_empty())
            .ok_or_else(|| TelemetryError::out_of_bounds(offset, 1, 0))?;
        let terminator = tail
            .iter()
            .position(|&byte| byte == 0)
            .ok_or_else(|| TelemetryError::deserialization(offset, "unterminated string"))?;
        let text = std::str::from_utf8(&tail[..terminator])
            .map_err(|e| TelemetryError::deserialization(offset, format!("invalid UTF-8: {}", e)))?
            .to_owned();
        self.position += terminator + 1;
        Ok(text)
    }
}
