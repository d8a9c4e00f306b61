use std::io;

/// A forward-only cursor over a borrowed byte buffer.
///
/// Every read is bounds checked and fails with `InvalidData` instead of panicking,
/// so truncated frames coming from the network surface as regular io errors.
#[derive(Debug)]
pub struct ByteReader<'a> {
    buf: &'a [u8],
}

impl<'a> ByteReader<'a> {
    /// Creates a new `ByteReader`.
    ///
    /// # Arguments
    /// * `buf` - The bytes to read from.
    ///
    /// # Returns
    /// A new `ByteReader` instance.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    /// Returns the amount of bytes left to read.
    pub fn remaining(&self) -> usize {
        self.buf.len()
    }

    /// Returns the rest of the buffer, leaving the reader empty.
    pub fn rest(&mut self) -> &'a [u8] {
        self.take(self.buf.len()).unwrap_or_default()
    }

    /// Takes the next `n` bytes out of the buffer.
    ///
    /// # Arguments
    /// * `n` - The amount of bytes to take.
    ///
    /// # Returns
    /// The bytes or an `InvalidData` error if there are less than `n` bytes left.
    pub fn take(&mut self, n: usize) -> io::Result<&'a [u8]> {
        if self.buf.len() < n {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "The given buffer is too small, needed {n} bytes but only {} remain",
                    self.buf.len()
                ),
            ));
        }

        let (head, tail) = self.buf.split_at(n);
        self.buf = tail;
        Ok(head)
    }

    pub fn u8(&mut self) -> io::Result<u8> {
        Ok(self.array::<1>()?[0])
    }

    pub fn u32(&mut self) -> io::Result<u32> {
        self.array().map(u32::from_be_bytes)
    }

    pub fn u64(&mut self) -> io::Result<u64> {
        self.array().map(u64::from_be_bytes)
    }

    fn array<const N: usize>(&mut self) -> io::Result<[u8; N]> {
        let bytes = self.take(N)?;
        let mut out = [0; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_big_endian_integers() {
        let mut buf = Vec::new();
        buf.push(7u8);
        buf.extend_from_slice(&42u32.to_be_bytes());
        buf.extend_from_slice(&9001u64.to_be_bytes());

        let mut reader = ByteReader::new(&buf);
        assert_eq!(reader.u8().unwrap(), 7);
        assert_eq!(reader.u32().unwrap(), 42);
        assert_eq!(reader.u64().unwrap(), 9001);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn truncated_buffer_is_invalid_data() {
        let buf = [0u8; 3];
        let mut reader = ByteReader::new(&buf);

        let err = reader.u32().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
