pub trait Serialize {
    /// Appends the binary representation of `self` to `buf`.
    fn serialize(&self, buf: &mut Vec<u8>);
}
