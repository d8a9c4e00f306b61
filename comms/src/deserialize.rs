use std::io;

pub trait Deserialize: Sized {
    fn deserialize(buf: &[u8]) -> io::Result<Self>;
}
