/// Read / write runs of `f32`s at arbitrary positions in raw binary files

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::types::Offset;

const FLOAT_SIZE: u64 = std::mem::size_of::<f32>() as u64;

/// Read `len` floats, starting `offset` floats into the file at `path`.
///
/// Fails with `UnexpectedEof` if the file holds fewer than `offset + len`
/// floats.
pub fn read_segment(path: &Path, offset: Offset, len: usize) -> std::io::Result<Vec<f32>> {
    let file = File::open(path)?;
    let mut buf = BufReader::new(file);
    buf.seek(SeekFrom::Start(offset * FLOAT_SIZE))?;
    let mut bytes = vec![0; len * FLOAT_SIZE as usize];
    buf.read_exact(&mut bytes)?;
    Ok(bytes
       .chunks_exact(FLOAT_SIZE as usize)
       .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
       .collect())
}

/// Create (or truncate) the file at `path` and write `data` into it, starting
/// `offset` floats from the beginning.
pub fn write_segment(data: &[f32], offset: Offset, path: &Path) -> std::io::Result<()> {
    let file = File::create(path)?;
    let mut buf = BufWriter::new(file);
    buf.seek(SeekFrom::Start(offset * FLOAT_SIZE))?;
    for datum in data {
        buf.write_all(&datum.to_le_bytes())?;
    }
    buf.flush()
}
