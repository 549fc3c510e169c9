pub mod raw;

use std::path::{Path, PathBuf};

use group::{Call, ProcessGroup};

use crate::error::{Error, Result};
use crate::types::Offset;

/// A contiguous run of `len` floats starting `offset` floats into `path`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    pub path: PathBuf,
    pub offset: Offset,
    pub len: usize,
}

impl Segment {
    pub fn new(path: impl Into<PathBuf>, offset: Offset, len: usize) -> Self {
        Self { path: path.into(), offset, len }
    }
}

/// Reads in which every member of a process group takes part.
///
/// Every member must issue the same sequence of `collective_read`s, with
/// identical segments, even if only some of them use the data. A member that
/// skips a read, or asks for a different segment, breaks the group.
pub trait CollectiveRead: ProcessGroup {
    fn collective_read(&self, segment: &Segment) -> Result<Vec<f32>> {
        let Segment { path, offset, len } = segment;
        self.synchronize(Call::Read { path: path.clone(), offset: *offset, len: *len })?;
        raw::read_segment(path, *offset, *len)
            .map_err(|source| Error::Read { path: path.clone(), source })
    }
}

impl<G: ProcessGroup> CollectiveRead for G {}

/// Write `data` into a fresh file at `path`, starting `offset` floats in.
///
/// Only the coordinator writes, so this is not a collective operation.
pub fn write_segment(data: &[f32], offset: Offset, path: &Path) -> Result<()> {
    raw::write_segment(data, offset, path)
        .map_err(|source| Error::Write { path: path.to_path_buf(), source })
}

#[cfg(test)]
mod test_collective_read {
    use super::*;
    use group::{GroupError, Solo, ThreadGroup};
    use tempfile::tempdir;
    #[allow(unused)] use pretty_assertions::{assert_eq, assert_ne};

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn written_volume_reads_back_exactly() -> TestResult {
        let dir = tempdir()?;
        let path = dir.path().join("volume.bin");
        let data: Vec<f32> = (0..27).map(|i| i as f32 * 0.37 - 4.0).collect();
        write_segment(&data, 5, &path)?;
        assert_eq!(Solo.collective_read(&Segment::new(&path, 5, data.len()))?, data);
        Ok(())
    }

    #[test]
    fn every_member_receives_the_segment() -> TestResult {
        let dir = tempdir()?;
        let path = dir.path().join("data.bin");
        write_segment(&[1.0, 2.0, 3.0, 4.0], 0, &path)?;
        let segment = Segment::new(&path, 1, 2);

        let results = ThreadGroup::run(3, |member| member.collective_read(&segment))?;
        for result in results {
            assert_eq!(result?, vec![2.0, 3.0]);
        }
        Ok(())
    }

    #[test]
    fn differing_segments_break_the_group() -> TestResult {
        let dir = tempdir()?;
        let path = dir.path().join("data.bin");
        write_segment(&[1.0, 2.0, 3.0, 4.0], 0, &path)?;

        let results = ThreadGroup::run(2, |member| {
            let offset = member.context().rank() as Offset;
            member.collective_read(&Segment::new(&path, offset, 1))
        })?;
        for result in results {
            assert!(matches!(result, Err(Error::Group(GroupError::Mismatch { .. }))));
        }
        Ok(())
    }

    #[test]
    fn unreadable_file_is_an_io_error() {
        let missing = Segment::new("/definitely/not/here.bin", 0, 1);
        assert!(matches!(Solo.collective_read(&missing), Err(Error::Read { .. })));
    }
}
