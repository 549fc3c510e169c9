use crate::error::{Error, Result};
use crate::types::{Intensityf32, Index1_u, Index3_u};

pub type VolumeData = Vec<Intensityf32>;

/// Cubic reconstruction volume of `n` voxels per side.
///
/// Stored flat in `(z, y, x)`-major order: voxel `[x, y, z]` lives at
/// `z * n*n + y * n + x`, so each Z slice is one contiguous run of `n*n`
/// values.
#[derive(Clone, Debug, PartialEq)]
pub struct Volume {
    pub n: usize,
    pub data: VolumeData,
}

impl Volume {

    pub fn zeros(n: usize) -> Self { Self { n, data: vec![0.0; n * n * n] } }

    pub fn new(n: usize, data: VolumeData) -> Result<Self> {
        let expected = n * n * n;
        if data.len() != expected {
            return Err(Error::Shape { what: "reconstruction volume", expected, found: data.len() })
        }
        Ok(Self { n, data })
    }

    /// Number of voxels in one Z slice
    pub fn slice_len(&self) -> usize { self.n * self.n }

    /// Position of voxel `[x, y, z]` in `data`
    #[inline]
    pub fn voxel_index(&self, [x, y, z]: Index3_u) -> Index1_u {
        z * self.slice_len() + y * self.n + x
    }

    /// Sum of all voxel values, accumulated in double precision
    pub fn checksum(&self) -> f64 {
        self.data.iter().map(|&v| v as f64).sum()
    }
}

impl core::ops::Index<Index1_u> for Volume {
    type Output = Intensityf32;
    #[inline]
    fn index(&self, i: Index1_u) -> &Self::Output { &self.data[i] }
}

impl core::ops::Index<Index3_u> for Volume {
    type Output = Intensityf32;
    fn index(&self, voxel: Index3_u) -> &Self::Output { &self.data[self.voxel_index(voxel)] }
}

impl core::ops::IndexMut<Index3_u> for Volume {
    fn index_mut(&mut self, voxel: Index3_u) -> &mut Self::Output {
        let i = self.voxel_index(voxel);
        &mut self.data[i]
    }
}
