//! Materialize geometry and per-projection data from the input directory.
//!
//! Input layout, all files being raw little-endian `f32`s:
//!
//! ```text
//! <input>/projections.bin           projections × rows × columns
//! <input>/transform.bin             projections × 12    (row-major 3×4)
//! <input>/<V>/combined.bin          4 × V²              (X row, Y row, 2 unused rows)
//! <input>/<V>/z_voxel_coords.bin    V
//! <input>/<V>/volumeweight.bin      projections × V²
//! ```
//!
//! Every read is collective: all members of the group must load the same
//! data in the same order.

use std::path::PathBuf;

use crate::detector::Detector;
use crate::error::{Error, Result};
use crate::io::{CollectiveRead, Segment};
use crate::types::{Coordf32, Intensityf32, Offset, Transform, Weightf32};

/// Locations of the input files for a volume with `n_voxels` per side
#[derive(Clone, Debug)]
pub struct InputLayout {
    dir: PathBuf,
    n_voxels: usize,
}

impl InputLayout {

    pub fn new(dir: impl Into<PathBuf>, n_voxels: usize) -> Self {
        Self { dir: dir.into(), n_voxels }
    }

    pub fn n_voxels(&self) -> usize { self.n_voxels }

    /// Directory holding the geometry files for this volume size
    pub fn voxel_dir(&self) -> PathBuf { self.dir.join(self.n_voxels.to_string()) }

    pub fn combined        (&self) -> PathBuf { self.voxel_dir().join("combined.bin") }
    pub fn z_voxel_coords  (&self) -> PathBuf { self.voxel_dir().join("z_voxel_coords.bin") }
    pub fn volume_weight   (&self) -> PathBuf { self.voxel_dir().join("volumeweight.bin") }
    pub fn projections     (&self) -> PathBuf { self.dir.join("projections.bin") }
    pub fn transform       (&self) -> PathBuf { self.dir.join("transform.bin") }
}

/// Geometry used by every projection: loaded once, then only read
#[derive(Clone, Debug)]
pub struct GlobalData {
    n: usize,
    /// 4 rows of V² values: X and Y coordinates of every (x,y) column of a
    /// slice, followed by two unused rows
    combined_matrix: Vec<Coordf32>,
    /// Z coordinate of every slice
    z_voxel_coords: Vec<Coordf32>,
}

impl GlobalData {

    pub fn new(n: usize, combined_matrix: Vec<Coordf32>, z_voxel_coords: Vec<Coordf32>) -> Result<Self> {
        check_len("combined voxel coordinates", 4 * n * n, &combined_matrix)?;
        check_len("Z voxel coordinates"       ,         n, &z_voxel_coords )?;
        Ok(Self { n, combined_matrix, z_voxel_coords })
    }

    pub fn load<G: CollectiveRead>(group: &G, layout: &InputLayout) -> Result<Self> {
        let n = layout.n_voxels();
        let combined_matrix = group.collective_read(&Segment::new(layout.combined(), 0, 4 * n * n))?;
        let z_voxel_coords  = group.collective_read(&Segment::new(layout.z_voxel_coords(), 0, n))?;
        Self::new(n, combined_matrix, z_voxel_coords)
    }

    pub fn n_voxels(&self) -> usize { self.n }

    /// X coordinates of all voxels in a slice, indexed by `y*V + x`
    pub fn xs(&self) -> &[Coordf32] { &self.combined_matrix[..self.n * self.n] }

    /// Y coordinates of all voxels in a slice, indexed by `y*V + x`
    pub fn ys(&self) -> &[Coordf32] { let s = self.n * self.n; &self.combined_matrix[s..2 * s] }

    pub fn z(&self, slice: usize) -> Coordf32 { self.z_voxel_coords[slice] }
}

/// Data belonging to a single projection: discarded once back-projected
#[derive(Clone, Debug)]
pub struct ProjectionData {
    /// Pre-processed detector image, indexed by `column + row * columns`
    pub projection: Vec<Intensityf32>,
    pub transform: Transform,
    /// Cone-beam correction for each (x,y) column of the volume
    pub volume_weight: Vec<Weightf32>,
}

impl ProjectionData {

    pub fn new(
        detector: &Detector,
        n_voxels: usize,
        projection: Vec<Intensityf32>,
        transform: Vec<Coordf32>,
        volume_weight: Vec<Weightf32>,
    ) -> Result<Self> {
        check_len("projection image" , detector.pixels()   , &projection   )?;
        check_len("volume weights"   , n_voxels * n_voxels , &volume_weight)?;
        let found = transform.len();
        let transform: Transform = transform.try_into()
            .map_err(|_| Error::Shape { what: "transform matrix", expected: 12, found })?;
        Ok(Self { projection, transform, volume_weight })
    }

    pub fn load<G: CollectiveRead>(
        group: &G,
        id: usize,
        layout: &InputLayout,
        detector: &Detector,
    ) -> Result<Self> {
        let n = layout.n_voxels();
        let pixels = detector.pixels();
        let slice = n * n;
        let at = |len: usize| (id * len) as Offset;

        let projection    = group.collective_read(&Segment::new(layout.projections()  , at(pixels), pixels))?;
        let transform     = group.collective_read(&Segment::new(layout.transform()    , at(12)    , 12    ))?;
        let volume_weight = group.collective_read(&Segment::new(layout.volume_weight(), at(slice) , slice ))?;
        Self::new(detector, n, projection, transform, volume_weight)
    }
}

fn check_len(what: &'static str, expected: usize, data: &[f32]) -> Result<()> {
    if data.len() != expected { return Err(Error::Shape { what, expected, found: data.len() }) }
    Ok(())
}
