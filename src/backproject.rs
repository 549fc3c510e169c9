//! Voxel-driven back-projection of one projection onto the reconstruction
//! volume.
//!
//! Every voxel is mapped through the projection's transform onto the
//! detector; if it lands on a detector pixel, that pixel's value, scaled by
//! the voxel column's cone-beam weight, is added to the voxel. Voxels whose
//! rays miss the detector receive nothing.
//!
//! Z slices are independent: each task owns a disjoint run of whole slices of
//! the output volume, so the tasks can run in parallel without locking.

use ndarray::azip;
use rayon::prelude::*;

use crate::detector::Detector;
use crate::error::{Error, Result};
use crate::loader::{GlobalData, ProjectionData};
use crate::types::{Coordf32, Intensityf32, Transform};
use crate::volume::Volume;

/// Add the contribution of one projection to every voxel of `volume`.
///
/// Work is split into tasks of `slices_per_task` consecutive Z slices, run on
/// the current rayon pool.
pub fn back_project(
    volume: &mut Volume,
    global: &GlobalData,
    data: &ProjectionData,
    detector: &Detector,
    slices_per_task: usize,
) -> Result<()> {
    if global.n_voxels() != volume.n {
        return Err(Error::Shape { what: "voxel coordinate table", expected: volume.n, found: global.n_voxels() })
    }
    if data.volume_weight.len() != volume.slice_len() {
        return Err(Error::Shape { what: "volume weights", expected: volume.slice_len(), found: data.volume_weight.len() })
    }
    if data.projection.len() != detector.pixels() {
        return Err(Error::Shape { what: "projection image", expected: detector.pixels(), found: data.projection.len() })
    }
    let slices_per_task = slices_per_task.max(1);
    let slice_len = volume.slice_len();

    // `par_chunks_mut` hands out non-overlapping runs of whole slices
    volume.data
        .par_chunks_mut(slice_len * slices_per_task)
        .enumerate()
        .for_each(|(task, slab)| {
            let first_slice = task * slices_per_task;
            for (k, slice) in slab.chunks_mut(slice_len).enumerate() {
                back_project_slice(slice, global.z(first_slice + k), global, data, detector);
            }
        });
    Ok(())
}

fn back_project_slice(
    slice: &mut [Intensityf32],
    z: Coordf32,
    global: &GlobalData,
    data: &ProjectionData,
    detector: &Detector,
) {
    let ProjectionData { projection, transform, volume_weight } = data;
    azip!((voxel in slice, &x in global.xs(), &y in global.ys(), &weight in &volume_weight[..]) {
        let pixel = detector_coordinates(project_voxel([x, y, z], transform))
            .and_then(|(column, row)| detector.pixel_index(column, row));
        // Rays leaving the detector's field of view are masked out
        if let Some(pixel) = pixel {
            *voxel += projection[pixel] * weight;
        }
    });
}

/// Homogeneous detector coordinates `(u, v, w)` of the voxel at `(x, y, z)`
#[inline]
pub fn project_voxel([x, y, z]: [Coordf32; 3], m: &Transform) -> [Coordf32; 3] {
    let voxel = [x, y, z, 1.0];
    let mut uvw = [0.0; 3];
    for (j, &c) in voxel.iter().enumerate() {
        uvw[0] += c * m[j];
        uvw[1] += c * m[j + 4];
        uvw[2] += c * m[j + 8];
    }
    uvw
}

/// Nearest detector (column, row) to homogeneous coordinates `(u, v, w)`.
///
/// Halves are rounded away from zero. `None` if the perspective division does
/// not give a finite position (`w == 0`).
#[inline]
pub fn detector_coordinates([u, v, w]: [Coordf32; 3]) -> Option<(i32, i32)> {
    let column = (u / w).round();
    let row    = (v / w).round();
    if !(column.is_finite() && row.is_finite()) { return None }
    // Saturating casts keep far-off positions outside the detector
    Some((column as i32, row as i32))
}


#[cfg(test)]
mod test_kernel {
    use super::*;
    use float_eq::assert_float_eq;
    #[allow(unused)] use pretty_assertions::{assert_eq, assert_ne};

    /// Voxel coordinates equal to voxel indices
    fn index_grid(n: usize) -> GlobalData {
        let xs = (0..n * n).map(|i| (i % n) as f32);
        let ys = (0..n * n).map(|i| (i / n) as f32);
        let unused = std::iter::repeat(0.0).take(2 * n * n);
        let combined = xs.chain(ys).chain(unused).collect();
        GlobalData::new(n, combined, (0..n).map(|z| z as f32).collect()).unwrap()
    }

    fn uniform(detector: &Detector, n: usize, value: f32, transform: Transform) -> ProjectionData {
        ProjectionData::new(detector, n, vec![value; detector.pixels()], transform.to_vec(), vec![1.0; n * n]).unwrap()
    }

    /// Transform sending every voxel to the same detector position
    fn constant(column: f32, row: f32) -> Transform {
        [0.0, 0.0, 0.0, column,
         0.0, 0.0, 0.0, row,
         0.0, 0.0, 0.0, 1.0]
    }

    const DETECTOR: Detector = Detector { rows: 4, columns: 5, projections: 1 };

    #[test]
    fn last_pixel_is_inside() -> Result<()> {
        let n = 3;
        let mut volume = Volume::zeros(n);
        let data = uniform(&DETECTOR, n, 2.0, constant(4.0, 3.0));
        back_project(&mut volume, &index_grid(n), &data, &DETECTOR, 1)?;
        assert!(volume.data.iter().all(|&v| v == 2.0));
        Ok(())
    }

    #[test]
    fn one_past_last_column_is_outside() -> Result<()> {
        let n = 3;
        let mut volume = Volume::zeros(n);
        let data = uniform(&DETECTOR, n, 2.0, constant(5.0, 0.0));
        back_project(&mut volume, &index_grid(n), &data, &DETECTOR, 1)?;
        assert!(volume.data.iter().all(|&v| v == 0.0));
        Ok(())
    }

    #[test]
    fn contributions_accumulate() -> Result<()> {
        let n = 2;
        let global = index_grid(n);
        let mut volume = Volume::zeros(n);
        back_project(&mut volume, &global, &uniform(&DETECTOR, n, 1.5, constant(0.0, 0.0)), &DETECTOR, 1)?;
        back_project(&mut volume, &global, &uniform(&DETECTOR, n, 2.0, constant(1.0, 1.0)), &DETECTOR, 1)?;
        assert_eq!(volume.data, vec![3.5; 8]);
        Ok(())
    }

    #[test]
    fn weights_and_pixels_follow_the_voxel() -> Result<()> {
        // Column = x, row = z: every voxel reads a different pixel
        let n = 3;
        let detector = Detector { rows: 3, columns: 3, projections: 1 };
        let transform = [1.0, 0.0, 0.0, 0.0,
                         0.0, 0.0, 1.0, 0.0,
                         0.0, 0.0, 0.0, 1.0];
        let image: Vec<f32> = (0..9).map(|p| p as f32).collect();
        let weights: Vec<f32> = (0..9).map(|i| if i % n == 0 { 0.5 } else { 1.0 }).collect();
        let data = ProjectionData::new(&detector, n, image, transform.to_vec(), weights)?;

        let mut volume = Volume::zeros(n);
        back_project(&mut volume, &index_grid(n), &data, &detector, 2)?;
        for z in 0..n { for y in 0..n { for x in 0..n {
            let weight = if x == 0 { 0.5 } else { 1.0 };
            assert_float_eq!(volume[[x, y, z]], (x + z * 3) as f32 * weight, ulps <= 1);
        }}}
        Ok(())
    }

    #[test]
    fn tasking_does_not_change_the_result() -> Result<()> {
        let n = 7;
        let detector = Detector { rows: 8, columns: 9, projections: 1 };
        let transform = [0.7, 0.2, 0.0, 1.0,
                         0.1, 0.0, 0.9, 0.5,
                         0.0, 0.01, 0.0, 1.0];
        let image: Vec<f32> = (0..detector.pixels()).map(|p| (p as f32).sin()).collect();
        let weights: Vec<f32> = (0..n * n).map(|i| 1.0 + i as f32 / 10.0).collect();
        let data = ProjectionData::new(&detector, n, image, transform.to_vec(), weights)?;
        let global = index_grid(n);

        let mut reference = Volume::zeros(n);
        back_project(&mut reference, &global, &data, &detector, n)?;
        assert!(reference.data.iter().any(|&v| v != 0.0));
        for slices_per_task in [0, 1, 2, 3, 100] {
            let mut volume = Volume::zeros(n);
            back_project(&mut volume, &global, &data, &detector, slices_per_task)?;
            assert_eq!(volume, reference);
        }
        Ok(())
    }

    #[test]
    fn mismatched_geometry_is_rejected() {
        let mut volume = Volume::zeros(3);
        let data = uniform(&DETECTOR, 2, 1.0, constant(0.0, 0.0));
        let result = back_project(&mut volume, &index_grid(2), &data, &DETECTOR, 1);
        assert!(matches!(result, Err(Error::Shape { .. })));
    }

    #[test]
    fn weights_for_another_volume_are_rejected() {
        let mut volume = Volume::zeros(3);
        let data = uniform(&DETECTOR, 2, 1.0, constant(0.0, 0.0));
        let result = back_project(&mut volume, &index_grid(3), &data, &DETECTOR, 1);
        assert!(matches!(result, Err(Error::Shape { what: "volume weights", expected: 9, found: 4 })));
        assert!(volume.data.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn image_for_another_detector_is_rejected() {
        let n = 2;
        let mut volume = Volume::zeros(n);
        let tiny = Detector { rows: 1, columns: 1, projections: 1 };
        let data = uniform(&tiny, n, 1.0, constant(3.0, 3.0));
        let large = Detector { rows: 4, columns: 4, projections: 1 };
        let result = back_project(&mut volume, &index_grid(n), &data, &large, 1);
        assert!(matches!(result, Err(Error::Shape { what: "projection image", expected: 16, found: 1 })));
    }
}
