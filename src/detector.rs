//! Dimensions of the X-ray detector and of the scan, shared by every member
//! of the group.

use serde::Deserialize;

use crate::error::{Error, Result};

pub const NUM_PROJECTIONS : usize = 320;
pub const DETECTOR_ROWS   : usize = 192;
pub const DETECTOR_COLUMNS: usize = 256;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Detector {
    pub rows: usize,
    pub columns: usize,
    /// Number of angular views in the scan
    pub projections: usize,
}

impl Default for Detector {
    fn default() -> Self {
        Self { rows: DETECTOR_ROWS, columns: DETECTOR_COLUMNS, projections: NUM_PROJECTIONS }
    }
}

impl Detector {

    /// Number of floats in one projection image
    pub fn pixels(&self) -> usize { self.rows * self.columns }

    /// Flat index of the pixel at (`column`, `row`), or `None` if that lies
    /// outside the detector.
    #[inline]
    pub fn pixel_index(&self, column: i32, row: i32) -> Option<usize> {
        if column < 0 || row < 0 { return None }
        let (column, row) = (column as usize, row as usize);
        if column >= self.columns || row >= self.rows { return None }
        Some(column + row * self.columns)
    }

    pub fn validate(&self) -> Result<()> {
        let Self { rows, columns, projections } = *self;
        if rows == 0 || columns == 0 || projections == 0 {
            return Err(Error::Config(format!(
                "detector needs at least one row, column and projection, got {rows}×{columns} with {projections} projections"
            )))
        }
        Ok(())
    }
}
