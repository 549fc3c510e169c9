pub type Intensityf32 = f32;
pub type Weightf32    = f32;
pub type Coordf32     = f32;

#[allow(non_camel_case_types)] pub type Index1_u = usize;
#[allow(non_camel_case_types)] pub type Index3_u = [usize; 3];

/// Element (not byte) offset into a file of `f32`s
pub type Offset = u64;

/// Row-major 3×4 matrix mapping homogeneous voxel coordinates `(x, y, z, 1)`
/// onto homogeneous detector coordinates `(u, v, w)`
pub type Transform = [Coordf32; 12];
