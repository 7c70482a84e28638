//! Curves over four control points, sampled on `[0, 1]`.

use glam::Vec3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCurve {
    /// Power-basis cubic `p3·s³ + p2·s² + p1·s + p0` with the control points
    /// used directly as coefficients. Starts at `p0`; it does not pass
    /// through the remaining points.
    Cubic([Vec3; 4]),
    /// Uniform Catmull–Rom segment between `p1` and `p2`, with `p0` and `p3`
    /// steering the end tangents.
    CatmullRom([Vec3; 4]),
}

impl PathCurve {
    /// Sample at `s`, clamped to `[0, 1]`.
    pub fn evaluate(&self, s: f32) -> Vec3 {
        let s = s.clamp(0.0, 1.0);
        match self {
            PathCurve::Cubic([p0, p1, p2, p3]) => ((*p3 * s + *p2) * s + *p1) * s + *p0,
            PathCurve::CatmullRom([p0, p1, p2, p3]) => {
                let s2 = s * s;
                let s3 = s2 * s;
                let f0 = -s3 + 2.0 * s2 - s;
                let f1 = 3.0 * s3 - 5.0 * s2 + 2.0;
                let f2 = -3.0 * s3 + 4.0 * s2 + s;
                let f3 = s3 - s2;
                (*p0 * f0 + *p1 * f1 + *p2 * f2 + *p3 * f3) * 0.5
            }
        }
    }
}
