use super::Vec3;

/// 4x4 matrix stored column-major (`cols[col][row]`), the layout WebGL/WGSL
/// hosts hand over as a flat 16-element array.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Mat4 {
    pub cols: [[f64; 4]; 4],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mat4 {
    pub const IDENTITY: Self = Self {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    pub fn from_cols(cols: [[f64; 4]; 4]) -> Self {
        Self { cols }
    }

    /// Build from rows; handy for writing matrices the way they read on paper.
    pub fn from_rows(rows: [[f64; 4]; 4]) -> Self {
        let mut cols = [[0.0; 4]; 4];
        for (r, row) in rows.iter().enumerate() {
            for (c, v) in row.iter().enumerate() {
                cols[c][r] = *v;
            }
        }
        Self { cols }
    }

    /// Read a flat column-major array (as passed by the map on every repaint).
    pub fn from_cols_array(a: &[f64; 16]) -> Self {
        let mut cols = [[0.0; 4]; 4];
        for (i, v) in a.iter().enumerate() {
            cols[i / 4][i % 4] = *v;
        }
        Self { cols }
    }

    pub fn to_cols_array(&self) -> [f64; 16] {
        let mut out = [0.0; 16];
        for (i, v) in out.iter_mut().enumerate() {
            *v = self.cols[i / 4][i % 4];
        }
        out
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.cols[col][row]
    }

    pub fn translation(t: Vec3) -> Self {
        let mut m = Self::IDENTITY;
        m.cols[3] = [t.x, t.y, t.z, 1.0];
        m
    }

    pub fn scaling(s: Vec3) -> Self {
        let mut m = Self::IDENTITY;
        m.cols[0][0] = s.x;
        m.cols[1][1] = s.y;
        m.cols[2][2] = s.z;
        m
    }

    /// Rotation of `angle_rad` about a unit `axis` (Rodrigues form).
    pub fn rotation_axis(axis: Vec3, angle_rad: f64) -> Self {
        let c = angle_rad.cos();
        let s = angle_rad.sin();
        let t = 1.0 - c;
        let Vec3 { x, y, z } = axis;
        let tx = t * x;
        let ty = t * y;

        Self::from_rows([
            [tx * x + c, tx * y - s * z, tx * z + s * y, 0.0],
            [tx * y + s * z, ty * y + c, ty * z - s * x, 0.0],
            [tx * z - s * y, ty * z + s * x, t * z * z + c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// `self * rhs` (rhs is applied to points first).
    pub fn multiply(&self, rhs: &Self) -> Self {
        let a = &self.cols;
        let b = &rhs.cols;
        let mut c = [[0.0; 4]; 4];
        for col in 0..4 {
            for row in 0..4 {
                c[col][row] = a[0][row] * b[col][0]
                    + a[1][row] * b[col][1]
                    + a[2][row] * b[col][2]
                    + a[3][row] * b[col][3];
            }
        }
        Self { cols: c }
    }

    /// Right-multiply by a non-uniform scale, scaling the first three columns.
    pub fn scale(&self, s: Vec3) -> Self {
        let mut m = *self;
        for (col, k) in [s.x, s.y, s.z].into_iter().enumerate() {
            for row in 0..4 {
                m.cols[col][row] *= k;
            }
        }
        m
    }

    /// Transform a point (w = 1) and return the homogeneous result.
    pub fn transform_point4(&self, p: Vec3) -> [f64; 4] {
        let mut out = [0.0; 4];
        for (row, o) in out.iter_mut().enumerate() {
            *o = self.cols[0][row] * p.x
                + self.cols[1][row] * p.y
                + self.cols[2][row] * p.z
                + self.cols[3][row];
        }
        out
    }

    pub fn abs_diff_max(&self, other: &Self) -> f64 {
        let mut worst = 0.0f64;
        for col in 0..4 {
            for row in 0..4 {
                worst = worst.max((self.cols[col][row] - other.cols[col][row]).abs());
            }
        }
        worst
    }
}

impl std::ops::Mul for Mat4 {
    type Output = Mat4;

    fn mul(self, rhs: Mat4) -> Mat4 {
        self.multiply(&rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::Mat4;
    use crate::math::Vec3;
    use std::f64::consts::FRAC_PI_2;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn cols_array_round_trips_layout() {
        let mut a = [0.0; 16];
        for (i, v) in a.iter_mut().enumerate() {
            *v = i as f64;
        }
        let m = Mat4::from_cols_array(&a);
        // Element 12 is the x translation in column-major storage.
        assert_eq!(m.get(0, 3), 12.0);
        assert_eq!(m.get(3, 0), 3.0);
        assert_eq!(m.to_cols_array(), a);
    }

    #[test]
    fn scale_matches_right_multiplied_scaling() {
        let t = Mat4::translation(Vec3::new(1.0, 2.0, 3.0));
        let s = Vec3::new(2.0, -2.0, 4.0);
        assert_eq!(t.scale(s), t * Mat4::scaling(s));
    }

    #[test]
    fn rotation_about_x_turns_y_into_z() {
        let r = Mat4::rotation_axis(Vec3::X, FRAC_PI_2);
        let p = r.transform_point4(Vec3::Y);
        assert_close(p[0], 0.0, 1e-12);
        assert_close(p[1], 0.0, 1e-12);
        assert_close(p[2], 1.0, 1e-12);
    }

    #[test]
    fn multiplication_applies_rhs_first() {
        let t = Mat4::translation(Vec3::new(10.0, 0.0, 0.0));
        let s = Mat4::scaling(Vec3::new(2.0, 2.0, 2.0));
        let p = (t * s).transform_point4(Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(p, [12.0, 0.0, 0.0, 1.0]);
        let q = (s * t).transform_point4(Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(q, [22.0, 0.0, 0.0, 1.0]);
    }
}
