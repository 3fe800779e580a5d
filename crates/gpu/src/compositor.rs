use foundation::math::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Placement of the overlay model in the map's projected units.
///
/// `rotate` is in radians and applied about X, then Y, then Z.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformDescriptor {
    pub translate: Vec3,
    pub rotate: Vec3,
    pub scale: f64,
}

/// Model matrix `T · S(s, -s, s) · Rx · Ry · Rz`.
///
/// Y is negated because projected map y grows southwards while model space
/// is y-up.
pub fn model_matrix(transform: &TransformDescriptor) -> Mat4 {
    let rotation_x = Mat4::rotation_axis(Vec3::X, transform.rotate.x);
    let rotation_y = Mat4::rotation_axis(Vec3::Y, transform.rotate.y);
    let rotation_z = Mat4::rotation_axis(Vec3::Z, transform.rotate.z);
    let s = transform.scale;

    Mat4::translation(transform.translate)
        .scale(Vec3::new(s, -s, s))
        .multiply(&rotation_x)
        .multiply(&rotation_y)
        .multiply(&rotation_z)
}

/// Combined matrix for one repaint: `map_projection × model_matrix`.
///
/// The result is used directly as the overlay camera's projection; there is
/// no separate view matrix.
pub fn compose_frame(map_projection: &Mat4, transform: &TransformDescriptor) -> Mat4 {
    map_projection.multiply(&model_matrix(transform))
}

/// Matrices of a single overlay render call. Rebuilt every repaint.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OverlayFrameState {
    pub index: u64,
    pub map_projection: Mat4,
    pub combined: Mat4,
}

impl OverlayFrameState {
    pub fn build(index: u64, map_projection: Mat4, transform: &TransformDescriptor) -> Self {
        Self {
            index,
            map_projection,
            combined: compose_frame(&map_projection, transform),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{OverlayFrameState, TransformDescriptor, compose_frame, model_matrix};
    use foundation::math::{Mat4, Vec3};
    use std::f64::consts::FRAC_PI_2;

    fn reference_transform() -> TransformDescriptor {
        TransformDescriptor {
            translate: Vec3::new(1.0, 1.0, 1.0),
            rotate: Vec3::new(FRAC_PI_2, 0.75, 0.0),
            scale: 5.0,
        }
    }

    // T(1,1,1) · S(5,-5,5) · Rx(π/2) · Ry(0.75), worked out by hand.
    fn expected_reference_matrix() -> Mat4 {
        let (s, c) = 0.75f64.sin_cos();
        Mat4::from_rows([
            [5.0 * c, 0.0, 5.0 * s, 1.0],
            [-5.0 * s, 0.0, 5.0 * c, 1.0],
            [0.0, 5.0, 0.0, 1.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    #[test]
    fn reference_input_produces_known_matrix() {
        let m = compose_frame(&Mat4::IDENTITY, &reference_transform());
        let diff = m.abs_diff_max(&expected_reference_matrix());
        assert!(diff < 1e-12, "max element diff {diff}");

        // Literal values, so a change in trig conventions is caught too.
        assert!((m.get(0, 0) - 3.658_444_344_3).abs() < 1e-9);
        assert!((m.get(0, 2) - 3.408_193_800_0).abs() < 1e-9);
    }

    #[test]
    fn swapping_rotation_order_changes_the_result() {
        let t = reference_transform();
        let swapped = Mat4::translation(t.translate)
            .scale(Vec3::new(t.scale, -t.scale, t.scale))
            .multiply(&Mat4::rotation_axis(Vec3::Z, t.rotate.z))
            .multiply(&Mat4::rotation_axis(Vec3::Y, t.rotate.y))
            .multiply(&Mat4::rotation_axis(Vec3::X, t.rotate.x));
        assert!(model_matrix(&t).abs_diff_max(&swapped) > 1e-3);
    }

    #[test]
    fn map_matrix_multiplies_on_the_left() {
        let t = reference_transform();
        let map = Mat4::translation(Vec3::new(0.0, 0.0, -3.0)).scale(Vec3::new(2.0, 2.0, 2.0));
        let left = compose_frame(&map, &t);
        assert_eq!(left, map * model_matrix(&t));
        assert!(left.abs_diff_max(&(model_matrix(&t) * map)) > 1e-3);
    }

    #[test]
    fn composition_is_deterministic() {
        let map = Mat4::from_cols_array(&[
            1.5, 0.0, 0.0, 0.0, 0.0, 1.2, 0.3, 0.0, 0.0, -0.4, 1.1, 1.0, 0.2, 0.1, -2.0, 3.0,
        ]);
        let a = OverlayFrameState::build(7, map, &reference_transform());
        let b = OverlayFrameState::build(7, map, &reference_transform());
        assert_eq!(a, b);
        assert_eq!(a.combined.to_cols_array(), b.combined.to_cols_array());
    }
}
