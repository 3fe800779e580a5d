use foundation::bounds::Aabb3;
use foundation::math::Vec3;
use foundation::time::TimeMs;

use crate::world::World;

/// Default speed (world units per second) under which a moving camera is at rest.
pub const DEFAULT_REST_THRESHOLD: f64 = 0.25;

/// Turns camera position samples into a single `rest` signal per movement.
///
/// The camera counts as moving while its speed between consecutive samples
/// exceeds `rest_threshold`. The first sample slower than that after a
/// movement reports rest; a camera that never moved never reports rest.
#[derive(Debug, Clone)]
pub struct RestDetector {
    rest_threshold: f64,
    last: Option<(Vec3, TimeMs)>,
    moving: bool,
}

impl Default for RestDetector {
    fn default() -> Self {
        Self::new(DEFAULT_REST_THRESHOLD)
    }
}

impl RestDetector {
    pub fn new(rest_threshold: f64) -> Self {
        Self {
            rest_threshold,
            last: None,
            moving: false,
        }
    }

    pub fn rest_threshold(&self) -> f64 {
        self.rest_threshold
    }

    pub fn is_moving(&self) -> bool {
        self.moving
    }

    /// Feed one sample; returns `true` exactly when the camera came to rest.
    pub fn update(&mut self, position: Vec3, now: TimeMs) -> bool {
        let Some((prev, prev_t)) = self.last else {
            self.last = Some((position, now));
            return false;
        };

        let dt_ms = now.since(prev_t);
        if dt_ms == 0 {
            // Same instant: treat any displacement as movement.
            if position != prev {
                self.moving = true;
                self.last = Some((position, now));
            }
            return false;
        }

        let speed = position.distance(prev) / (dt_ms as f64 / 1000.0);
        self.last = Some((position, now));

        if speed > self.rest_threshold {
            self.moving = true;
            false
        } else if self.moving {
            self.moving = false;
            true
        } else {
            false
        }
    }
}

/// What the viewport camera should frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FitRequest {
    pub bounds: Aabb3,
    pub padding: f64,
}

/// Frames every mesh in the scene; `None` when there is nothing to frame.
pub fn fit_bounds(world: &World, padding: f64) -> Option<FitRequest> {
    world.bounds().map(|bounds| FitRequest { bounds, padding })
}

#[cfg(test)]
mod tests {
    use super::{RestDetector, fit_bounds};
    use crate::model::{Fragment, Model};
    use crate::world::World;
    use foundation::bounds::Aabb3;
    use foundation::ids::{FragmentId, ModelId};
    use foundation::math::Vec3;
    use foundation::time::TimeMs;

    #[test]
    fn reports_rest_once_after_movement() {
        let mut d = RestDetector::new(0.25);
        assert!(!d.update(Vec3::ZERO, TimeMs(0)));
        // 10 units in 100ms: moving.
        assert!(!d.update(Vec3::new(10.0, 0.0, 0.0), TimeMs(100)));
        assert!(d.is_moving());
        // Still.
        assert!(d.update(Vec3::new(10.0, 0.0, 0.0), TimeMs(200)));
        assert!(!d.update(Vec3::new(10.0, 0.0, 0.0), TimeMs(300)));
    }

    #[test]
    fn stationary_camera_never_rests() {
        let mut d = RestDetector::default();
        for t in 0..5 {
            assert!(!d.update(Vec3::ZERO, TimeMs(t * 16)));
        }
    }

    #[test]
    fn fit_covers_the_whole_scene() {
        let mut world = World::new();
        assert!(fit_bounds(&world, 0.8).is_none());

        world.add_model(&Model::new(
            ModelId(1),
            "m",
            vec![
                Fragment::new(FragmentId(1), Aabb3::point(Vec3::new(-1.0, 0.0, 0.0))),
                Fragment::new(FragmentId(2), Aabb3::point(Vec3::new(3.0, 2.0, 1.0))),
            ],
        ));
        let fit = fit_bounds(&world, 0.8).unwrap();
        assert_eq!(fit.padding, 0.8);
        assert_eq!(fit.bounds.min, Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(fit.bounds.max, Vec3::new(3.0, 2.0, 1.0));
    }
}
