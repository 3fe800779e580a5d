use crate::math::Vec3;

/// Axis-aligned bounding box in world units.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb3 {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb3 {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Aabb3 { min, max }
    }

    /// Degenerate box around a single point.
    pub fn point(p: Vec3) -> Self {
        Aabb3 { min: p, max: p }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max).scale(0.5)
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn union(&self, other: &Aabb3) -> Aabb3 {
        Aabb3::new(self.min.min(other.min), self.max.max(other.max))
    }

    /// Euclidean distance from `p` to the box; zero when inside.
    pub fn distance_to(&self, p: Vec3) -> f64 {
        let closest = p.max(self.min).min(self.max);
        closest.distance(p)
    }

    /// Box grown by `padding` times its size on every side.
    pub fn padded(&self, padding: f64) -> Aabb3 {
        let grow = self.size().scale(padding);
        Aabb3::new(self.min - grow, self.max + grow)
    }
}

#[cfg(test)]
mod tests {
    use super::Aabb3;
    use crate::math::Vec3;

    #[test]
    fn distance_is_zero_inside_and_euclidean_outside() {
        let b = Aabb3::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(b.distance_to(Vec3::new(0.5, 0.0, 0.0)), 0.0);
        assert_eq!(b.distance_to(Vec3::new(4.0, 1.0, 5.0)), 5.0);
    }

    #[test]
    fn point_box_distance_is_point_distance() {
        let b = Aabb3::point(Vec3::new(3.0, 0.0, 0.0));
        assert_eq!(b.distance_to(Vec3::ZERO), 3.0);
    }

    #[test]
    fn union_and_padding() {
        let a = Aabb3::point(Vec3::ZERO);
        let b = Aabb3::point(Vec3::new(2.0, 4.0, -2.0));
        let u = a.union(&b);
        assert_eq!(u.min, Vec3::new(0.0, 0.0, -2.0));
        assert_eq!(u.max, Vec3::new(2.0, 4.0, 0.0));
        assert_eq!(u.center(), Vec3::new(1.0, 2.0, -1.0));
        let p = u.padded(0.5);
        assert_eq!(p.min, Vec3::new(-1.0, -2.0, -3.0));
    }
}
