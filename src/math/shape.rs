use glam::Vec3;

/**
 * A simple sphere representation.
 */
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {

    pub const UNIT: Self = Sphere {
        center: Vec3::ZERO,
        radius: 1.0
    };

    pub const fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// True if the spheres touch or overlap.
    pub fn intersects(&self, other: &Sphere) -> bool {
        let reach = self.radius + other.radius;
        self.center.distance_squared(other.center) <= reach * reach
    }
}

impl Default for Sphere {
    fn default() -> Self { Self::UNIT }
}


#[cfg(test)]
mod test {
    use glam::Vec3;
    use crate::math::Sphere;

    #[test]
    fn intersects() {
        let bullet = Sphere::new(Vec3::new(0.0, 10.0, 1.5), 0.2);
        let target = Sphere::new(Vec3::new(0.3, 10.5, 1.5), 0.5);
        assert!(bullet.intersects(&target));
        assert!(target.intersects(&bullet));

        let far_target = Sphere::new(Vec3::new(3.0, 10.0, 1.5), 0.5);
        assert!(!bullet.intersects(&far_target));
    }

    #[test]
    fn touching_counts() {
        let a = Sphere::new(Vec3::ZERO, 1.0);
        let b = Sphere::new(Vec3::new(0.0, 2.0, 0.0), 1.0);
        assert!(a.intersects(&b));
    }
}
