use nalgebra as na;

/// Shared orbit-control target.
///
/// The rendering collaborator owns the actual camera and its controls; the
/// session only dictates where they should look. Switching the active
/// avatar snaps the target back to the canonical framing position.
pub struct OrbitTarget {
    target: na::Point3<f32>,
}

impl OrbitTarget {
    pub fn new() -> Self {
        OrbitTarget {
            target: na::Point3::origin(),
        }
    }

    pub fn target(&self) -> na::Point3<f32> {
        self.target
    }

    pub fn set_target(&mut self, target: na::Point3<f32>) {
        self.target = target;
    }

    pub fn reset(&mut self) {
        self.target = na::Point3::origin();
    }
}

impl Default for OrbitTarget {
    fn default() -> Self {
        OrbitTarget::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_returns_to_origin() {
        let mut camera = OrbitTarget::new();
        camera.set_target(na::Point3::new(0.0, 1.2, 0.5));
        camera.reset();
        assert_eq!(camera.target(), na::Point3::origin());
    }
}
