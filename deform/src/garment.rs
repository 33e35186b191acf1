use nalgebra as na;

/// Vertical shift, in scene units, per cm of deviation from the authored
/// garment length.
pub const VERTICAL_OFFSET_PER_CM: f32 = 0.01;

/// Garment category. The category fixes the admissible length range and
/// the direction the mesh shifts as the hem moves, since tops hang from
/// the shoulders while bottoms sit on the hips.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize,
)]
pub enum GarmentClass {
    Tops,
    Bottoms,
}

impl GarmentClass {
    pub fn length_range_cm(self) -> (f32, f32) {
        match self {
            GarmentClass::Tops => (50.0, 80.0),
            GarmentClass::Bottoms => (80.0, 120.0),
        }
    }

    fn drop_sign(self) -> f32 {
        match self {
            GarmentClass::Tops => -1.0,
            GarmentClass::Bottoms => 1.0,
        }
    }
}

/// A wearable mesh's sizing state. The mesh itself belongs to the
/// rendering collaborator; this struct carries the authored reference
/// values and the transform the fitter keeps up to date.
#[derive(Debug)]
pub struct Garment {
    class: GarmentClass,
    base_length_cm: f32,
    authored_scale: na::Vector3<f32>,
    base_position_y: f32,
    length_cm: f32,
    scale: na::Vector3<f32>,
    position_y: f32,
}

impl Garment {
    pub fn new(
        class: GarmentClass,
        base_length_cm: f32,
        authored_scale: na::Vector3<f32>,
        base_position_y: f32,
    ) -> Self {
        Garment {
            class,
            base_length_cm,
            authored_scale,
            base_position_y,
            length_cm: base_length_cm,
            scale: authored_scale,
            position_y: base_position_y,
        }
    }

    pub fn class(&self) -> GarmentClass {
        self.class
    }

    pub fn base_length_cm(&self) -> f32 {
        self.base_length_cm
    }

    pub fn length_cm(&self) -> f32 {
        self.length_cm
    }

    pub fn scale(&self) -> na::Vector3<f32> {
        self.scale
    }

    pub fn position_y(&self) -> f32 {
        self.position_y
    }
}

/// Resizes a garment to the requested length and returns the length that
/// was actually applied after clamping to the class range.
///
/// Only the Y axis stretches; X/Z keep the authored scale because garments
/// do not widen with length in this model, only the body does. The mesh
/// shifts vertically by a fixed amount per cm so the hem stays anchored
/// relative to the body.
pub fn apply_length(garment: &mut Garment, requested_cm: f32) -> f32 {
    let (min_cm, max_cm) = garment.class.length_range_cm();
    let applied_cm = requested_cm.clamp(min_cm, max_cm);

    let size_ratio = applied_cm / garment.base_length_cm;
    garment.scale.y = garment.authored_scale.y * size_ratio;
    garment.position_y = garment.base_position_y
        + garment.class.drop_sign()
            * (applied_cm - garment.base_length_cm)
            * VERTICAL_OFFSET_PER_CM;
    garment.length_cm = applied_cm;

    applied_cm
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tee() -> Garment {
        Garment::new(
            GarmentClass::Tops,
            60.0,
            na::Vector3::new(0.67, 0.67, 0.67),
            0.1,
        )
    }

    #[test]
    fn length_clamps_to_class_range() {
        let mut tee = tee();
        assert_eq!(apply_length(&mut tee, 90.0), 80.0);
        assert_eq!(apply_length(&mut tee, 10.0), 50.0);
        assert_eq!(apply_length(&mut tee, 65.0), 65.0);

        let mut jeans = Garment::new(
            GarmentClass::Bottoms,
            100.0,
            na::Vector3::new(1.0, 1.0, 1.0),
            0.0,
        );
        assert_eq!(apply_length(&mut jeans, 60.0), 80.0);
        assert_eq!(apply_length(&mut jeans, 130.0), 120.0);
    }

    #[test]
    fn only_the_y_axis_stretches() {
        let mut tee = tee();
        apply_length(&mut tee, 90.0);

        // 0.67 * (80 / 60) ≈ 0.893
        assert!((tee.scale().y - 0.67 * (80.0 / 60.0)).abs() < 1e-6);
        assert!((tee.scale().y - 0.893).abs() < 1e-3);
        assert_eq!(tee.scale().x, 0.67);
        assert_eq!(tee.scale().z, 0.67);
    }

    #[test]
    fn tops_shift_down_and_bottoms_shift_up() {
        let mut tee = tee();
        apply_length(&mut tee, 70.0);
        assert!((tee.position_y() - (0.1 - 10.0 * 0.01)).abs() < 1e-6);

        let mut jeans = Garment::new(
            GarmentClass::Bottoms,
            100.0,
            na::Vector3::new(1.0, 1.0, 1.0),
            -0.2,
        );
        apply_length(&mut jeans, 110.0);
        assert!((jeans.position_y() - (-0.2 + 10.0 * 0.01)).abs() < 1e-6);
    }

    #[test]
    fn reapplying_a_length_is_idempotent() {
        let mut tee = tee();
        apply_length(&mut tee, 75.0);
        let scale = tee.scale();
        let position = tee.position_y();

        apply_length(&mut tee, 75.0);
        assert_eq!(tee.scale(), scale);
        assert_eq!(tee.position_y(), position);
    }

    #[test]
    fn authored_length_keeps_authored_transform() {
        let mut tee = tee();
        apply_length(&mut tee, 60.0);

        assert_eq!(tee.scale(), na::Vector3::new(0.67, 0.67, 0.67));
        assert_eq!(tee.position_y(), 0.1);
    }
}
