use {
    crate::{classify::GrowthTable, skeleton::Skeleton},
    nalgebra as na,
};

/// Maximum deviation from an avatar's anatomical base height, in cm.
pub const STATURE_SPAN_CM: f32 = 30.0;

/// Fraction of the length delta applied to the X/Z axes, so limbs thicken
/// slower than they lengthen.
pub const WIDTH_DAMPING: f32 = 0.7;

/// Clamps a requested height to the span allowed around the base height.
pub fn clamp_height(base_cm: f32, requested_cm: f32) -> f32 {
    requested_cm.clamp(base_cm - STATURE_SPAN_CM, base_cm + STATURE_SPAN_CM)
}

/// Rewrites local bone scales for a target stature and returns the height
/// that was actually applied after clamping.
///
/// Each classified bone is scaled along its length (Y) axis by the region's
/// share of the global factor, with damped X/Z growth. Scales are written
/// absolutely, so reapplying the same height is idempotent, and bones no
/// region matches are never touched. The avatar's root transform is not
/// part of the skeleton and stays untouched as well.
pub fn apply_stature(
    skeleton: &mut Skeleton,
    table: &GrowthTable,
    base_cm: f32,
    requested_cm: f32,
) -> f32 {
    let applied_cm = clamp_height(base_cm, requested_cm);
    let global_scale = applied_cm / base_cm;

    for bone in skeleton.bones_mut() {
        let ratio = match table.classify(bone.name()) {
            Some(ratio) => ratio,
            None => continue,
        };

        let length = 1.0 + (global_scale - 1.0) * ratio;
        let width = 1.0 + (length - 1.0) * WIDTH_DAMPING;
        bone.set_scale(na::Vector3::new(width, length, width));

        tracing::trace!(
            "bone `{}` scaled to ({}, {}, {})",
            bone.name(),
            width,
            length,
            width
        );
    }

    applied_cm
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::skeleton::{Bone, Skeleton},
    };

    fn rig() -> Skeleton {
        Skeleton::from_bones(vec![
            Bone::new("Hips", None),
            Bone::new("Spine", Some(0)),
            Bone::new("UpperArm_L", Some(1)),
            Bone::new("UpperLeg_R", Some(0)),
        ])
        .unwrap()
    }

    #[test]
    fn requested_height_is_clamped_to_span() {
        assert_eq!(clamp_height(170.0, 250.0), 200.0);
        assert_eq!(clamp_height(170.0, 100.0), 140.0);
        assert_eq!(clamp_height(170.0, 171.5), 171.5);
    }

    #[test]
    fn scales_follow_region_ratio_with_damped_width() {
        let mut skeleton = rig();
        let table = GrowthTable::builtin();

        let applied = apply_stature(&mut skeleton, &table, 170.0, 250.0);
        assert_eq!(applied, 200.0);

        let global = 200.0f32 / 170.0;
        let arm = &skeleton.bones()[2];
        let length = 1.0 + (global - 1.0) * 0.4;
        let width = 1.0 + (length - 1.0) * WIDTH_DAMPING;
        assert!((arm.scale().y - length).abs() < 1e-6);
        assert!((arm.scale().x - width).abs() < 1e-6);
        assert!((arm.scale().z - width).abs() < 1e-6);

        // Matches the worked example: ≈1.0706 long, ≈1.0494 wide.
        assert!((arm.scale().y - 1.0706).abs() < 1e-3);
        assert!((arm.scale().x - 1.0494).abs() < 1e-3);

        let leg = &skeleton.bones()[3];
        assert!((leg.scale().y - global).abs() < 1e-6);
    }

    #[test]
    fn unmatched_bones_keep_identity_scale() {
        let mut skeleton = rig();
        let table = GrowthTable::builtin();

        apply_stature(&mut skeleton, &table, 170.0, 200.0);

        let hips = &skeleton.bones()[0];
        assert_eq!(hips.scale(), nalgebra::Vector3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn reapplying_the_same_height_is_idempotent() {
        let mut once = rig();
        let mut twice = rig();
        let table = GrowthTable::builtin();

        apply_stature(&mut once, &table, 170.0, 195.0);
        apply_stature(&mut twice, &table, 170.0, 195.0);
        apply_stature(&mut twice, &table, 170.0, 195.0);

        for (a, b) in once.bones().iter().zip(twice.bones()) {
            assert_eq!(a.scale(), b.scale());
        }
    }

    #[test]
    fn base_height_restores_identity_on_matched_bones() {
        let mut skeleton = rig();
        let table = GrowthTable::builtin();

        apply_stature(&mut skeleton, &table, 170.0, 200.0);
        apply_stature(&mut skeleton, &table, 170.0, 170.0);

        for bone in skeleton.bones() {
            assert_eq!(bone.scale(), nalgebra::Vector3::new(1.0, 1.0, 1.0));
        }
    }
}
