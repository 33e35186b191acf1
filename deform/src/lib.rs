//! Anthropometric deformation math for the fitting viewer.
//!
//! Everything in this crate is pure: skeletons are plain bone trees,
//! classification is a table scan, and the stature/garment operations
//! rewrite local transforms in place. Asset loading, scene membership and
//! session state live in the `fitview` crate.

pub mod classify;
pub mod garment;
pub mod skeleton;
pub mod stature;

pub use self::{
    classify::{GrowthTable, Region},
    garment::{apply_length, Garment, GarmentClass},
    skeleton::{Bone, InvalidSkeleton, Skeleton},
    stature::{apply_stature, clamp_height, STATURE_SPAN_CM, WIDTH_DAMPING},
};
