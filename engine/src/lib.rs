//! Core of the virtual fitting viewer: asset loading, the avatar/garment
//! registry and the session API the surrounding application drives.
//!
//! Rendering, windowing and widgets are external collaborators. They hand
//! the session a [`scene::Scene`] sink and an [`assets::Loader`], call the
//! session operations on UI events, and read the mutated transforms out of
//! the registry on every frame.

pub mod assets;
pub mod camera;
pub mod config;
pub mod registry;
pub mod scene;
pub mod session;

pub use fitview_deform as deform;
