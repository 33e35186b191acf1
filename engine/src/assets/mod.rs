mod gltf;

pub use self::gltf::GltfLoader;

use {
    crate::scene::NodeId,
    fitview_deform::Skeleton,
    futures::future::BoxFuture,
    nalgebra as na,
    std::sync::Arc,
};

pub type AssetKey = Arc<str>;

/// Uniform scale and centering translation computed at load time so a
/// model lands in the viewport at a canonical size. Applied to the model's
/// root node only, never to classified bones.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Normalization {
    pub scale: f32,
    pub offset: na::Vector3<f32>,
}

impl Normalization {
    pub fn identity() -> Self {
        Normalization {
            scale: 1.0,
            offset: na::Vector3::zeros(),
        }
    }
}

/// A model delivered by the loader: scene-node handles plus the data the
/// core needs to deform it.
pub struct LoadedModel {
    pub root: NodeId,
    /// Line-drawing overlay of the bone hierarchy, present when the model
    /// carries a skeleton.
    pub overlay: Option<NodeId>,
    pub skeleton: Option<Skeleton>,
    pub normalize: Normalization,
}

/// External loader capability.
///
/// Bit-level container parsing is not the core's concern; any loader that
/// can turn a key path into renderer-owned nodes and a bone list fits
/// here. Loads complete in arbitrary order relative to each other.
pub trait Loader: Send + Sync {
    fn load(
        &self,
        key: &AssetKey,
    ) -> BoxFuture<'static, Result<LoadedModel, LoadError>>;
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Gltf {
        #[from]
        source: ::gltf::Error,
    },

    #[error("asset `{key}` not found in any source")]
    NotFound { key: AssetKey },

    #[error("model `{key}` has no scenes")]
    NoScenes { key: AssetKey },

    #[error("model `{key}` has no usable nodes")]
    NoNodes { key: AssetKey },

    #[error("model `{key}` has no skeleton")]
    MissingSkeleton { key: AssetKey },

    #[error("load worker terminated before completing `{key}`")]
    WorkerLost { key: AssetKey },
}
