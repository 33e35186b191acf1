use {
    super::{AssetKey, LoadError, LoadedModel, Loader, Normalization},
    crate::{
        config::{AssetSource, Config},
        scene::NodeId,
    },
    fitview_deform::{Bone, Skeleton},
    futures::future::BoxFuture,
    nalgebra as na,
    std::{collections::HashSet, path::PathBuf},
};

/// Loads avatar and garment models from `.glb`/`.gltf` containers found on
/// the configured filesystem sources.
pub struct GltfLoader {
    sources: Vec<PathBuf>,
}

impl GltfLoader {
    pub fn new(sources: Vec<PathBuf>) -> Self {
        GltfLoader { sources }
    }

    pub fn from_config(config: &Config) -> Self {
        GltfLoader::new(
            config
                .sources
                .iter()
                .map(|source| match source {
                    AssetSource::FileSystem { path } => path.clone(),
                })
                .collect(),
        )
    }
}

impl Loader for GltfLoader {
    fn load(
        &self,
        key: &AssetKey,
    ) -> BoxFuture<'static, Result<LoadedModel, LoadError>> {
        let sources = self.sources.clone();
        let key = key.clone();

        Box::pin(async move {
            let worker_key = key.clone();
            tokio::task::spawn_blocking(move || {
                import_model(&sources, &worker_key)
            })
            .await
            .map_err(|_| LoadError::WorkerLost { key })?
        })
    }
}

fn import_model(
    sources: &[PathBuf],
    key: &AssetKey,
) -> Result<LoadedModel, LoadError> {
    let path = locate(sources, key)
        .ok_or_else(|| LoadError::NotFound { key: key.clone() })?;

    let (document, _buffers, _images) = gltf::import(&path)?;

    let scene = match document
        .default_scene()
        .or_else(|| document.scenes().next())
    {
        Some(scene) => scene,
        None => return Err(LoadError::NoScenes { key: key.clone() }),
    };

    if scene.nodes().len() == 0 {
        return Err(LoadError::NoNodes { key: key.clone() });
    }

    let skeleton = extract_skeleton(&document, &scene);

    let normalize = match scene_bounds(&scene) {
        Some(bounds) => normalization(bounds),
        None => {
            tracing::debug!("model `{}` has no mesh bounds", key);
            Normalization::identity()
        }
    };

    let root = NodeId::allocate();
    let overlay = skeleton.as_ref().map(|_| NodeId::allocate());

    tracing::info!("model `{}` loaded from {}", key, path.display());

    Ok(LoadedModel {
        root,
        overlay,
        skeleton,
        normalize,
    })
}

fn locate(sources: &[PathBuf], key: &AssetKey) -> Option<PathBuf> {
    for dir in sources {
        for ext in &["glb", "gltf"] {
            let candidate = dir.join(format!("{}.{}", key, ext));
            if candidate.exists() {
                return Some(candidate);
            }
        }
    }
    None
}

/// Collects the model's bone tree in traversal order.
///
/// Skinned models contribute the first skin's joints; unskinned models
/// fall back to treating every named node as a bone, which is how rigs
/// exported without meshes come through.
fn extract_skeleton(
    document: &gltf::Document,
    scene: &gltf::Scene,
) -> Option<Skeleton> {
    let joints: Option<HashSet<usize>> = document
        .skins()
        .next()
        .map(|skin| skin.joints().map(|joint| joint.index()).collect());

    let mut bones = Vec::new();
    for node in scene.nodes() {
        collect_bones(&node, None, joints.as_ref(), &mut bones);
    }

    if bones.is_empty() {
        return None;
    }

    match Skeleton::from_bones(bones) {
        Ok(skeleton) => Some(skeleton),
        Err(err) => {
            tracing::warn!("discarding malformed skeleton: {}", err);
            None
        }
    }
}

fn collect_bones(
    node: &gltf::Node<'_>,
    parent: Option<usize>,
    joints: Option<&HashSet<usize>>,
    bones: &mut Vec<Bone>,
) {
    let is_bone = match joints {
        Some(joints) => joints.contains(&node.index()),
        None => node.name().is_some(),
    };

    let parent = if is_bone {
        let name = node
            .name()
            .map(str::to_owned)
            .unwrap_or_else(|| format!("joint_{}", node.index()));
        let (_, _, scale) = node.transform().decomposed();

        let index = bones.len();
        bones.push(Bone::new(name, parent).with_scale(na::Vector3::new(
            scale[0], scale[1], scale[2],
        )));
        Some(index)
    } else {
        parent
    };

    for child in node.children() {
        collect_bones(&child, parent, joints, bones);
    }
}

fn scene_bounds(
    scene: &gltf::Scene,
) -> Option<(na::Point3<f32>, na::Point3<f32>)> {
    let mut bounds = None;
    for node in scene.nodes() {
        node_bounds(&node, &na::Matrix4::identity(), &mut bounds);
    }
    bounds
}

fn node_bounds(
    node: &gltf::Node<'_>,
    parent: &na::Matrix4<f32>,
    bounds: &mut Option<(na::Point3<f32>, na::Point3<f32>)>,
) {
    let transform = parent * na::Matrix4::from(node.transform().matrix());

    if let Some(mesh) = node.mesh() {
        for primitive in mesh.primitives() {
            let aabb = primitive.bounding_box();
            for corner in 0..8 {
                let local = na::Point3::new(
                    if corner & 1 == 0 { aabb.min[0] } else { aabb.max[0] },
                    if corner & 2 == 0 { aabb.min[1] } else { aabb.max[1] },
                    if corner & 4 == 0 { aabb.min[2] } else { aabb.max[2] },
                );
                let point = transform.transform_point(&local);

                match bounds {
                    Some((min, max)) => {
                        min.x = min.x.min(point.x);
                        min.y = min.y.min(point.y);
                        min.z = min.z.min(point.z);
                        max.x = max.x.max(point.x);
                        max.y = max.y.max(point.y);
                        max.z = max.z.max(point.z);
                    }
                    None => *bounds = Some((point, point)),
                }
            }
        }
    }

    for child in node.children() {
        node_bounds(&child, &transform, bounds);
    }
}

/// Uniform scale to a canonical viewport size plus a centering offset,
/// the way the viewer frames every freshly loaded model.
fn normalization(
    (min, max): (na::Point3<f32>, na::Point3<f32>),
) -> Normalization {
    let size = max - min;
    let max_extent = size.x.max(size.y).max(size.z);
    if max_extent <= f32::EPSILON {
        return Normalization::identity();
    }

    let scale = 1.5 / max_extent;
    let center = min + size * 0.5;
    Normalization {
        scale,
        offset: -center.coords * scale,
    }
}
