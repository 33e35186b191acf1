use nalgebra as na;

/// Tree-like structure of bones/joints.
///
/// Bones are stored flat in traversal order with index-based parent links,
/// so a parent always precedes its children. The skeleton owns its bones;
/// the mesh nodes they drive belong to the rendering collaborator.
#[derive(Debug)]
pub struct Skeleton {
    bones: Box<[Bone]>,
}

impl Skeleton {
    /// Builds a skeleton from bones listed in traversal order.
    ///
    /// Every parent index must point at an earlier bone.
    pub fn from_bones(bones: Vec<Bone>) -> Result<Self, InvalidSkeleton> {
        for (index, bone) in bones.iter().enumerate() {
            if let Some(parent) = bone.parent {
                if parent >= index {
                    return Err(InvalidSkeleton {
                        index,
                        parent,
                        name: bone.name.clone(),
                    });
                }
            }
        }

        Ok(Skeleton {
            bones: bones.into(),
        })
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    pub fn bones_mut(&mut self) -> &mut [Bone] {
        &mut self.bones
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }
}

/// A single joint node: a name used for region classification and a local
/// scale in the bone's own space.
#[derive(Debug)]
pub struct Bone {
    name: String,
    parent: Option<usize>,
    scale: na::Vector3<f32>,
}

impl Bone {
    pub fn new(name: impl Into<String>, parent: Option<usize>) -> Self {
        Bone {
            name: name.into(),
            parent,
            scale: na::Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn with_scale(mut self, scale: na::Vector3<f32>) -> Self {
        self.scale = scale;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    pub fn scale(&self) -> na::Vector3<f32> {
        self.scale
    }

    pub fn set_scale(&mut self, scale: na::Vector3<f32>) {
        self.scale = scale;
    }
}

#[derive(Debug, thiserror::Error)]
#[error("bone `{name}` at index {index} references parent {parent} that does not precede it")]
pub struct InvalidSkeleton {
    pub index: usize,
    pub parent: usize,
    pub name: String,
}
