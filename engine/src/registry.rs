use {
    crate::{
        assets::{AssetKey, LoadError, LoadedModel, Normalization},
        config::{Config, WardrobePolicy},
        scene::{NodeId, Scene},
    },
    fitview_deform::{
        apply_stature, Garment, GarmentClass, GrowthTable, Skeleton,
    },
    nalgebra as na,
    std::collections::HashSet,
};

/// A loaded avatar: renderer node handles plus the deformable state the
/// render loop reads every frame.
pub struct Avatar {
    key: AssetKey,
    root: NodeId,
    overlay: NodeId,
    skeleton: Skeleton,
    base_height_cm: f32,
    current_height_cm: f32,
    normalize: Normalization,
}

impl Avatar {
    pub fn key(&self) -> &AssetKey {
        &self.key
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn overlay(&self) -> NodeId {
        self.overlay
    }

    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    pub fn base_height_cm(&self) -> f32 {
        self.base_height_cm
    }

    pub fn current_height_cm(&self) -> f32 {
        self.current_height_cm
    }

    pub fn normalize(&self) -> Normalization {
        self.normalize
    }

    pub(crate) fn apply_height(
        &mut self,
        table: &GrowthTable,
        requested_cm: f32,
    ) -> f32 {
        let applied_cm = apply_stature(
            &mut self.skeleton,
            table,
            self.base_height_cm,
            requested_cm,
        );
        self.current_height_cm = applied_cm;
        applied_cm
    }
}

/// A loaded garment: its renderer node plus the sizing state the fitter
/// keeps up to date.
pub struct GarmentPiece {
    key: AssetKey,
    root: NodeId,
    garment: Garment,
}

impl GarmentPiece {
    pub fn key(&self) -> &AssetKey {
        &self.key
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn garment(&self) -> &Garment {
        &self.garment
    }

    pub(crate) fn garment_mut(&mut self) -> &mut Garment {
        &mut self.garment
    }
}

/// Load lifecycle of a catalog slot. `Ready` and `Failed` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadState {
    Unloaded,
    Loading,
    Ready,
    Failed,
}

enum SlotState<T> {
    Unloaded,
    Loading,
    Ready(T),
    Failed,
}

impl<T> SlotState<T> {
    fn ready(&self) -> Option<&T> {
        match self {
            SlotState::Ready(value) => Some(value),
            _ => None,
        }
    }

    fn ready_mut(&mut self) -> Option<&mut T> {
        match self {
            SlotState::Ready(value) => Some(value),
            _ => None,
        }
    }

    fn load_state(&self) -> LoadState {
        match self {
            SlotState::Unloaded => LoadState::Unloaded,
            SlotState::Loading => LoadState::Loading,
            SlotState::Ready(_) => LoadState::Ready,
            SlotState::Failed => LoadState::Failed,
        }
    }
}

struct AvatarSlot {
    key: AssetKey,
    base_height_cm: f32,
    wardrobe: Vec<AssetKey>,
    state: SlotState<Avatar>,
}

struct GarmentSlot {
    key: AssetKey,
    class: GarmentClass,
    base_length_cm: f32,
    authored_scale: na::Vector3<f32>,
    base_position_y: f32,
    state: SlotState<GarmentPiece>,
}

/// Outcome of delivering a finished load to the registry.
pub(crate) enum Completion {
    Ready,
    /// The completion no longer matches registry state and was ignored.
    Dropped,
    /// The slot transitioned to `Failed`; reported exactly once.
    Failed(LoadError),
}

/// Owns the avatar and garment slots, the active identity, and the set of
/// node handles currently in the visible scene.
///
/// Slots are fixed at construction from the catalog; loads, switches and
/// overlay toggles only move their states. All scene mutations funnel
/// through the membership set so the non-idempotent sink never sees a
/// duplicate add or remove.
pub struct Registry {
    avatars: Vec<AvatarSlot>,
    garments: Vec<GarmentSlot>,
    active: usize,
    overlay_visible: bool,
    policy: WardrobePolicy,
    in_scene: HashSet<NodeId>,
}

impl Registry {
    pub fn new(config: &Config) -> Self {
        let avatars = config
            .avatars
            .iter()
            .map(|def| AvatarSlot {
                key: AssetKey::from(def.key.as_str()),
                base_height_cm: def.base_height_cm,
                wardrobe: def
                    .wardrobe
                    .iter()
                    .map(|key| AssetKey::from(key.as_str()))
                    .collect(),
                state: SlotState::Unloaded,
            })
            .collect();

        let garments = config
            .garments
            .iter()
            .map(|def| GarmentSlot {
                key: AssetKey::from(def.key.as_str()),
                class: def.class,
                base_length_cm: def.base_length_cm,
                authored_scale: na::Vector3::from(def.scale),
                base_position_y: def.base_position_y,
                state: SlotState::Unloaded,
            })
            .collect();

        Registry {
            avatars,
            garments,
            active: 0,
            overlay_visible: false,
            policy: config.wardrobe,
            in_scene: HashSet::new(),
        }
    }

    pub fn active_key(&self) -> Option<&AssetKey> {
        self.avatars.get(self.active).map(|slot| &slot.key)
    }

    pub fn is_active(&self, key: &str) -> bool {
        self.avatars
            .get(self.active)
            .map_or(false, |slot| &*slot.key == key)
    }

    pub fn overlay_visible(&self) -> bool {
        self.overlay_visible
    }

    pub fn policy(&self) -> WardrobePolicy {
        self.policy
    }

    pub fn avatar(&self, key: &str) -> Option<&Avatar> {
        self.avatar_index(key)
            .and_then(|index| self.avatars[index].state.ready())
    }

    pub fn active_avatar(&self) -> Option<&Avatar> {
        self.avatars.get(self.active).and_then(|slot| slot.state.ready())
    }

    pub(crate) fn active_avatar_mut(&mut self) -> Option<&mut Avatar> {
        self.avatars
            .get_mut(self.active)
            .and_then(|slot| slot.state.ready_mut())
    }

    pub fn garment(&self, key: &str) -> Option<&GarmentPiece> {
        self.garment_index(key)
            .and_then(|index| self.garments[index].state.ready())
    }

    pub(crate) fn garment_mut(
        &mut self,
        key: &str,
    ) -> Option<&mut GarmentPiece> {
        match self.garment_index(key) {
            Some(index) => self.garments[index].state.ready_mut(),
            None => None,
        }
    }

    pub fn avatar_state(&self, key: &str) -> Option<LoadState> {
        self.avatar_index(key)
            .map(|index| self.avatars[index].state.load_state())
    }

    pub fn garment_state(&self, key: &str) -> Option<LoadState> {
        self.garment_index(key)
            .map(|index| self.garments[index].state.load_state())
    }

    pub fn in_scene(&self, node: NodeId) -> bool {
        self.in_scene.contains(&node)
    }

    pub(crate) fn begin_load_avatar(&mut self, key: &str) -> bool {
        match self.avatar_index(key) {
            Some(index) => {
                match self.avatars[index].state {
                    SlotState::Unloaded => {
                        self.avatars[index].state = SlotState::Loading;
                        true
                    }
                    _ => false,
                }
            }
            None => false,
        }
    }

    pub(crate) fn begin_load_garment(&mut self, key: &str) -> bool {
        match self.garment_index(key) {
            Some(index) => {
                match self.garments[index].state {
                    SlotState::Unloaded => {
                        self.garments[index].state = SlotState::Loading;
                        true
                    }
                    _ => false,
                }
            }
            None => false,
        }
    }

    pub(crate) fn complete_avatar(
        &mut self,
        key: &AssetKey,
        result: Result<LoadedModel, LoadError>,
        scene: &mut dyn Scene,
    ) -> Completion {
        let index = match self.avatar_index(key) {
            Some(index) => index,
            None => {
                tracing::warn!(
                    "dropping completion for unknown avatar `{}`",
                    key
                );
                return Completion::Dropped;
            }
        };

        if !matches!(self.avatars[index].state, SlotState::Loading) {
            tracing::warn!("dropping stale completion for avatar `{}`", key);
            return Completion::Dropped;
        }

        let model = match result {
            Ok(model) => model,
            Err(error) => {
                self.avatars[index].state = SlotState::Failed;
                return Completion::Failed(error);
            }
        };

        let skeleton = match model.skeleton {
            Some(skeleton) => skeleton,
            None => {
                self.avatars[index].state = SlotState::Failed;
                return Completion::Failed(LoadError::MissingSkeleton {
                    key: key.clone(),
                });
            }
        };

        let base_height_cm = self.avatars[index].base_height_cm;
        let root = model.root;
        let overlay = model.overlay.unwrap_or_else(NodeId::allocate);

        self.avatars[index].state = SlotState::Ready(Avatar {
            key: key.clone(),
            root,
            overlay,
            skeleton,
            base_height_cm,
            current_height_cm: base_height_cm,
            normalize: model.normalize,
        });

        // A switch may have happened while this load was in flight; only
        // the current target joins the visible set.
        if index == self.active {
            self.attach(scene, root);
            if self.overlay_visible {
                self.attach(scene, overlay);
            }
        }

        Completion::Ready
    }

    pub(crate) fn complete_garment(
        &mut self,
        key: &AssetKey,
        result: Result<LoadedModel, LoadError>,
        scene: &mut dyn Scene,
    ) -> Completion {
        let index = match self.garment_index(key) {
            Some(index) => index,
            None => {
                tracing::warn!(
                    "dropping completion for unknown garment `{}`",
                    key
                );
                return Completion::Dropped;
            }
        };

        if !matches!(self.garments[index].state, SlotState::Loading) {
            tracing::warn!("dropping stale completion for garment `{}`", key);
            return Completion::Dropped;
        }

        let model = match result {
            Ok(model) => model,
            Err(error) => {
                self.garments[index].state = SlotState::Failed;
                return Completion::Failed(error);
            }
        };

        let slot = &self.garments[index];
        let piece = GarmentPiece {
            key: key.clone(),
            root: model.root,
            garment: Garment::new(
                slot.class,
                slot.base_length_cm,
                slot.authored_scale,
                slot.base_position_y,
            ),
        };
        self.garments[index].state = SlotState::Ready(piece);

        // Garments are visually independent of the avatar skeleton, so
        // visibility only consults the wardrobe policy, not avatar
        // readiness.
        self.sync_wardrobe(scene);

        Completion::Ready
    }

    /// Makes the next ready identity active, moving root and overlay nodes
    /// between the visible set accordingly. Returns the active key after
    /// the call and whether it changed; stature state of both avatars is
    /// left untouched.
    pub(crate) fn switch(
        &mut self,
        scene: &mut dyn Scene,
    ) -> Option<(AssetKey, bool)> {
        if self.avatars.is_empty() {
            return None;
        }

        let len = self.avatars.len();
        let mut next = None;
        for step in 1..len {
            let index = (self.active + step) % len;
            if self.avatars[index].state.ready().is_some() {
                next = Some(index);
                break;
            }
        }

        let next = match next {
            Some(next) => next,
            None => {
                tracing::debug!("switch ignored: no other avatar is ready");
                return Some((self.avatars[self.active].key.clone(), false));
            }
        };

        let shown = self.avatars[self.active]
            .state
            .ready()
            .map(|avatar| (avatar.root, avatar.overlay));
        if let Some((root, overlay)) = shown {
            self.detach(scene, root);
            self.detach(scene, overlay);
        }

        self.active = next;

        let shown = self.avatars[next]
            .state
            .ready()
            .map(|avatar| (avatar.root, avatar.overlay));
        if let Some((root, overlay)) = shown {
            self.attach(scene, root);
            if self.overlay_visible {
                self.attach(scene, overlay);
            }
        }

        self.sync_wardrobe(scene);

        Some((self.avatars[next].key.clone(), true))
    }

    /// Remembers the overlay flag and applies it to the active avatar's
    /// overlay. Avatars becoming active later inherit the remembered flag.
    pub(crate) fn set_overlay_visible(
        &mut self,
        visible: bool,
        scene: &mut dyn Scene,
    ) {
        self.overlay_visible = visible;

        let overlay = self
            .avatars
            .get(self.active)
            .and_then(|slot| slot.state.ready())
            .map(|avatar| avatar.overlay);

        if let Some(overlay) = overlay {
            if visible {
                self.attach(scene, overlay);
            } else {
                self.detach(scene, overlay);
            }
        }
    }

    /// Re-derives garment visibility from the wardrobe policy.
    pub(crate) fn sync_wardrobe(&mut self, scene: &mut dyn Scene) {
        let wardrobe = match self.policy {
            WardrobePolicy::Shared => None,
            WardrobePolicy::PerAvatar => Some(
                self.avatars
                    .get(self.active)
                    .map(|slot| slot.wardrobe.clone())
                    .unwrap_or_default(),
            ),
        };

        let mut attach = Vec::new();
        let mut detach = Vec::new();
        for slot in &self.garments {
            if let Some(piece) = slot.state.ready() {
                let worn = match &wardrobe {
                    None => true,
                    Some(keys) => keys.contains(&slot.key),
                };
                if worn {
                    attach.push(piece.root);
                } else {
                    detach.push(piece.root);
                }
            }
        }

        for node in attach {
            self.attach(scene, node);
        }
        for node in detach {
            self.detach(scene, node);
        }
    }

    /// Removes everything the registry put into the visible scene.
    pub(crate) fn teardown(&mut self, scene: &mut dyn Scene) {
        for node in self.in_scene.drain() {
            scene.remove(node);
        }
    }

    fn attach(&mut self, scene: &mut dyn Scene, node: NodeId) {
        if self.in_scene.insert(node) {
            scene.add(node);
        }
    }

    fn detach(&mut self, scene: &mut dyn Scene, node: NodeId) {
        if self.in_scene.remove(&node) {
            scene.remove(node);
        }
    }

    fn avatar_index(&self, key: &str) -> Option<usize> {
        self.avatars.iter().position(|slot| &*slot.key == key)
    }

    fn garment_index(&self, key: &str) -> Option<usize> {
        self.garments.iter().position(|slot| &*slot.key == key)
    }
}
