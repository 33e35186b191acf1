use {
    crate::{
        assets::{AssetKey, LoadError, LoadedModel, Loader},
        camera::OrbitTarget,
        config::Config,
        registry::{Completion, Registry},
        scene::Scene,
    },
    fitview_deform::{apply_length, GrowthTable},
    flume::{bounded, Receiver, Sender},
    std::sync::Arc,
    tokio::runtime::Handle as TokioHandle,
    tracing_futures::Instrument as _,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SlotKind {
    Avatar,
    Garment,
}

struct LoadMsg {
    kind: SlotKind,
    key: AssetKey,
    result: Result<LoadedModel, LoadError>,
}

/// Observable outcome of `advance`, for the surrounding UI.
#[derive(Debug)]
pub enum SessionEvent {
    AvatarReady(AssetKey),
    GarmentReady(AssetKey),
    /// Surfaced once per failed asset; the slot stays unavailable for the
    /// rest of the session.
    LoadFailed { key: AssetKey, error: LoadError },
}

/// Root data structure for a fitting session.
///
/// Owns the registry, the loader and scene capabilities, and the channel
/// that ferries finished loads back to the render-loop thread. The
/// external render loop calls [`Session::advance`] every frame and reads
/// deformed transforms out of [`Session::registry`]; UI events call the
/// operation methods.
pub struct Session {
    config: Config,
    registry: Registry,
    table: GrowthTable,
    camera: OrbitTarget,
    scene: Box<dyn Scene>,
    loader: Arc<dyn Loader>,
    runtime: TokioHandle,
    send_loaded: Sender<LoadMsg>,
    recv_loaded: Receiver<LoadMsg>,
}

impl Session {
    pub fn new(
        config: Config,
        loader: Arc<dyn Loader>,
        scene: Box<dyn Scene>,
        runtime: TokioHandle,
    ) -> Self {
        let registry = Registry::new(&config);
        let table = config
            .regions
            .clone()
            .map(GrowthTable::from_regions)
            .unwrap_or_default();
        let (send_loaded, recv_loaded) = bounded(512);

        Session {
            config,
            registry,
            table,
            camera: OrbitTarget::new(),
            scene,
            loader,
            runtime,
            send_loaded,
            recv_loaded,
        }
    }

    /// Kicks off asynchronous loads for every catalog entry. Loads
    /// complete in arbitrary order; `advance` folds them in as they land.
    pub fn start(&mut self) {
        let avatars: Vec<(AssetKey, String)> = self
            .config
            .avatars
            .iter()
            .map(|def| (AssetKey::from(def.key.as_str()), def.path.clone()))
            .collect();
        for (key, path) in avatars {
            if self.registry.begin_load_avatar(&key) {
                self.spawn_load(SlotKind::Avatar, key, path);
            }
        }

        let garments: Vec<(AssetKey, String)> = self
            .config
            .garments
            .iter()
            .map(|def| (AssetKey::from(def.key.as_str()), def.path.clone()))
            .collect();
        for (key, path) in garments {
            if self.registry.begin_load_garment(&key) {
                self.spawn_load(SlotKind::Garment, key, path);
            }
        }
    }

    fn spawn_load(&self, kind: SlotKind, key: AssetKey, path: String) {
        let path = AssetKey::from(path.as_str());
        let fut = self.loader.load(&path);
        let send = self.send_loaded.clone();
        let span = tracing::info_span!("load_model", key = %key, path = %path);

        self.runtime.spawn(
            async move {
                let result = fut.await;
                let _ = send.send(LoadMsg { kind, key, result });
            }
            .instrument(span),
        );
    }

    /// Folds finished loads into the registry. Called from the render-loop
    /// thread once per frame; never blocks.
    pub fn advance(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();

        while let Ok(msg) = self.recv_loaded.try_recv() {
            let LoadMsg { kind, key, result } = msg;
            let outcome = match kind {
                SlotKind::Avatar => self.registry.complete_avatar(
                    &key,
                    result,
                    &mut *self.scene,
                ),
                SlotKind::Garment => self.registry.complete_garment(
                    &key,
                    result,
                    &mut *self.scene,
                ),
            };

            match outcome {
                Completion::Ready => {
                    tracing::info!("model `{}` is ready", key);
                    events.push(match kind {
                        SlotKind::Avatar => SessionEvent::AvatarReady(key),
                        SlotKind::Garment => SessionEvent::GarmentReady(key),
                    });
                }
                Completion::Dropped => {}
                Completion::Failed(error) => {
                    tracing::error!(
                        "failed to load model `{}`: {}",
                        key,
                        error
                    );
                    events.push(SessionEvent::LoadFailed { key, error });
                }
            }
        }

        events
    }

    /// Deforms the active avatar toward the requested stature and returns
    /// the clamped height that was applied, or `None` while the avatar is
    /// not ready.
    pub fn apply_height(&mut self, requested_cm: f32) -> Option<f32> {
        let table = &self.table;
        match self.registry.active_avatar_mut() {
            Some(avatar) => Some(avatar.apply_height(table, requested_cm)),
            None => {
                tracing::debug!(
                    "height request dropped: active avatar is not ready"
                );
                None
            }
        }
    }

    /// Resizes a garment to the requested length and returns the clamped
    /// length that was applied, or `None` while the garment is not ready.
    pub fn apply_garment_length(
        &mut self,
        key: &str,
        requested_cm: f32,
    ) -> Option<f32> {
        match self.registry.garment_mut(key) {
            Some(piece) => {
                Some(apply_length(piece.garment_mut(), requested_cm))
            }
            None => {
                tracing::debug!(
                    "length request dropped: garment `{}` is not ready",
                    key
                );
                None
            }
        }
    }

    /// Toggles to the next ready avatar identity and returns the active
    /// key afterwards. The camera target snaps back to the canonical
    /// position only when the identity actually changes.
    pub fn switch_avatar(&mut self) -> Option<AssetKey> {
        match self.registry.switch(&mut *self.scene) {
            Some((key, true)) => {
                self.camera.reset();
                tracing::info!("active avatar is now `{}`", key);
                Some(key)
            }
            Some((key, false)) => Some(key),
            None => None,
        }
    }

    pub fn set_skeleton_overlay(&mut self, visible: bool) {
        self.registry.set_overlay_visible(visible, &mut *self.scene);
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn camera(&self) -> &OrbitTarget {
        &self.camera
    }

    pub fn growth_table(&self) -> &GrowthTable {
        &self.table
    }

    /// Ends the session, removing everything it added to the scene.
    pub fn teardown(mut self) {
        self.registry.teardown(&mut *self.scene);
    }
}
