use {
    color_eyre::Report,
    eyre::WrapErr,
    fitview_deform::{GarmentClass, Region},
    std::path::PathBuf,
};

#[derive(Clone, Debug, serde::Deserialize)]
pub enum AssetSource {
    FileSystem { path: PathBuf },
}

/// One avatar identity in the catalog.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct AvatarDef {
    pub key: String,
    /// Loader path of the model container, without extension.
    pub path: String,
    /// Anatomical reference height at scale 1.
    pub base_height_cm: f32,
    /// Garment keys this avatar wears under the `PerAvatar` policy.
    #[serde(default)]
    pub wardrobe: Vec<String>,
}

/// One garment slot in the catalog.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct GarmentDef {
    pub key: String,
    pub path: String,
    pub class: GarmentClass,
    /// Reference hem length at the authored scale.
    pub base_length_cm: f32,
    /// Scale the mesh was authored at.
    pub scale: [f32; 3],
    pub base_position_y: f32,
}

/// Whether garments stay visible regardless of the active avatar, or
/// follow the active avatar's wardrobe on every switch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Deserialize)]
pub enum WardrobePolicy {
    Shared,
    PerAvatar,
}

impl Default for WardrobePolicy {
    fn default() -> Self {
        WardrobePolicy::Shared
    }
}

#[derive(Clone, Debug, serde::Deserialize)]
pub struct Config {
    pub sources: Vec<AssetSource>,
    pub avatars: Vec<AvatarDef>,
    #[serde(default)]
    pub garments: Vec<GarmentDef>,
    #[serde(default)]
    pub wardrobe: WardrobePolicy,
    /// Optional override for the built-in growth-ratio table.
    #[serde(default)]
    pub regions: Option<Vec<Region>>,
}

impl Config {
    pub async fn load_default() -> Result<Self, Report> {
        // Load from predefined file path for desktop platforms.
        let path = std::env::var("FITVIEW_CONFIG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./cfg.ron"));

        let config = Self::load(path).await?;
        Ok(config)
    }

    #[tracing::instrument]
    pub async fn load(path: PathBuf) -> Result<Self, Report> {
        let file = std::fs::File::open(&path).wrap_err_with(|| {
            format!("failed to open config at {}", path.display())
        })?;
        Ok(ron::de::from_reader(file)?)
    }
}
