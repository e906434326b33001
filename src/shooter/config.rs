use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use anyhow::Context;
use derive_more::*;
use serde::Deserialize;
use crate::Model;

/// File loaded when no path is given on the command line.
pub const DEFAULT_CONFIG_PATH: &str = "shooter.yaml";

/**
 * Tunable values of the game.
 * Every field has a default, so a config file only needs to list what it changes.
 */
#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShooterConfig {
    pub window: WindowConfig,
    pub player: PlayerConfig,
    pub camera: CameraConfig,
    pub bullet: BulletConfig,
    pub targets: TargetConfig,
    /// Seed for target placement. Random if absent.
    pub rng_seed: Option<u64>,
    /// Game ticks per second.
    pub tick_rate: f32,
}

impl Default for ShooterConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            player: PlayerConfig::default(),
            camera: CameraConfig::default(),
            bullet: BulletConfig::default(),
            targets: TargetConfig::default(),
            rng_seed: None,
            tick_rate: 60.0,
        }
    }
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Simple Shooter".to_owned(),
            width: 800,
            height: 600,
        }
    }
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlayerConfig {
    /// Units per second.
    pub speed: f32,
    pub scale: f32,
    pub model: Model,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            speed: 10.0,
            scale: 1.0,
            model: Model::Panda,
        }
    }
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraConfig {
    pub distance: f32,
    pub height: f32,
    pub look_height: f32,
    /// Vertical field of view in degrees.
    pub fov: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            distance: 15.0,
            height: 5.0,
            look_height: 1.5,
            fov: 40.0,
        }
    }
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BulletConfig {
    pub speed: f32,
    pub scale: f32,
    /// Collision radius before the entity's scale is applied.
    pub radius: f32,
    /// Bullets past this distance on x or y are destroyed.
    pub bound: f32,
    /// Height above the shooter that bullets spawn at.
    pub muzzle_height: f32,
}

impl Default for BulletConfig {
    fn default() -> Self {
        Self {
            speed: 30.0,
            scale: 0.2,
            radius: 0.2,
            bound: 100.0,
            muzzle_height: 1.5,
        }
    }
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TargetConfig {
    pub count: u32,
    pub scale: f32,
    /// Collision radius before the entity's scale is applied.
    pub radius: f32,
    pub x_range: [f32; 2],
    pub y_range: [f32; 2],
    pub z: f32,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            count: 3,
            scale: 0.5,
            radius: 0.5,
            x_range: [-8.0, 8.0],
            y_range: [10.0, 30.0],
            z: 1.5,
        }
    }
}

impl ShooterConfig {

    /**
     * Picks a config the way the game's command line does.
     * An explicit path must exist. Otherwise [`DEFAULT_CONFIG_PATH`] is used if present,
     * and the built-in defaults if not.
     */
    pub fn from_args(path: Option<String>) -> anyhow::Result<Self> {
        Self::find(path.map(PathBuf::from), Path::new(DEFAULT_CONFIG_PATH))
    }

    fn find(path: Option<PathBuf>, default_path: &Path) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load(&path),
            None if default_path.exists() => Self::load(default_path),
            None => {
                log::info!("No {} found, using defaults", default_path.display());
                Ok(Self::default())
            }
        }
    }

    /// Reads and validates a YAML config file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = Self::parse(&text)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        log::info!("Loaded config {}", path.display());
        Ok(config)
    }

    /// Parses and validates YAML text.
    pub fn parse(text: &str) -> anyhow::Result<Self> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("window.width", self.window.width as f32)?;
        positive("window.height", self.window.height as f32)?;
        positive("player.speed", self.player.speed)?;
        positive("player.scale", self.player.scale)?;
        positive("camera.fov", self.camera.fov)?;
        positive("bullet.speed", self.bullet.speed)?;
        positive("bullet.scale", self.bullet.scale)?;
        positive("bullet.radius", self.bullet.radius)?;
        positive("bullet.bound", self.bullet.bound)?;
        positive("targets.count", self.targets.count as f32)?;
        positive("targets.scale", self.targets.scale)?;
        positive("targets.radius", self.targets.radius)?;
        ordered("targets.x_range", self.targets.x_range)?;
        ordered("targets.y_range", self.targets.y_range)?;
        within("tick_rate", self.tick_rate, MIN_TICK_RATE, MAX_TICK_RATE)?;
        Ok(())
    }

    pub fn tick_duration(&self) -> Duration {
        Duration::from_secs_f32(1.0 / self.tick_rate)
    }
}

const MIN_TICK_RATE: f32 = 1.0;
const MAX_TICK_RATE: f32 = 1000.0;

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NotFinite { field });
    }
    match value > 0.0 {
        true => Ok(()),
        false => Err(ConfigError::NotPositive { field, value }),
    }
}

/// Ranges are sampled uniformly, so both ends and the span between them must be finite.
fn ordered(field: &'static str, [min, max]: [f32; 2]) -> Result<(), ConfigError> {
    if !min.is_finite() || !max.is_finite() || !(max - min).is_finite() {
        return Err(ConfigError::NotFinite { field });
    }
    match min <= max {
        true => Ok(()),
        false => Err(ConfigError::ReversedRange { field, min, max }),
    }
}

fn within(field: &'static str, value: f32, min: f32, max: f32) -> Result<(), ConfigError> {
    match (min..=max).contains(&value) {
        true => Ok(()),
        false => Err(ConfigError::OutOfRange { field, value, min, max }),
    }
}

#[derive(Error, Display, Debug, PartialEq)]
pub enum ConfigError {
    #[display(fmt="{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f32 },
    #[display(fmt="{field} is reversed, {min} > {max}")]
    ReversedRange { field: &'static str, min: f32, max: f32 },
    #[display(fmt="{field} must be finite")]
    NotFinite { field: &'static str },
    #[display(fmt="{field} must be between {min} and {max}, got {value}")]
    OutOfRange { field: &'static str, value: f32, min: f32, max: f32 },
}


#[cfg(test)]
mod test {
    use std::fs;
    use std::path::PathBuf;
    use crate::Model;
    use crate::shooter::{ConfigError, ShooterConfig};

    /// Path in the temp directory that is unique to a test.
    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("hecs_shooter_{}_{name}", std::process::id()))
    }

    #[test]
    fn empty_file_is_default() {
        let config = ShooterConfig::parse("{}").unwrap();
        assert_eq!(ShooterConfig::default(), config);
        assert_eq!(3, config.targets.count);
        assert_eq!(30.0, config.bullet.speed);
        assert_eq!(10.0, config.player.speed);
    }

    #[test]
    fn partial_override() {
        let text = "
player:
  speed: 12.5
  model: models/box
targets:
  count: 5
  y_range: [20, 40]
rng_seed: 7
";
        let config = ShooterConfig::parse(text).unwrap();
        assert_eq!(12.5, config.player.speed);
        assert_eq!(Model::Box, config.player.model);
        assert_eq!(1.0, config.player.scale);
        assert_eq!(5, config.targets.count);
        assert_eq!([20.0, 40.0], config.targets.y_range);
        assert_eq!([-8.0, 8.0], config.targets.x_range);
        assert_eq!(Some(7), config.rng_seed);
    }

    #[test]
    fn rejects_bad_values() {
        let mut config = ShooterConfig::default();
        config.targets.x_range = [8.0, -8.0];
        assert_eq!(
            Err(ConfigError::ReversedRange { field: "targets.x_range", min: 8.0, max: -8.0 }),
            config.validate(),
        );

        let mut config = ShooterConfig::default();
        config.bullet.speed = 0.0;
        let err = config.validate().unwrap_err();
        assert_eq!("bullet.speed must be positive, got 0", err.to_string());
    }

    #[test]
    fn rejects_unknown_fields_and_models() {
        assert!(ShooterConfig::parse("player:\n  sped: 3").is_err());
        let err = ShooterConfig::parse("player:\n  model: models/teapot").unwrap_err();
        assert!(format!("{err:#}").contains("models/teapot"), "{err:#}");
    }

    #[test]
    fn rejects_non_finite_values() {
        let mut config = ShooterConfig::default();
        config.player.speed = f32::INFINITY;
        assert_eq!(Err(ConfigError::NotFinite { field: "player.speed" }), config.validate());

        let mut config = ShooterConfig::default();
        config.bullet.bound = f32::NAN;
        assert_eq!(Err(ConfigError::NotFinite { field: "bullet.bound" }), config.validate());

        let err = ShooterConfig::parse("targets:\n  y_range: [10, .inf]").unwrap_err();
        assert!(format!("{err:#}").contains("targets.y_range must be finite"), "{err:#}");
    }

    #[test]
    fn rejects_overflowing_range() {
        let err = ShooterConfig::parse("targets:\n  x_range: [-3.0e38, 3.0e38]").unwrap_err();
        assert!(format!("{err:#}").contains("targets.x_range must be finite"), "{err:#}");
    }

    #[test]
    fn rejects_extreme_tick_rates() {
        for tick_rate in [".inf", "1.0e-30", "0", "5000"] {
            let text = format!("tick_rate: {tick_rate}");
            let err = ShooterConfig::parse(&text).unwrap_err();
            assert!(format!("{err:#}").contains("tick_rate must be between 1 and 1000"), "{err:#}");
        }
        assert!(ShooterConfig::parse("tick_rate: 1").is_ok());
    }

    #[test]
    fn explicit_path_must_exist() {
        let missing = temp_path("missing.yaml");
        let err = ShooterConfig::from_args(Some(missing.display().to_string())).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to read config"), "{err:#}");
    }

    #[test]
    fn loads_explicit_path() {
        let path = temp_path("explicit.yaml");
        fs::write(&path, "bullet:\n  speed: 45\nrng_seed: 9\n").unwrap();
        let config = ShooterConfig::from_args(Some(path.display().to_string()));
        fs::remove_file(&path).unwrap();
        let config = config.unwrap();
        assert_eq!(45.0, config.bullet.speed);
        assert_eq!(Some(9), config.rng_seed);
    }

    #[test]
    fn default_path() {
        let default_path = temp_path("default.yaml");
        let config = ShooterConfig::find(None, &default_path).unwrap();
        assert_eq!(ShooterConfig::default(), config);

        fs::write(&default_path, "targets:\n  count: 6\n").unwrap();
        let config = ShooterConfig::find(None, &default_path);
        fs::remove_file(&default_path).unwrap();
        assert_eq!(6, config.unwrap().targets.count);
    }

    #[test]
    fn tick_duration() {
        let config = ShooterConfig { tick_rate: 50.0, ..Default::default() };
        assert_eq!(20, config.tick_duration().as_millis());
    }
}
