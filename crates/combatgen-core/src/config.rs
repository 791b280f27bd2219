use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

const DEFAULT_CONFIG_YAML: &str = include_str!("../config/combatgen.default.yaml");

/// Resolution, path and polling settings for the generator and observer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    pub screen_resolution: u32,
    pub minimap_resolution: u32,
    /// World units covered by the feature layer camera.
    pub camera_width: f32,
    pub map_path: PathBuf,
    pub replay_dir: PathBuf,
    pub parsed_dir: PathBuf,
    pub replay_suffix: String,
    pub parsed_suffix: String,
    /// File name the generator saves its replay under.
    pub replay_name: String,
    /// Game loops advanced between two polls.
    pub step_size: u32,
    /// Player whose point of view the replay is observed from (team minerals).
    pub observed_player_id: u32,
    /// Program and arguments of the controller bridge.
    pub bridge_command: Vec<String>,
}

impl Default for CombatConfig {
    fn default() -> Self {
        CombatConfig {
            screen_resolution: 84,
            minimap_resolution: 64,
            camera_width: 24.0,
            map_path: PathBuf::from("CombatGenerator-v1.SC2Map"),
            replay_dir: PathBuf::from("replays"),
            parsed_dir: PathBuf::from("replays_parsed"),
            replay_suffix: ".SC2Replay".to_string(),
            parsed_suffix: ".SC2Replay_parsed".to_string(),
            replay_name: "SC2CombatGenerator.SC2Replay".to_string(),
            step_size: 16,
            observed_player_id: 1,
            bridge_command: vec![
                "python3".to_string(),
                "-m".to_string(),
                "combatgen_bridge".to_string(),
            ],
        }
    }
}

impl CombatConfig {
    /// Parse a config from YAML text. Paths stay as written.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: CombatConfig = serde_yaml::from_str(yaml).map_err(ConfigError::Yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a config file and resolve its relative paths against the file's directory.
    pub fn from_yaml_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = fs::read_to_string(path).map_err(ConfigError::Io)?;
        let config = Self::from_yaml_str(&yaml)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Ok(config.resolved_against(base))
    }

    /// Return the default YAML config included with this crate.
    pub fn default_yaml() -> &'static str {
        DEFAULT_CONFIG_YAML
    }

    /// Parse the default YAML config included with this crate.
    pub fn from_default_yaml() -> Result<Self, ConfigError> {
        Self::from_yaml_str(Self::default_yaml())
    }

    /// Load `path` if given, otherwise the embedded default.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_yaml_path(path),
            None => Self::from_default_yaml(),
        }
    }

    /// Make relative paths relative to `base`.
    pub fn resolved_against(mut self, base: &Path) -> Self {
        for path in [&mut self.map_path, &mut self.replay_dir, &mut self.parsed_dir] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
        self
    }

    /// Where the generator writes its replay.
    pub fn replay_path(&self) -> PathBuf {
        self.replay_dir.join(&self.replay_name)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.screen_resolution == 0 || self.minimap_resolution == 0 {
            return Err(ConfigError::Invalid(
                "screen and minimap resolution must be greater than 0".to_string(),
            ));
        }
        if !self.camera_width.is_finite() || self.camera_width <= 0.0 {
            return Err(ConfigError::Invalid(
                "camera_width must be finite and > 0".to_string(),
            ));
        }
        if self.step_size == 0 {
            return Err(ConfigError::Invalid(
                "step_size must be greater than 0".to_string(),
            ));
        }
        if self.replay_suffix.is_empty() || self.parsed_suffix.is_empty() {
            return Err(ConfigError::Invalid(
                "replay and parsed suffixes must not be empty".to_string(),
            ));
        }
        if self.replay_suffix == self.parsed_suffix {
            return Err(ConfigError::Invalid(
                "parsed_suffix must differ from replay_suffix".to_string(),
            ));
        }
        if !self.replay_name.ends_with(&self.replay_suffix) {
            return Err(ConfigError::Invalid(format!(
                "replay_name '{}' must end with '{}'",
                self.replay_name, self.replay_suffix
            )));
        }
        if self.bridge_command.is_empty() {
            return Err(ConfigError::Invalid(
                "bridge_command must name a program".to_string(),
            ));
        }
        Ok(())
    }
}

/// Error type for loading and validating configuration files.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Yaml(serde_yaml::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "failed to read config file: {err}"),
            ConfigError::Yaml(err) => write!(f, "failed to parse config YAML: {err}"),
            ConfigError::Invalid(err) => write!(f, "invalid config: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_yaml_matches_default_struct() {
        let parsed = CombatConfig::from_default_yaml().expect("default yaml should parse");
        assert_eq!(parsed, CombatConfig::default());
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config = CombatConfig::from_yaml_str("step_size: 8\n").expect("partial yaml");
        assert_eq!(config.step_size, 8);
        assert_eq!(config.screen_resolution, 84);
    }

    #[test]
    fn invalid_values_are_rejected() {
        for yaml in [
            "step_size: 0\n",
            "parsed_suffix: .SC2Replay\n",
            "bridge_command: []\n",
            "replay_name: out.bin\n",
        ] {
            let err = CombatConfig::from_yaml_str(yaml).expect_err(yaml);
            assert!(matches!(err, ConfigError::Invalid(_)), "{yaml}");
        }
    }

    #[test]
    fn file_paths_resolve_against_config_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("combat.yaml");
        fs::write(&path, "replay_dir: out/replays\nmap_path: /maps/x.SC2Map\n").expect("write");

        let config = CombatConfig::from_yaml_path(&path).expect("load");
        assert_eq!(config.replay_dir, dir.path().join("out/replays"));
        assert_eq!(config.map_path, PathBuf::from("/maps/x.SC2Map"));
        assert_eq!(
            config.replay_path(),
            dir.path().join("out/replays/SC2CombatGenerator.SC2Replay")
        );
    }
}
