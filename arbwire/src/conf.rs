use std::path::{Path, PathBuf};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::{
    error::{WireError, WireResult},
    magic::{DEFAULT_MAX_DEPTH, ENV_CODEC_CONFIG_PATH},
    version::Version,
};

/// Options of a codec session.
///
/// ```toml
/// version = "0.9"
/// merge_context = false
/// max_depth = 256
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodecOptions {
    /// Wire version produced by the encoder and expected by the decoder.
    pub version: Version,

    /// Encode trees embedded in constants into the enclosing context instead
    /// of nested envelopes. Both ends of a channel must agree on it.
    pub merge_context: bool,

    /// Maximum nesting depth of nodes, counted across embedded trees.
    pub max_depth: usize,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            version: Version::default(),
            merge_context: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl CodecOptions {
    pub fn with_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    pub fn with_merge_context(mut self, merge_context: bool) -> Self {
        self.merge_context = merge_context;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Get the default path to the codec configuration file.
    pub fn default_path() -> PathBuf {
        if let Ok(config_path) = std::env::var(ENV_CODEC_CONFIG_PATH) {
            return config_path.into();
        }

        let mut path = PathBuf::new();

        #[cfg(target_os = "windows")]
        {
            if let Ok(appdata) = std::env::var("APPDATA") {
                path.push(appdata);
            }
        }
        #[cfg(not(target_os = "windows"))]
        {
            if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
                path.push(xdg_config_home);
            } else if let Ok(home) = std::env::var("HOME") {
                path.push(home);
                path.push(".config");
            }
        }

        path.push("arbor");
        path.push("codec.toml");
        path
    }

    /// Parse options from TOML text. Missing keys take their default value.
    pub fn from_toml_str(text: &str) -> WireResult<Self> {
        toml::from_str(text).map_err(|e| WireError::Config {
            source: e,
            file: String::from("<inline>"),
        })
    }

    /// Load options from a TOML file.
    pub fn load_from_toml(path: &Path) -> WireResult<Self> {
        let toml_str = std::fs::read_to_string(path)?;
        toml::from_str(&toml_str).map_err(|e| WireError::Config {
            source: e,
            file: path.display().to_string(),
        })
    }

    /// Load options from [`CodecOptions::default_path`], falling back to the
    /// defaults when the file does not exist.
    pub fn load_default() -> WireResult<Self> {
        let path = Self::default_path();
        if !path.exists() {
            warn!(
                "Codec configuration `{}` not found, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_toml(&path)
    }

    /// Save options to a TOML file, creating parent directories as needed.
    pub fn save_to_toml(&self, path: &Path) -> WireResult<()> {
        let toml_str = toml::to_string(self).map_err(|e| WireError::ConfigSerialize {
            source: e,
            path: path.display().to_string(),
        })?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, toml_str)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let options = CodecOptions::from_toml_str("version = \"0.8\"").unwrap();
        assert_eq!(options.version, Version::V0_8);
        assert!(!options.merge_context);
        assert_eq!(options.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn rejects_unknown_keys_and_versions() {
        assert!(CodecOptions::from_toml_str("verbose = true").unwrap_err().is_config());
        assert!(CodecOptions::from_toml_str("version = \"1.0\"").is_err());
    }

    #[test]
    fn save_then_load() {
        let dir = std::env::temp_dir().join(format!("arbwire-conf-{}", std::process::id()));
        let path = dir.join("nested").join("codec.toml");
        let options = CodecOptions::default()
            .with_version(Version::V0_8)
            .with_merge_context(true)
            .with_max_depth(64);
        options.save_to_toml(&path).unwrap();
        assert_eq!(CodecOptions::load_from_toml(&path).unwrap(), options);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = CodecOptions::load_from_toml(Path::new("/nonexistent/arbor/codec.toml"))
            .unwrap_err();
        assert!(err.is_io());
    }
}
