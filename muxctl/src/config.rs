// SPDX-License-Identifier: MIT

use anyhow::Context;
use log::{debug, info};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use muxfs::{BackendConfig, Volume};

pub const DEFAULT_SDRAM_KIB: u64 = 1024;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Images {
    pub sd: Option<PathBuf>,
    pub usb: Option<PathBuf>,
    pub sdram_kib: u64,
}

impl Default for Images {
    fn default() -> Self {
        Self {
            sd: Some(PathBuf::from("sd.img")),
            usb: Some(PathBuf::from("usb.img")),
            sdram_kib: DEFAULT_SDRAM_KIB,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawTool {
    images: Images,
}

/// `muxctl.toml`: backend enablement plus where each medium's image lives.
#[derive(Debug, Clone)]
pub struct ToolConfig {
    backends: BackendConfig,
    images: Images,
    base_dir: PathBuf,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            backends: BackendConfig::default(),
            images: Images::default(),
            base_dir: PathBuf::from("."),
        }
    }
}

impl ToolConfig {
    /// Loads `path`, or the defaults (SD only) when the file does not exist.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            info!("{} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let base_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();
        let config = Self::from_toml_str(&content, base_dir)?;
        debug!("config: {:?}", config.backends);
        Ok(config)
    }

    pub fn from_toml_str(doc: &str, base_dir: PathBuf) -> anyhow::Result<Self> {
        let backends = BackendConfig::from_toml_str(doc)?;
        let raw: RawTool = toml::from_str(doc)?;
        anyhow::ensure!(raw.images.sdram_kib > 0, "images.sdram_kib must be non-zero");
        Ok(Self {
            backends,
            images: raw.images,
            base_dir,
        })
    }

    #[inline]
    pub fn backends(&self) -> &BackendConfig {
        &self.backends
    }

    pub fn sdram_bytes(&self) -> usize {
        (self.images.sdram_kib as usize).saturating_mul(1024)
    }

    /// Image file backing `volume`, resolved against the config directory.
    pub fn image(&self, volume: Volume) -> anyhow::Result<PathBuf> {
        let path = match volume {
            Volume::Sd => self.images.sd.as_ref(),
            Volume::Usb => self.images.usb.as_ref(),
            Volume::Sdram | Volume::SpiFlash => None,
        };
        let path = path.with_context(|| format!("no image file configured for {volume}"))?;
        Ok(self.base_dir.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_document() {
        let doc = r#"
            truncate_buffer_size = 512

            [backends]
            sd = "sdio"
            usb = true
            sdram = true

            [images]
            sd = "cards/sd.img"
            usb = "usb.img"
            sdram_kib = 2048
        "#;
        let config = ToolConfig::from_toml_str(doc, PathBuf::from("/tmp/work")).unwrap();
        assert!(config.backends().is_enabled(Volume::Usb));
        assert_eq!(config.backends().truncate_buffer_size(), 512);
        assert_eq!(config.sdram_bytes(), 2048 * 1024);
        assert_eq!(
            config.image(Volume::Sd).unwrap(),
            PathBuf::from("/tmp/work/cards/sd.img")
        );
        assert!(config.image(Volume::Sdram).is_err());
    }

    #[test]
    fn test_defaults_and_errors() {
        let config = ToolConfig::from_toml_str("", PathBuf::from(".")).unwrap();
        assert_eq!(config.sdram_bytes(), DEFAULT_SDRAM_KIB as usize * 1024);
        assert!(!config.backends().is_enabled(Volume::Usb));

        assert!(ToolConfig::from_toml_str("[images]\nsdram_kib = 0\n", PathBuf::from(".")).is_err());
        assert!(ToolConfig::from_toml_str("[backends]\nsd = 4\n", PathBuf::from(".")).is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ToolConfig::from_file(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.image(Volume::Usb).unwrap(), PathBuf::from("./usb.img"));
    }
}
