use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::contact;
use crate::store::medium::DEFAULT_MAX_VALUE_BYTES;

/// Name of the per-project directory holding config and data.
pub const PROJECT_DIR: &str = ".enrol";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub contact: ContactConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Medium root, relative to `.enrol/` unless absolute.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_max_value_bytes")]
    pub max_value_bytes: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            max_value_bytes: default_max_value_bytes(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminConfig {
    #[serde(default = "default_admin_username")]
    pub username: String,
    /// Hex BLAKE3 digest of the admin password.
    #[serde(default = "default_admin_password_blake3")]
    pub password_blake3: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: default_admin_username(),
            password_blake3: default_admin_password_blake3(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_ttl_minutes")]
    pub ttl_minutes: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_minutes: default_ttl_minutes(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactConfig {
    #[serde(default = "default_whatsapp_number")]
    pub whatsapp_number: String,
    #[serde(default = "default_greeting")]
    pub greeting: String,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            whatsapp_number: default_whatsapp_number(),
            greeting: default_greeting(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
}

impl ProjectConfig {
    /// Absolute medium root for a project rooted at `project_root`.
    #[must_use]
    pub fn data_dir(&self, project_root: &Path) -> PathBuf {
        project_root.join(PROJECT_DIR).join(&self.storage.data_dir)
    }

    /// Commented TOML written by `enrol init`.
    pub fn template() -> Result<String> {
        let body = toml::to_string_pretty(&Self::default())
            .context("Failed to render default config")?;
        Ok(format!(
            "# enrol project configuration.\n\
             # admin.password_blake3 is the hex BLAKE3 digest of the admin password\n\
             # (default: \"admin\"). Generate one with `printf %s <password> | b3sum`.\n\n{body}"
        ))
    }
}

/// Walk up from `start` to the nearest directory containing `.enrol/`.
#[must_use]
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(PROJECT_DIR).is_dir() {
            return Some(current);
        }
        if !current.pop() {
            return None;
        }
    }
}

pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    let path = project_root.join(PROJECT_DIR).join("config.toml");
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn load_user_config() -> Result<UserConfig> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };

    let path = config_dir.join("enrol/config.toml");
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

const fn default_max_value_bytes() -> usize {
    DEFAULT_MAX_VALUE_BYTES
}

fn default_admin_username() -> String {
    "admin".to_string()
}

fn default_admin_password_blake3() -> String {
    blake3::hash(b"admin").to_hex().to_string()
}

const fn default_ttl_minutes() -> u32 {
    480
}

fn default_whatsapp_number() -> String {
    contact::DEFAULT_NUMBER.to_string()
}

fn default_greeting() -> String {
    contact::DEFAULT_GREETING.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_project_config_uses_defaults() {
        let root = TempDir::new().expect("tempdir");
        let cfg = load_project_config(root.path()).expect("load should succeed");
        assert_eq!(cfg, ProjectConfig::default());
        assert_eq!(cfg.storage.max_value_bytes, 5 * 1024 * 1024);
        assert_eq!(cfg.admin.username, "admin");
        assert_eq!(cfg.session.ttl_minutes, 480);
        assert_eq!(cfg.contact.whatsapp_number, "37127333527");
        assert_eq!(
            cfg.data_dir(root.path()),
            root.path().join(".enrol").join("data")
        );
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let root = TempDir::new().expect("tempdir");
        std::fs::create_dir_all(root.path().join(PROJECT_DIR)).expect("mkdir");
        std::fs::write(
            root.path().join(".enrol/config.toml"),
            "[session]\nttl_minutes = 5\n\n[storage]\nmax_value_bytes = 1024\n",
        )
        .expect("write");

        let cfg = load_project_config(root.path()).expect("load");
        assert_eq!(cfg.session.ttl_minutes, 5);
        assert_eq!(cfg.storage.max_value_bytes, 1024);
        assert_eq!(cfg.storage.data_dir, PathBuf::from("data"));
        assert_eq!(cfg.admin, AdminConfig::default());
    }

    #[test]
    fn malformed_config_is_an_error() {
        let root = TempDir::new().expect("tempdir");
        std::fs::create_dir_all(root.path().join(PROJECT_DIR)).expect("mkdir");
        std::fs::write(root.path().join(".enrol/config.toml"), "[session\n").expect("write");
        let err = load_project_config(root.path()).expect_err("parse error");
        assert!(err.to_string().starts_with("Failed to parse"));
    }

    #[test]
    fn template_parses_back_to_defaults() {
        let template = ProjectConfig::template().expect("template");
        assert!(template.starts_with("# enrol project configuration."));
        let parsed: ProjectConfig = toml::from_str(&template).expect("parse");
        assert_eq!(parsed, ProjectConfig::default());
    }

    #[test]
    fn project_root_is_found_from_nested_dirs() {
        let root = TempDir::new().expect("tempdir");
        let nested = root.path().join("a/b");
        std::fs::create_dir_all(&nested).expect("mkdir nested");
        assert!(find_project_root(&nested).is_none_or(|found| !found.starts_with(root.path())));

        std::fs::create_dir_all(root.path().join(PROJECT_DIR)).expect("mkdir .enrol");
        assert_eq!(find_project_root(&nested), Some(root.path().to_path_buf()));
    }
}
