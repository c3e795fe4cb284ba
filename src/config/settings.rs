//! Configuration file support for kadmin

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub editor: EditorSettings,

    #[serde(default)]
    pub behavior: Behavior,
}

/// Default values for cluster access
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Defaults {
    /// Namespace used by commands that target a single namespace
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Kubeconfig context; the current context when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    /// Kubeconfig file; the standard lookup when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubeconfig: Option<String>,
}

/// Editor settings for `kadmin edit`
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct EditorSettings {
    /// Editor command line, used when KUBE_EDITOR and EDITOR are unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    /// Directory for staged edit files; the system temp dir when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staging_dir: Option<String>,
}

/// Behavior settings
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Behavior {
    #[serde(default = "default_true")]
    pub confirm_destructive: bool,
}

fn default_namespace() -> String {
    "default".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            context: None,
            kubeconfig: None,
        }
    }
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            confirm_destructive: default_true(),
        }
    }
}

impl Settings {
    /// Load settings from file or return defaults
    pub fn load() -> Self {
        match Self::find_config_file() {
            Some(path) => Self::load_from_file(&path).unwrap_or_else(|e| {
                crate::log_warn!("Ignoring config file: {:#}", e);
                Self::default()
            }),
            None => Self::default(),
        }
    }

    /// Load settings from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings: Settings = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(settings)
    }

    /// Find config file in standard locations
    /// Priority:
    /// 1. .kadmin.toml in current directory
    /// 2. ~/.config/kadmin/config.toml (XDG config directory)
    fn find_config_file() -> Option<PathBuf> {
        let local_config = PathBuf::from(".kadmin.toml");
        if local_config.exists() {
            return Some(local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("kadmin").join("config.toml");
            if xdg_config.exists() {
                return Some(xdg_config);
            }
        }

        None
    }

    /// Generate example config file content
    pub fn example_config() -> String {
        r#"# kadmin configuration file
# Place this file at ~/.config/kadmin/config.toml or .kadmin.toml in your project

[defaults]
namespace = "default"
# context = "my-cluster"          # Optional: kubeconfig context to use
# kubeconfig = "/path/to/config"  # Optional: overrides the standard kubeconfig lookup

[editor]
# command = "code --wait"         # Used when KUBE_EDITOR and EDITOR are unset (default: vim)
# staging_dir = "/tmp"            # Where edit sessions stage their YAML file

[behavior]
# Ask before deleting pods in `kadmin cleanup`
confirm_destructive = true
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.defaults.namespace, "default");
        assert!(settings.defaults.context.is_none());
        assert!(settings.editor.command.is_none());
        assert!(settings.behavior.confirm_destructive);
    }

    #[test]
    fn test_settings_deserialization() {
        let toml_str = r#"
[defaults]
namespace = "prod"
context = "east"

[editor]
command = "nano -w"

[behavior]
confirm_destructive = false
"#;
        let settings: Settings = toml::from_str(toml_str).unwrap();
        assert_eq!(settings.defaults.namespace, "prod");
        assert_eq!(settings.defaults.context.as_deref(), Some("east"));
        assert_eq!(settings.editor.command.as_deref(), Some("nano -w"));
        assert!(!settings.behavior.confirm_destructive);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let settings: Settings = toml::from_str("[editor]\nstaging_dir = \"/var/tmp\"\n").unwrap();
        assert_eq!(settings.defaults.namespace, "default");
        assert!(settings.behavior.confirm_destructive);
        assert_eq!(settings.editor.staging_dir.as_deref(), Some("/var/tmp"));
    }

    #[test]
    fn test_example_config_parses() {
        let example = Settings::example_config();
        assert!(example.contains("kadmin configuration"));

        let settings: Settings = toml::from_str(&example).unwrap();
        assert_eq!(settings.defaults.namespace, "default");
    }

    #[test]
    fn test_load_from_file() {
        let mut temp = tempfile::NamedTempFile::new().unwrap();
        temp.write_all(b"[defaults]\nnamespace = \"ops\"\n").unwrap();

        let settings = Settings::load_from_file(temp.path()).unwrap();
        assert_eq!(settings.defaults.namespace, "ops");
    }

    #[test]
    fn test_load_from_file_reports_parse_errors() {
        let mut temp = tempfile::NamedTempFile::new().unwrap();
        temp.write_all(b"[defaults\n").unwrap();

        let err = Settings::load_from_file(temp.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
