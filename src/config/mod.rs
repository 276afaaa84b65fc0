use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::upload::UploadLimits;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConfigPathError {
    MissingHomeDirectory,
}

const APP_DIR: &str = "blogdesk";
const APP_CONFIG_FILE: &str = "config.json";

/// Editor settings from `config.json`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub upload_path: String,
    pub delete_path: String,
    pub csrf_token: Option<String>,
    pub request_timeout_secs: u64,
    pub upload_limits: UploadLimits,
    /// When set, images are kept in a local directory instead of the blog server.
    pub local_store: Option<LocalStoreConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            upload_path: "/blog/upload-image/".to_string(),
            delete_path: "/blog/delete-image/".to_string(),
            csrf_token: None,
            request_timeout_secs: 30,
            upload_limits: UploadLimits::default(),
            local_store: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LocalStoreConfig {
    pub dir: PathBuf,
    #[serde(default = "default_public_prefix")]
    pub public_prefix: String,
}

fn default_public_prefix() -> String {
    "/media/post_images".to_string()
}

pub fn load_app_config() -> AppConfig {
    let (xdg_config_home, home) = config_env_dirs();
    load_app_config_with(xdg_config_home.as_deref(), home.as_deref())
}

fn load_app_config_with(xdg_config_home: Option<&Path>, home: Option<&Path>) -> AppConfig {
    let path = match app_config_path(APP_DIR, APP_CONFIG_FILE, xdg_config_home, home) {
        Ok(p) => p,
        Err(_) => return AppConfig::default(),
    };
    if !path.exists() {
        return AppConfig::default();
    }
    match std::fs::read_to_string(&path) {
        Ok(contents) => parse_app_config(&contents).unwrap_or_else(|err| {
            tracing::warn!(?err, ?path, "failed to parse config.json; using defaults");
            AppConfig::default()
        }),
        Err(err) => {
            tracing::warn!(?err, ?path, "failed to read config.json; using defaults");
            AppConfig::default()
        }
    }
}

fn parse_app_config(contents: &str) -> serde_json::Result<AppConfig> {
    serde_json::from_str(contents)
}

pub(crate) fn config_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

pub(crate) fn app_config_path(
    app_dir: &str,
    file_name: &str,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    let mut path = config_root(xdg_config_home, home)?;
    path.push(app_dir);
    path.push(file_name);
    Ok(path)
}

fn config_root(
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    if let Some(xdg) = xdg_config_home.filter(|path| !path.as_os_str().is_empty()) {
        return Ok(xdg.to_path_buf());
    }

    let home = home.ok_or(ConfigPathError::MissingHomeDirectory)?;
    Ok(home.join(".config"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_config_path_prefers_xdg_config_home() {
        let path = app_config_path(
            "blogdesk",
            "config.json",
            Some(Path::new("/tmp/config-root")),
            Some(Path::new("/tmp/home")),
        )
        .expect("path should resolve");

        assert_eq!(path, PathBuf::from("/tmp/config-root/blogdesk/config.json"));
    }

    #[test]
    fn app_config_path_falls_back_to_home_dot_config() {
        let path = app_config_path("blogdesk", "config.json", None, Some(Path::new("/tmp/home")))
            .expect("path should resolve");

        assert_eq!(path, PathBuf::from("/tmp/home/.config/blogdesk/config.json"));
    }

    #[test]
    fn app_config_path_errors_when_home_missing_and_xdg_unset() {
        let error = app_config_path("blogdesk", "config.json", None, None).unwrap_err();
        assert_eq!(error, ConfigPathError::MissingHomeDirectory);
    }

    #[test]
    fn partial_config_keeps_defaults_for_missing_fields() {
        let config = parse_app_config(
            r#"{
                "base_url": "https://blog.example",
                "csrf_token": "abc",
                "upload_limits": { "max_upload_mb": 5 }
            }"#,
        )
        .expect("config should parse");

        assert_eq!(config.base_url, "https://blog.example");
        assert_eq!(config.upload_path, "/blog/upload-image/");
        assert_eq!(config.csrf_token.as_deref(), Some("abc"));
        assert_eq!(config.upload_limits.max_upload_mb, 5);
        assert_eq!(config.upload_limits.max_width, 2048);
        assert_eq!(config.local_store, None);
    }

    #[test]
    fn local_store_prefix_has_a_default() {
        let config = parse_app_config(r#"{ "local_store": { "dir": "/tmp/blog-media" } }"#)
            .expect("config should parse");
        assert_eq!(
            config.local_store,
            Some(LocalStoreConfig {
                dir: PathBuf::from("/tmp/blog-media"),
                public_prefix: "/media/post_images".to_string(),
            })
        );
    }

    #[test]
    fn missing_config_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = load_app_config_with(Some(dir.path()), None);
        assert_eq!(config.delete_path, "/blog/delete-image/");
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn malformed_config_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let app_dir = dir.path().join(APP_DIR);
        std::fs::create_dir_all(&app_dir).unwrap();
        std::fs::write(app_dir.join(APP_CONFIG_FILE), "{ not json").unwrap();

        let config = load_app_config_with(Some(dir.path()), None);
        assert_eq!(config.base_url, "http://127.0.0.1:8000");
    }
}
