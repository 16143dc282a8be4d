//! Typed configuration for the tonearm client.
//!
//! Configuration is loaded from a single YAML file and validated up front:
//! a missing or malformed key aborts startup with a [`ConfigError`] instead
//! of surfacing as `None` deep inside a page fetch.

use std::path::{Path, PathBuf};

use {
    secrecy::SecretString,
    serde::Deserialize,
    thiserror::Error,
    tracing::debug,
    url::Url,
};

/// RFC 7636 bounds for the PKCE code verifier length.
const VERIFIER_MIN: usize = 43;
const VERIFIER_MAX: usize = 128;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid YAML in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Root configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Streaming API access: OAuth endpoints, client credentials and the
/// endpoint templates used by the page fetchers.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub client_id: String,
    pub client_secret: SecretString,
    pub auth_url: String,
    pub access_token_url: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    #[serde(default = "default_token_file")]
    pub token_file: PathBuf,
    #[serde(default = "default_verifier_length")]
    pub verifier_length: usize,
    /// How long the callback listener waits for the redirect, in seconds.
    #[serde(default = "default_callback_timeout")]
    pub callback_timeout_secs: u64,
    pub endpoints: Endpoints,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_image_dir")]
    pub image_dir: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            image_dir: default_image_dir(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Endpoints {
    pub users: UserEndpoints,
    pub artist: ArtistEndpoints,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserEndpoints {
    pub current_user_profile: String,
    pub user_top_item_artists: String,
    pub user_top_item_tracks: String,
    pub current_user_playlists: String,
}

/// Artist endpoints are templates carrying an `{id}` placeholder.
#[derive(Debug, Clone, Deserialize)]
pub struct ArtistEndpoints {
    pub get_albums: String,
    pub top_tracks: String,
    pub related_artists: String,
}

impl ArtistEndpoints {
    pub fn albums_url(&self, id: &str) -> String {
        fill(&self.get_albums, id)
    }

    pub fn top_tracks_url(&self, id: &str) -> String {
        fill(&self.top_tracks, id)
    }

    pub fn related_artists_url(&self, id: &str) -> String {
        fill(&self.related_artists, id)
    }
}

fn fill(template: &str, id: &str) -> String {
    template.replace("{id}", id)
}

fn default_token_file() -> PathBuf {
    PathBuf::from("data/tokens.json")
}

fn default_verifier_length() -> usize {
    64
}

fn default_callback_timeout() -> u64 {
    300
}

fn default_image_dir() -> PathBuf {
    PathBuf::from("image_cache")
}

impl Config {
    /// Load and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_yaml::from_str(&raw).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let api = &self.api;
        if api.client_id.is_empty() {
            return Err(ConfigError::Invalid("api.client_id is empty".into()));
        }
        require_url("api.auth_url", &api.auth_url)?;
        require_url("api.access_token_url", &api.access_token_url)?;

        let redirect = require_url("api.redirect_uri", &api.redirect_uri)?;
        if redirect.port().is_none() {
            return Err(ConfigError::Invalid(
                "api.redirect_uri must carry an explicit port for the callback listener".into(),
            ));
        }

        if api.scopes.is_empty() {
            return Err(ConfigError::Invalid("api.scopes is empty".into()));
        }
        if !(VERIFIER_MIN..=VERIFIER_MAX).contains(&api.verifier_length) {
            return Err(ConfigError::Invalid(format!(
                "api.verifier_length must be between {VERIFIER_MIN} and {VERIFIER_MAX}, got {}",
                api.verifier_length
            )));
        }

        let users = &api.endpoints.users;
        for (key, value) in [
            ("users.current_user_profile", &users.current_user_profile),
            ("users.user_top_item_artists", &users.user_top_item_artists),
            ("users.user_top_item_tracks", &users.user_top_item_tracks),
            ("users.current_user_playlists", &users.current_user_playlists),
        ] {
            if value.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "api.endpoints.{key} is empty"
                )));
            }
        }

        let artist = &api.endpoints.artist;
        for (key, value) in [
            ("artist.get_albums", &artist.get_albums),
            ("artist.top_tracks", &artist.top_tracks),
            ("artist.related_artists", &artist.related_artists),
        ] {
            if !value.contains("{id}") {
                return Err(ConfigError::Invalid(format!(
                    "api.endpoints.{key} must contain an {{id}} placeholder"
                )));
            }
        }

        Ok(())
    }

    /// Port the callback listener binds, taken from the redirect URI.
    pub fn callback_port(&self) -> Result<u16, ConfigError> {
        let url = require_url("api.redirect_uri", &self.api.redirect_uri)?;
        url.port().ok_or_else(|| {
            ConfigError::Invalid("api.redirect_uri must carry an explicit port".into())
        })
    }
}

fn require_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|e| ConfigError::Invalid(format!("{key} is not a valid URL: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_yaml() -> String {
        r#"
api:
  client_id: abc123
  client_secret: shhh
  auth_url: https://accounts.example.com/authorize
  access_token_url: https://accounts.example.com/api/token
  redirect_uri: http://localhost:3000/callback
  scopes:
    - user-read-private
    - user-top-read
  endpoints:
    users:
      current_user_profile: https://api.example.com/v1/me
      user_top_item_artists: https://api.example.com/v1/me/top/artists
      user_top_item_tracks: https://api.example.com/v1/me/top/tracks
      current_user_playlists: https://api.example.com/v1/me/playlists
    artist:
      get_albums: https://api.example.com/v1/artists/{id}/albums
      top_tracks: https://api.example.com/v1/artists/{id}/top-tracks
      related_artists: https://api.example.com/v1/artists/{id}/related-artists
"#
        .to_string()
    }

    fn load_str(yaml: &str) -> Result<Config, ConfigError> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, yaml).unwrap();
        Config::load(&path)
    }

    #[test]
    fn test_sample_config_loads() {
        let config = load_str(&sample_yaml()).unwrap();
        assert_eq!(config.api.client_id, "abc123");
        assert_eq!(config.api.verifier_length, 64);
        assert_eq!(config.api.callback_timeout_secs, 300);
        assert_eq!(config.api.token_file, PathBuf::from("data/tokens.json"));
        assert_eq!(config.cache.image_dir, PathBuf::from("image_cache"));
        assert_eq!(config.callback_port().unwrap(), 3000);
    }

    #[test]
    fn test_missing_key_fails_at_load() {
        let yaml = sample_yaml().replace("  access_token_url: https://accounts.example.com/api/token\n", "");
        assert!(matches!(load_str(&yaml), Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn test_redirect_uri_without_port_rejected() {
        let yaml = sample_yaml().replace(
            "http://localhost:3000/callback",
            "http://localhost/callback",
        );
        assert!(matches!(load_str(&yaml), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_artist_template_without_placeholder_rejected() {
        let yaml = sample_yaml().replace(
            "https://api.example.com/v1/artists/{id}/albums",
            "https://api.example.com/v1/artists/albums",
        );
        assert!(matches!(load_str(&yaml), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_verifier_length_bounds() {
        let yaml = sample_yaml().replace(
            "  scopes:",
            "  verifier_length: 16\n  scopes:",
        );
        assert!(matches!(load_str(&yaml), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_artist_url_fill() {
        let config = load_str(&sample_yaml()).unwrap();
        assert_eq!(
            config.api.endpoints.artist.albums_url("42xyz"),
            "https://api.example.com/v1/artists/42xyz/albums"
        );
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            Config::load("does/not/exist.yaml"),
            Err(ConfigError::Io { .. })
        ));
    }
}
