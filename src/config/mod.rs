//! Environment-file discovery and value resolution.
//!
//! A dotenv-style `.env` file is discovered by walking upward from a
//! starting directory (bounded depth). Values supply defaults for CLI
//! flags; flags always win. A relative cookies path found in the file
//! resolves against the directory the file was found in, so the file can
//! point at siblings regardless of the invocation directory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Environment key supplying a default cookies file path.
pub const COOKIES_PATH_KEY: &str = "AUDIOPROBE_COOKIES_PATH";
/// Environment key supplying a default yt-dlp executable path.
pub const YT_DLP_PATH_KEY: &str = "AUDIOPROBE_YT_DLP_PATH";

const ENV_FILE_NAME: &str = ".env";
const MAX_WALK_LEVELS: usize = 12;

/// A discovered (possibly empty) environment file.
#[derive(Debug, Default, Clone)]
pub struct EnvFile {
    values: HashMap<String, String>,
    path: Option<PathBuf>,
}

impl EnvFile {
    /// Walks upward from `start_dir` looking for a `.env` file.
    ///
    /// Never fails: a missing or unreadable file yields an empty set.
    #[must_use]
    pub fn discover(start_dir: &Path) -> Self {
        let mut current = start_dir.to_path_buf();
        for _ in 0..=MAX_WALK_LEVELS {
            let candidate = current.join(ENV_FILE_NAME);
            if candidate.is_file() {
                let values = std::fs::read_to_string(&candidate)
                    .map(|content| Self::parse(&content))
                    .unwrap_or_default();
                debug!(path = %candidate.display(), keys = values.len(), "loaded env file");
                return Self {
                    values,
                    path: Some(candidate),
                };
            }
            let Some(parent) = current.parent() else {
                break;
            };
            if parent == current {
                break;
            }
            current = parent.to_path_buf();
        }
        Self::default()
    }

    /// Parses dotenv-style content: `KEY=VALUE` per line, `#` comments and
    /// blanks skipped, surrounding quotes stripped from values.
    #[must_use]
    pub fn parse(content: &str) -> HashMap<String, String> {
        let mut out = HashMap::new();
        for raw in content.lines() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value.trim().trim_matches('"').trim_matches('\'');
            out.insert(key.trim().to_string(), value.to_string());
        }
        out
    }

    /// Returns the value for `key`, when present and non-empty.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str).filter(|v| !v.is_empty())
    }

    /// Path of the file the values came from, when one was found.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Resolves a path value from this file: absolute paths pass through,
    /// relative ones resolve against the env file's directory (or stay
    /// relative to the working directory when no file was found).
    #[must_use]
    pub fn resolve_path(&self, raw: &str) -> PathBuf {
        let path = PathBuf::from(raw);
        if path.is_absolute() {
            return path;
        }
        match self.path.as_deref().and_then(Path::parent) {
            Some(dir) => dir.join(path),
            None => path,
        }
    }
}
