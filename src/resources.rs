// Resource location and text loading
// Maps the card's logical relative paths to absolute ones, whether the
// resources sit next to the installed executable or under the working
// directory during development.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

pub struct ResourceDir {
    root: PathBuf,
}

impl ResourceDir {
    /// Pick the resource root: an explicit override wins, then the
    /// directory next to the executable if it carries a `resources`
    /// folder (bundled install), then the working directory.
    pub fn locate(override_root: Option<PathBuf>) -> Self {
        if let Some(root) = override_root {
            return Self { root };
        }
        if let Ok(exe) = env::current_exe() {
            if let Some(dir) = exe.parent() {
                if dir.join("resources").is_dir() {
                    return Self {
                        root: dir.to_path_buf(),
                    };
                }
            }
        }
        Self {
            root: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.root.join(relative)
    }
}

/// Read a text file as an ordered sequence of lines. Any read failure is
/// logged and yields the single fallback line instead.
pub fn load_lines(path: &Path, fallback: &str) -> Vec<String> {
    match fs::read_to_string(path) {
        Ok(content) => content.lines().map(str::to_string).collect(),
        Err(e) => {
            warn!(?path, error = %e, "could not read text file, using fallback");
            vec![fallback.to_string()]
        }
    }
}
