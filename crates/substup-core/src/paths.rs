use dirs::home_dir;
use std::path::{Path, PathBuf};

/// Returns the primary installation directory, or None if the user's home cannot be resolved.
pub fn try_substup_home() -> Option<PathBuf> {
    if let Ok(val) = std::env::var("SUBSTUP_HOME") {
        return Some(PathBuf::from(val));
    }
    home_dir().map(|h| h.join(".substup"))
}

/// Returns the canonical substup home directory (`~/.substup`).
///
/// # Panics
///
/// Panics if neither `SUBSTUP_HOME` is set nor the user's home directory
/// can be resolved.
pub fn substup_home() -> PathBuf {
    try_substup_home().expect("Could not determine home directory. Set SUBSTUP_HOME to override.")
}

/// Binary installation target under a given root: `<root>/bin`
pub fn bin_path_in(home: &Path) -> PathBuf {
    home.join("bin")
}

/// Cache for verified downloads under a given root: `<root>/cache`
pub fn cache_path_in(home: &Path) -> PathBuf {
    home.join("cache")
}

/// Scratch space under a given root, guaranteed same volume as bin: `<root>/tmp`
pub fn tmp_path_in(home: &Path) -> PathBuf {
    home.join("tmp")
}

/// Installation receipt under a given root: `<root>/receipt.toml`
pub fn receipt_path_in(home: &Path) -> PathBuf {
    home.join("receipt.toml")
}

/// Binary installation target: ~/.substup/bin
pub fn bin_path() -> PathBuf {
    bin_path_in(&substup_home())
}

/// Cache for verified downloads: ~/.substup/cache
pub fn cache_path() -> PathBuf {
    cache_path_in(&substup_home())
}

/// Installation receipt: ~/.substup/receipt.toml
pub fn receipt_path() -> PathBuf {
    receipt_path_in(&substup_home())
}
