use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(Debug, thiserror::Error)]
pub enum HomeDirError {
    #[error("cannot determine the user home directory")]
    HomeMissing,
    #[error("cannot determine the application data directory")]
    AppDataMissing,
    #[error("home_dir must be an absolute path (after ~ expansion): {0}")]
    AbsoluteRequired(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Expand a leading `~` to the user home directory. Other paths pass through.
pub fn expand_tilde(raw: &str) -> Result<PathBuf, HomeDirError> {
    let rest = if raw == "~" {
        ""
    } else if let Some(rest) = raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
        rest
    } else {
        return Ok(PathBuf::from(raw));
    };

    let home = dirs::home_dir().ok_or(HomeDirError::HomeMissing)?;
    Ok(if rest.is_empty() { home } else { home.join(rest) })
}

/// Platform base for the default home: `%APPDATA%` on Windows, `$HOME` elsewhere.
fn platform_base() -> Result<PathBuf, HomeDirError> {
    if cfg!(target_os = "windows") {
        dirs::config_dir().ok_or(HomeDirError::AppDataMissing)
    } else {
        dirs::home_dir().ok_or(HomeDirError::HomeMissing)
    }
}

/// Resolve the server home directory.
///
/// A configured value gets `~` expansion and must end up absolute. Without one,
/// `<platform base>/<default_subdir>` is used. With `create`, the directory is
/// created if missing.
pub fn resolve_home_dir(
    config_home: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf, HomeDirError> {
    let path = match config_home {
        Some(raw) => {
            let expanded = expand_tilde(&raw)?;
            if !expanded.is_absolute() {
                return Err(HomeDirError::AbsoluteRequired(raw));
            }
            expanded
        }
        None => platform_base()?.join(default_subdir),
    };

    if create {
        fs::create_dir_all(&path)?;
    }
    Ok(path)
}

/// Join `rel` onto `base` unless it is already absolute.
pub fn resolve_under(base: &Path, rel: &str) -> PathBuf {
    let p = Path::new(rel);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base.join(p)
    }
}
