//! Helpers for lsext.
//!
//! Small path utilities shared by the config loader and the listing.

use std::path::{Path, PathBuf};

/// The current user's home directory, if one can be determined.
pub fn get_home() -> Option<PathBuf> {
    dirs::home_dir()
}

/// Replaces a leading home directory with `~` for display.
pub fn shorten_home_path(path: &Path) -> String {
    if let Some(home) = get_home()
        && let Ok(rest) = path.strip_prefix(&home)
    {
        if rest.as_os_str().is_empty() {
            return "~".to_string();
        }
        return format!("~/{}", rest.display());
    }
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn home_is_shortened() {
        let Some(home) = get_home() else {
            return;
        };
        assert_eq!(shorten_home_path(&home), "~");
        assert_eq!(shorten_home_path(&home.join("docs")), "~/docs");
        assert_eq!(shorten_home_path(Path::new("/nonexistent/x")), "/nonexistent/x");
    }
}
