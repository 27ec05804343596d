use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "quill";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    pub fn config_path() -> PathBuf {
        ProjectDirs::from("", "", APP_NAME)
            .map(|pd| pd.config_dir().join("config.json"))
            .unwrap_or_else(|| PathBuf::from("quill_config.json"))
    }

    pub fn draft_path() -> PathBuf {
        Self::state_dir()
            .map(|dir| dir.join("autosave.json"))
            .unwrap_or_else(|| PathBuf::from("quill_autosave.json"))
    }

    pub fn log_dir() -> PathBuf {
        Self::state_dir().unwrap_or_else(|| PathBuf::from("."))
    }

    fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(PathBuf::from(home).join(".local").join("state").join(APP_NAME))
        } else {
            ProjectDirs::from("", "", APP_NAME).map(|pd| pd.data_local_dir().to_path_buf())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_have_expected_file_names() {
        assert!(AppDirs::config_path().ends_with("config.json"));
        assert!(AppDirs::draft_path().ends_with("autosave.json"));
    }
}
