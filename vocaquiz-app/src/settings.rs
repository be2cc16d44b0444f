use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use vocaquiz_core::QuizConfig;
use vocaquiz_json::paths::settings_file;

/// Reads `settings.json` under `root`; a missing file means defaults.
pub fn load(root: &Path) -> Result<QuizConfig> {
    let path = settings_file(root);
    if !path.exists() {
        return Ok(QuizConfig::default());
    }
    let raw = fs::read_to_string(&path)
        .with_context(|| format!("reading settings {}", path.display()))?;
    let cfg = serde_json::from_str(&raw)
        .with_context(|| format!("malformed settings file {}", path.display()))?;
    tracing::debug!(path = %path.display(), ?cfg, "settings loaded");
    Ok(cfg)
}

pub fn save(root: &Path, cfg: &QuizConfig) -> Result<()> {
    fs::create_dir_all(root)?;
    let path = settings_file(root);
    fs::write(&path, serde_json::to_vec_pretty(cfg)?)
        .with_context(|| format!("writing settings {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vocaquiz_core::DirectionMode;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load(dir.path()).unwrap(), QuizConfig::default());
    }

    #[test]
    fn saved_settings_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = QuizConfig {
            cards_per_session: 5,
            direction: DirectionMode::Random,
            seed: Some(11),
        };
        save(dir.path(), &cfg).unwrap();
        assert_eq!(load(dir.path()).unwrap(), cfg);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(settings_file(dir.path()), "{ nope").unwrap();
        assert!(load(dir.path()).is_err());
    }
}
