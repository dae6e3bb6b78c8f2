use anyhow::{Context, Result};
use daybook_core::models::settings::Settings;
use std::fs;
use std::path::{Path, PathBuf};

pub const HOME_ENV: &str = "DAYBOOK_HOME";

/// Resolve the data home: `--home`, else `$DAYBOOK_HOME`, else `~/.daybook`.
pub fn daybook_home(flag: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = flag {
        return Ok(dir);
    }
    if let Some(dir) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set (or pass --home)")?;
    Ok(PathBuf::from(home).join(".daybook"))
}

pub fn ensure_home(home: &Path) -> Result<()> {
    fs::create_dir_all(home).with_context(|| format!("create {}", home.display()))
}

pub fn config_path(home: &Path) -> PathBuf {
    home.join("config.toml")
}

/// Directory holding one JSON snapshot per storage key.
pub fn data_dir(home: &Path) -> PathBuf {
    home.join("data")
}

pub fn load_config(home: &Path) -> Result<Settings> {
    let p = config_path(home);
    if !p.exists() {
        return Ok(Settings::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config(home: &Path, cfg: &Settings) -> Result<()> {
    ensure_home(home)?;
    let p = config_path(home);
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

/// Write the default config unless one exists. Returns true if written.
pub fn init_config(home: &Path) -> Result<bool> {
    let p = config_path(home);
    if p.exists() {
        return Ok(false);
    }
    save_config(home, &Settings::default())?;
    Ok(true)
}

pub fn render_config(cfg: &Settings) -> Result<String> {
    toml::to_string_pretty(cfg).context("serialize config")
}
