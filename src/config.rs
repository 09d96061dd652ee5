//! External configuration loader.
//!
//! Reads `config.toml` from the executable's directory (or CWD).
//! Falls back to defaults if the file is missing or incomplete.
//! The resulting `GameConfig` is immutable and passed into constructors.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

// ── Public Config Struct ──

#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    pub timing: TimingConfig,
    pub scoring: ScoringConfig,
    pub cell_size: u32,
    pub paths: PathsConfig,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TimingConfig {
    pub frame_rate_hz: u32,
    /// Minimum wall-clock gap between two enemy steps.
    pub pursuit_interval_ms: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScoringConfig {
    pub cheese_bonus: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PathsConfig {
    pub level_file: PathBuf,
    pub save_file: PathBuf,
    pub highscore_file: PathBuf,
    pub assets_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl TimingConfig {
    /// Sleep budget for one frame at the configured rate.
    pub fn frame_duration(&self) -> Duration {
        Duration::from_micros(1_000_000 / u64::from(self.frame_rate_hz.max(1)))
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    scoring: TomlScoring,
    #[serde(default)]
    display: TomlDisplay,
    #[serde(default)]
    paths: TomlPaths,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_frame_rate")]
    frame_rate_hz: u32,
    #[serde(default = "default_pursuit_interval")]
    pursuit_interval_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlScoring {
    #[serde(default = "default_cheese_bonus")]
    cheese_bonus: u32,
}

#[derive(Deserialize, Debug)]
struct TomlDisplay {
    #[serde(default = "default_cell_size")]
    cell_size: u32,
}

#[derive(Deserialize, Debug)]
struct TomlPaths {
    #[serde(default = "default_level_file")]
    level_file: String,
    #[serde(default = "default_save_file")]
    save_file: String,
    #[serde(default = "default_highscore_file")]
    highscore_file: String,
    #[serde(default = "default_assets_dir")]
    assets_dir: String,
    #[serde(default = "default_log_dir")]
    log_dir: String,
}

// ── Defaults ──

fn default_frame_rate() -> u32 { 60 }
fn default_pursuit_interval() -> u64 { 500 }
fn default_cheese_bonus() -> u32 { 10 }
fn default_cell_size() -> u32 { 40 }

fn default_level_file() -> String { "level.txt".into() }
fn default_save_file() -> String { "savegame.toml".into() }
fn default_highscore_file() -> String { "highscore.txt".into() }
fn default_assets_dir() -> String { "assets".into() }
fn default_log_dir() -> String { "logs".into() }

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            frame_rate_hz: default_frame_rate(),
            pursuit_interval_ms: default_pursuit_interval(),
        }
    }
}

impl Default for TomlScoring {
    fn default() -> Self {
        TomlScoring { cheese_bonus: default_cheese_bonus() }
    }
}

impl Default for TomlDisplay {
    fn default() -> Self {
        TomlDisplay { cell_size: default_cell_size() }
    }
}

impl Default for TomlPaths {
    fn default() -> Self {
        TomlPaths {
            level_file: default_level_file(),
            save_file: default_save_file(),
            highscore_file: default_highscore_file(),
            assets_dir: default_assets_dir(),
            log_dir: default_log_dir(),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default(), &[])
    }
}

// ── Loading ──

/// Config plus anything worth logging once a subscriber exists.
pub struct Loaded {
    pub config: GameConfig,
    pub warnings: Vec<String>,
}

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Loaded {
        let search_dirs = candidate_dirs();
        let mut warnings = vec![];
        let toml_cfg = load_toml(&search_dirs, &mut warnings);
        Loaded {
            config: GameConfig::from_toml(toml_cfg, &search_dirs),
            warnings,
        }
    }

    fn from_toml(cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        GameConfig {
            timing: TimingConfig {
                frame_rate_hz: cfg.timing.frame_rate_hz.max(1),
                pursuit_interval_ms: cfg.timing.pursuit_interval_ms,
            },
            scoring: ScoringConfig {
                cheese_bonus: cfg.scoring.cheese_bonus,
            },
            cell_size: cfg.display.cell_size.max(1),
            paths: PathsConfig {
                level_file: resolve_existing(&cfg.paths.level_file, search_dirs),
                save_file: PathBuf::from(cfg.paths.save_file),
                highscore_file: PathBuf::from(cfg.paths.highscore_file),
                assets_dir: resolve_existing(&cfg.paths.assets_dir, search_dirs),
                log_dir: PathBuf::from(cfg.paths.log_dir),
            },
        }
    }
}

/// Relative resource paths are looked up in the candidate dirs first;
/// if none has it, the path stays relative to CWD.
fn resolve_existing(path: &str, search_dirs: &[PathBuf]) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
        return p.to_path_buf();
    }
    search_dirs
        .iter()
        .map(|d| d.join(p))
        .find(|candidate| candidate.exists())
        .unwrap_or_else(|| p.to_path_buf())
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf], warnings: &mut Vec<String>) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if !path.exists() {
            continue;
        }
        match std::fs::read_to_string(&path) {
            Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    warnings.push(format!("{} parse error, using defaults: {e}", path.display()));
                    return TomlConfig::default();
                }
            },
            Err(e) => warnings.push(format!("could not read {}: {e}", path.display())),
        }
    }
    TomlConfig::default()
}
