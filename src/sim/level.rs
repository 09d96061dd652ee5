//! Level loader.
//!
//! The level lives in a plain text file, one grid row per line (alphabet in
//! `domain::grid`). If the file does not exist yet, the built-in map is
//! written there first so the player has something to edit.

use std::io::ErrorKind;
use std::path::Path;

use tracing::info;

use crate::domain::grid::{self, Level};
use crate::error::{LevelLoadError, ParseError};

/// Built-in maze: 20×10, one cat, four cheese, two traps, a key and a door.
const DEFAULT_MAP: &[&str] = &[
    "WWWWWWWWWWWWWWWWWWWW",
    "W P       C        W",
    "W WWWWWW WWWWWW WW W",
    "W C      W      C  W",
    "WWWWWW W W WWWWWWWWW",
    "W T    W C   E     W",
    "W WWW WWWWWWWWWW W W",
    "W K   T          W W",
    "WWWWWWWWWWWWWWWW D W",
    "WWWWWWWWWWWWWWWWWWWW",
];

/// The built-in map as file text (trailing newline included).
pub fn default_map_text() -> String {
    let mut text = DEFAULT_MAP.join("\n");
    text.push('\n');
    text
}

/// Read the level file, creating it from the built-in map when absent.
pub fn read_or_create(path: &Path) -> Result<String, LevelLoadError> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            let text = default_map_text();
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|source| LevelLoadError::WriteDefault {
                    path: path.to_path_buf(),
                    source,
                })?;
            }
            std::fs::write(path, &text).map_err(|source| LevelLoadError::WriteDefault {
                path: path.to_path_buf(),
                source,
            })?;
            info!("level file {} not found, wrote built-in map", path.display());
            Ok(text)
        }
        Err(source) => Err(LevelLoadError::Read { path: path.to_path_buf(), source }),
    }
}

/// Map text together with the level parsed from it. The text is kept so a
/// restart can parse it again.
#[derive(Clone, Debug)]
pub struct LevelSource {
    pub text: String,
    pub level: Level,
}

impl LevelSource {
    pub fn from_text(text: String) -> Result<Self, ParseError> {
        let level = grid::parse(&text)?;
        Ok(LevelSource { text, level })
    }
}

/// Load and parse the level at `path`.
pub fn load_level(path: &Path) -> Result<LevelSource, LevelLoadError> {
    let text = read_or_create(path)?;
    let source = LevelSource::from_text(text).map_err(|source| LevelLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    let level = &source.level;
    info!(
        "loaded level {} ({}x{}, {} cheese)",
        path.display(),
        level.grid.width(),
        level.grid.height(),
        level.spawns.cheese.len(),
    );
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::GridPos;

    #[test]
    fn default_map_is_valid() {
        let level = grid::parse(&default_map_text()).unwrap();
        assert_eq!((level.grid.width(), level.grid.height()), (20, 10));
        assert_eq!(level.spawns.player, GridPos::new(2, 1));
        assert_eq!(level.spawns.enemy, Some(GridPos::new(13, 5)));
        assert_eq!(level.spawns.key, Some(GridPos::new(2, 7)));
        assert_eq!(level.spawns.door, Some(GridPos::new(17, 8)));
        assert_eq!(level.spawns.cheese.len(), 4);
        assert_eq!(level.spawns.traps.len(), 2);
    }

    #[test]
    fn missing_file_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("maps").join("level.txt");
        let source = load_level(&path).unwrap();
        assert_eq!(source.level.grid.width(), 20);
        assert_eq!(source.text, default_map_text());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), default_map_text());
    }

    #[test]
    fn existing_file_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("level.txt");
        std::fs::write(&path, "WWWW\nWP W\nWWWW\n").unwrap();
        let level = load_level(&path).unwrap().level;
        assert_eq!((level.grid.width(), level.grid.height()), (4, 3));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "WWWW\nWP W\nWWWW\n");
    }

    #[test]
    fn invalid_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("level.txt");
        std::fs::write(&path, "PEE").unwrap();
        match load_level(&path) {
            Err(LevelLoadError::Parse { source: ParseError::DuplicateMarker { marker: 'E', .. }, .. }) => {}
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn directory_path_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(load_level(dir.path()), Err(LevelLoadError::Read { .. })));
    }
}
