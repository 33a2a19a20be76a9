// src/config.rs

use crate::game::search::SearchConfig;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

const PROFILES_DIR: &str = "profiles";

pub fn save_profile(name: &str, config: &SearchConfig) -> io::Result<()> {
    save_profile_in(Path::new(PROFILES_DIR), name, config)
}

pub fn load_profile(name: &str) -> io::Result<SearchConfig> {
    load_profile_in(Path::new(PROFILES_DIR), name)
}

pub fn get_profiles() -> io::Result<Vec<String>> {
    get_profiles_in(Path::new(PROFILES_DIR))
}

pub fn save_profile_in(dir: &Path, name: &str, config: &SearchConfig) -> io::Result<()> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.json", name));
    let json = serde_json::to_string_pretty(config)?;
    fs::File::create(path)?.write_all(json.as_bytes())
}

pub fn load_profile_in(dir: &Path, name: &str) -> io::Result<SearchConfig> {
    let path = dir.join(format!("{}.json", name));
    let json = fs::read_to_string(path)?;
    serde_json::from_str(&json).map_err(io::Error::from)
}

pub fn get_profiles_in(dir: &Path) -> io::Result<Vec<String>> {
    let mut profiles = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() {
            if let Some(stem) = path.file_stem() {
                if let Some(name) = stem.to_str() {
                    profiles.push(name.to_string());
                }
            }
        }
    }
    profiles.sort();
    Ok(profiles)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let config = SearchConfig {
            time_limit_secs: 120,
            use_transposition: false,
            use_ordering: true,
            use_killer: true,
        };
        save_profile_in(dir.path(), "fast", &config).unwrap();
        let loaded = load_profile_in(dir.path(), "fast").unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn profiles_are_listed_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let config = SearchConfig::default();
        save_profile_in(dir.path(), "beta", &config).unwrap();
        save_profile_in(dir.path(), "alpha", &config).unwrap();
        assert_eq!(get_profiles_in(dir.path()).unwrap(), ["alpha", "beta"]);
    }

    #[test]
    fn missing_profile_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_profile_in(dir.path(), "nope").is_err());
    }
}
