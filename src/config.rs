use crate::error::{MisrankError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use toml::map::Map;
use toml::Value;

pub const DEFAULT_CONFIG_FILE: &str = "misrank.toml";
pub const DEFAULT_GLOBAL_CONFIG_FILE: &str = ".config/misrank/config.toml";

/// Optional defaults for the annotation pipeline; CLI flags always win.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MisrankConfig {
    pub annovar: Option<AnnovarSection>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnnovarSection {
    pub install_dir: Option<PathBuf>,
    pub database_dir: Option<PathBuf>,
    pub build: Option<String>,
}

pub fn load_config(root: &Path) -> Result<Option<MisrankConfig>> {
    let global = std::env::var_os("HOME")
        .map(PathBuf::from)
        .map(|home| home.join(DEFAULT_GLOBAL_CONFIG_FILE));
    load_config_with_global(root, global.as_deref())
}

pub(crate) fn load_config_with_global(
    root: &Path,
    global_path: Option<&Path>,
) -> Result<Option<MisrankConfig>> {
    let local_path = root.join(DEFAULT_CONFIG_FILE);
    let global_exists = global_path.map(Path::exists).unwrap_or(false);
    if !local_path.exists() && !global_exists {
        return Ok(None);
    }

    let mut merged = Value::Table(Map::new());
    if let Some(path) = global_path {
        merge_file_if_exists(&mut merged, path)?;
    }
    merge_file_if_exists(&mut merged, &local_path)?;

    let config: MisrankConfig = merged
        .try_into()
        .map_err(|e: toml::de::Error| MisrankError::ConfigParse(e.to_string()))?;
    Ok(Some(config))
}

fn merge_file_if_exists(merged: &mut Value, path: &Path) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }
    let value = read_toml_value(path)?;
    merge_toml(merged, value);
    Ok(())
}

fn read_toml_value(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| MisrankError::ConfigParse(format!("{}: {}", path.display(), e)))
}

fn merge_toml(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Table(base_table), Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_toml(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => {
            *slot = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn load_config_returns_none_when_no_file_exists() {
        let dir = TempDir::new().expect("temp dir should be created");
        let config = load_config_with_global(dir.path(), None).expect("load should not fail");
        assert!(config.is_none());
    }

    #[test]
    fn local_config_overrides_the_global_one() {
        let root = TempDir::new().expect("root temp dir should be created");
        let global_root = TempDir::new().expect("global temp dir should be created");
        let global_path = global_root.path().join("config.toml");

        fs::write(
            &global_path,
            r#"
[annovar]
install_dir = "/opt/annovar"
database_dir = "/opt/annovar/humandb"
build = "hg19"
"#,
        )
        .expect("global config should write");

        fs::write(
            root.path().join(DEFAULT_CONFIG_FILE),
            r#"
[annovar]
build = "hg38"
"#,
        )
        .expect("local config should write");

        let config = load_config_with_global(root.path(), Some(&global_path))
            .expect("load should succeed")
            .expect("merged config should exist");

        let annovar = config.annovar.expect("annovar section should exist");
        assert_eq!(annovar.install_dir, Some(PathBuf::from("/opt/annovar")));
        assert_eq!(annovar.build.as_deref(), Some("hg38"));
    }

    #[test]
    fn global_config_alone_is_enough() {
        let root = TempDir::new().expect("root temp dir should be created");
        let global_root = TempDir::new().expect("global temp dir should be created");
        let global_path = global_root.path().join("config.toml");
        fs::write(&global_path, "[annovar]\nbuild = \"hg19\"\n").expect("global should write");

        let config = load_config_with_global(root.path(), Some(&global_path))
            .expect("load should succeed")
            .expect("config should exist");
        assert_eq!(
            config.annovar.and_then(|annovar| annovar.build).as_deref(),
            Some("hg19")
        );
    }
}
