use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Defaults read from config files, in the same `--flag` form as the command line.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub api_key: Option<String>,
    pub no_images: bool,
    pub force_half_cell: bool,
    pub debug_log: Option<PathBuf>,
    pub history_dir: Option<PathBuf>,
}

impl ConfigFlags {
    /// Merge two flag sets. Switches combine; valued options from `other` win.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            api_key: other.api_key.clone().or_else(|| self.api_key.clone()),
            no_images: self.no_images || other.no_images,
            force_half_cell: self.force_half_cell || other.force_half_cell,
            debug_log: other.debug_log.clone().or_else(|| self.debug_log.clone()),
            history_dir: other
                .history_dir
                .clone()
                .or_else(|| self.history_dir.clone()),
        }
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("photogrid").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("photogrid")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("photogrid").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".config")
                .join("photogrid")
                .join("config");
        }
    }

    PathBuf::from(".photogridrc")
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".photogridrc")
}

pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = Vec::new();
    lines.push("# photogrid defaults (saved with --save)".to_string());
    if let Some(key) = &flags.api_key {
        lines.push(format!("--api-key {key}"));
    }
    if flags.no_images {
        lines.push("--no-images".to_string());
    }
    if flags.force_half_cell {
        lines.push("--force-half-cell".to_string());
    }
    if let Some(path) = &flags.debug_log {
        lines.push(format!("--debug-log {}", path.display()));
    }
    if let Some(path) = &flags.history_dir {
        lines.push(format!("--history-dir {}", path.display()));
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Pick known flags out of raw arguments, ignoring everything else.
///
/// Valued flags accept both `--flag value` and `--flag=value`.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        match token {
            "--no-images" => flags.no_images = true,
            "--force-half-cell" => flags.force_half_cell = true,
            "--api-key" | "--debug-log" | "--history-dir" => {
                if let Some(next) = tokens.get(i + 1) {
                    set_valued(&mut flags, token, next);
                    i += 1;
                }
            }
            _ => {
                if let Some((name, value)) = token.split_once('=') {
                    set_valued(&mut flags, name, value);
                }
            }
        }
        i += 1;
    }
    flags
}

fn set_valued(flags: &mut ConfigFlags, name: &str, value: &str) {
    match name {
        "--api-key" => flags.api_key = Some(value.to_string()),
        "--debug-log" => flags.debug_log = Some(PathBuf::from(value)),
        "--history-dir" => flags.history_dir = Some(PathBuf::from(value)),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn tokens(args: &[&str]) -> Vec<String> {
        args.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_parse_flag_tokens_extracts_known_flags() {
        let args = tokens(&[
            "photogrid",
            "--no-images",
            "--api-key",
            "abc123",
            "--debug-log=grid.log",
            "--force-half-cell",
            "--history-dir",
            "/tmp/hist",
            "kittens",
        ]);
        let flags = parse_flag_tokens(&args);
        assert!(flags.no_images);
        assert!(flags.force_half_cell);
        assert_eq!(flags.api_key.as_deref(), Some("abc123"));
        assert_eq!(flags.debug_log, Some(PathBuf::from("grid.log")));
        assert_eq!(flags.history_dir, Some(PathBuf::from("/tmp/hist")));
    }

    #[test]
    fn test_parse_flag_tokens_ignores_unknown_and_dangling() {
        let flags = parse_flag_tokens(&tokens(&["--verbose", "--theme=dark", "--api-key"]));
        assert_eq!(flags, ConfigFlags::default());
    }

    #[test]
    fn test_config_union_merges_cli_over_file_for_options() {
        let file = ConfigFlags {
            no_images: true,
            api_key: Some("from-file".to_string()),
            history_dir: Some(PathBuf::from("/data")),
            ..ConfigFlags::default()
        };
        let cli = ConfigFlags {
            force_half_cell: true,
            api_key: Some("from-cli".to_string()),
            ..ConfigFlags::default()
        };
        let merged = file.union(&cli);
        assert!(merged.no_images);
        assert!(merged.force_half_cell);
        assert_eq!(merged.api_key.as_deref(), Some("from-cli"));
        assert_eq!(merged.history_dir, Some(PathBuf::from("/data")));
    }

    #[test]
    fn test_save_load_and_clear_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(".photogridrc");
        let flags = ConfigFlags {
            api_key: Some("k3y".to_string()),
            no_images: true,
            force_half_cell: true,
            debug_log: Some(PathBuf::from("grid.log")),
            history_dir: Some(PathBuf::from("hist")),
        };

        save_config_flags(&path, &flags).unwrap();
        let loaded = load_config_flags(&path).unwrap();
        assert_eq!(loaded, flags);

        clear_config_flags(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_missing_config_loads_defaults() {
        let dir = tempdir().unwrap();
        let loaded = load_config_flags(&dir.path().join("absent")).unwrap();
        assert_eq!(loaded, ConfigFlags::default());
    }
}
