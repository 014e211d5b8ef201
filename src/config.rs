//! Configuration discovery and effective settings resolution.
//!
//! Firehose reads `firehose.toml|yaml|yml` from the project root (or closest
//! ancestor) and merges it with CLI flags to produce an `Effective` config.
//! Defaults:
//! - `output`: `xml`
//! - `pretty`: true
//! - `color`: false
//! - `fixup.base_dir`, `fixup.hash_alg`: unset
//!
//! Overrides precedence: CLI > config file > defaults.

use crate::document::Format;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Default, Deserialize, Clone)]
/// Fix-up related configuration under `[fixup]`.
pub struct FixupCfg {
    pub base_dir: Option<String>,
    pub hash_alg: Option<String>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `firehose.toml|yaml`.
pub struct FirehoseConfig {
    pub output: Option<String>,
    pub pretty: Option<bool>,
    pub color: Option<bool>,
    #[serde(default)]
    pub fixup: Option<FixupCfg>,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by commands after applying precedence.
pub struct Effective {
    pub root: PathBuf,
    pub output: Format,
    pub pretty: bool,
    pub color: bool,
    pub base_dir: Option<PathBuf>,
    pub hash_alg: Option<String>,
}

/// CLI-side overrides; `None` defers to the config file.
#[derive(Debug, Default, Clone)]
pub struct Overrides<'a> {
    pub root: Option<&'a Path>,
    pub output: Option<Format>,
    pub pretty: Option<bool>,
    pub color: Option<bool>,
    pub base_dir: Option<&'a Path>,
    pub hash_alg: Option<&'a str>,
}

const CONFIG_NAMES: [&str; 3] = ["firehose.toml", "firehose.yaml", "firehose.yml"];

/// Walk upward from `start` to detect the project root.
///
/// Stops when a `firehose.toml|yaml|yml` or a `.git` directory is found.
pub fn detect_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if CONFIG_NAMES.iter().any(|name| cur.join(name).exists()) {
            return cur.to_path_buf();
        }
        if cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Load `FirehoseConfig` from `firehose.toml` or `firehose.yaml|yml` if present.
///
/// A file that fails to parse is reported and treated as absent.
pub fn load_config(root: &Path) -> Option<FirehoseConfig> {
    let toml_path = root.join("firehose.toml");
    if toml_path.exists() {
        let s = fs::read_to_string(&toml_path).ok()?;
        return match toml::from_str::<FirehoseConfig>(&s) {
            Ok(cfg) => Some(cfg),
            Err(e) => {
                warn!(path = %toml_path.display(), error = %e, "ignoring invalid config");
                None
            }
        };
    }
    for yml in ["firehose.yaml", "firehose.yml"] {
        let p = root.join(yml);
        if p.exists() {
            let s = fs::read_to_string(&p).ok()?;
            return match serde_yaml::from_str::<FirehoseConfig>(&s) {
                Ok(cfg) => Some(cfg),
                Err(e) => {
                    warn!(path = %p.display(), error = %e, "ignoring invalid config");
                    None
                }
            };
        }
    }
    None
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
pub fn resolve_effective(cli: &Overrides<'_>) -> Effective {
    let start = cli
        .root
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let root = detect_root(&start);
    let cfg = load_config(&root).unwrap_or_default();
    let fixup = cfg.fixup.unwrap_or_default();

    let cfg_output = cfg.output.as_deref().and_then(|s| match s.parse::<Format>() {
        Ok(f) => Some(f),
        Err(e) => {
            warn!(error = %e, "ignoring configured output");
            None
        }
    });
    let output = cli.output.or(cfg_output).unwrap_or(Format::Xml);
    let pretty = cli.pretty.or(cfg.pretty).unwrap_or(true);
    let color = cli.color.or(cfg.color).unwrap_or(false);

    // a configured base_dir is relative to the project root
    let base_dir = cli
        .base_dir
        .map(Path::to_path_buf)
        .or_else(|| fixup.base_dir.map(|d| root.join(d)));
    let hash_alg = cli.hash_alg.map(str::to_string).or(fixup.hash_alg);

    Effective {
        root,
        output,
        pretty,
        color,
        base_dir,
        hash_alg,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_without_config() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        let eff = resolve_effective(&Overrides {
            root: Some(dir.path()),
            ..Default::default()
        });
        assert_eq!(eff.root, dir.path());
        assert_eq!(eff.output, Format::Xml);
        assert!(eff.pretty);
        assert!(!eff.color);
        assert!(eff.base_dir.is_none());
        assert!(eff.hash_alg.is_none());
    }

    #[test]
    fn test_detect_and_load_toml() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let mut f = fs::File::create(root.join("firehose.toml")).unwrap();
        writeln!(
            f,
            "{}",
            r#"
output = "json"
pretty = false
[fixup]
base_dir = "build"
hash_alg = "sha256"
    "#
        )
        .unwrap();
        let nested = root.join("a/b");
        fs::create_dir_all(&nested).unwrap();

        // Resolve from a subdirectory to exercise the upward walk
        let eff = resolve_effective(&Overrides {
            root: Some(&nested),
            ..Default::default()
        });
        assert_eq!(eff.root, root);
        assert_eq!(eff.output, Format::Json);
        assert!(!eff.pretty);
        assert_eq!(eff.base_dir, Some(root.join("build")));
        assert_eq!(eff.hash_alg.as_deref(), Some("sha256"));
    }

    #[test]
    fn test_load_yaml() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(
            root.join("firehose.yml"),
            "output: json\ncolor: true\nfixup:\n  hash_alg: md5\n",
        )
        .unwrap();
        let cfg = load_config(root).unwrap();
        assert_eq!(cfg.output.as_deref(), Some("json"));
        assert_eq!(cfg.color, Some(true));
        assert_eq!(cfg.fixup.unwrap().hash_alg.as_deref(), Some("md5"));
    }

    #[test]
    fn test_cli_overrides_config() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(
            root.join("firehose.toml"),
            "output = \"json\"\ncolor = true\n[fixup]\nhash_alg = \"sha1\"\n",
        )
        .unwrap();
        let eff = resolve_effective(&Overrides {
            root: Some(root),
            output: Some(Format::Xml),
            color: Some(false),
            hash_alg: Some("md5"),
            ..Default::default()
        });
        assert_eq!(eff.output, Format::Xml);
        assert!(!eff.color);
        assert_eq!(eff.hash_alg.as_deref(), Some("md5"));
    }

    #[test]
    fn test_invalid_config_treated_as_absent() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("firehose.toml"), "output = [").unwrap();
        assert!(load_config(dir.path()).is_none());
        let eff = resolve_effective(&Overrides {
            root: Some(dir.path()),
            ..Default::default()
        });
        assert_eq!(eff.output, Format::Xml);
    }
}
