// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use crate::Config;

/// Ordered list of config file locations searched from lowest to highest priority.
/// Later files override earlier ones.
fn config_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from("/etc/advocate/config.yaml"));
    paths.push(PathBuf::from("/etc/advocate/config.yml"));

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".config/advocate/config.yaml"));
        paths.push(home.join(".config/advocate/config.yml"));
    }
    if let Some(cfg) = dirs::config_dir() {
        paths.push(cfg.join("advocate/config.yaml"));
        paths.push(cfg.join("advocate/config.yml"));
    }

    paths.push(PathBuf::from(".advocate.yaml"));
    paths.push(PathBuf::from(".advocate.yml"));
    paths.push(PathBuf::from("advocate.yaml"));
    paths.push(PathBuf::from("advocate.yml"));

    paths
}

/// Load configuration by merging all discovered YAML files, then applying the
/// recognized environment variables (`ARCHIVE_ROOT`, `LLM_ENDPOINT`,
/// `LLM_API_KEY`, `LLM_DEPLOYMENT`, `LLM_API_VERSION`) as the final,
/// highest-priority layer. `extra` may provide an explicit path (`--config`).
pub fn load(extra: Option<&Path>) -> anyhow::Result<Config> {
    let mut merged = serde_yaml::Value::Mapping(serde_yaml::Mapping::new());

    for path in config_search_paths() {
        if path.is_file() {
            debug!(path = %path.display(), "loading config layer");
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            let layer: serde_yaml::Value = serde_yaml::from_str(&text)
                .with_context(|| format!("parsing {}", path.display()))?;
            merge_yaml(&mut merged, layer);
        }
    }

    if let Some(p) = extra {
        debug!(path = %p.display(), "loading explicit config");
        let text =
            std::fs::read_to_string(p).with_context(|| format!("reading {}", p.display()))?;
        let layer: serde_yaml::Value =
            serde_yaml::from_str(&text).with_context(|| format!("parsing {}", p.display()))?;
        merge_yaml(&mut merged, layer);
    }

    let mut config: Config = if matches!(merged, serde_yaml::Value::Mapping(ref m) if m.is_empty())
    {
        Config::default()
    } else {
        serde_yaml::from_value(merged).unwrap_or_default()
    };

    apply_env_overrides(&mut config);
    Ok(config)
}

/// Apply the environment-variable overrides named in the external interfaces
/// contract. Environment always wins over file-based configuration, since it
/// is how the orchestrator's own deployment tooling is expected to inject
/// secrets and per-environment paths.
fn apply_env_overrides(config: &mut Config) {
    if let Ok(v) = std::env::var("ARCHIVE_ROOT") {
        config.archive.root = PathBuf::from(v);
    }
    if let Ok(v) = std::env::var("LLM_ENDPOINT") {
        config.llm.endpoint = Some(v);
    }
    if let Ok(v) = std::env::var("LLM_API_KEY") {
        config.llm.api_key = Some(v);
    }
    if let Ok(v) = std::env::var("LLM_DEPLOYMENT") {
        config.llm.deployment = Some(v);
    }
    if let Ok(v) = std::env::var("LLM_API_VERSION") {
        config.llm.api_version = Some(v);
    }
}

/// Deep-merge `src` into `dst`; src wins on scalar conflicts.
fn merge_yaml(dst: &mut serde_yaml::Value, src: serde_yaml::Value) {
    match (dst, src) {
        (serde_yaml::Value::Mapping(d), serde_yaml::Value::Mapping(s)) => {
            for (k, v) in s {
                let entry = d
                    .entry(k)
                    .or_insert(serde_yaml::Value::Mapping(serde_yaml::Mapping::new()));
                merge_yaml(entry, v);
            }
        }
        (dst, src) => *dst = src,
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Environment variables are process-global; serialize tests that touch them.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn val(s: &str) -> serde_yaml::Value {
        serde_yaml::from_str(s).unwrap()
    }

    #[test]
    fn merge_scalar_src_wins() {
        let mut dst = val("x: 1");
        let src = val("x: 2");
        merge_yaml(&mut dst, src);
        assert_eq!(dst["x"].as_i64(), Some(2));
    }

    #[test]
    fn merge_preserves_keys_not_in_src() {
        let mut dst = val("a: 1\nb: 2");
        let src = val("b: 99");
        merge_yaml(&mut dst, src);
        assert_eq!(dst["a"].as_i64(), Some(1));
        assert_eq!(dst["b"].as_i64(), Some(99));
    }

    #[test]
    fn merge_nested_tables() {
        let mut dst = val("archive:\n  root: /a");
        let src = val("archive:\n  root: /b");
        merge_yaml(&mut dst, src);
        assert_eq!(dst["archive"]["root"].as_str(), Some("/b"));
    }

    #[test]
    fn load_returns_error_when_explicit_path_missing() {
        let result = load(Some(Path::new("/tmp/advocate_nonexistent_config_xyz.yaml")));
        assert!(result.is_err());
    }

    #[test]
    fn load_with_no_extra_path_returns_defaults() {
        let _guard = ENV_LOCK.lock().unwrap();
        let cfg = load(None).unwrap();
        assert_eq!(cfg.engine.max_iterations, 30);
    }

    #[test]
    fn load_explicit_file_overrides_defaults() {
        use std::io::Write;
        let _guard = ENV_LOCK.lock().unwrap();
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "archive:\n  root: /tmp/explicit-case-root").unwrap();
        let cfg = load(Some(f.path())).unwrap();
        assert_eq!(cfg.archive.root, PathBuf::from("/tmp/explicit-case-root"));
    }

    #[test]
    fn env_var_overrides_file_value() {
        let _guard = ENV_LOCK.lock().unwrap();
        use std::io::Write;
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "archive:\n  root: /tmp/from-file").unwrap();
        std::env::set_var("ARCHIVE_ROOT", "/tmp/from-env");
        let cfg = load(Some(f.path())).unwrap();
        std::env::remove_var("ARCHIVE_ROOT");
        assert_eq!(cfg.archive.root, PathBuf::from("/tmp/from-env"));
    }

    #[test]
    fn llm_env_vars_populate_config() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("LLM_ENDPOINT", "https://example.test/v1");
        std::env::set_var("LLM_API_KEY", "secret-key");
        std::env::set_var("LLM_DEPLOYMENT", "gpt-support");
        std::env::set_var("LLM_API_VERSION", "2024-10-01");
        let cfg = load(None).unwrap();
        std::env::remove_var("LLM_ENDPOINT");
        std::env::remove_var("LLM_API_KEY");
        std::env::remove_var("LLM_DEPLOYMENT");
        std::env::remove_var("LLM_API_VERSION");
        assert_eq!(cfg.llm.endpoint.as_deref(), Some("https://example.test/v1"));
        assert_eq!(cfg.llm.api_key.as_deref(), Some("secret-key"));
        assert_eq!(cfg.llm.deployment.as_deref(), Some("gpt-support"));
        assert_eq!(cfg.llm.api_version.as_deref(), Some("2024-10-01"));
    }
}
