//! Build-invocation configuration.
//!
//! An [`InvocationConfig`] is created once per build and handed (behind an
//! `Arc`, typically) to every rule-emission call site and to the top-level
//! orchestration step. It owns the export registry's lifetime, so shared
//! build state dies with the invocation instead of living in a global.

use crate::registry::ExportRegistry;
use anyhow::Context;
use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Suffixes longer than this are collapsed to an md5 digest.
const MAX_SUFFIX_LEN: usize = 64;

/// Settings for one build invocation.
pub struct InvocationConfig {
    out_dir: PathBuf,
    target: String,
    tool_args: Vec<String>,
    environ: HashMap<String, String>,
    suffix: OnceCell<String>,
    exports: OnceCell<ExportRegistry>,
}

impl InvocationConfig {
    /// Capture the current process environment alongside the given settings.
    pub fn new(out_dir: PathBuf, target: impl Into<String>, tool_args: Vec<String>) -> Self {
        Self {
            out_dir,
            target: target.into(),
            tool_args,
            environ: std::env::vars().collect(),
            suffix: OnceCell::new(),
            exports: OnceCell::new(),
        }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn tool_args(&self) -> &[String] {
        &self.tool_args
    }

    pub fn environ(&self) -> &HashMap<String, String> {
        &self.environ
    }

    /// The export registry for this invocation.
    ///
    /// Created on first access. Concurrent first-time callers race on the
    /// cell, not on the data: every racer observes the one instance that
    /// won, so no append can land in a discarded collection.
    pub fn exports(&self) -> &ExportRegistry {
        self.exports.get_or_init(ExportRegistry::default)
    }

    /// Cache-key suffix for files the wrapped tool generates, encoding
    /// everything that changes the tool's inputs: the target plus any extra
    /// tool arguments.
    ///
    /// An overlong suffix is collapsed to its md5 digest, and the full key
    /// is written to a side file (see [`suffix_file`](Self::suffix_file))
    /// so it stays recoverable.
    pub fn cache_suffix(&self) -> &str {
        self.suffix.get_or_init(|| {
            let mut suffix = format!("-{}", self.target);
            if !self.tool_args.is_empty() {
                suffix.push('-');
                suffix.push_str(&sanitize_key(&self.tool_args.join("_")));
            }

            if suffix.len() > MAX_SUFFIX_LEN {
                let short = format!("-{:x}", md5::compute(suffix.as_bytes()));
                tracing::debug!("cache-key suffix too long: {suffix:?}");
                tracing::debug!("replacing with: {short:?}");

                let side_file = self.out_dir.join(format!("build{short}.suf"));
                if let Err(e) = fs::write(&side_file, &suffix) {
                    tracing::warn!("error writing suffix file {}: {e}", side_file.display());
                }
                short
            } else {
                suffix
            }
        })
    }

    /// Path of the build manifest the wrapped tool regenerates.
    pub fn manifest_file(&self) -> PathBuf {
        self.out_dir.join(format!("build{}.ninja", self.cache_suffix()))
    }

    /// Side file holding the full cache key when the suffix was collapsed.
    pub fn suffix_file(&self) -> PathBuf {
        self.out_dir.join(format!("build{}.suf", self.cache_suffix()))
    }
}

/// Replace separators and spaces so a value can be embedded in a file name.
fn sanitize_key(s: &str) -> String {
    s.replace(['/', ' '], "_")
}

/// Optional `mason.toml` supplying where the wrapped tool lives and the
/// arguments always passed to it. CLI flags take precedence.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub tool: Option<PathBuf>,
    #[serde(default)]
    pub tool_args: Vec<String>,
}

impl FileConfig {
    /// Load from `path`, treating a missing file as empty defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_suffix_is_kept_verbatim() {
        let config = InvocationConfig::new(PathBuf::from("out"), "aosp_arm", vec![]);
        assert_eq!(config.cache_suffix(), "-aosp_arm");
        assert_eq!(config.manifest_file(), PathBuf::from("out/build-aosp_arm.ninja"));
    }

    #[test]
    fn tool_args_are_sanitized_into_the_suffix() {
        let config = InvocationConfig::new(
            PathBuf::from("out"),
            "aosp_arm",
            vec!["--one".to_string(), "two/three four".to_string()],
        );
        assert_eq!(config.cache_suffix(), "-aosp_arm---one_two_three_four");
    }

    #[test]
    fn long_suffix_collapses_to_digest_with_side_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = "x".repeat(100);
        let config = InvocationConfig::new(dir.path().to_path_buf(), target.clone(), vec![]);

        let full = format!("-{target}");
        let expected = format!("-{:x}", md5::compute(full.as_bytes()));
        assert_eq!(config.cache_suffix(), expected);

        let saved = fs::read_to_string(config.suffix_file()).unwrap();
        assert_eq!(saved, full);
    }

    #[test]
    fn suffix_is_derived_once() {
        let config = InvocationConfig::new(PathBuf::from("out"), "t", vec![]);
        let first = config.cache_suffix() as *const str;
        let second = config.cache_suffix() as *const str;
        assert_eq!(first, second);
    }

    #[test]
    fn concurrent_export_access_shares_one_registry() {
        let threads = 16;
        let config = InvocationConfig::new(PathBuf::from("out"), "t", vec![]);

        std::thread::scope(|scope| {
            for t in 0..threads {
                let config = &config;
                scope.spawn(move || {
                    config.exports().append("RACE", format!("value-{t:02}"));
                });
            }
        });

        // All appends landed in one shared collection, not N separate ones.
        assert_eq!(config.exports().drain("RACE").len(), threads);
    }

    #[test]
    fn file_config_defaults_when_missing() {
        let loaded = FileConfig::load(Path::new("does/not/exist.toml")).unwrap();
        assert!(loaded.tool.is_none());
        assert!(loaded.tool_args.is_empty());
    }

    #[test]
    fn file_config_parses_tool_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mason.toml");
        fs::write(&path, "tool = \"/usr/bin/ckati\"\ntool_args = [\"--regen\"]\n").unwrap();

        let loaded = FileConfig::load(&path).unwrap();
        assert_eq!(loaded.tool, Some(PathBuf::from("/usr/bin/ckati")));
        assert_eq!(loaded.tool_args, vec!["--regen"]);
    }
}
