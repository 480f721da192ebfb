//! Per-invocation registry of exported build artifacts.
//!
//! Build-rule emission runs on whatever worker threads the build-graph
//! engine decides to use, and each rule appends the paths it produced under
//! an export name. A single pass at the end of the build drains every list
//! in lexicographic order, so the serialized exports never depend on
//! scheduling order.
//!
//! The registry lives inside [`crate::config::InvocationConfig`] and is
//! created lazily on first access; see `InvocationConfig::exports`.

use std::collections::HashMap;
use std::sync::Mutex;

/// Named, append-only lists of artifact paths for one build invocation.
#[derive(Debug, Default)]
pub struct ExportRegistry {
    lists: Mutex<HashMap<String, Vec<String>>>,
}

impl ExportRegistry {
    /// Append one artifact path under `export`.
    ///
    /// Safe to call from any number of concurrent producers. Appends made
    /// by one caller keep their relative order; no ordering is guaranteed
    /// across callers, which is why [`drain`](Self::drain) sorts.
    pub fn append(&self, export: &str, artifact: impl Into<String>) {
        let mut lists = self.lists.lock().expect("export registry lock poisoned");
        lists
            .entry(export.to_string())
            .or_default()
            .push(artifact.into());
    }

    /// Snapshot of everything appended under `export`, sorted
    /// lexicographically so repeated builds with the same contributions
    /// produce byte-identical exports.
    ///
    /// A name with no prior appends yields an empty list, not an error;
    /// a feature that produced nothing is a valid steady state.
    pub fn drain(&self, export: &str) -> Vec<String> {
        let lists = self.lists.lock().expect("export registry lock poisoned");
        let mut paths = lists.get(export).cloned().unwrap_or_default();
        paths.sort();
        paths
    }

    /// All exports as `(name, space-joined sorted paths)` pairs, sorted by
    /// name. Paths containing spaces are a caller error and not validated
    /// here.
    pub fn export_build_vars(&self) -> Vec<(String, String)> {
        let lists = self.lists.lock().expect("export registry lock poisoned");
        let mut vars: Vec<(String, String)> = lists
            .iter()
            .map(|(name, paths)| {
                let mut paths = paths.clone();
                paths.sort();
                (name.clone(), paths.join(" "))
            })
            .collect();
        vars.sort_by(|a, b| a.0.cmp(&b.0));
        vars
    }
}

/// Render exported variables as `NAME := value` lines for a make-style
/// consumer.
pub fn render_build_vars(vars: &[(String, String)]) -> String {
    let mut out = String::new();
    for (name, value) in vars {
        out.push_str(name);
        out.push_str(" := ");
        out.push_str(value);
        out.push('\n');
    }
    out
}
