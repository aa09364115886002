//! Port-workspace layout and artifact location.
//!
//! A port workspace is a directory tree produced by the external build and
//! comparison pipeline. This module maps an example name to the artifacts
//! that pipeline leaves behind; it never creates or modifies them (except
//! [`Layout::relocate_output`], which moves a finished document into its
//! canonical directory).

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The one example whose output document is macro-enabled.
pub const MACRO_EXAMPLE: &str = "macro";

/// Naming conventions of a port workspace, relative to its root.
///
/// Defaults reproduce the conventional tree:
///
/// ```text
/// examples/<name>.zig                      target implementation
/// examples/c/<name>.c                      reference implementation
/// testing/screenshots/c_<stem>.png         reference rendering
/// testing/screenshots/zig_<stem>.png       target rendering
/// testing/screenshots/comparison_<stem>.png combined comparison image
/// testing/comparison_results/<stem>_output.txt
/// testing/c-output-xls/<stem>.<ext>        reference output document
/// testing/zig-output-xls/<name>.<ext>      relocated target output
/// zig-<name>.<ext>                         freshly generated, pre-relocation
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Directory holding target implementation files.
    pub target_dir: String,
    /// Directory holding reference implementation files.
    pub reference_dir: String,
    /// Directory holding rendered screenshots.
    pub screenshots_dir: String,
    /// Directory holding textual comparison results.
    pub results_dir: String,
    /// Directory holding reference output documents.
    pub reference_output_dir: String,
    /// Directory target output documents are relocated into.
    pub target_output_dir: String,
    /// File extension of target implementation files (no dot).
    pub target_ext: String,
    /// File extension of reference implementation files (no dot).
    pub reference_ext: String,
    /// Basename prefix of freshly generated, not-yet-relocated outputs.
    pub pending_output_prefix: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            target_dir: "examples".into(),
            reference_dir: "examples/c".into(),
            screenshots_dir: "testing/screenshots".into(),
            results_dir: "testing/comparison_results".into(),
            reference_output_dir: "testing/c-output-xls".into(),
            target_output_dir: "testing/zig-output-xls".into(),
            target_ext: "zig".into(),
            reference_ext: "c".into(),
            pending_output_prefix: "zig-".into(),
        }
    }
}

impl LayoutConfig {
    /// Load a layout config from a YAML file. Missing keys keep their
    /// defaults; a missing file is an error (the caller asked for this path).
    pub fn load_from_file(path: &Path) -> Result<Self, CoreError> {
        let contents = fs::read_to_string(path).map_err(|source| CoreError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml_ng::from_str(&contents).map_err(|source| CoreError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// A remap rule rewrites an example name into the stem used for derived
/// artifacts (screenshots, comparison results, reference outputs).
///
/// Kept as one ordered table consulted in a single place so every artifact
/// kind agrees on the stem; the first matching rule wins.
#[derive(Debug, Clone, Copy)]
enum RemapRule {
    /// Exact name alias.
    Exact {
        name: &'static str,
        stem: &'static str,
    },
    /// Leading-token substitution.
    Prefix {
        from: &'static str,
        to: &'static str,
    },
}

impl RemapRule {
    fn apply<'n>(&self, name: &'n str) -> Option<Cow<'n, str>> {
        match *self {
            RemapRule::Exact { name: n, stem } => (name == n).then(|| Cow::Borrowed(stem)),
            RemapRule::Prefix { from, to } => name
                .strip_prefix(from)
                .map(|rest| Cow::Owned(format!("{to}{rest}"))),
        }
    }
}

const REMAP_RULES: &[RemapRule] = &[
    RemapRule::Exact {
        name: "conditional_format1",
        stem: "conditional_format_simple",
    },
    RemapRule::Prefix {
        from: "dates_and_times",
        to: "date_and_times",
    },
];

/// Stem used for derived artifact basenames of `name`.
pub fn artifact_stem(name: &str) -> Cow<'_, str> {
    REMAP_RULES
        .iter()
        .find_map(|rule| rule.apply(name))
        .unwrap_or(Cow::Borrowed(name))
}

/// Output document extension for `name` (no dot).
pub fn output_ext(name: &str) -> &'static str {
    if name == MACRO_EXAMPLE {
        "xlsm"
    } else {
        "xlsx"
    }
}

/// One artifact: where it should be, and whether it is there right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub exists: bool,
}

impl Artifact {
    fn probe(path: PathBuf) -> Self {
        let exists = path.is_file();
        Self { path, exists }
    }
}

/// Every artifact the external pipeline can leave behind for one example.
///
/// Always computed on demand so repeated queries reflect the current
/// filesystem state.
#[derive(Debug, Clone)]
pub struct ArtifactSet {
    pub name: String,
    /// Target implementation source file.
    pub implementation: Artifact,
    /// Reference implementation source file.
    pub reference: Artifact,
    /// Combined comparison screenshot; gates classification.
    pub screenshot: Artifact,
    /// Reference-side rendering, input to direct image comparison.
    pub reference_screenshot: Artifact,
    /// Target-side rendering, input to direct image comparison.
    pub target_screenshot: Artifact,
    /// Free-text comparison result.
    pub result_text: Artifact,
    /// Target output document at its post-relocation location.
    pub output: Artifact,
    /// Reference output document.
    pub reference_output: Artifact,
    /// Freshly generated target output, not yet relocated.
    pub pending_output: Artifact,
}

/// Relative ages of the two implementation files. Diagnostic only; never
/// part of status computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Freshness {
    /// True when the target implementation is at least as new as the
    /// reference.
    pub target_is_newer: bool,
    /// Absolute gap between the two modification times, in whole seconds.
    pub lag_secs: u64,
}

/// A port workspace rooted at a directory.
#[derive(Debug, Clone)]
pub struct Layout {
    root: PathBuf,
    config: LayoutConfig,
}

impl Layout {
    /// Workspace with the conventional directory layout.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_config(root, LayoutConfig::default())
    }

    /// Workspace with an explicit layout config.
    #[must_use]
    pub fn with_config(root: impl Into<PathBuf>, config: LayoutConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    /// Workspace root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory scanned to enumerate the example set.
    #[must_use]
    pub fn reference_dir(&self) -> PathBuf {
        self.root.join(&self.config.reference_dir)
    }

    /// Extension of reference implementation files (no dot).
    #[must_use]
    pub fn reference_ext(&self) -> &str {
        &self.config.reference_ext
    }

    /// Resolve the full artifact set for `name`.
    ///
    /// Never fails: artifacts that are missing (or unreachable) are reported
    /// as absent.
    #[must_use]
    pub fn locate(&self, name: &str) -> ArtifactSet {
        let cfg = &self.config;
        let stem = artifact_stem(name);
        let ext = output_ext(name);

        let implementation = self
            .root
            .join(&cfg.target_dir)
            .join(format!("{name}.{}", cfg.target_ext));
        let reference = self
            .root
            .join(&cfg.reference_dir)
            .join(format!("{name}.{}", cfg.reference_ext));
        let shots = self.root.join(&cfg.screenshots_dir);
        let results = self.root.join(&cfg.results_dir);

        ArtifactSet {
            name: name.to_string(),
            implementation: Artifact::probe(implementation),
            reference: Artifact::probe(reference),
            screenshot: Artifact::probe(shots.join(format!("comparison_{stem}.png"))),
            reference_screenshot: Artifact::probe(shots.join(format!("c_{stem}.png"))),
            target_screenshot: Artifact::probe(shots.join(format!("zig_{stem}.png"))),
            result_text: Artifact::probe(results.join(format!("{stem}_output.txt"))),
            output: Artifact::probe(
                self.root
                    .join(&cfg.target_output_dir)
                    .join(format!("{name}.{ext}")),
            ),
            reference_output: Artifact::probe(
                self.root
                    .join(&cfg.reference_output_dir)
                    .join(format!("{stem}.{ext}")),
            ),
            pending_output: Artifact::probe(
                self.root
                    .join(format!("{}{name}.{ext}", cfg.pending_output_prefix)),
            ),
        }
    }

    /// Compare modification times of the implementation and reference files.
    ///
    /// Returns `None` when either file (or its mtime) is unavailable.
    #[must_use]
    pub fn freshness(&self, name: &str) -> Option<Freshness> {
        let set = self.locate(name);
        let target = mtime(&set.implementation.path)?;
        let reference = mtime(&set.reference.path)?;
        let (newer, older, target_is_newer) = if target >= reference {
            (target, reference, true)
        } else {
            (reference, target, false)
        };
        let lag_secs = newer.duration_since(older).ok()?.as_secs();
        Some(Freshness {
            target_is_newer,
            lag_secs,
        })
    }

    /// Move a freshly generated output document into the canonical output
    /// directory, creating it if needed. Returns the destination path.
    pub fn relocate_output(&self, name: &str) -> Result<PathBuf, CoreError> {
        let set = self.locate(name);
        if !set.pending_output.exists {
            return Err(CoreError::MissingOutput {
                path: set.pending_output.path,
            });
        }
        let dest = set.output.path;
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|source| CoreError::Relocate {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::rename(&set.pending_output.path, &dest).map_err(|source| CoreError::Relocate {
            path: dest.clone(),
            source,
        })?;
        Ok(dest)
    }
}

fn mtime(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).ok()?.modified().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write as _;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        File::create(path).expect("create");
    }

    #[test]
    fn test_artifact_stem_plain_name_unchanged() {
        assert_eq!(artifact_stem("chart_area"), "chart_area");
    }

    #[test]
    fn test_artifact_stem_exact_alias() {
        assert_eq!(artifact_stem("conditional_format1"), "conditional_format_simple");
    }

    #[test]
    fn test_artifact_stem_prefix_family() {
        assert_eq!(artifact_stem("dates_and_times01"), "date_and_times01");
        assert_eq!(artifact_stem("dates_and_times"), "date_and_times");
    }

    #[test]
    fn test_output_ext_macro_variant() {
        assert_eq!(output_ext("macro"), "xlsm");
        assert_eq!(output_ext("demo"), "xlsx");
    }

    #[test]
    fn test_locate_paths_follow_conventions() {
        let dir = TempDir::new().expect("tempdir");
        let layout = Layout::new(dir.path());
        let set = layout.locate("demo");

        assert_eq!(set.implementation.path, dir.path().join("examples/demo.zig"));
        assert_eq!(set.reference.path, dir.path().join("examples/c/demo.c"));
        assert_eq!(
            set.screenshot.path,
            dir.path().join("testing/screenshots/comparison_demo.png")
        );
        assert_eq!(
            set.result_text.path,
            dir.path().join("testing/comparison_results/demo_output.txt")
        );
        assert_eq!(
            set.output.path,
            dir.path().join("testing/zig-output-xls/demo.xlsx")
        );
        assert_eq!(set.pending_output.path, dir.path().join("zig-demo.xlsx"));
    }

    #[test]
    fn test_locate_remap_applies_to_every_derived_artifact() {
        let dir = TempDir::new().expect("tempdir");
        let layout = Layout::new(dir.path());
        let set = layout.locate("conditional_format1");

        // Derived artifacts use the remapped stem...
        assert!(set
            .screenshot
            .path
            .ends_with("comparison_conditional_format_simple.png"));
        assert!(set
            .reference_screenshot
            .path
            .ends_with("c_conditional_format_simple.png"));
        assert!(set
            .result_text
            .path
            .ends_with("conditional_format_simple_output.txt"));
        assert!(set
            .reference_output
            .path
            .ends_with("conditional_format_simple.xlsx"));
        // ...while source files and the relocated output keep the name.
        assert!(set.implementation.path.ends_with("conditional_format1.zig"));
        assert!(set.output.path.ends_with("conditional_format1.xlsx"));
    }

    #[test]
    fn test_locate_reports_existence_not_errors() {
        let dir = TempDir::new().expect("tempdir");
        let layout = Layout::new(dir.path());

        let set = layout.locate("demo");
        assert!(!set.implementation.exists);
        assert!(!set.screenshot.exists);

        touch(dir.path(), "examples/demo.zig");
        let set = layout.locate("demo");
        assert!(set.implementation.exists, "locate must re-probe every call");
    }

    #[test]
    fn test_freshness_requires_both_files() {
        let dir = TempDir::new().expect("tempdir");
        let layout = Layout::new(dir.path());
        assert!(layout.freshness("demo").is_none());

        touch(dir.path(), "examples/c/demo.c");
        touch(dir.path(), "examples/demo.zig");
        let fresh = layout.freshness("demo").expect("both files present");
        assert!(fresh.target_is_newer);
    }

    #[test]
    fn test_relocate_output_moves_pending_file() {
        let dir = TempDir::new().expect("tempdir");
        let layout = Layout::new(dir.path());

        let mut f = File::create(dir.path().join("zig-demo.xlsx")).expect("create");
        f.write_all(b"doc").expect("write");
        drop(f);

        let dest = layout.relocate_output("demo").expect("relocation");
        assert_eq!(dest, dir.path().join("testing/zig-output-xls/demo.xlsx"));
        assert!(dest.is_file());
        assert!(!dir.path().join("zig-demo.xlsx").exists());
    }

    #[test]
    fn test_relocate_output_missing_pending_is_typed_error() {
        let dir = TempDir::new().expect("tempdir");
        let layout = Layout::new(dir.path());
        let err = layout.relocate_output("demo").expect_err("nothing to move");
        assert!(matches!(err, CoreError::MissingOutput { .. }));
    }

    #[test]
    fn test_layout_config_partial_yaml_overlays_defaults() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("layout.yaml");
        fs::write(&path, "target_ext: rs\n").expect("write");

        let config = LayoutConfig::load_from_file(&path).expect("parse");
        assert_eq!(config.target_ext, "rs");
        assert_eq!(config.reference_dir, "examples/c");
    }

    #[test]
    fn test_layout_config_malformed_yaml_is_typed_error() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("layout.yaml");
        fs::write(&path, "target_ext: [unclosed\n").expect("write");

        let err = LayoutConfig::load_from_file(&path).expect_err("bad yaml");
        assert!(matches!(err, CoreError::ConfigParse { .. }));
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        fn strip<'a>(name: &'a str, prefix: &str, suffix: &str) -> &'a str {
            name.strip_prefix(prefix)
                .and_then(|s| s.strip_suffix(suffix))
                .expect("artifact basename shape")
        }

        proptest! {
            /// Every derived artifact of a name must agree on one stem,
            /// whatever the remap table did to it.
            #[test]
            fn prop_remap_consistent_across_artifact_kinds(name in "[a-z][a-z0-9_]{0,24}") {
                let layout = Layout::new("port-root");
                let set = layout.locate(&name);
                let file = |a: &Artifact| {
                    a.path
                        .file_name()
                        .and_then(|f| f.to_str())
                        .expect("utf8 basename")
                        .to_string()
                };

                let shot = file(&set.screenshot);
                let ref_shot = file(&set.reference_screenshot);
                let tgt_shot = file(&set.target_screenshot);
                let result = file(&set.result_text);
                let ref_out = file(&set.reference_output);

                let stem = strip(&shot, "comparison_", ".png").to_string();
                prop_assert_eq!(strip(&ref_shot, "c_", ".png"), stem.as_str());
                prop_assert_eq!(strip(&tgt_shot, "zig_", ".png"), stem.as_str());
                prop_assert_eq!(strip(&result, "", "_output.txt"), stem.as_str());
                let ext = format!(".{}", output_ext(&name));
                prop_assert_eq!(strip(&ref_out, "", &ext), stem.as_str());
            }
        }
    }
}
