//! Edit engine for site config files.
//!
//! Responsibilities:
//! - Compile the planned `(pattern, replacement)` pairs into line regexes.
//! - Apply them in order, in memory, to each config file.
//! - Write every changed file once, after all substitutions succeeded.
//! - Record sha256 digests and a unified diff preview.

pub mod error;

pub use error::{EditError, EditResult};

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use diffy::PatchFormatter;
use fs_err as fs;
use recipekit_types::plan::PlannedEdit;
use recipekit_types::report::{EditRecord, SubstitutionRecord};
use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use tracing::{debug, warn};

/// What to do when a pattern matches no line of its file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingPattern {
    #[default]
    Fail,
    Warn,
}

#[derive(Debug, Clone, Default)]
pub struct PatchOptions {
    pub dry_run: bool,
    pub on_missing: MissingPattern,
    /// Copy the original to `<file><suffix>` before overwriting it.
    pub backup_suffix: Option<String>,
}

/// A compiled substitution. The replacement is inserted literally.
#[derive(Debug, Clone)]
pub struct Substitution {
    pattern: Regex,
    replacement: String,
}

impl Substitution {
    pub fn new(pattern: &str, replacement: impl Into<String>) -> EditResult<Self> {
        let compiled = Regex::new(pattern).map_err(|source| EditError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self {
            pattern: compiled,
            replacement: replacement.into(),
        })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Rewrite every matching line of `contents`, returning the new text and
    /// the number of lines that matched.
    pub fn apply(&self, contents: &str) -> (String, u64) {
        let mut out = String::with_capacity(contents.len());
        let mut matched = 0u64;
        for line in contents.split_inclusive('\n') {
            let (body, eol) = match line.strip_suffix('\n') {
                Some(body) => (body, "\n"),
                None => (line, ""),
            };
            if self.pattern.is_match(body) {
                matched += 1;
                out.push_str(&self.pattern.replace_all(body, NoExpand(&self.replacement)));
            } else {
                out.push_str(body);
            }
            out.push_str(eol);
        }
        (out, matched)
    }
}

/// The in-memory result of patching one file.
#[derive(Debug, Clone)]
pub struct PatchOutcome {
    pub path: Utf8PathBuf,
    pub before: String,
    pub after: String,
    pub record: EditRecord,
}

impl PatchOutcome {
    pub fn changed(&self) -> bool {
        self.before != self.after
    }
}

/// Everything the edit phase did (or would do, in a dry run).
#[derive(Debug, Clone, Default)]
pub struct EditOutcome {
    pub files: Vec<PatchOutcome>,
    pub written: bool,
}

impl EditOutcome {
    pub fn records(&self) -> Vec<EditRecord> {
        self.files.iter().map(|f| f.record.clone()).collect()
    }

    pub fn patch(&self) -> String {
        render_patch(&self.files)
    }
}

/// Apply substitutions to `contents` in order.
///
/// Each substitution sees the output of the previous one.
pub fn apply_substitutions(
    path: &Utf8Path,
    contents: &str,
    substitutions: &[Substitution],
    on_missing: MissingPattern,
) -> EditResult<(String, Vec<SubstitutionRecord>)> {
    let mut current = contents.to_string();
    let mut records = Vec::with_capacity(substitutions.len());

    for sub in substitutions {
        let (next, matched) = sub.apply(&current);
        if matched == 0 {
            match on_missing {
                MissingPattern::Fail => {
                    return Err(EditError::PatternNotMatched {
                        pattern: sub.pattern().to_string(),
                        path: path.to_path_buf(),
                    });
                }
                MissingPattern::Warn => {
                    warn!(pattern = sub.pattern(), file = %path, "pattern matched no line");
                }
            }
        }
        records.push(SubstitutionRecord {
            pattern: sub.pattern().to_string(),
            lines_matched: matched,
        });
        current = next;
    }

    Ok((current, records))
}

fn abs_path(root: &Utf8Path, rel: &Utf8Path) -> Utf8PathBuf {
    if rel.is_absolute() {
        rel.to_path_buf()
    } else {
        root.join(rel)
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn compute_edit(root: &Utf8Path, edit: &PlannedEdit, opts: &PatchOptions) -> EditResult<PatchOutcome> {
    let rel = Utf8Path::new(&edit.path);
    let abs = abs_path(root, rel);

    let substitutions = edit
        .substitutions
        .iter()
        .map(|s| Substitution::new(&s.pattern, s.replacement.as_str()))
        .collect::<EditResult<Vec<_>>>()?;

    let before = match fs::read_to_string(&abs) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(EditError::ConfigFileMissing { path: abs });
        }
        Err(e) => {
            return Err(anyhow::Error::new(e)
                .context(format!("read config file {abs}"))
                .into());
        }
    };
    let (after, substitutions) = apply_substitutions(rel, &before, &substitutions, opts.on_missing)?;

    let record = EditRecord {
        path: edit.path.clone(),
        sha256_before: sha256_hex(before.as_bytes()),
        sha256_after: sha256_hex(after.as_bytes()),
        substitutions,
    };
    Ok(PatchOutcome {
        path: rel.to_path_buf(),
        before,
        after,
        record,
    })
}

/// Compute every edit without touching the file system.
pub fn preview_edits(
    root: &Utf8Path,
    edits: &[PlannedEdit],
    opts: &PatchOptions,
) -> EditResult<EditOutcome> {
    let files = edits
        .iter()
        .map(|e| compute_edit(root, e, opts))
        .collect::<EditResult<Vec<_>>>()?;
    Ok(EditOutcome {
        files,
        written: false,
    })
}

/// Apply edits relative to `root`. When `opts.dry_run` is true, no files are
/// written, but records and a patch are still produced.
pub fn apply_edits(
    root: &Utf8Path,
    edits: &[PlannedEdit],
    opts: &PatchOptions,
) -> EditResult<EditOutcome> {
    let mut outcome = preview_edits(root, edits, opts)?;
    if opts.dry_run {
        return Ok(outcome);
    }

    // Write only changed files.
    for file in &outcome.files {
        if !file.changed() {
            debug!(file = %file.path, "config file already up to date");
            continue;
        }
        let abs = abs_path(root, &file.path);
        if let Some(suffix) = &opts.backup_suffix {
            let backup = format!("{abs}{suffix}");
            fs::copy(&abs, &backup).with_context(|| format!("back up {abs}"))?;
        }
        fs::write(&abs, &file.after).with_context(|| format!("write {abs}"))?;
        debug!(file = %file.path, "config file patched");
    }
    outcome.written = true;
    Ok(outcome)
}

fn render_patch(files: &[PatchOutcome]) -> String {
    let mut out = String::new();
    let formatter = PatchFormatter::new();

    for file in files {
        if !file.changed() {
            continue;
        }
        let path = file.path.as_str().trim_start_matches("./");
        out.push_str(&format!("--- a/{0}\n+++ b/{0}\n", path));

        let patch = diffy::create_patch(&file.before, &file.after);
        let body = formatter.fmt_patch(&patch).to_string();
        // diffy repeats the file header; keep only the hunks
        let hunks = body
            .split_once("\n@@")
            .map(|(_, rest)| format!("@@{rest}"))
            .unwrap_or(body);
        out.push_str(&hunks);
        if !out.ends_with('\n') {
            out.push('\n');
        }
    }

    out
}
