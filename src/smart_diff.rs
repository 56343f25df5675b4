use crate::diff::{is_ignorable, split_lines};
use crate::error::{Result, VcsError};
use crate::objects::ObjectKind;
use crate::repo::Repository;
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::sync::OnceLock;

/// Function-granularity diff: lines are grouped under the nearest preceding
/// function signature and two snapshots of the same function are compared
/// as whitespace-normalized line lists.
///
/// Boundary detection is a single-line regex heuristic (`name(args) {`), not
/// a parser. Multi-line signatures, nested braces, and syntaxes that do not
/// put the opening brace on the signature line all defeat it; those lines
/// simply accrue to whichever function was last opened.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SmartDiffReport {
    pub files: Vec<FileFunctions>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct FileFunctions {
    pub path: String,
    /// Names of functions whose normalized bodies differ, sorted.
    pub functions: Vec<String>,
}

fn signature_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"([A-Za-z_][A-Za-z0-9_]*)\(([^)]*)\)\s*\{").unwrap()
    })
}

/// The identifier of a `name(args) {` signature on this line, if any.
pub fn extract_function_name(line: &str) -> Option<String> {
    signature_pattern()
        .captures(line)
        .map(|caps| caps[1].to_string())
}

fn normalize_whitespace(line: &str) -> String {
    line.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Groups one side's lines by function name. A signature line switches the
/// current function and is included in its own body; lines seen before any
/// signature belong to no function and are dropped.
fn collect_functions(
    lines: &[String],
    ignore_empty: bool,
    ignore_whitespace: bool,
) -> HashMap<String, Vec<String>> {
    let mut functions: HashMap<String, Vec<String>> = HashMap::new();
    let mut current: Option<String> = None;
    for line in lines {
        if is_ignorable(line, ignore_empty, ignore_whitespace) {
            continue;
        }
        if let Some(name) = extract_function_name(line) {
            current = Some(name);
        }
        if let Some(name) = &current {
            functions
                .entry(name.clone())
                .or_default()
                .push(normalize_whitespace(line));
        }
    }
    functions
}

fn modified_functions(
    old: &[String],
    new: &[String],
    ignore_empty: bool,
    ignore_whitespace: bool,
) -> Vec<String> {
    let old_functions = collect_functions(old, ignore_empty, ignore_whitespace);
    let new_functions = collect_functions(new, ignore_empty, ignore_whitespace);
    let mut changed: Vec<String> = old_functions
        .iter()
        .filter(|(name, body)| new_functions.get(*name).is_some_and(|b| b != *body))
        .map(|(name, _)| name.clone())
        .collect();
    changed.sort();
    changed
}

impl Repository {
    /// Reports, per tracked file, the functions whose bodies changed between
    /// HEAD's snapshot and the working copy. Functions present on only one
    /// side are never reported; only names found in both snapshots are
    /// compared. `NoCommits` while HEAD is the sentinel. A corrupt blob
    /// drops its file from the comparison; the walk over the remaining
    /// tree entries continues.
    pub fn diff_smart(
        &self,
        ignore_empty: bool,
        ignore_whitespace: bool,
    ) -> Result<SmartDiffReport> {
        self.ensure_initialized()?;
        let tree = self.head_tree()?;
        let store = self.store();
        let mut report = SmartDiffReport::default();
        for (path, blob_digest) in tree {
            let working = self.root().join(&path);
            if !working.exists() {
                // no new side, so no function exists on both sides
                continue;
            }
            let old = match store.read(ObjectKind::Blob, &blob_digest) {
                Ok(data) => data,
                Err(VcsError::ObjectCorrupt { .. }) => continue,
                Err(e) => return Err(e),
            };
            let old_lines = split_lines(&old);
            let new_lines = split_lines(&fs::read(&working)?);
            let functions =
                modified_functions(&old_lines, &new_lines, ignore_empty, ignore_whitespace);
            if !functions.is_empty() {
                report.files.push(FileFunctions { path, functions });
            }
        }
        Ok(report)
    }
}
