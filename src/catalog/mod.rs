//! Script discovery for the dashboard.
//!
//! The catalog comes from `config/config.json` when that file lists scripts,
//! otherwise from a scan of the jobs directory.

pub mod inputs;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::models::{catalog_source, Catalog, CatalogEntry, ScriptSpec};

pub const NO_DESCRIPTION: &str = "(no description)";

/// Typed error for catalog lookups, downcast by the HTTP layer into a 404
#[derive(Debug)]
pub enum ScriptNotFound {
    UnknownId(String),
    MissingFile(String),
}

impl std::fmt::Display for ScriptNotFound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownId(id) => write!(f, "Script not found: {}", id),
            Self::MissingFile(file) => write!(f, "Configured script file not found: {}", file),
        }
    }
}

impl std::error::Error for ScriptNotFound {}

/// Contents of config/config.json
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub scripts: Vec<ScriptSpec>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Find the jobs directory under `root`, accepting `jobs` or `Jobs`.
/// Creates `jobs` when neither exists.
pub fn find_jobs_dir(root: &Path) -> PathBuf {
    for name in ["jobs", "Jobs"] {
        let candidate = root.join(name);
        if candidate.is_dir() {
            return candidate;
        }
    }
    let jobs = root.join("jobs");
    if let Err(e) = fs::create_dir_all(&jobs) {
        tracing::warn!("Could not create jobs directory {}: {}", jobs.display(), e);
    }
    jobs
}

/// Read the catalog config. Missing, blank or malformed files all yield None.
///
/// Entries are parsed one at a time: a bad entry or widget is skipped with a
/// warning instead of discarding the whole catalog.
pub fn load_catalog_config(path: &Path) -> Option<CatalogConfig> {
    let text = fs::read_to_string(path).ok()?;
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let mut raw: Map<String, Value> = match serde_json::from_str(text) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!("Ignoring invalid catalog config {}: {}", path.display(), e);
            return None;
        }
    };

    let scripts = match raw.remove("scripts") {
        Some(Value::Array(items)) => items
            .into_iter()
            .enumerate()
            .filter_map(|(i, item)| parse_script_spec(path, i, item))
            .collect(),
        None | Some(Value::Null) => Vec::new(),
        Some(_) => {
            tracing::warn!("Ignoring `scripts` in {}: expected a list", path.display());
            Vec::new()
        }
    };
    Some(CatalogConfig { scripts, extra: raw })
}

fn parse_script_spec(path: &Path, index: usize, mut item: Value) -> Option<ScriptSpec> {
    let inputs = item.as_object_mut().and_then(|obj| obj.remove("inputs"));
    let mut spec: ScriptSpec = match serde_json::from_value(without_nulls(item)) {
        Ok(spec) => spec,
        Err(e) => {
            tracing::warn!("Skipping script #{} in {}: {}", index + 1, path.display(), e);
            return None;
        }
    };

    spec.inputs = match inputs {
        None | Some(Value::Null) => None,
        Some(Value::Array(items)) => Some(
            items
                .into_iter()
                .filter_map(|input| match serde_json::from_value(without_nulls(input)) {
                    Ok(input) => Some(input),
                    Err(e) => {
                        tracing::warn!("Skipping an input of script #{} in {}: {}", index + 1, path.display(), e);
                        None
                    }
                })
                .collect(),
        ),
        Some(_) => {
            tracing::warn!("Ignoring inputs of script #{} in {}: expected a list", index + 1, path.display());
            None
        }
    };
    Some(spec)
}

/// Treat `null` members as absent so their defaults apply
fn without_nulls(mut value: Value) -> Value {
    if let Value::Object(obj) = &mut value {
        obj.retain(|_, v| !v.is_null());
    }
    value
}

/// Locate a configured script file.
/// Relative names are tried against the root, then the jobs dir, then by bare file name in the jobs dir.
pub fn resolve_script_path(root: &Path, jobs_dir: &Path, file: &str) -> Option<PathBuf> {
    let given = Path::new(file);
    if given.is_absolute() {
        return given.exists().then(|| given.to_path_buf());
    }

    let mut candidates = vec![root.join(given), jobs_dir.join(given)];
    if let Some(name) = given.file_name() {
        candidates.push(jobs_dir.join(name));
    }
    candidates.into_iter().find(|p| p.exists())
}

/// One-line summary of a script: its module docstring, else a leading comment
pub fn script_description(path: &Path) -> String {
    let Ok(src) = fs::read_to_string(path) else {
        return NO_DESCRIPTION.to_string();
    };

    if path.extension().is_some_and(|ext| ext == "py") {
        if let Some(doc) = module_docstring(&src) {
            return doc;
        }
    }

    for line in src.lines().map(str::trim) {
        if line.starts_with("#!") || line.is_empty() {
            continue;
        }
        if line.starts_with('#') {
            let text = line.trim_start_matches(|c| c == '#' || c == ' ');
            if !text.is_empty() {
                return text.to_string();
            }
            continue;
        }
        break;
    }
    NO_DESCRIPTION.to_string()
}

/// First line of a Python module docstring, skipping leading comments
fn module_docstring(src: &str) -> Option<String> {
    let mut rest = src;
    loop {
        let trimmed = rest.trim_start();
        if trimmed.starts_with('#') {
            rest = trimmed.split_once('\n').map(|(_, r)| r).unwrap_or("");
            continue;
        }
        rest = trimmed;
        break;
    }

    let quote = ["\"\"\"", "'''", "\"", "'"].into_iter().find(|q| rest.starts_with(q))?;
    let body = &rest[quote.len()..];
    // A single-quoted string must close on its own line
    let body = if quote.len() == 1 { body.lines().next().unwrap_or("") } else { body };
    let end = body.find(quote)?;
    body[..end]
        .trim()
        .lines()
        .next()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
}

/// Whether a scanned file can be launched
fn is_runnable(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }
    if path.extension().is_some_and(|ext| ext == "py" || ext == "sh") {
        return true;
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Ok(meta) = path.metadata() {
            return meta.permissions().mode() & 0o111 != 0;
        }
    }
    false
}

fn file_stem(file: &str) -> Option<String> {
    Path::new(file)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
}

fn entry_from_spec(index: usize, spec: ScriptSpec, root: &Path, jobs_dir: &Path) -> CatalogEntry {
    let path = spec
        .file
        .as_deref()
        .and_then(|f| resolve_script_path(root, jobs_dir, f));
    if path.is_none() {
        tracing::warn!("Catalog entry {:?} points at a missing file {:?}", spec.id, spec.file);
    }

    let id = spec
        .id
        .or_else(|| spec.file.as_deref().and_then(file_stem))
        .unwrap_or_else(|| format!("script-{}", index + 1));
    let name = spec
        .name
        .or_else(|| {
            spec.file
                .as_deref()
                .and_then(|f| Path::new(f).file_name())
                .map(|n| n.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| id.clone());
    let description = spec
        .description
        .filter(|d| !d.trim().is_empty())
        .or_else(|| path.as_deref().map(script_description))
        .unwrap_or_else(|| NO_DESCRIPTION.to_string());

    CatalogEntry {
        id,
        name,
        file: spec.file,
        description,
        path,
        inputs: spec.inputs.unwrap_or_default(),
        extra: spec.extra,
    }
}

/// Runnable files of the jobs directory, sorted by name
pub fn scan_jobs_dir(root: &Path, jobs_dir: &Path) -> Vec<CatalogEntry> {
    let mut paths: Vec<PathBuf> = match fs::read_dir(jobs_dir) {
        Ok(rd) => rd.filter_map(|e| e.ok()).map(|e| e.path()).filter(|p| is_runnable(p)).collect(),
        Err(e) => {
            tracing::warn!("Could not scan {}: {}", jobs_dir.display(), e);
            Vec::new()
        }
    };
    paths.sort();

    paths
        .into_iter()
        .map(|p| {
            let name = p
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let file = p.strip_prefix(root).unwrap_or(&p).to_string_lossy().into_owned();
            CatalogEntry {
                id: file_stem(&name).unwrap_or_else(|| name.clone()),
                name,
                file: Some(file),
                description: script_description(&p),
                path: Some(p),
                inputs: Vec::new(),
                extra: Map::new(),
            }
        })
        .collect()
}

impl Catalog {
    /// Build the catalog for `cfg`: configured scripts first, jobs scan as fallback
    pub fn load(cfg: &Config) -> Self {
        let jobs_dir = cfg.jobs_dir();
        let configured: Vec<CatalogEntry> = load_catalog_config(&cfg.catalog_config)
            .map(|c| c.scripts)
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(i, spec)| entry_from_spec(i, spec, &cfg.root_dir, &jobs_dir))
            .collect();

        if !configured.is_empty() {
            return Self {
                source: catalog_source::CONFIG,
                entries: configured,
            };
        }

        let entries = scan_jobs_dir(&cfg.root_dir, &jobs_dir);
        if entries.is_empty() {
            tracing::warn!(
                "No scripts found in {} or {}",
                cfg.catalog_config.display(),
                jobs_dir.display()
            );
        }
        Self {
            source: catalog_source::SCAN,
            entries,
        }
    }

    /// Look up an entry, failing with a typed error for unknown ids
    pub fn find(&self, id: &str) -> Result<&CatalogEntry> {
        self.get(id)
            .ok_or_else(|| ScriptNotFound::UnknownId(id.to_string()).into())
    }
}

impl CatalogEntry {
    /// Resolved file of the entry, failing when the configured file is missing
    pub fn require_path(&self) -> Result<&Path> {
        self.path.as_deref().ok_or_else(|| {
            ScriptNotFound::MissingFile(self.file.clone().unwrap_or_default()).into()
        })
    }

    pub fn read_source(&self) -> Result<String> {
        let path = self.require_path()?;
        fs::read_to_string(path).with_context(|| format!("Could not read file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn root_with(files: &[(&str, &str)]) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (name, body) in files {
            let path = dir.path().join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, body).unwrap();
        }
        dir
    }

    #[test]
    fn test_find_jobs_dir_prefers_existing() {
        let dir = root_with(&[("Jobs/lab.py", "")]);
        assert_eq!(find_jobs_dir(dir.path()), dir.path().join("Jobs"));

        let empty = tempfile::tempdir().unwrap();
        let created = find_jobs_dir(empty.path());
        assert_eq!(created, empty.path().join("jobs"));
        assert!(created.is_dir());
    }

    #[test]
    fn test_load_catalog_config_tolerates_bad_files() {
        let dir = root_with(&[("blank.json", "  \n"), ("broken.json", "{not json")]);
        assert!(load_catalog_config(&dir.path().join("missing.json")).is_none());
        assert!(load_catalog_config(&dir.path().join("blank.json")).is_none());
        assert!(load_catalog_config(&dir.path().join("broken.json")).is_none());
    }

    #[test]
    fn test_bad_widget_does_not_drop_catalog() {
        let config = r#"{"scripts": [
            {"id": "lab2", "file": "jobs/lab2.sh", "inputs": [
                {"name": "username", "arg": "--username", "type": null},
                {"name": "routers", "type": "select", "choices": "a,b"},
                {"name": "count", "arg": "--count", "type": "int"}
            ]},
            {"id": 7, "file": "jobs/odd.sh"},
            {"id": "lab3", "file": "jobs/lab3.sh", "inputs": "none"}
        ]}"#;
        let dir = root_with(&[("config.json", config)]);
        let parsed = load_catalog_config(&dir.path().join("config.json")).unwrap();

        let ids: Vec<_> = parsed.scripts.iter().map(|s| s.id.as_deref()).collect();
        assert_eq!(ids, vec![Some("lab2"), Some("lab3")]);
        let inputs = parsed.scripts[0].inputs.as_ref().unwrap();
        let names: Vec<_> = inputs.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["username", "count"]);
        assert_eq!(inputs[0].kind, crate::models::InputKind::Text);
        assert!(parsed.scripts[1].inputs.is_none());
    }

    #[test]
    fn test_resolve_script_path_order() {
        let dir = root_with(&[("jobs/lab2.sh", "echo hi")]);
        let jobs = dir.path().join("jobs");
        assert_eq!(resolve_script_path(dir.path(), &jobs, "jobs/lab2.sh"), Some(dir.path().join("jobs/lab2.sh")));
        assert_eq!(resolve_script_path(dir.path(), &jobs, "lab2.sh"), Some(jobs.join("lab2.sh")));
        assert_eq!(resolve_script_path(dir.path(), &jobs, "elsewhere/lab2.sh"), Some(jobs.join("lab2.sh")));
        assert_eq!(resolve_script_path(dir.path(), &jobs, "nope.sh"), None);
    }

    #[test]
    fn test_script_description_sources() {
        let dir = root_with(&[
            ("doc.py", "#!/usr/bin/env python3\n\"\"\"Run show commands.\n\nMore text.\n\"\"\"\nimport sys\n"),
            ("comment.sh", "#!/bin/sh\n# Ping every device once\necho\n"),
            ("bare.sh", "echo hi\n# too late\n"),
        ]);
        assert_eq!(script_description(&dir.path().join("doc.py")), "Run show commands.");
        assert_eq!(script_description(&dir.path().join("comment.sh")), "Ping every device once");
        assert_eq!(script_description(&dir.path().join("bare.sh")), NO_DESCRIPTION);
        assert_eq!(script_description(&dir.path().join("absent.sh")), NO_DESCRIPTION);
    }

    #[test]
    fn test_single_quoted_docstrings() {
        let dir = root_with(&[
            ("double.py", "# lab helper\n\"Run labs\"\nimport os\n"),
            ("single.py", "'Ping check'\n"),
            ("open.py", "\"unterminated\nimport os\n"),
        ]);
        assert_eq!(script_description(&dir.path().join("double.py")), "Run labs");
        assert_eq!(script_description(&dir.path().join("single.py")), "Ping check");
        assert_eq!(script_description(&dir.path().join("open.py")), NO_DESCRIPTION);
    }

    #[test]
    fn test_catalog_from_config_keeps_missing_entries() {
        let config = r#"{"scripts": [
            {"id": "lab2", "name": "Lab 2", "file": "jobs/lab2.sh",
             "inputs": [{"name": "username", "arg": "--username"}]},
            {"name": "Ghost", "file": "jobs/ghost.sh"}
        ]}"#;
        let dir = root_with(&[("config/config.json", config), ("jobs/lab2.sh", "# Lab two\n")]);
        let catalog = Catalog::load(&Config::with_root(dir.path()));

        assert!(catalog.is_config_driven());
        assert_eq!(catalog.entries.len(), 2);
        let lab2 = catalog.find("lab2").unwrap();
        assert_eq!(lab2.description, "Lab two");
        assert_eq!(lab2.inputs.len(), 1);

        let ghost = catalog.find("ghost").unwrap();
        assert!(ghost.path.is_none());
        let err = ghost.require_path().unwrap_err();
        assert_eq!(err.to_string(), "Configured script file not found: jobs/ghost.sh");
        assert!(err.downcast_ref::<ScriptNotFound>().is_some());
    }

    #[test]
    fn test_catalog_falls_back_to_scan() {
        let dir = root_with(&[
            ("config/config.json", r#"{"scripts": []}"#),
            ("jobs/b.sh", "# Second\n"),
            ("jobs/a.py", "\"\"\"First\"\"\"\n"),
            ("jobs/notes.txt", "not runnable"),
        ]);
        let catalog = Catalog::load(&Config::with_root(dir.path()));

        assert_eq!(catalog.source, catalog_source::SCAN);
        let ids: Vec<&str> = catalog.entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(catalog.entries[0].name, "a.py");
        assert_eq!(catalog.entries[0].description, "First");
        assert!(catalog.entries[1].inputs.is_empty());
        assert!(catalog.find("notes").is_err());
    }
}
