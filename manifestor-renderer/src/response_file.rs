//! Compiler response files (`csc.rsp` style).
//!
//! Options are whitespace separated, may be quoted, and take either a `-` or
//! a `/` prefix. Lines starting with `#` are comments. Options that do not
//! affect manifests are ignored.
//!
//! Merge order: the unit record supplies the defaults, response files apply
//! in their listed order, and within one file the last occurrence of an
//! option wins. `unsafe`, `nullable` and `langversion` override; defines and
//! references accumulate.

use std::path::{Path, PathBuf};

use crate::error::{io_err, RenderError};

/// Options collected from one or more response files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseFileOptions {
    pub defines: Vec<String>,
    pub references: Vec<PathBuf>,
    pub allow_unsafe: Option<bool>,
    pub nullable: Option<String>,
    pub lang_version: Option<String>,
}

impl ResponseFileOptions {
    /// Parse the text of one response file into a fresh option set.
    pub fn parse(text: &str) -> Self {
        let mut options = ResponseFileOptions::default();
        options.apply(text);
        options
    }

    /// Read and apply every file in `paths`, in order. Relative paths are
    /// resolved against `root`.
    pub fn load_all(root: &Path, paths: &[PathBuf]) -> Result<Self, RenderError> {
        let mut options = ResponseFileOptions::default();
        for path in paths {
            let full = root.join(path);
            let text = std::fs::read_to_string(&full).map_err(|e| io_err(&full, e))?;
            options.apply(&text);
        }
        Ok(options)
    }

    /// Apply the options of one file on top of the current values.
    pub fn apply(&mut self, text: &str) {
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            for token in tokenize(line) {
                self.apply_token(&token);
            }
        }
    }

    fn apply_token(&mut self, token: &str) {
        let Some(option) = token.strip_prefix('-').or_else(|| token.strip_prefix('/')) else {
            tracing::debug!("ignoring response file token '{token}'");
            return;
        };
        let (name, value) = match option.split_once(':') {
            Some((name, value)) => (name, Some(value)),
            None => (option, None),
        };

        match (name.to_ascii_lowercase().as_str(), value) {
            ("define" | "d", Some(list)) => {
                self.defines.extend(
                    list.split([';', ','])
                        .map(str::trim)
                        .filter(|d| !d.is_empty())
                        .map(str::to_string),
                );
            }
            ("reference" | "r", Some(path)) if !path.is_empty() => {
                self.references.push(PathBuf::from(path));
            }
            ("unsafe" | "unsafe+", None) => self.allow_unsafe = Some(true),
            ("unsafe-", None) => self.allow_unsafe = Some(false),
            ("nullable" | "nullable+", None) => self.nullable = Some("enable".to_string()),
            ("nullable-", None) => self.nullable = Some("disable".to_string()),
            ("nullable", Some(v)) if !v.is_empty() => self.nullable = Some(v.to_string()),
            ("langversion", Some(v)) if !v.is_empty() => self.lang_version = Some(v.to_string()),
            _ => tracing::debug!("ignoring response file option '{token}'"),
        }
    }
}

/// Split on whitespace outside double quotes; quotes are dropped.
fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    for ch in line.chars() {
        match ch {
            '"' => quoted = !quoted,
            c if c.is_whitespace() && !quoted => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}
