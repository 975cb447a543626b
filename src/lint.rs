//! Kind schema linting
//!
//! Flags schema entries that normalize fine but produce poor or
//! surprising examples.
//!
//! ## Lints
//! - **Errors**: `MALFORMED_CHAIN`, `EMPTY_CONSTRAINT`
//! - **Warnings**: `UNNAMED_TAG`, `MISSING_FIELD_TYPE`,
//!   `UNKNOWN_FIELD_TYPE`, `STRAY_EITHER`,
//!   `DUPLICATE_TAG`, `MISSING_DESCRIPTION`, `UNKNOWN_CONTENT`,
//!   `UNUSUAL_TAG_NAME`

use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;

use crate::schema::{ContentFormat, FieldChain, FieldType, KindRecord, TagSpec};

/// Result of linting one kind
#[derive(Debug, Default, Serialize)]
pub struct LintResult {
    pub kind: u32,
    pub errors: Vec<LintIssue>,
    pub warnings: Vec<LintIssue>,
}

impl LintResult {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

#[derive(Debug, Serialize)]
pub struct LintIssue {
    pub code: &'static str,
    pub message: String,
    /// e.g. `tags[2].next[1]`
    pub path: String,
}

impl LintIssue {
    fn new(code: &'static str, message: String, path: String) -> Self {
        Self { code, message, path }
    }
}

/// The kind schema linter
pub struct SchemaLinter {
    tag_name: Regex,
}

impl Default for SchemaLinter {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaLinter {
    pub fn new() -> Self {
        Self {
            tag_name: Regex::new(r"^[A-Za-z0-9_\-:.]+$").expect("tag name pattern is valid"),
        }
    }

    /// Lint a single kind
    pub fn lint(&self, kind: &KindRecord) -> LintResult {
        let mut result = LintResult {
            kind: kind.number,
            ..Default::default()
        };

        if !kind.has_description() {
            result.warnings.push(LintIssue::new(
                "MISSING_DESCRIPTION",
                format!("Kind {} has no description", kind.number),
                "description".to_string(),
            ));
        }

        if kind.content == ContentFormat::Unknown {
            result.warnings.push(LintIssue::new(
                "UNKNOWN_CONTENT",
                "Content format is missing or not one of json, free, empty".to_string(),
                "content".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for (i, tag) in kind.tags.iter().enumerate() {
            let path = format!("tags[{}]", i);
            if let Some(name) = tag.discriminator() {
                if !seen.insert(name) {
                    result.warnings.push(LintIssue::new(
                        "DUPLICATE_TAG",
                        format!("Tag '{}' is declared more than once", name),
                        path.clone(),
                    ));
                }
            }
            self.lint_tag(tag, &path, &mut result);
        }

        result
    }

    /// Lint every kind, keeping only results with something to report
    pub fn lint_all(&self, kinds: &[KindRecord]) -> Vec<LintResult> {
        kinds
            .iter()
            .map(|kind| self.lint(kind))
            .filter(|result| !result.is_clean() || result.has_warnings())
            .collect()
    }

    fn lint_tag(&self, tag: &TagSpec, path: &str, result: &mut LintResult) {
        match tag.discriminator() {
            None => result.warnings.push(LintIssue::new(
                "UNNAMED_TAG",
                "Tag has neither name nor prefix".to_string(),
                path.to_string(),
            )),
            Some(name) if !self.tag_name.is_match(name) => result.warnings.push(LintIssue::new(
                "UNUSUAL_TAG_NAME",
                format!("Tag name '{}' contains unexpected characters", name),
                path.to_string(),
            )),
            Some(_) => {}
        }

        let fields = match &tag.chain {
            FieldChain::Fields(fields) => fields,
            FieldChain::Malformed { limit } => {
                result.errors.push(LintIssue::new(
                    "MALFORMED_CHAIN",
                    format!("Field chain is cyclic or longer than {} fields", limit),
                    format!("{}.next", path),
                ));
                return;
            }
        };

        for (i, field) in fields.iter().enumerate() {
            let field_path = format!("{}.next[{}]", path, i);
            match &field.field_type {
                FieldType::Constrained if field.either.is_empty() => {
                    result.errors.push(LintIssue::new(
                        "EMPTY_CONSTRAINT",
                        "Constrained field lists no allowed values".to_string(),
                        field_path,
                    ));
                }
                FieldType::Constrained => {}
                other => {
                    match other {
                        FieldType::Missing => result.warnings.push(LintIssue::new(
                            "MISSING_FIELD_TYPE",
                            "Field declares no type and falls back to a generic value".to_string(),
                            field_path.clone(),
                        )),
                        FieldType::Other(label) => result.warnings.push(LintIssue::new(
                            "UNKNOWN_FIELD_TYPE",
                            format!("Unknown field type '{}' falls back to a generic value", label),
                            field_path.clone(),
                        )),
                        _ => {}
                    }
                    if !field.either.is_empty() {
                        result.warnings.push(LintIssue::new(
                            "STRAY_EITHER",
                            format!("'either' is ignored on a '{}' field", other),
                            field_path,
                        ));
                    }
                }
            }
        }
    }
}
