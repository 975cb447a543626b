//! Kind Registry
//!
//! Owns the normalized kind list loaded from one schema document. The
//! list is only ever replaced whole: [`KindRegistry::reload`] parses the
//! new document completely before swapping it in, so a failed reload
//! leaves the previous snapshot installed.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use include_dir::{include_dir, Dir};
use serde::Serialize;
use tracing::{debug, info};

use crate::checksum::Checksum;
use crate::config::KindsConfig;
use crate::error::{KindError, Result};
use crate::lint::{LintResult, SchemaLinter};
use crate::normalize::{normalize_with_report, RawSchema};
use crate::schema::KindRecord;
use crate::search::{search, suggest, Suggestion};
use crate::synth::{ExampleEvent, ExampleSynthesizer};

/// Bundled schema documents, compiled into the binary
static EMBEDDED: Dir<'static> = include_dir!("$CARGO_MANIFEST_DIR/registry");

/// Name of the bundled kinds document inside [`EMBEDDED`]
pub const EMBEDDED_DOCUMENT: &str = "kinds.yaml";

/// Where a snapshot was loaded from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaSource {
    Path(PathBuf),
    Embedded,
    /// Parsed from a caller-supplied string; cannot be reloaded
    Inline,
}

impl fmt::Display for SchemaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaSource::Path(path) => write!(f, "{}", path.display()),
            SchemaSource::Embedded => write!(f, "<embedded {}>", EMBEDDED_DOCUMENT),
            SchemaSource::Inline => write!(f, "<inline>"),
        }
    }
}

/// Load facts about one snapshot, for status output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistrySummary {
    pub source: String,
    pub kinds: usize,
    pub skipped: usize,
    pub checksum: String,
    pub loaded_at: DateTime<Utc>,
}

/// A loaded, normalized kinds document
#[derive(Debug)]
pub struct KindRegistry {
    kinds: Vec<KindRecord>,
    skipped: Vec<KindError>,
    checksum: Checksum,
    loaded_at: DateTime<Utc>,
    source: SchemaSource,
}

impl KindRegistry {
    /// Parse a kinds document held in memory
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Self::parse(text, SchemaSource::Inline)
    }

    /// Load a kinds document from disk
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let text = read_document(&path)?;
        Self::parse(&text, SchemaSource::Path(path))
    }

    /// Load the document bundled with this crate
    pub fn from_embedded() -> Result<Self> {
        Self::parse(embedded_document()?, SchemaSource::Embedded)
    }

    /// Load according to configuration, falling back to the bundled
    /// document when the configured path is missing and fallback is on
    pub fn open(config: &KindsConfig) -> Result<Self> {
        let path = config.schema_path();
        if !path.exists() && config.registry.embedded_fallback {
            info!(path = %path.display(), "schema document not found, using embedded copy");
            return Self::from_embedded();
        }
        Self::from_path(path)
    }

    fn parse(text: &str, source: SchemaSource) -> Result<Self> {
        let raw = RawSchema::from_yaml_str(text)?;
        let report = normalize_with_report(&raw);
        let checksum = Checksum::of_document(text);

        info!(
            source = %source,
            kinds = report.kinds.len(),
            skipped = report.skipped.len(),
            checksum = checksum.short(),
            "loaded kinds document"
        );

        Ok(Self {
            kinds: report.kinds,
            skipped: report.skipped,
            checksum,
            loaded_at: Utc::now(),
            source,
        })
    }

    /// Re-read the source document and replace the snapshot wholesale.
    ///
    /// Returns whether the document changed. On error the current
    /// snapshot is kept.
    pub fn reload(&mut self) -> Result<bool> {
        let fresh = match &self.source {
            SchemaSource::Path(path) => Self::from_path(path)?,
            SchemaSource::Embedded => Self::from_embedded()?,
            SchemaSource::Inline => {
                debug!("inline registry has no source to reload");
                return Ok(false);
            }
        };

        let changed = fresh.checksum != self.checksum;
        *self = fresh;
        Ok(changed)
    }

    /// All kinds, ascending by number
    pub fn kinds(&self) -> &[KindRecord] {
        &self.kinds
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Entries dropped during normalization
    pub fn skipped(&self) -> &[KindError] {
        &self.skipped
    }

    pub fn checksum(&self) -> &Checksum {
        &self.checksum
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn source(&self) -> &SchemaSource {
        &self.source
    }

    pub fn summary(&self) -> RegistrySummary {
        RegistrySummary {
            source: self.source.to_string(),
            kinds: self.kinds.len(),
            skipped: self.skipped.len(),
            checksum: self.checksum.short().to_string(),
            loaded_at: self.loaded_at,
        }
    }

    /// Look up a kind by number
    pub fn get(&self, number: u32) -> Option<&KindRecord> {
        self.kinds
            .binary_search_by_key(&number, |k| k.number)
            .ok()
            .map(|idx| &self.kinds[idx])
    }

    pub fn search(&self, query: &str) -> Vec<&KindRecord> {
        search(&self.kinds, query)
    }

    pub fn suggest(&self, query: &str, limit: usize) -> Vec<Suggestion<'_>> {
        suggest(&self.kinds, query, limit)
    }

    /// Synthesize an example event for a kind
    pub fn example(&self, number: u32, synthesizer: &ExampleSynthesizer) -> Result<ExampleEvent> {
        let kind = self.get(number).ok_or(KindError::NotFound(number))?;
        Ok(synthesizer.synthesize(kind))
    }

    /// Lint every kind; clean kinds are left out
    pub fn lint(&self) -> Vec<LintResult> {
        SchemaLinter::new().lint_all(&self.kinds)
    }
}

fn read_document(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| KindError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn embedded_document() -> Result<&'static str> {
    EMBEDDED
        .get_file(EMBEDDED_DOCUMENT)
        .and_then(|file| file.contents_utf8())
        .ok_or_else(|| KindError::EmbeddedMissing(EMBEDDED_DOCUMENT.to_string()))
}
