//! Kind Registry
//!
//! A schema-driven registry of event kinds. Each kind declares a content
//! format and an ordered list of tag shapes; each tag shape is a
//! discriminator followed by a chain of typed positional fields.
//!
//! ## Features
//!
//! - **Normalization**: raw YAML mappings become sorted [`KindRecord`]s,
//!   with `_`-prefixed anchor templates skipped and defaults filled
//! - **Example Synthesis**: a readable sample event for any kind, tag
//!   chains fully expanded with placeholder values
//! - **Search**: case-insensitive substring filter, plus fuzzy hints
//! - **Linting**: flags schema entries that produce poor examples
//!
//! ## Data flow
//!
//! ```text
//! kinds.yaml ──parse──▶ RawSchema ───────────normalize──▶ Vec<KindRecord>
//!                                                          │
//!                                   ┌──────────────────────┤
//!                                   ▼                      ▼
//!                            search(query)       ExampleSynthesizer
//!                                                          │
//!                                                          ▼
//!                                                    ExampleEvent
//! ```

pub mod checksum;
pub mod config;
pub mod error;
pub mod lint;
pub mod normalize;
pub mod registry;
pub mod schema;
pub mod search;
pub mod synth;

pub use checksum::Checksum;
pub use config::{KindsConfig, OutputFormat};
pub use error::{KindError, Result};
pub use lint::{LintIssue, LintResult, SchemaLinter};
pub use normalize::{normalize, normalize_with_report, NormalizeReport, RawSchema};
pub use registry::{KindRegistry, RegistrySummary, SchemaSource};
pub use schema::{
    unroll_chain, ContentFormat, FieldChain, FieldLink, FieldSpec, FieldType, KindRecord, TagSpec,
    MAX_CHAIN_LEN, NO_DESCRIPTION,
};
pub use search::{search, suggest, Suggestion};
pub use synth::{
    synthesize_example, ConstrainedPick, ExampleEvent, ExampleSynthesizer, SynthesisConfig,
    UnnamedTagPolicy,
};
