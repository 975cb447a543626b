//! Kind schema types
//!
//! A kind declares the shape of its content and an ordered list of tag
//! shapes. Each tag shape is a discriminator followed by a chain of typed
//! positional fields. In the source document the chain is a `next`-linked
//! list; here it is unrolled once, at normalization time, into a
//! [`FieldChain`].

use serde::{Serialize, Serializer};
use std::fmt;

/// Description used when a kind entry carries none
pub const NO_DESCRIPTION: &str = "No description";

/// Upper bound on the number of fields in one tag chain.
///
/// A `next` chain longer than this is reported as malformed. A cyclic
/// chain always hits the bound.
pub const MAX_CHAIN_LEN: usize = 64;

/// Expected shape of an event's `content`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContentFormat {
    /// A JSON-encoded object
    Json,
    /// Arbitrary text
    Free,
    /// Always the empty string
    Empty,
    #[default]
    Unknown,
}

impl ContentFormat {
    /// Parse a content label, mapping anything unrecognized to `Unknown`
    pub fn from_label(label: &str) -> Self {
        match label {
            "json" => ContentFormat::Json,
            "free" => ContentFormat::Free,
            "empty" => ContentFormat::Empty,
            _ => ContentFormat::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentFormat::Json => "json",
            ContentFormat::Free => "free",
            ContentFormat::Empty => "empty",
            ContentFormat::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ContentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Semantic type of one positional tag field
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// Hex id of another event
    Id,
    /// Hex public key
    Pubkey,
    /// Relay URL
    Relay,
    /// Any URL
    Url,
    /// Arbitrary string
    Free,
    /// `<kind>:<pubkey>:<identifier>` address
    Addr,
    /// Stringified kind number
    Kind,
    /// One of a closed set of literals (see [`FieldSpec::either`])
    Constrained,
    /// The field declares no `type`
    Missing,
    /// Anything the registry does not know about
    Other(String),
}

impl FieldType {
    pub fn from_label(label: &str) -> Self {
        match label {
            "id" => FieldType::Id,
            "pubkey" => FieldType::Pubkey,
            "relay" => FieldType::Relay,
            "url" => FieldType::Url,
            "free" => FieldType::Free,
            "addr" => FieldType::Addr,
            "kind" => FieldType::Kind,
            "constrained" => FieldType::Constrained,
            other => FieldType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FieldType::Id => "id",
            FieldType::Pubkey => "pubkey",
            FieldType::Relay => "relay",
            FieldType::Url => "url",
            FieldType::Free => "free",
            FieldType::Addr => "addr",
            FieldType::Kind => "kind",
            FieldType::Constrained => "constrained",
            FieldType::Missing => "missing",
            FieldType::Other(label) => label,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, FieldType::Missing | FieldType::Other(_))
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FieldType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One positional field in a tag chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Allowed literals; only meaningful for `constrained` fields
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub either: Vec<String>,
    /// Documentation only, never consulted by synthesis
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
}

impl FieldSpec {
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            either: Vec::new(),
            required: None,
        }
    }

    pub fn constrained<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            field_type: FieldType::Constrained,
            either: values.into_iter().map(Into::into).collect(),
            required: None,
        }
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    /// Render this field for a tag signature, e.g. `<relay>?` or `<a|b>`
    pub fn label(&self) -> String {
        let body = match self.field_type {
            FieldType::Constrained if !self.either.is_empty() => self.either.join("|"),
            _ => self.field_type.to_string(),
        };
        let optional = if self.required == Some(false) { "?" } else { "" };
        format!("<{}>{}", body, optional)
    }
}

/// A tag's positional fields after the discriminator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldChain {
    Fields(Vec<FieldSpec>),
    /// The source chain ran past [`MAX_CHAIN_LEN`]
    Malformed { limit: usize },
}

impl Default for FieldChain {
    fn default() -> Self {
        FieldChain::Fields(Vec::new())
    }
}

impl FieldChain {
    pub fn fields(&self) -> Option<&[FieldSpec]> {
        match self {
            FieldChain::Fields(fields) => Some(fields),
            FieldChain::Malformed { .. } => None,
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, FieldChain::Malformed { .. })
    }
}

impl From<Vec<FieldSpec>> for FieldChain {
    fn from(fields: Vec<FieldSpec>) -> Self {
        FieldChain::Fields(fields)
    }
}

/// A `next`-linked field in some source representation.
///
/// Implemented for `&serde_yaml::Value`; anything else that stores
/// chains as links can implement it and go through [`unroll_chain`].
pub trait FieldLink: Sized {
    /// The field described by this link
    fn field(&self) -> FieldSpec;

    /// The following link, if any
    fn next_link(&self) -> Option<Self>;
}

/// Flatten a linked chain into an owned [`FieldChain`].
///
/// Walks at most [`MAX_CHAIN_LEN`] links; a longer (or cyclic) chain is
/// returned as [`FieldChain::Malformed`].
pub fn unroll_chain<L: FieldLink>(head: Option<L>) -> FieldChain {
    let mut fields = Vec::new();
    let mut cursor = head;

    while let Some(link) = cursor {
        if fields.len() == MAX_CHAIN_LEN {
            return FieldChain::Malformed { limit: MAX_CHAIN_LEN };
        }
        fields.push(link.field());
        cursor = link.next_link();
    }

    FieldChain::Fields(fields)
}

/// One allowed tag shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct TagSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    pub chain: FieldChain,
}

impl TagSpec {
    /// A named tag with the given fields
    pub fn named(name: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
        Self {
            name: Some(name.into()),
            prefix: None,
            chain: FieldChain::Fields(fields),
        }
    }

    /// Build a tag by unrolling a linked chain
    pub fn from_links<L: FieldLink>(name: Option<String>, prefix: Option<String>, head: Option<L>) -> Self {
        Self {
            name,
            prefix,
            chain: unroll_chain(head),
        }
    }

    /// The tag's first element: `name`, else `prefix`
    pub fn discriminator(&self) -> Option<&str> {
        self.name.as_deref().or(self.prefix.as_deref())
    }

    /// Human-readable shape, e.g. `["p", <pubkey>, <relay>?]`
    pub fn signature(&self) -> String {
        let head = match (&self.name, &self.prefix) {
            (Some(name), _) => format!("\"{}\"", name),
            (None, Some(prefix)) => format!("\"{}…\"", prefix),
            (None, None) => "<unnamed>".to_string(),
        };

        let mut parts = vec![head];
        match &self.chain {
            FieldChain::Fields(fields) => parts.extend(fields.iter().map(FieldSpec::label)),
            FieldChain::Malformed { .. } => parts.push("<malformed>".to_string()),
        }
        format!("[{}]", parts.join(", "))
    }
}

/// One kind definition from the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KindRecord {
    pub number: u32,
    pub description: String,
    pub content: ContentFormat,
    pub tags: Vec<TagSpec>,
}

impl KindRecord {
    /// A kind with no declared content or tags
    pub fn new(number: u32, description: impl Into<String>) -> Self {
        Self {
            number,
            description: description.into(),
            content: ContentFormat::Unknown,
            tags: Vec::new(),
        }
    }

    pub fn with_content(mut self, content: ContentFormat) -> Self {
        self.content = content;
        self
    }

    pub fn with_tag(mut self, tag: TagSpec) -> Self {
        self.tags.push(tag);
        self
    }

    pub fn has_description(&self) -> bool {
        self.description != NO_DESCRIPTION
    }

    /// All tag discriminators concatenated in declaration order
    /// (search haystack)
    pub fn tag_names(&self) -> String {
        self.tags.iter().filter_map(TagSpec::discriminator).collect()
    }
}

impl<'a> FieldLink for &'a serde_yaml::Value {
    fn field(&self) -> FieldSpec {
        let value: &'a serde_yaml::Value = *self;
        let field_type = value
            .get("type")
            .and_then(scalar_string)
            .map(|label| FieldType::from_label(&label))
            .unwrap_or(FieldType::Missing);

        let either = value
            .get("either")
            .and_then(serde_yaml::Value::as_sequence)
            .map(|values| values.iter().filter_map(scalar_string).collect())
            .unwrap_or_default();

        FieldSpec {
            field_type,
            either,
            required: value.get("required").and_then(serde_yaml::Value::as_bool),
        }
    }

    fn next_link(&self) -> Option<Self> {
        let value: &'a serde_yaml::Value = *self;
        value.get("next").filter(|next| !next.is_null())
    }
}

/// Render a YAML scalar as a string; `None` for null, sequences and mappings
pub(crate) fn scalar_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        serde_yaml::Value::Tagged(tagged) => scalar_string(&tagged.value),
        _ => None,
    }
}
