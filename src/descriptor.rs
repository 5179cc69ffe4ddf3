//! Typed shapes of the three description documents
//!
//! A raw description is first checked against its contract (see
//! [`crate::validate`]) and then decoded into one of these structs. The same
//! structs are what a built schema emits from `describe()`, so the shapes
//! accepted on input and produced on output are the same types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One of the standard comparators shipped with the matching engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StandardComparator {
    /// Agree only on identical values
    Exact,
    /// Numeric difference mapped onto agreement levels
    Prorated,
    /// Year difference relative to the current year
    Year,
    /// String similarity thresholds
    String,
}

impl StandardComparator {
    pub const ALL: [StandardComparator; 4] = [
        StandardComparator::Exact,
        StandardComparator::Prorated,
        StandardComparator::Year,
        StandardComparator::String,
    ];

    /// Tag as written in descriptions
    pub fn tag(&self) -> &'static str {
        match self {
            StandardComparator::Exact => "EXACT",
            StandardComparator::Prorated => "PRORATED",
            StandardComparator::Year => "YEAR",
            StandardComparator::String => "STRING",
        }
    }

    /// Parse a tag, case-sensitive
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.tag() == tag)
    }
}

impl std::fmt::Display for StandardComparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// How two field values are to be scored
///
/// Custom configurations are kept as raw JSON objects; only the comparator
/// resolver downstream knows what they mean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ComparatorDescriptor {
    Standard(StandardComparator),
    Custom(Map<String, Value>),
}

impl ComparatorDescriptor {
    pub fn standard(&self) -> Option<StandardComparator> {
        match self {
            ComparatorDescriptor::Standard(c) => Some(*c),
            ComparatorDescriptor::Custom(_) => None,
        }
    }
}

impl From<StandardComparator> for ComparatorDescriptor {
    fn from(c: StandardComparator) -> Self {
        ComparatorDescriptor::Standard(c)
    }
}

impl From<Map<String, Value>> for ComparatorDescriptor {
    fn from(config: Map<String, Value>) -> Self {
        ComparatorDescriptor::Custom(config)
    }
}

/// Description of a fixed-width file layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedWidthSchemaDescription {
    /// `(name, start, length)` per column
    pub columns: Vec<(String, usize, usize)>,
    #[serde(default)]
    pub blocking_fields: Vec<String>,
    #[serde(default)]
    pub id_fields: Vec<String>,
}

/// Description of a delimited file layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelimitedSchemaDescription {
    pub columns: Vec<String>,
    #[serde(default)]
    pub blocking_fields: Vec<String>,
    #[serde(default)]
    pub id_fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<char>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<bool>,
}

/// Either kind of file schema description
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SchemaDescription {
    FixedWidth(FixedWidthSchemaDescription),
    Delimited(DelimitedSchemaDescription),
}

/// The `schema` entry of a comparator description
///
/// Each side is a schema-like object: either `{"ref": "<name>"}` naming a
/// schema bound in a [`crate::Script`], or an inline schema description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaSelection {
    Pair(Value, Value),
    Single(Value),
}

impl SchemaSelection {
    /// First schema, and the second one if it differs from the first
    pub fn sides(&self) -> (&Value, Option<&Value>) {
        match self {
            SchemaSelection::Pair(first, second) => (first, Some(second)),
            SchemaSelection::Single(schema) => (schema, None),
        }
    }
}

/// Description of a record comparator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordComparatorDescription {
    pub schema: SchemaSelection,
    pub compare: Vec<(String, ComparatorDescriptor)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle_blanks: Option<bool>,
}
