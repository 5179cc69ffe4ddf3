//! Structural validation of raw descriptions
//!
//! Each [`DescriptorKind`] has a fixed JSON Schema contract. Validation is
//! purely about shape: names referenced by `blockingFields`, `idFields` or
//! `compare` are resolved later, by the builders.
//!
//! Contracts are compiled once, on first use, and shared.

use std::collections::HashMap;
use std::sync::OnceLock;

use jsonschema::{Draft, JSONSchema};
use serde_json::{json, Value};

use crate::error::{LinkageError, Result};

/// The three kinds of description the compiler accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorKind {
    FixedWidthSchema,
    DelimitedSchema,
    RecordComparator,
}

type ContractTable = HashMap<DescriptorKind, std::result::Result<JSONSchema, String>>;

static CONTRACTS: OnceLock<ContractTable> = OnceLock::new();

impl DescriptorKind {
    pub const ALL: [DescriptorKind; 3] = [
        DescriptorKind::FixedWidthSchema,
        DescriptorKind::DelimitedSchema,
        DescriptorKind::RecordComparator,
    ];

    /// Human-readable name used in error messages and logs
    pub fn name(&self) -> &'static str {
        match self {
            DescriptorKind::FixedWidthSchema => "fixed-width schema",
            DescriptorKind::DelimitedSchema => "delimited schema",
            DescriptorKind::RecordComparator => "record comparator",
        }
    }

    /// JSON Schema contract for this kind
    pub fn contract(&self) -> Value {
        let names = json!({"type": "array", "items": {"type": "string"}});

        match self {
            DescriptorKind::FixedWidthSchema => json!({
                "$schema": "http://json-schema.org/draft-07/schema#",
                "type": "object",
                "properties": {
                    "columns": {
                        "type": "array",
                        "items": {
                            "type": "array",
                            "items": [
                                {"type": "string"},
                                {"type": "integer", "minimum": 0},
                                {"type": "integer", "minimum": 1}
                            ],
                            "minItems": 3,
                            "additionalItems": false
                        }
                    },
                    "blockingFields": names.clone(),
                    "idFields": names
                },
                "required": ["columns"]
            }),

            DescriptorKind::DelimitedSchema => json!({
                "$schema": "http://json-schema.org/draft-07/schema#",
                "type": "object",
                "properties": {
                    "columns": {"type": "array", "items": {"type": "string"}},
                    "blockingFields": names.clone(),
                    "idFields": names,
                    "delimiter": {"type": "string", "minLength": 1, "maxLength": 1},
                    "header": {"type": "boolean"}
                },
                "required": ["columns"]
            }),

            DescriptorKind::RecordComparator => json!({
                "$schema": "http://json-schema.org/draft-07/schema#",
                "type": "object",
                "properties": {
                    "schema": {
                        "anyOf": [
                            {"type": "object"},
                            {
                                "type": "array",
                                "items": {"type": "object"},
                                "minItems": 2,
                                "maxItems": 2
                            }
                        ]
                    },
                    "compare": {
                        "type": "array",
                        "items": {
                            "type": "array",
                            "items": [
                                {"type": "string"},
                                {
                                    "anyOf": [
                                        {"type": "object"},
                                        {"enum": ["EXACT", "PRORATED", "YEAR", "STRING"]}
                                    ]
                                }
                            ],
                            "minItems": 2,
                            "additionalItems": false
                        }
                    },
                    "handleBlanks": {"type": "boolean"}
                },
                "required": ["schema", "compare"]
            }),
        }
    }
}

impl std::fmt::Display for DescriptorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

fn compiled(kind: DescriptorKind) -> Result<&'static JSONSchema> {
    let table = CONTRACTS.get_or_init(|| {
        DescriptorKind::ALL
            .into_iter()
            .map(|k| {
                let compiled = JSONSchema::options()
                    .with_draft(Draft::Draft7)
                    .compile(&k.contract())
                    .map_err(|e| e.to_string());
                (k, compiled)
            })
            .collect()
    });

    match table.get(&kind) {
        Some(Ok(schema)) => Ok(schema),
        Some(Err(e)) => Err(LinkageError::Contract(e.clone())),
        None => Err(LinkageError::Contract(format!("no contract for {}", kind))),
    }
}

/// Check `description` against the contract for `kind`
///
/// Reports the first violation with its JSON pointer (empty for the root).
pub fn validate(kind: DescriptorKind, description: &Value) -> Result<()> {
    let rejected = |path: String, reason: String| {
        tracing::debug!(kind = %kind, path = %path, "description rejected");
        LinkageError::Validation {
            kind: kind.name(),
            path,
            reason,
        }
    };

    if let Err(mut errors) = compiled(kind)?.validate(description) {
        if let Some(error) = errors.next() {
            return Err(rejected(error.instance_path.to_string(), error.to_string()));
        }
    }

    if kind == DescriptorKind::FixedWidthSchema {
        if let Some((path, reason)) = misfit_offset(description) {
            return Err(rejected(path, reason));
        }
    }

    Ok(())
}

/// First span start or length that is not a plain unsigned integer
///
/// Draft 7 counts `0.0` and integers past `u64::MAX` as integers; the
/// builder needs a `usize`.
fn misfit_offset(description: &Value) -> Option<(String, String)> {
    let columns = description.get("columns")?.as_array()?;
    columns.iter().enumerate().find_map(|(i, column)| {
        (1..=2).find_map(|j| {
            let value = column.get(j)?;
            match value.as_u64().and_then(|n| usize::try_from(n).ok()) {
                Some(_) => None,
                None => Some((
                    format!("/columns/{}/{}", i, j),
                    format!("{} is not an unsigned integer no greater than {}", value, usize::MAX),
                )),
            }
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn rejection(kind: DescriptorKind, description: Value) -> (String, String) {
        match validate(kind, &description) {
            Err(LinkageError::Validation { path, reason, .. }) => (path, reason),
            other => panic!("Expected validation failure, got {:?}", other),
        }
    }

    #[test]
    fn test_fixed_width_contract() {
        let ok = json!({
            "columns": [["name", 0, 10], ["dob", 10, 8]],
            "blockingFields": ["dob"],
            "idFields": ["name"]
        });
        assert!(validate(DescriptorKind::FixedWidthSchema, &ok).is_ok());

        let (path, _) = rejection(
            DescriptorKind::FixedWidthSchema,
            json!({"columns": [["name", "0", 10]]}),
        );
        assert_eq!(path, "/columns/0/1");

        let (path, _) = rejection(
            DescriptorKind::FixedWidthSchema,
            json!({"columns": [["name", 0]]}),
        );
        assert_eq!(path, "/columns/0");
    }

    #[test]
    fn test_missing_columns_reported_at_root() {
        let err = validate(DescriptorKind::DelimitedSchema, &json!({"header": true})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        match err {
            LinkageError::Validation { path, reason, .. } => {
                assert_eq!(path, "");
                assert!(reason.contains("columns"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_span_bounds() {
        rejection(DescriptorKind::FixedWidthSchema, json!({"columns": [["a", -1, 3]]}));
        rejection(DescriptorKind::FixedWidthSchema, json!({"columns": [["a", 0, 0]]}));
    }

    #[test]
    fn test_offsets_must_be_plain_integers() {
        let (path, reason) = rejection(
            DescriptorKind::FixedWidthSchema,
            json!({"columns": [["name", 0, 10], ["dob", 10.0, 8]]}),
        );
        assert_eq!(path, "/columns/1/1");
        assert!(reason.contains("10.0"));

        let huge: Value =
            serde_json::from_str(r#"{"columns": [["name", 0, 18446744073709551616]]}"#).unwrap();
        let (path, _) = rejection(DescriptorKind::FixedWidthSchema, huge);
        assert_eq!(path, "/columns/0/2");
    }

    #[test]
    fn test_contracts_compile() {
        for kind in DescriptorKind::ALL {
            assert!(compiled(kind).is_ok(), "{} contract", kind);
        }
        assert!(std::ptr::eq(
            compiled(DescriptorKind::DelimitedSchema).unwrap(),
            compiled(DescriptorKind::DelimitedSchema).unwrap()
        ));
    }

    #[test]
    fn test_delimited_contract() {
        let ok = json!({"columns": ["a", "b"], "delimiter": "|", "header": true});
        assert!(validate(DescriptorKind::DelimitedSchema, &ok).is_ok());

        let (path, _) = rejection(
            DescriptorKind::DelimitedSchema,
            json!({"columns": ["a"], "delimiter": "||"}),
        );
        assert_eq!(path, "/delimiter");

        let (path, _) = rejection(
            DescriptorKind::DelimitedSchema,
            json!({"columns": ["a"], "header": "yes"}),
        );
        assert_eq!(path, "/header");
    }

    #[test]
    fn test_legacy_tagged_blocking_entries_rejected() {
        let (path, _) = rejection(
            DescriptorKind::DelimitedSchema,
            json!({"columns": ["a"], "blockingFields": [["string", "a"]]}),
        );
        assert_eq!(path, "/blockingFields/0");
    }

    #[test]
    fn test_comparator_contract() {
        let schema = json!({"columns": ["a"]});
        let ok = json!({
            "schema": schema,
            "compare": [["a", "EXACT"], ["a", {"type": "custom"}]],
            "handleBlanks": false
        });
        assert!(validate(DescriptorKind::RecordComparator, &ok).is_ok());

        let pair = json!({"schema": [schema, schema], "compare": [["a", "YEAR"]]});
        assert!(validate(DescriptorKind::RecordComparator, &pair).is_ok());

        let (path, _) = rejection(
            DescriptorKind::RecordComparator,
            json!({"schema": [schema], "compare": [["a", "YEAR"]]}),
        );
        assert_eq!(path, "/schema");

        let (path, _) = rejection(
            DescriptorKind::RecordComparator,
            json!({"schema": schema, "compare": [["a", "FUZZY"]]}),
        );
        assert_eq!(path, "/compare/0/1");

        rejection(DescriptorKind::RecordComparator, json!({"schema": schema}));
    }
}
