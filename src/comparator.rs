//! Record comparators: which fields two records are scored on, and how
//!
//! The builder only resolves field names against the two schemas and keeps
//! each comparator descriptor as given. Turning a descriptor into scoring
//! code is the matching engine's job.

use std::sync::Arc;

use chrono::Datelike;
use serde_json::{json, Value};

use crate::descriptor::{ComparatorDescriptor, RecordComparatorDescription, StandardComparator};
use crate::error::{LinkageError, Result};
use crate::schema::FileSchema;

const PRORATED_SLOPE: [f64; 3] = [0.1, 0.2, 0.4];
const PRORATED_INTERCEPT: [f64; 3] = [1.1, 1.0, 1.0];
const STRING_LEVELS: [f64; 3] = [0.92, 0.86, 0.81];

impl StandardComparator {
    /// Default tuning the engine applies for this tag
    ///
    /// YEAR is anchored on the current calendar year.
    pub fn default_parameters(&self) -> Value {
        match self {
            StandardComparator::Exact => json!({}),
            StandardComparator::Prorated => json!({
                "slope": PRORATED_SLOPE,
                "intercept": PRORATED_INTERCEPT,
            }),
            StandardComparator::Year => json!({
                "referenceYear": chrono::Local::now().year(),
                "slope": PRORATED_SLOPE,
                "intercept": PRORATED_INTERCEPT,
            }),
            StandardComparator::String => json!({ "levels": STRING_LEVELS }),
        }
    }
}

/// One dimension of the comparison vector
#[derive(Debug, Clone, PartialEq)]
pub struct CompareStep {
    field: String,
    descriptor: ComparatorDescriptor,
    index1: usize,
    index2: usize,
    field_indices: Option<(usize, usize)>,
}

impl CompareStep {
    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn descriptor(&self) -> &ComparatorDescriptor {
        &self.descriptor
    }

    /// Column index of the field in the first and second schema
    pub fn column_indices(&self) -> (usize, usize) {
        (self.index1, self.index2)
    }

    /// Index of the field in each schema's [`fields`](FileSchema::fields)
    ///
    /// `None` when the field is a blocking or id field on either side.
    pub fn field_indices(&self) -> Option<(usize, usize)> {
        self.field_indices
    }
}

/// Immutable plan for comparing records of `schema1` with records of `schema2`
#[derive(Debug, Clone)]
pub struct RecordComparator {
    schema1: Arc<FileSchema>,
    schema2: Arc<FileSchema>,
    steps: Vec<CompareStep>,
    handle_blanks: bool,
}

impl RecordComparator {
    pub fn builder(schema1: Arc<FileSchema>, schema2: Arc<FileSchema>) -> RecordComparatorBuilder {
        RecordComparatorBuilder {
            schema1,
            schema2,
            steps: Vec::new(),
            handle_blanks: true,
        }
    }

    /// Builder for comparing records of one file against each other
    pub fn within(schema: Arc<FileSchema>) -> RecordComparatorBuilder {
        Self::builder(Arc::clone(&schema), schema)
    }

    /// Run the builder over a decoded description whose schemas are already resolved
    pub fn from_description(
        description: &RecordComparatorDescription,
        schema1: Arc<FileSchema>,
        schema2: Arc<FileSchema>,
    ) -> Result<Self> {
        let mut b = Self::builder(schema1, schema2);
        if let Some(h) = description.handle_blanks {
            b.handle_blanks(h);
        }
        for (field, descriptor) in &description.compare {
            b.compare(field.as_str(), descriptor.clone())?;
        }
        b.build()
    }

    pub fn schema1(&self) -> &Arc<FileSchema> {
        &self.schema1
    }

    pub fn schema2(&self) -> &Arc<FileSchema> {
        &self.schema2
    }

    /// Steps in the order they were added
    pub fn steps(&self) -> &[CompareStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn handle_blanks(&self) -> bool {
        self.handle_blanks
    }

    /// True when both sides are the very same schema instance
    pub fn is_self_comparison(&self) -> bool {
        Arc::ptr_eq(&self.schema1, &self.schema2)
    }

    /// Compared field names, one per dimension
    pub fn comparison_fields(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(|s| s.field.as_str())
    }
}

/// Accumulates comparison steps for a [`RecordComparator`]
#[derive(Debug)]
pub struct RecordComparatorBuilder {
    schema1: Arc<FileSchema>,
    schema2: Arc<FileSchema>,
    steps: Vec<CompareStep>,
    handle_blanks: bool,
}

impl RecordComparatorBuilder {
    pub fn handle_blanks(&mut self, handle_blanks: bool) -> &mut Self {
        self.handle_blanks = handle_blanks;
        self
    }

    pub fn compare(
        &mut self,
        field: impl Into<String>,
        descriptor: impl Into<ComparatorDescriptor>,
    ) -> Result<&mut Self> {
        let field = field.into();
        let index1 = self.schema1.column_index(&field).ok_or_else(|| {
            LinkageError::UnknownCompareField {
                name: field.clone(),
                missing_in: "the first schema",
            }
        })?;
        let index2 = self.schema2.column_index(&field).ok_or_else(|| {
            LinkageError::UnknownCompareField {
                name: field.clone(),
                missing_in: "the second schema",
            }
        })?;
        let field_indices = self
            .schema1
            .field_index(&field)
            .zip(self.schema2.field_index(&field));

        self.steps.push(CompareStep {
            field,
            descriptor: descriptor.into(),
            index1,
            index2,
            field_indices,
        });
        Ok(self)
    }

    pub fn build(self) -> Result<RecordComparator> {
        if self.steps.is_empty() {
            return Err(LinkageError::Empty("record comparator", "compare steps"));
        }
        tracing::debug!(
            steps = self.steps.len(),
            handle_blanks = self.handle_blanks,
            "built record comparator"
        );
        Ok(RecordComparator {
            schema1: self.schema1,
            schema2: self.schema2,
            steps: self.steps,
            handle_blanks: self.handle_blanks,
        })
    }
}
