//! Scalar filters evaluated against stored rows.
//!
//! A filter is a disjunction of equality clauses built in code.

use crate::error::MemoryError;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
struct Clause {
    field: String,
    value: Value,
}

/// OR of `field = value` clauses. An empty filter matches every row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Filter {
    clauses: Vec<Clause>,
}

impl Filter {
    /// Single equality clause.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            clauses: vec![Clause {
                field: field.into(),
                value: value.into(),
            }],
        }
    }

    /// `field = v1 OR field = v2 ...`.
    pub fn any_of<I, V>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let field = field.into();
        Self {
            clauses: values
                .into_iter()
                .map(|value| Clause {
                    field: field.clone(),
                    value: value.into(),
                })
                .collect(),
        }
    }

    /// Disjunction of two filters.
    pub fn or(mut self, other: Filter) -> Self {
        self.clauses.extend(other.clauses);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Reject clauses that can never be evaluated.
    pub fn validate(&self) -> Result<(), MemoryError> {
        for clause in &self.clauses {
            if clause.field.trim().is_empty() {
                return Err(MemoryError::InvalidFilter("empty field name".to_string()));
            }
            if !is_scalar(&clause.value) {
                return Err(MemoryError::InvalidFilter(format!(
                    "value for `{}` must be a string, number or bool",
                    clause.field
                )));
            }
        }
        Ok(())
    }

    /// Evaluate against a row. Comparing against a non-scalar column is an error.
    pub fn matches(&self, row: &Value) -> Result<bool, MemoryError> {
        if self.clauses.is_empty() {
            return Ok(true);
        }
        let mut matched = false;
        for clause in &self.clauses {
            match row.get(&clause.field) {
                None => {}
                Some(column) if !is_scalar(column) => {
                    return Err(MemoryError::InvalidFilter(format!(
                        "column `{}` is not scalar",
                        clause.field
                    )));
                }
                Some(column) => matched |= scalar_eq(column, &clause.value),
            }
        }
        Ok(matched)
    }
}

fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_))
}

fn scalar_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => left == right,
    }
}
