// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Parameter model
//!
//! Parameters are collected from the target URL's query string, its
//! fragment query string, and the guessing heuristics. Multiple observed
//! values for one name accumulate into an ordered list; names are never
//! removed once added.

mod extract;
mod guess;

pub use extract::{extract, ExtractedParameters};
pub use guess::{ParameterGuesser, PARAMETER_WORDLIST};

use serde::{Deserialize, Serialize};

/// Where a parameter was first observed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamOrigin {
    /// Present in the URL query string
    Query,
    /// Present in the fragment query string
    Fragment,
    /// Discovered by a guessing heuristic
    Guessed,
}

/// A scannable parameter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub origin: ParamOrigin,
    /// Observed values, order of first appearance preserved
    pub values: Vec<String>,
}

/// Ordered map of parameters, keyed by name
#[derive(Debug, Clone, Default)]
pub struct ParameterMap {
    entries: Vec<Parameter>,
}

impl ParameterMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an observed (name, value) pair. A repeated name accumulates
    /// the value; the origin of the first observation wins.
    pub fn insert(&mut self, name: &str, value: &str, origin: ParamOrigin) {
        match self.entries.iter_mut().find(|p| p.name == name) {
            Some(param) => param.values.push(value.to_string()),
            None => self.entries.push(Parameter {
                name: name.to_string(),
                origin,
                values: vec![value.to_string()],
            }),
        }
    }

    /// Insert a guessed name with a sentinel value, only if absent.
    /// Returns true when the name was newly added. Idempotent: guessing
    /// the same name twice does not create duplicate entries.
    pub fn insert_guessed(&mut self, name: &str, sentinel: &str) -> bool {
        if self.contains(name) {
            return false;
        }
        self.entries.push(Parameter {
            name: name.to_string(),
            origin: ParamOrigin::Guessed,
            values: vec![sentinel.to_string()],
        });
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|p| p.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.entries.iter().find(|p| p.name == name)
    }

    /// Parameter names in first-appearance order
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|p| p.name.clone()).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Parameter> {
        self.entries.iter()
    }

    /// All observed values across all parameters
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .flat_map(|p| p.values.iter().map(String::as_str))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
