//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - handed to the theory builder as read-only snapshots
//! - loaded from / exported to JSON
//! - reloaded later for plotting or comparisons

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Encoded parameter numbers at or above this value address the derived-function
/// vector (`encoded - PARAM_FUN_OFFSET`), everything below addresses the
/// fit-parameter vector.
pub const PARAM_FUN_OFFSET: usize = 20_000;

/// Upper end of every tabulated time axis (µs).
pub const T_MAX_US: f64 = 20.0;

/// One physical line of the theory block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TheoryLine {
    /// Line number in the source file (used in error messages).
    pub line_no: usize,
    pub text: String,
}

impl TheoryLine {
    pub fn new(line_no: usize, text: impl Into<String>) -> Self {
        Self {
            line_no,
            text: text.into(),
        }
    }

    /// Number consecutive lines starting at `first_line_no`.
    pub fn numbered<I, S>(first_line_no: usize, lines: I) -> Vec<TheoryLine>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        lines
            .into_iter()
            .enumerate()
            .map(|(i, text)| TheoryLine::new(first_line_no + i, text))
            .collect()
    }

    /// Line content with the theory comment (`(...`) and msr comment (`#...`) removed.
    pub fn content(&self) -> &str {
        let mut s = self.text.as_str();
        if let Some(idx) = s.find('(') {
            s = &s[..idx];
        }
        if let Some(idx) = s.find('#') {
            s = &s[..idx];
        }
        s.trim()
    }

    /// True if this line separates two additive terms.
    pub fn is_separator(&self) -> bool {
        self.content().split_whitespace().next() == Some("+")
    }
}

/// A resolved reference to a kernel parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamRef {
    /// 0-based index into the fit-parameter vector.
    Param(usize),
    /// Dense index into the derived-function value vector.
    Function(usize),
}

impl ParamRef {
    /// Classify a single-integer reference by the function offset.
    pub fn decode(encoded: usize) -> Self {
        if encoded < PARAM_FUN_OFFSET {
            ParamRef::Param(encoded)
        } else {
            ParamRef::Function(encoded - PARAM_FUN_OFFSET)
        }
    }

    /// Fetch the current value.
    ///
    /// # Panics
    /// Panics if the index is outside the supplied vector; the builder validates
    /// indices against the sizes the tree was built for.
    #[inline]
    pub fn resolve(self, params: &[f64], funcs: &[f64]) -> f64 {
        match self {
            ParamRef::Param(idx) => params[idx],
            ParamRef::Function(idx) => funcs[idx],
        }
    }
}

/// Maps FUNCTIONS-block numbers (`fun<N>`) to dense indices into the
/// derived-function value vector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionTable {
    index_of: BTreeMap<usize, usize>,
}

impl FunctionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from function numbers in block order; index = position.
    pub fn from_numbers(numbers: &[usize]) -> Self {
        Self {
            index_of: numbers
                .iter()
                .enumerate()
                .map(|(idx, &number)| (number, idx))
                .collect(),
        }
    }

    pub fn index_of(&self, number: usize) -> Option<usize> {
        self.index_of.get(&number).copied()
    }

    pub fn len(&self) -> usize {
        self.index_of.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index_of.is_empty()
    }
}

/// A derived-function value as supplied by the FUNCTIONS-block evaluator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionValue {
    pub number: usize,
    pub value: f64,
}

/// One run of a model file: a name plus its map table (1-based parameter numbers).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunDef {
    pub name: String,
    #[serde(default)]
    pub map: Vec<i64>,
}

/// Uniform time grid in µs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TimeGrid {
    pub start: f64,
    pub end: f64,
    pub step: f64,
}

impl Default for TimeGrid {
    fn default() -> Self {
        Self {
            start: 0.0,
            end: 10.0,
            step: 0.01,
        }
    }
}

impl TimeGrid {
    pub fn points(&self) -> Vec<f64> {
        if !(self.step.is_finite() && self.step > 0.0) || self.end < self.start {
            return vec![self.start];
        }
        let n = ((self.end - self.start) / self.step + 1e-9).floor() as usize + 1;
        (0..n).map(|i| self.start + i as f64 * self.step).collect()
    }
}

/// A model description as read from JSON.
///
/// This is the snapshot the engine needs from the surrounding msr handling:
/// theory lines, current parameter values, pre-evaluated derived functions and
/// per-run map tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelFile {
    #[serde(default)]
    pub title: String,
    pub theory: Vec<String>,
    pub parameters: Vec<f64>,
    #[serde(default)]
    pub functions: Vec<FunctionValue>,
    #[serde(default)]
    pub runs: Vec<RunDef>,
    #[serde(default)]
    pub time: TimeGrid,
}

impl ModelFile {
    /// Theory lines numbered from 1.
    pub fn theory_lines(&self) -> Vec<TheoryLine> {
        TheoryLine::numbered(1, self.theory.iter().cloned())
    }

    pub fn function_table(&self) -> FunctionTable {
        let numbers: Vec<usize> = self.functions.iter().map(|f| f.number).collect();
        FunctionTable::from_numbers(&numbers)
    }

    pub fn function_values(&self) -> Vec<f64> {
        self.functions.iter().map(|f| f.value).collect()
    }

    /// Runs to evaluate; a model without runs gets one unnamed run with an empty map.
    pub fn effective_runs(&self) -> Vec<RunDef> {
        if self.runs.is_empty() {
            vec![RunDef {
                name: "run".to_string(),
                map: Vec::new(),
            }]
        } else {
            self.runs.clone()
        }
    }
}

/// Evaluated curve of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunCurve {
    pub run: String,
    pub t: Vec<f64>,
    pub value: Vec<f64>,
}

/// A saved curve file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveFile {
    pub tool: String,
    pub generated: String,
    pub title: String,
    pub theory: Vec<String>,
    pub parameters: Vec<f64>,
    pub curves: Vec<RunCurve>,
}
