//! Minimal columnar table used to carry designs, evaluations and summaries.
//!
//! Columns are kept in insertion order; that order is the contract between the
//! design assemblers (random-variable columns first, in model order), the model
//! (which reads inputs by name) and the post-processors.

use serde::{Deserialize, Serialize};

use crate::error::{DesignError, Result};

/// One named column of a [`DataFrame`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "values")]
pub enum Column {
    Float(Vec<f64>),
    Int(Vec<i64>),
    Text(Vec<String>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Float(v) => v.len(),
            Column::Int(v) => v.len(),
            Column::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Column::Float(_) => "float",
            Column::Int(_) => "int",
            Column::Text(_) => "text",
        }
    }

    /// An empty column of the same kind
    fn empty_like(&self) -> Column {
        match self {
            Column::Float(_) => Column::Float(Vec::new()),
            Column::Int(_) => Column::Int(Vec::new()),
            Column::Text(_) => Column::Text(Vec::new()),
        }
    }

    /// Gather rows by position, in the order given
    pub fn take(&self, rows: &[usize]) -> Column {
        match self {
            Column::Float(v) => Column::Float(rows.iter().map(|&i| v[i]).collect()),
            Column::Int(v) => Column::Int(rows.iter().map(|&i| v[i]).collect()),
            Column::Text(v) => Column::Text(rows.iter().map(|&i| v[i].clone()).collect()),
        }
    }

    /// Numeric view of the column; integers are widened
    pub fn to_f64(&self) -> Option<Vec<f64>> {
        match self {
            Column::Float(v) => Some(v.clone()),
            Column::Int(v) => Some(v.iter().map(|&x| x as f64).collect()),
            Column::Text(_) => None,
        }
    }

    /// Render a single cell, used for building derived column names.
    /// Floats always keep a fractional part (`1.0`, not `1`).
    pub fn cell_string(&self, row: usize) -> String {
        match self {
            Column::Float(v) => format!("{:?}", v[row]),
            Column::Int(v) => v[row].to_string(),
            Column::Text(v) => v[row].clone(),
        }
    }

    fn append(&mut self, other: &Column) -> Result<()> {
        match (self, other) {
            (Column::Float(a), Column::Float(b)) => a.extend_from_slice(b),
            (Column::Int(a), Column::Int(b)) => a.extend_from_slice(b),
            (Column::Text(a), Column::Text(b)) => a.extend(b.iter().cloned()),
            (a, b) => {
                return Err(DesignError::invalid(format!(
                    "cannot append {} column to {} column",
                    b.kind(),
                    a.kind()
                )));
            }
        }
        Ok(())
    }
}

impl From<Vec<f64>> for Column {
    fn from(v: Vec<f64>) -> Self {
        Column::Float(v)
    }
}

impl From<Vec<i64>> for Column {
    fn from(v: Vec<i64>) -> Self {
        Column::Int(v)
    }
}

impl From<Vec<String>> for Column {
    fn from(v: Vec<String>) -> Self {
        Column::Text(v)
    }
}

impl From<Vec<&str>> for Column {
    fn from(v: Vec<&str>) -> Self {
        Column::Text(v.into_iter().map(String::from).collect())
    }
}

/// Ordered collection of equal-length named columns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataFrame {
    names: Vec<String>,
    columns: Vec<Column>,
}

impl DataFrame {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a frame from `(name, column)` pairs.
    ///
    /// Fails when lengths differ or a name repeats.
    pub fn from_columns<S, I>(columns: I) -> Result<Self>
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, Column)>,
    {
        let mut df = DataFrame::new();
        for (name, column) in columns {
            let name = name.into();
            if df.has_column(&name) {
                return Err(DesignError::invalid(format!("duplicate column `{name}`")));
            }
            df.insert(name, column)?;
        }
        Ok(df)
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows() == 0
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.position(name).map(|i| &self.columns[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.names.iter().map(String::as_str).zip(self.columns.iter())
    }

    /// Add a column, replacing any existing column of the same name in place.
    pub fn insert(&mut self, name: impl Into<String>, column: Column) -> Result<()> {
        let name = name.into();
        if !self.columns.is_empty() && column.len() != self.n_rows() {
            return Err(DesignError::invalid(format!(
                "column `{name}` has {} rows, frame has {}",
                column.len(),
                self.n_rows()
            )));
        }
        match self.position(&name) {
            Some(i) => self.columns[i] = column,
            None => {
                self.names.push(name);
                self.columns.push(column);
            }
        }
        Ok(())
    }

    /// Builder-style [`DataFrame::insert`]
    pub fn with_column(mut self, name: impl Into<String>, column: impl Into<Column>) -> Result<Self> {
        self.insert(name, column.into())?;
        Ok(self)
    }

    pub fn remove(&mut self, name: &str) -> Option<Column> {
        let i = self.position(name)?;
        self.names.remove(i);
        Some(self.columns.remove(i))
    }

    fn require(&self, name: &str) -> Result<&Column> {
        self.column(name)
            .ok_or_else(|| DesignError::invalid(format!("`{name}` not in frame columns")))
    }

    pub fn float(&self, name: &str) -> Result<&[f64]> {
        match self.require(name)? {
            Column::Float(v) => Ok(v),
            other => Err(DesignError::invalid(format!(
                "column `{name}` is {}, expected float",
                other.kind()
            ))),
        }
    }

    pub fn int(&self, name: &str) -> Result<&[i64]> {
        match self.require(name)? {
            Column::Int(v) => Ok(v),
            other => Err(DesignError::invalid(format!(
                "column `{name}` is {}, expected int",
                other.kind()
            ))),
        }
    }

    pub fn text(&self, name: &str) -> Result<&[String]> {
        match self.require(name)? {
            Column::Text(v) => Ok(v),
            other => Err(DesignError::invalid(format!(
                "column `{name}` is {}, expected text",
                other.kind()
            ))),
        }
    }

    /// Numeric values of a float or integer column
    pub fn numeric(&self, name: &str) -> Result<Vec<f64>> {
        self.require(name)?.to_f64().ok_or_else(|| {
            DesignError::invalid(format!("column `{name}` is text, expected numeric"))
        })
    }

    /// Sub-frame with the given columns, in the given order
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<DataFrame> {
        let mut df = DataFrame::new();
        for name in names {
            let name = name.as_ref();
            df.insert(name, self.require(name)?.clone())?;
        }
        Ok(df)
    }

    /// Rows at the given positions, in the order given
    pub fn take(&self, rows: &[usize]) -> DataFrame {
        DataFrame {
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c.take(rows)).collect(),
        }
    }

    /// Row-major numeric matrix over the given columns
    pub fn to_rows<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<Vec<f64>>> {
        let cols = names
            .iter()
            .map(|n| self.numeric(n.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok((0..self.n_rows())
            .map(|i| cols.iter().map(|c| c[i]).collect())
            .collect())
    }

    /// Place `other`'s columns to the right of this frame's columns.
    ///
    /// Fails when a name appears in both frames.
    pub fn hconcat(&self, other: &DataFrame) -> Result<DataFrame> {
        let mut df = self.clone();
        for (name, column) in other.iter() {
            if df.has_column(name) {
                return Err(DesignError::invalid(format!("duplicate column `{name}`")));
            }
            df.insert(name, column.clone())?;
        }
        Ok(df)
    }

    /// Stack frames with identical column names and kinds
    pub fn vconcat(frames: &[DataFrame]) -> Result<DataFrame> {
        let Some(first) = frames.first() else {
            return Ok(DataFrame::new());
        };
        let mut df = DataFrame {
            names: first.names.clone(),
            columns: first.columns.iter().map(Column::empty_like).collect(),
        };
        for frame in frames {
            if frame.names != df.names {
                return Err(DesignError::invalid("cannot stack frames with different columns"));
            }
            for (acc, column) in df.columns.iter_mut().zip(&frame.columns) {
                acc.append(column)?;
            }
        }
        Ok(df)
    }
}
