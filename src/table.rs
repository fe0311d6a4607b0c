use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use thiserror::Error;

use crate::error::Error;

/// Base cost substituted for a missing preference. High enough that the
/// solver only ever reaches for an unrated alternative when every rated one
/// is blocked by the group-size constraints.
const NO_PREFERENCE_PENALTY: f64 = 10_000.0;

/// Ways an input table can be structurally invalid.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MalformedInput {
    #[error("input table has no persons or no alternatives")]
    Empty,

    #[error("row {row} has {found} cost columns, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("person {name:?} appears more than once")]
    DuplicatePerson { name: String },

    #[error("alternative {name:?} appears more than once")]
    DuplicateAlternative { name: String },

    #[error("cost for {person:?} in {alternative:?} is not a non-negative number: {value:?}")]
    InvalidCost {
        person: String,
        alternative: String,
        value: String,
    },

    #[error("first column must be headed \"Persons\", found {found:?}")]
    PersonsHeader { found: String },
}

/// Immutable person × alternative preference costs.
///
/// Rows are persons and columns are alternatives, both kept in input order.
/// A `None` entry means the person left that alternative unrated; it is
/// charged the sentinel penalty at model-build time, never treated as free.
#[derive(Debug, Clone)]
pub struct CostTable {
    persons: Vec<String>,
    alternatives: Vec<String>,
    /// Row-major, `persons.len() * alternatives.len()` entries.
    costs: Vec<Option<f64>>,
    penalty: f64,
}

impl CostTable {
    /// Builds a table from ordered rows of `(person, costs)`.
    ///
    /// Rejects empty tables, ragged rows, duplicate person or alternative
    /// names, and stated costs that are negative or non-finite.
    pub fn new(
        alternatives: Vec<String>,
        rows: Vec<(String, Vec<Option<f64>>)>,
    ) -> Result<Self, MalformedInput> {
        if alternatives.is_empty() || rows.is_empty() {
            return Err(MalformedInput::Empty);
        }

        let mut seen = HashSet::new();
        for name in &alternatives {
            if !seen.insert(name.as_str()) {
                return Err(MalformedInput::DuplicateAlternative { name: name.clone() });
            }
        }

        let mut seen: HashSet<String> = HashSet::new();
        let mut persons = Vec::with_capacity(rows.len());
        let mut costs = Vec::with_capacity(rows.len() * alternatives.len());
        for (index, (name, row)) in rows.into_iter().enumerate() {
            if !seen.insert(name.clone()) {
                return Err(MalformedInput::DuplicatePerson { name });
            }
            if row.len() != alternatives.len() {
                return Err(MalformedInput::RaggedRow {
                    row: index + 1,
                    expected: alternatives.len(),
                    found: row.len(),
                });
            }
            for (column, cell) in row.iter().enumerate() {
                if let Some(value) = cell {
                    if !value.is_finite() || *value < 0.0 {
                        return Err(MalformedInput::InvalidCost {
                            person: name.clone(),
                            alternative: alternatives[column].clone(),
                            value: value.to_string(),
                        });
                    }
                }
            }
            persons.push(name);
            costs.extend(row);
        }

        let penalty = match costs.iter().flatten().copied().reduce(f64::max) {
            Some(max) if max >= NO_PREFERENCE_PENALTY => max + NO_PREFERENCE_PENALTY,
            _ => NO_PREFERENCE_PENALTY,
        };

        Ok(CostTable {
            persons,
            alternatives,
            costs,
            penalty,
        })
    }

    /// Reads a table from a CSV file whose first column is headed `Persons`.
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
        Self::from_csv(reader)
    }

    pub fn from_csv_reader<R: Read>(input: R) -> Result<Self, Error> {
        let reader = csv::ReaderBuilder::new().flexible(true).from_reader(input);
        Self::from_csv(reader)
    }

    /// Blank cells and `NA` mark unstated preferences; everything else must
    /// parse as a number. Ragged rows are caught here rather than left to the
    /// CSV layer so they report as malformed input, not as a decode error.
    fn from_csv<R: Read>(mut reader: csv::Reader<R>) -> Result<Self, Error> {
        let headers = reader.headers()?.clone();
        let mut header_cells = headers.iter();
        match header_cells.next() {
            Some(first) if first.trim() == "Persons" => {}
            other => {
                return Err(MalformedInput::PersonsHeader {
                    found: other.unwrap_or("").to_string(),
                }
                .into());
            }
        }
        let alternatives: Vec<String> = header_cells.map(|h| h.trim().to_string()).collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let mut fields = record.iter();
            let person = fields.next().unwrap_or("").trim().to_string();

            let mut row = Vec::with_capacity(alternatives.len());
            for (column, cell) in fields.enumerate() {
                let cell = cell.trim();
                if cell.is_empty() || cell == "NA" {
                    row.push(None);
                } else {
                    let value = cell.parse::<f64>().map_err(|_| MalformedInput::InvalidCost {
                        person: person.clone(),
                        alternative: alternatives
                            .get(column)
                            .cloned()
                            .unwrap_or_else(|| format!("column {}", column + 2)),
                        value: cell.to_string(),
                    })?;
                    row.push(Some(value));
                }
            }
            rows.push((person, row));
        }

        Ok(Self::new(alternatives, rows)?)
    }

    pub fn persons(&self) -> &[String] {
        &self.persons
    }

    pub fn alternatives(&self) -> &[String] {
        &self.alternatives
    }

    pub fn n_persons(&self) -> usize {
        self.persons.len()
    }

    pub fn n_alternatives(&self) -> usize {
        self.alternatives.len()
    }

    /// Stated cost, or `None` when the person left this alternative unrated.
    pub fn cost(&self, person: usize, alternative: usize) -> Option<f64> {
        self.costs[person * self.alternatives.len() + alternative]
    }

    /// Stated cost with missing preferences substituted by the sentinel.
    pub fn effective_cost(&self, person: usize, alternative: usize) -> f64 {
        self.cost(person, alternative).unwrap_or(self.penalty)
    }

    /// Penalty charged for an unrated assignment. Strictly larger than every
    /// stated cost in the table.
    pub fn penalty_cost(&self) -> f64 {
        self.penalty
    }

    /// Largest stated cost in a person's row, `None` if they rated nothing.
    pub fn worst_stated_cost(&self, person: usize) -> Option<f64> {
        let width = self.alternatives.len();
        self.costs[person * width..(person + 1) * width]
            .iter()
            .flatten()
            .copied()
            .reduce(f64::max)
    }
}
