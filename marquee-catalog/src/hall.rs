use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// One row of seats. Seat numbers are 1-indexed within the row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HallRow {
    pub label: String,
    pub seat_count: u32,
}

/// Physical layout of a cinema hall. Rows may have irregular lengths.
/// Immutable once a show is scheduled against it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HallConfig {
    pub id: Uuid,
    pub name: String,
    pub rows: Vec<HallRow>,
}

impl HallConfig {
    pub fn new(name: impl Into<String>, rows: Vec<HallRow>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            rows,
        }
    }

    pub fn capacity(&self) -> u32 {
        self.rows.iter().map(|r| r.seat_count).sum()
    }

    /// Ordered list of valid seat ids ("A1", "A2", ... row by row).
    /// Pure and deterministic for a given layout.
    pub fn seat_map(&self) -> Result<Vec<String>, InvalidConfiguration> {
        self.validate()?;

        let mut seats = Vec::with_capacity(self.capacity() as usize);
        for row in &self.rows {
            for number in 1..=row.seat_count {
                seats.push(format!("{}{}", row.label, number));
            }
        }
        Ok(seats)
    }

    /// Same layout rules checked at creation time so malformed halls are
    /// rejected before anything schedules against them.
    pub fn validate(&self) -> Result<(), InvalidConfiguration> {
        if self.rows.is_empty() {
            return Err(InvalidConfiguration::NoRows);
        }

        let mut labels = HashSet::new();
        for row in &self.rows {
            if row.seat_count == 0 {
                return Err(InvalidConfiguration::EmptyRow {
                    label: row.label.clone(),
                });
            }
            if !labels.insert(row.label.as_str()) {
                return Err(InvalidConfiguration::DuplicateRowLabel {
                    label: row.label.clone(),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InvalidConfiguration {
    #[error("Hall has no rows")]
    NoRows,

    #[error("Row {label} has zero seats")]
    EmptyRow { label: String },

    #[error("Duplicate row label: {label}")]
    DuplicateRowLabel { label: String },
}
