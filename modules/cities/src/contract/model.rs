use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// A city row. `id` is assigned by storage on insert and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    pub population: i64,
}

impl City {
    /// A not-yet-persisted city; `id` stays zero until insert.
    pub fn new(name: impl Into<String>, population: i64) -> Self {
        Self {
            id: 0,
            name: name.into(),
            population,
        }
    }

    /// Structural checks only; knows nothing about persistence.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.is_empty() {
            return Err(DomainError::invalid("city name must not be empty"));
        }
        if self.population < 0 {
            return Err(DomainError::invalid(format!(
                "city population must not be negative (got {})",
                self.population
            )));
        }
        Ok(())
    }
}

/// Optional predicates over `cities`. `None` means "not constrained".
///
/// Present predicates are ANDed together; pagination applies after the
/// ascending-id ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CityFilter {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub population: Option<i64>,
    pub population_gte: Option<i64>,
    pub population_lte: Option<i64>,

    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl CityFilter {
    pub fn by_id(id: i64) -> Self {
        Self {
            id: Some(id),
            ..Default::default()
        }
    }

    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }
}

/// Partial update. A `None` field is left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CityUpdate {
    pub population: Option<i64>,
}

impl CityUpdate {
    pub fn is_empty(&self) -> bool {
        self.population.is_none()
    }
}
