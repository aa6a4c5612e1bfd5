use serde::{Deserialize, Serialize};

use crate::contract::model::{City, CityFilter, CityUpdate};

/// REST DTO for city representation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityDto {
    pub id: i64,
    pub name: String,
    pub population: i64,
}

/// REST DTO for creating a new city
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCityReq {
    pub name: String,
    pub population: i64,
}

/// REST DTO for updating a city (partial)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateCityReq {
    pub population: Option<i64>,
}

/// REST DTO for city list response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityListDto {
    pub cities: Vec<CityDto>,
}

/// REST DTO for listing query parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListCitiesQuery {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub population: Option<i64>,
    pub population_gte: Option<i64>,
    pub population_lte: Option<i64>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl ListCitiesQuery {
    /// Convert into a filter, clamping `limit` to `max_page_size`.
    pub fn into_filter(self, max_page_size: u32) -> CityFilter {
        CityFilter {
            id: self.id,
            name: self.name,
            population: self.population,
            population_gte: self.population_gte,
            population_lte: self.population_lte,
            limit: self.limit.map(|l| l.min(max_page_size)),
            offset: self.offset,
        }
    }
}

// Conversion implementations between REST DTOs and contract models

impl From<City> for CityDto {
    fn from(city: City) -> Self {
        Self {
            id: city.id,
            name: city.name,
            population: city.population,
        }
    }
}

impl From<Vec<City>> for CityListDto {
    fn from(cities: Vec<City>) -> Self {
        Self {
            cities: cities.into_iter().map(CityDto::from).collect(),
        }
    }
}

impl From<CreateCityReq> for City {
    fn from(req: CreateCityReq) -> Self {
        City::new(req.name, req.population)
    }
}

impl From<UpdateCityReq> for CityUpdate {
    fn from(req: UpdateCityReq) -> Self {
        Self {
            population: req.population,
        }
    }
}
