use async_trait::async_trait;

use crate::contract::{
    error::CitiesError,
    model::{City, CityFilter, CityUpdate},
};

/// Public API trait for the cities module that other crates can use
#[async_trait]
pub trait CitiesApi: Send + Sync {
    /// Validate and insert a city; the returned value carries the generated id
    async fn create_city(&self, city: City) -> Result<City, CitiesError>;

    /// Delete a city by id
    async fn delete_city(&self, id: i64) -> Result<(), CitiesError>;

    /// Apply a partial update to an existing city
    async fn update_city(&self, id: i64, update: CityUpdate) -> Result<(), CitiesError>;

    /// Filtered listing, ascending id; an empty result is not an error
    async fn find_cities(&self, filter: CityFilter) -> Result<Vec<City>, CitiesError>;

    /// Get a city by id
    async fn find_city_by_id(&self, id: i64) -> Result<City, CitiesError>;

    /// Cities with exactly this population
    async fn find_cities_by_population(&self, population: i64)
        -> Result<Vec<City>, CitiesError>;

    /// Cities with population >= the bound
    async fn find_cities_by_population_gte(
        &self,
        population: i64,
    ) -> Result<Vec<City>, CitiesError>;

    /// Cities with population <= the bound
    async fn find_cities_by_population_lte(
        &self,
        population: i64,
    ) -> Result<Vec<City>, CitiesError>;

    /// Id of the last (highest-id) city with this name, if any
    async fn find_id_by_name(&self, name: &str) -> Result<Option<i64>, CitiesError>;
}
