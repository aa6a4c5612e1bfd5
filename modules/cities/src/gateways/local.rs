use async_trait::async_trait;
use std::sync::Arc;

use crate::contract::{
    client::CitiesApi,
    error::CitiesError,
    model::{City, CityFilter, CityUpdate},
};
use crate::domain::service::Service;

/// In-process client: the public contract backed directly by the domain service.
pub struct CitiesLocalClient {
    service: Arc<Service>,
}

impl CitiesLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl CitiesApi for CitiesLocalClient {
    async fn create_city(&self, city: City) -> Result<City, CitiesError> {
        self.service.create_city(city).await.map_err(Into::into)
    }

    async fn delete_city(&self, id: i64) -> Result<(), CitiesError> {
        self.service.delete_city(id).await.map_err(Into::into)
    }

    async fn update_city(&self, id: i64, update: CityUpdate) -> Result<(), CitiesError> {
        self.service.update_city(id, update).await.map_err(Into::into)
    }

    async fn find_cities(&self, filter: CityFilter) -> Result<Vec<City>, CitiesError> {
        self.service.find_cities(filter).await.map_err(Into::into)
    }

    async fn find_city_by_id(&self, id: i64) -> Result<City, CitiesError> {
        self.service.find_city_by_id(id).await.map_err(Into::into)
    }

    async fn find_cities_by_population(
        &self,
        population: i64,
    ) -> Result<Vec<City>, CitiesError> {
        self.service
            .find_cities_by_population(population)
            .await
            .map_err(Into::into)
    }

    async fn find_cities_by_population_gte(
        &self,
        population: i64,
    ) -> Result<Vec<City>, CitiesError> {
        self.service
            .find_cities_by_population_gte(population)
            .await
            .map_err(Into::into)
    }

    async fn find_cities_by_population_lte(
        &self,
        population: i64,
    ) -> Result<Vec<City>, CitiesError> {
        self.service
            .find_cities_by_population_lte(population)
            .await
            .map_err(Into::into)
    }

    async fn find_id_by_name(&self, name: &str) -> Result<Option<i64>, CitiesError> {
        self.service.find_id_by_name(name).await.map_err(Into::into)
    }
}
