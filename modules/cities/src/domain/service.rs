use std::sync::Arc;

use db::DbHandle;
use sqlx::AnyConnection;
use tracing::{debug, info, instrument};

use crate::contract::model::{City, CityFilter, CityUpdate};
use crate::domain::error::DomainError;
use crate::infra::storage::queries;

/// Domain service for city management.
///
/// Every public operation is one transactional unit: begin, run the body on
/// `&mut *tx`, commit. Any `?` in the body drops `tx`, which rolls it back.
#[derive(Clone)]
pub struct Service {
    db: Arc<DbHandle>,
}

impl Service {
    pub fn new(db: Arc<DbHandle>) -> Self {
        Self { db }
    }

    #[instrument(
        name = "cities.service.create_city",
        skip(self),
        fields(name = %city.name, population = city.population)
    )]
    pub async fn create_city(&self, mut city: City) -> Result<City, DomainError> {
        info!("Creating city");

        let mut tx = self.db.begin().await?;
        city.validate()?;
        city.id = queries::insert_city(&mut *tx, &city).await?;
        tx.commit()
            .await
            .map_err(|e| DomainError::storage("failed to commit city insert", e))?;

        info!(city_id = city.id, "Successfully created city");
        Ok(city)
    }

    #[instrument(name = "cities.service.delete_city", skip(self), fields(city_id = id))]
    pub async fn delete_city(&self, id: i64) -> Result<(), DomainError> {
        info!("Deleting city");

        let mut tx = self.db.begin().await?;
        let city = select_city_by_id(&mut *tx, id).await?;
        city.validate()?;
        queries::delete_city_by_id(&mut *tx, id).await?;
        tx.commit()
            .await
            .map_err(|e| DomainError::storage("failed to commit city delete", e))?;

        info!("Successfully deleted city");
        Ok(())
    }

    #[instrument(name = "cities.service.update_city", skip(self), fields(city_id = id))]
    pub async fn update_city(&self, id: i64, update: CityUpdate) -> Result<(), DomainError> {
        info!("Updating city");

        let mut tx = self.db.begin().await?;
        select_city_by_id(&mut *tx, id).await?;

        if let Some(population) = update.population {
            queries::update_population(&mut *tx, id, population).await?;
        } else {
            debug!("Empty update, nothing to write");
        }

        tx.commit()
            .await
            .map_err(|e| DomainError::storage("failed to commit city update", e))?;

        info!("Successfully updated city");
        Ok(())
    }

    /// Filtered listing. Zero matches is an empty `Vec`, never `NotFound`.
    #[instrument(name = "cities.service.find_cities", skip(self))]
    pub async fn find_cities(&self, filter: CityFilter) -> Result<Vec<City>, DomainError> {
        debug!("Finding cities");

        let mut tx = self.db.begin().await?;
        let cities = queries::select_cities(&mut *tx, &filter).await?;
        tx.commit()
            .await
            .map_err(|e| DomainError::storage("failed to commit city lookup", e))?;

        debug!("Found {} cities", cities.len());
        Ok(cities)
    }

    #[instrument(name = "cities.service.find_city_by_id", skip(self), fields(city_id = id))]
    pub async fn find_city_by_id(&self, id: i64) -> Result<City, DomainError> {
        first_or_not_found(self.find_cities(CityFilter::by_id(id)).await?)
    }

    #[instrument(name = "cities.service.find_cities_by_population", skip(self))]
    pub async fn find_cities_by_population(
        &self,
        population: i64,
    ) -> Result<Vec<City>, DomainError> {
        non_empty_or_not_found(
            self.find_cities(CityFilter {
                population: Some(population),
                ..Default::default()
            })
            .await?,
        )
    }

    #[instrument(name = "cities.service.find_cities_by_population_gte", skip(self))]
    pub async fn find_cities_by_population_gte(
        &self,
        population: i64,
    ) -> Result<Vec<City>, DomainError> {
        non_empty_or_not_found(
            self.find_cities(CityFilter {
                population_gte: Some(population),
                ..Default::default()
            })
            .await?,
        )
    }

    #[instrument(name = "cities.service.find_cities_by_population_lte", skip(self))]
    pub async fn find_cities_by_population_lte(
        &self,
        population: i64,
    ) -> Result<Vec<City>, DomainError> {
        non_empty_or_not_found(
            self.find_cities(CityFilter {
                population_lte: Some(population),
                ..Default::default()
            })
            .await?,
        )
    }

    /// With duplicate names the highest id wins; no match is `Ok(None)`.
    #[instrument(name = "cities.service.find_id_by_name", skip(self))]
    pub async fn find_id_by_name(&self, name: &str) -> Result<Option<i64>, DomainError> {
        let mut tx = self.db.begin().await?;
        let id = queries::select_last_id_by_name(&mut *tx, name).await?;
        tx.commit()
            .await
            .map_err(|e| DomainError::storage("failed to commit city lookup", e))?;

        debug!(?id, "Resolved city id by name");
        Ok(id)
    }
}

/// Existence check inside an open transaction.
async fn select_city_by_id(conn: &mut AnyConnection, id: i64) -> Result<City, DomainError> {
    first_or_not_found(queries::select_cities(conn, &CityFilter::by_id(id)).await?)
}

fn first_or_not_found(cities: Vec<City>) -> Result<City, DomainError> {
    cities
        .into_iter()
        .next()
        .ok_or_else(DomainError::city_not_found)
}

fn non_empty_or_not_found(cities: Vec<City>) -> Result<Vec<City>, DomainError> {
    if cities.is_empty() {
        return Err(DomainError::city_not_found());
    }
    Ok(cities)
}
