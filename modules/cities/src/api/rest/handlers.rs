use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, OriginalUri, Path, Query},
    http::StatusCode,
    response::Json,
    Extension,
};
use tracing::{error, info};

use crate::api::rest::dto::{CityDto, CityListDto, CreateCityReq, ListCitiesQuery, UpdateCityReq};
use crate::api::rest::error::{from_parts, map_domain_error};
use crate::api::rest::problem::ProblemResponse;
use crate::config::CitiesConfig;
use crate::contract::model::CityFilter;
use crate::domain::error::DomainError;
use crate::domain::service::Service;

fn invalid_body(rejection: JsonRejection, instance: &str) -> ProblemResponse {
    from_parts(
        StatusCode::BAD_REQUEST,
        "CITIES_INVALID_REQUEST",
        "Invalid request",
        rejection.body_text(),
        instance,
    )
}

/// Resolve a city name to its id, or a 404 problem.
async fn resolve_id(svc: &Service, name: &str, instance: &str) -> Result<i64, ProblemResponse> {
    match svc.find_id_by_name(name).await {
        Ok(Some(id)) => Ok(id),
        Ok(None) => Err(map_domain_error(&DomainError::city_not_found(), instance)),
        Err(e) => {
            error!("Failed to resolve city {}: {}", name, e);
            Err(map_domain_error(&e, instance))
        }
    }
}

/// Every city, ascending id
pub async fn list_all_cities(
    Extension(svc): Extension<Arc<Service>>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<CityListDto>, ProblemResponse> {
    match svc.find_cities(CityFilter::default()).await {
        Ok(cities) => Ok(Json(cities.into())),
        Err(e) => {
            error!("Failed to list cities: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Filtered listing driven by query parameters
pub async fn list_cities(
    Extension(svc): Extension<Arc<Service>>,
    Extension(config): Extension<CitiesConfig>,
    Query(query): Query<ListCitiesQuery>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<CityListDto>, ProblemResponse> {
    info!("Listing cities with query: {:?}", query);

    let filter = query.into_filter(config.max_page_size);
    match svc.find_cities(filter).await {
        Ok(cities) => Ok(Json(cities.into())),
        Err(e) => {
            error!("Failed to list cities: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Create a new city
pub async fn create_city(
    OriginalUri(uri): OriginalUri,
    Extension(svc): Extension<Arc<Service>>,
    body: Result<Json<CreateCityReq>, JsonRejection>,
) -> Result<(StatusCode, Json<CityDto>), ProblemResponse> {
    let Json(req_body) = body.map_err(|r| invalid_body(r, uri.path()))?;
    info!("Creating city: {:?}", req_body);

    match svc.create_city(req_body.into()).await {
        Ok(city) => Ok((StatusCode::CREATED, Json(CityDto::from(city)))),
        Err(e) => {
            error!("Failed to create city: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// First city (lowest id) with the given name
pub async fn get_city(
    Extension(svc): Extension<Arc<Service>>,
    Path(name): Path<String>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<CityDto>, ProblemResponse> {
    info!("Getting city with name: {}", name);

    match svc.find_cities(CityFilter::by_name(name.as_str())).await {
        Ok(cities) => match cities.into_iter().next() {
            Some(city) => Ok(Json(CityDto::from(city))),
            None => Err(map_domain_error(&DomainError::city_not_found(), uri.path())),
        },
        Err(e) => {
            error!("Failed to get city {}: {}", name, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Delete the city resolved by name
pub async fn delete_city(
    Extension(svc): Extension<Arc<Service>>,
    Path(name): Path<String>,
    OriginalUri(uri): OriginalUri,
) -> Result<StatusCode, ProblemResponse> {
    info!("Deleting city: {}", name);

    let id = resolve_id(&svc, &name, uri.path()).await?;
    match svc.delete_city(id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => {
            error!("Failed to delete city {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Partially update the city resolved by name and return its new state
pub async fn update_city(
    OriginalUri(uri): OriginalUri,
    Extension(svc): Extension<Arc<Service>>,
    Path(name): Path<String>,
    body: Result<Json<UpdateCityReq>, JsonRejection>,
) -> Result<Json<CityDto>, ProblemResponse> {
    let Json(req_body) = body.map_err(|r| invalid_body(r, uri.path()))?;
    info!("Updating city {} with: {:?}", name, req_body);

    let id = resolve_id(&svc, &name, uri.path()).await?;
    let updated = match svc.update_city(id, req_body.into()).await {
        Ok(()) => svc.find_city_by_id(id).await,
        Err(e) => Err(e),
    };

    match updated {
        Ok(city) => Ok(Json(CityDto::from(city))),
        Err(e) => {
            error!("Failed to update city {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}
