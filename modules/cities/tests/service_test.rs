mod common;

use cities::contract::model::{City, CityFilter, CityUpdate};
use cities::domain::error::DomainError;
use common::{insert_raw, setup};
use tracing_test::traced_test;

async fn seed(t: &common::TestDb) -> Vec<City> {
    let mut out = Vec::new();
    for (name, population) in [
        ("Roma", 2_800_000),
        ("Prato", 200_000),
        ("Firenze", 380_000),
        ("Milano", 1_400_000),
    ] {
        out.push(t.service.create_city(City::new(name, population)).await.unwrap());
    }
    out
}

#[tokio::test]
async fn create_then_find_by_name_round_trips() {
    let t = setup().await;

    let created = t
        .service
        .create_city(City::new("Prato", 200_000))
        .await
        .unwrap();
    assert_ne!(created.id, 0);

    let found = t
        .service
        .find_cities(CityFilter::by_name("Prato"))
        .await
        .unwrap();
    assert_eq!(found, vec![created.clone()]);
    assert_eq!(found[0].name, "Prato");
    assert_eq!(found[0].population, 200_000);
}

#[tokio::test]
async fn create_returns_the_generated_row_id() {
    let t = setup().await;

    let first = t.service.create_city(City::new("Roma", 1)).await.unwrap();
    let raw = insert_raw(&t.db, "Lucca", 2).await;
    let second = t.service.create_city(City::new("Pisa", 3)).await.unwrap();

    assert!(first.id < raw && raw < second.id);
    let stored = t.service.find_city_by_id(second.id).await.unwrap();
    assert_eq!(stored, second);
}

#[tokio::test]
async fn empty_filter_returns_every_row_in_id_order() {
    let t = setup().await;
    let seeded = seed(&t).await;

    let all = t.service.find_cities(CityFilter::default()).await.unwrap();

    assert_eq!(all, seeded);
    assert!(all.windows(2).all(|w| w[0].id < w[1].id));
}

#[tokio::test]
async fn unknown_id_is_empty_for_find_but_not_found_for_single_predicate_finders() {
    let t = setup().await;
    seed(&t).await;

    let none = t.service.find_cities(CityFilter::by_id(9_999)).await.unwrap();
    assert!(none.is_empty());

    let err = t.service.find_city_by_id(9_999).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));

    let err = t.service.find_cities_by_population(1).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
    let err = t
        .service
        .find_cities_by_population_gte(10_000_000)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
    let err = t.service.find_cities_by_population_lte(10).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}

#[tokio::test]
async fn population_finders_use_inclusive_bounds() {
    let t = setup().await;
    seed(&t).await;

    let exact = t.service.find_cities_by_population(200_000).await.unwrap();
    assert_eq!(exact.len(), 1);
    assert_eq!(exact[0].name, "Prato");

    let gte = t
        .service
        .find_cities_by_population_gte(1_400_000)
        .await
        .unwrap();
    let names: Vec<_> = gte.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Roma", "Milano"]);

    let lte = t.service.find_cities_by_population_lte(380_000).await.unwrap();
    let names: Vec<_> = lte.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Prato", "Firenze"]);
}

#[tokio::test]
async fn combined_predicates_intersect() {
    let t = setup().await;
    seed(&t).await;

    let band = t
        .service
        .find_cities(CityFilter {
            population_gte: Some(300_000),
            population_lte: Some(2_000_000),
            ..Default::default()
        })
        .await
        .unwrap();
    let names: Vec<_> = band.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Firenze", "Milano"]);

    let contradictory = t
        .service
        .find_cities(CityFilter {
            population_gte: Some(2_000_000),
            population_lte: Some(300_000),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(contradictory.is_empty());

    let mismatch = t
        .service
        .find_cities(CityFilter {
            name: Some("Roma".into()),
            population: Some(200_000),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(mismatch.is_empty());
}

#[tokio::test]
async fn pagination_slices_the_ordered_result() {
    let t = setup().await;
    let seeded = seed(&t).await;

    let page = t
        .service
        .find_cities(CityFilter {
            limit: Some(2),
            offset: Some(1),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page, seeded[1..3].to_vec());

    let tail = t
        .service
        .find_cities(CityFilter {
            offset: Some(3),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(tail, seeded[3..].to_vec());
}

#[tokio::test]
async fn create_rejects_invalid_cities() {
    let t = setup().await;

    let err = t.service.create_city(City::new("", 10)).await.unwrap_err();
    assert!(matches!(err, DomainError::Invalid { .. }));

    let err = t
        .service
        .create_city(City::new("Nowhere", -1))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Invalid { .. }));

    let all = t.service.find_cities(CityFilter::default()).await.unwrap();
    assert!(all.is_empty());

    // the rejected transactions were rolled back and released
    let ok = t.service.create_city(City::new("Siena", 50_000)).await.unwrap();
    let all = t.service.find_cities(CityFilter::default()).await.unwrap();
    assert_eq!(all, vec![ok]);
}

#[tokio::test]
async fn update_writes_population() {
    let t = setup().await;
    let prato = t
        .service
        .create_city(City::new("Prato", 200_000))
        .await
        .unwrap();

    t.service
        .update_city(
            prato.id,
            CityUpdate {
                population: Some(0),
            },
        )
        .await
        .unwrap();

    let reloaded = t.service.find_city_by_id(prato.id).await.unwrap();
    assert_eq!(reloaded.population, 0);
}

#[tokio::test]
async fn update_without_population_leaves_row_unchanged() {
    let t = setup().await;
    let prato = t
        .service
        .create_city(City::new("Prato", 200_000))
        .await
        .unwrap();

    t.service
        .update_city(prato.id, CityUpdate::default())
        .await
        .unwrap();

    let reloaded = t.service.find_city_by_id(prato.id).await.unwrap();
    assert_eq!(reloaded, prato);
}

#[tokio::test]
async fn update_unknown_id_is_not_found() {
    let t = setup().await;

    let err = t
        .service
        .update_city(
            42,
            CityUpdate {
                population: Some(1),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}

#[tokio::test]
async fn delete_removes_the_row() {
    let t = setup().await;
    let seeded = seed(&t).await;

    t.service.delete_city(seeded[0].id).await.unwrap();

    let all = t.service.find_cities(CityFilter::default()).await.unwrap();
    assert_eq!(all, seeded[1..].to_vec());
}

#[tokio::test]
async fn delete_unknown_id_is_not_found() {
    let t = setup().await;

    let err = t.service.delete_city(12_345).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}

#[tokio::test]
async fn delete_revalidates_stored_record_and_rolls_back() {
    let t = setup().await;
    let bad_id = insert_raw(&t.db, "", 5).await;

    let err = t.service.delete_city(bad_id).await.unwrap_err();
    assert!(matches!(err, DomainError::Invalid { .. }));

    // The row survived: the transaction never reached the delete.
    let still_there = t.service.find_cities(CityFilter::by_id(bad_id)).await.unwrap();
    assert_eq!(still_there.len(), 1);
}

#[tokio::test]
async fn find_id_by_name_returns_last_scanned_match() {
    let t = setup().await;
    let first = t.service.create_city(City::new("Springfield", 1)).await.unwrap();
    t.service.create_city(City::new("Shelbyville", 2)).await.unwrap();
    let second = t.service.create_city(City::new("Springfield", 3)).await.unwrap();
    assert!(first.id < second.id);

    let id = t.service.find_id_by_name("Springfield").await.unwrap();
    assert_eq!(id, Some(second.id));
}

#[tokio::test]
async fn find_id_by_name_without_match_is_none() {
    let t = setup().await;
    seed(&t).await;

    let id = t.service.find_id_by_name("Atlantis").await.unwrap();
    assert_eq!(id, None);
}

#[tokio::test]
#[traced_test]
async fn service_operations_emit_events() {
    let t = setup().await;

    t.service
        .create_city(City::new("Lucca", 90_000))
        .await
        .unwrap();

    assert!(logs_contain("Creating city"));
    assert!(logs_contain("Successfully created city"));
}
