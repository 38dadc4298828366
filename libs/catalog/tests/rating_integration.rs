//! Integration tests for ratings: upsert semantics, aggregates and history

mod support;

use catalog::CatalogError;
use serial_test::serial;
use support::{movie, row_count, setup, unique_title};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

#[tokio::test]
#[serial]
async fn test_rating_twice_with_same_value_is_idempotent() {
    let catalog = setup().await;
    let cancel = CancellationToken::new();
    let created = movie(&unique_title("Up"), 2009, &["Animation"]);
    catalog.movies.create(&created, &cancel).await.unwrap();
    let user = Uuid::new_v4();

    assert!(catalog.ratings.rate_movie(created.id, 4, user, &cancel).await.unwrap());
    let first = catalog
        .movies
        .get_by_id(created.id, Some(user), &cancel)
        .await
        .unwrap()
        .unwrap();

    assert!(catalog.ratings.rate_movie(created.id, 4, user, &cancel).await.unwrap());
    let second = catalog
        .movies
        .get_by_id(created.id, Some(user), &cancel)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(row_count(&catalog.pool, "ratings", created.id).await, 1);
    assert_eq!(first.rating, second.rating);
    assert_eq!(second.user_rating, Some(4));
}

#[tokio::test]
#[serial]
async fn test_rating_again_overwrites_previous_value() {
    let catalog = setup().await;
    let cancel = CancellationToken::new();
    let created = movie(&unique_title("Cars"), 2006, &["Animation"]);
    catalog.movies.create(&created, &cancel).await.unwrap();
    let user = Uuid::new_v4();

    catalog.ratings.rate_movie(created.id, 2, user, &cancel).await.unwrap();
    catalog.ratings.rate_movie(created.id, 5, user, &cancel).await.unwrap();

    let movie = catalog
        .movies
        .get_by_id(created.id, Some(user), &cancel)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(movie.user_rating, Some(5));
    assert_eq!(movie.rating, Some(5.0));
}

#[tokio::test]
#[serial]
async fn test_rating_unknown_movie_is_a_validation_failure() {
    let catalog = setup().await;
    let cancel = CancellationToken::new();

    let result = catalog
        .ratings
        .rate_movie(Uuid::new_v4(), 3, Uuid::new_v4(), &cancel)
        .await;

    match result {
        Err(CatalogError::Validation(errors)) => assert!(errors.has_failure_for("movie_id")),
        other => panic!("expected validation failure, got {other:?}"),
    }
}

#[tokio::test]
#[serial]
async fn test_every_value_in_range_is_accepted() {
    let catalog = setup().await;
    let cancel = CancellationToken::new();
    let created = movie(&unique_title("Coco"), 2017, &["Animation"]);
    catalog.movies.create(&created, &cancel).await.unwrap();

    for value in 1..=5 {
        let user = Uuid::new_v4();
        assert!(
            catalog
                .ratings
                .rate_movie(created.id, value, user, &cancel)
                .await
                .unwrap()
        );
    }

    let rated = catalog
        .movies
        .get_by_id(created.id, None, &cancel)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(rated.rating, Some(3.0));
}

#[tokio::test]
#[serial]
async fn test_unrate_reports_whether_a_rating_existed() {
    let catalog = setup().await;
    let cancel = CancellationToken::new();
    let created = movie(&unique_title("Jaws"), 1975, &["Thriller"]);
    catalog.movies.create(&created, &cancel).await.unwrap();
    let user = Uuid::new_v4();

    assert!(!catalog.ratings.delete_rating(created.id, user, &cancel).await.unwrap());

    catalog.ratings.rate_movie(created.id, 3, user, &cancel).await.unwrap();
    assert!(catalog.ratings.delete_rating(created.id, user, &cancel).await.unwrap());
    assert!(!catalog.ratings.delete_rating(created.id, user, &cancel).await.unwrap());
}

#[tokio::test]
#[serial]
async fn test_aggregate_is_absent_without_ratings() {
    let catalog = setup().await;
    let cancel = CancellationToken::new();
    let created = movie(&unique_title("Nope"), 2022, &["Horror"]);
    catalog.movies.create(&created, &cancel).await.unwrap();

    let unrated = catalog
        .movies
        .update(created, Some(Uuid::new_v4()), &cancel)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unrated.rating, None);
    assert_eq!(unrated.user_rating, None);
}

#[tokio::test]
#[serial]
async fn test_concurrent_ratings_converge_to_one_row() {
    let catalog = setup().await;
    let cancel = CancellationToken::new();
    let created = movie(&unique_title("Rashomon"), 1950, &["Drama"]);
    catalog.movies.create(&created, &cancel).await.unwrap();
    let user = Uuid::new_v4();

    let mut handles = Vec::new();
    for attempt in 0..10 {
        let ratings = catalog.ratings.clone();
        let movie_id = created.id;
        handles.push(tokio::spawn(async move {
            let value = attempt % 5 + 1;
            ratings
                .rate_movie(movie_id, value, user, &CancellationToken::new())
                .await
        }));
    }

    for handle in handles {
        assert!(handle.await.unwrap().unwrap(), "every upsert must succeed");
    }

    assert_eq!(row_count(&catalog.pool, "ratings", created.id).await, 1);

    let stored: i32 = sqlx::query_scalar("SELECT rating FROM ratings WHERE movieid = $1")
        .bind(created.id)
        .fetch_one(&catalog.pool)
        .await
        .unwrap();
    let history = catalog.ratings.get_all_ratings(user, &cancel).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].rating, stored);
}

#[tokio::test]
#[serial]
async fn test_rating_history_carries_slugs() {
    let catalog = setup().await;
    let cancel = CancellationToken::new();
    let user = Uuid::new_v4();
    let first = movie(&unique_title("Alien"), 1979, &["Horror"]);
    let second = movie(&unique_title("Aliens"), 1986, &["Action"]);

    for (created, value) in [(&first, 5), (&second, 4)] {
        catalog.movies.create(created, &cancel).await.unwrap();
        catalog
            .ratings
            .rate_movie(created.id, value, user, &cancel)
            .await
            .unwrap();
    }

    let mut history = catalog.ratings.get_all_ratings(user, &cancel).await.unwrap();
    history.sort_by_key(|entry| entry.rating);

    assert_eq!(history.len(), 2);
    assert_eq!(history[0].movie_id, second.id);
    assert_eq!(history[0].slug, second.slug());
    assert_eq!(history[0].rating, 4);
    assert_eq!(history[1].movie_id, first.id);
    assert_eq!(history[1].slug, first.slug());

    assert!(
        catalog
            .ratings
            .get_all_ratings(Uuid::new_v4(), &cancel)
            .await
            .unwrap()
            .is_empty()
    );
}
