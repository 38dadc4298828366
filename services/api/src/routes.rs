//! API service routes

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::{
    AppState,
    error::ApiError,
    middleware::{Caller, identify_caller},
    models::{
        CreateMovieRequest, MovieListResponse, MovieQuery, MovieRatingResponse, MovieResponse,
        RateMovieRequest, UpdateMovieRequest,
    },
};

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let movie_routes = Router::new()
        .route("/api/movies", get(get_movies).post(create_movie))
        .route(
            "/api/movies/:id",
            get(get_movie).put(update_movie).delete(delete_movie),
        )
        .route(
            "/api/movies/:id/ratings",
            axum::routing::put(rate_movie).delete(delete_rating),
        )
        .route("/api/ratings/me", get(get_user_ratings))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            identify_caller,
        ));

    Router::new()
        .route("/health", get(health_check))
        .merge(movie_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let healthy = common::database::health_check(&state.db_pool)
        .await
        .unwrap_or(false);

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if healthy { "ok" } else { "unhealthy" },
            "service": "movies-api"
        })),
    )
}

/// Create a new movie
pub async fn create_movie(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(payload): Json<CreateMovieRequest>,
) -> Result<impl IntoResponse, ApiError> {
    caller.require_trusted()?;

    let movie = payload.into_movie();
    let created = state
        .movie_service
        .create(&movie, &state.request_token())
        .await?;

    if !created {
        return Err(ApiError::BadRequest("Movie could not be created".to_string()));
    }

    info!("Created movie {} ({})", movie.id, movie.slug());
    Ok((StatusCode::CREATED, Json(MovieResponse::from(movie))))
}

/// Get a movie by id or slug
pub async fn get_movie(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id_or_slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let cancel = state.request_token();
    let movie = match Uuid::parse_str(&id_or_slug) {
        Ok(id) => {
            state
                .movie_service
                .get_by_id(id, caller.user_id(), &cancel)
                .await?
        }
        Err(_) => {
            state
                .movie_service
                .get_by_slug(&id_or_slug, caller.user_id(), &cancel)
                .await?
        }
    }
    .ok_or(ApiError::NotFound("Movie not found".to_string()))?;

    Ok(Json(MovieResponse::from(movie)))
}

/// Get movies with filtering, sorting and pagination
pub async fn get_movies(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Query(query): Query<MovieQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let options = query.into_options(caller.user_id());
    let cancel = state.request_token();

    let movies = state.movie_service.get_all(&options, &cancel).await?;
    let total = state
        .movie_service
        .get_count(options.title.as_deref(), options.year_of_release, &cancel)
        .await?;

    Ok(Json(MovieListResponse::new(
        movies,
        options.page,
        options.page_size,
        total,
    )))
}

/// Update a movie
pub async fn update_movie(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMovieRequest>,
) -> Result<impl IntoResponse, ApiError> {
    caller.require_trusted()?;

    let updated = state
        .movie_service
        .update(payload.into_movie(id), caller.user_id(), &state.request_token())
        .await?
        .ok_or(ApiError::NotFound("Movie not found".to_string()))?;

    info!("Updated movie {}", id);
    Ok(Json(MovieResponse::from(updated)))
}

/// Delete a movie with its genres and ratings
pub async fn delete_movie(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    caller.require_admin()?;

    let deleted = state
        .movie_service
        .delete(id, &state.request_token())
        .await?;

    if deleted {
        info!("Deleted movie {}", id);
        Ok(Json(json!({"message": "Movie deleted successfully"})))
    } else {
        Err(ApiError::NotFound("Movie not found".to_string()))
    }
}

/// Rate a movie as the current user
pub async fn rate_movie(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RateMovieRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = caller.require_user()?;

    let rated = state
        .rating_service
        .rate_movie(id, payload.rating, user.id, &state.request_token())
        .await?;

    if rated {
        Ok(Json(json!({"message": "Movie rated successfully"})))
    } else {
        Err(ApiError::BadRequest("Rating could not be saved".to_string()))
    }
}

/// Remove the current user's rating of a movie
pub async fn delete_rating(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let user = caller.require_user()?;

    let deleted = state
        .rating_service
        .delete_rating(id, user.id, &state.request_token())
        .await?;

    if deleted {
        Ok(Json(json!({"message": "Rating deleted successfully"})))
    } else {
        Err(ApiError::NotFound("Rating not found".to_string()))
    }
}

/// Get every rating of the current user
pub async fn get_user_ratings(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Result<impl IntoResponse, ApiError> {
    let user = caller.require_user()?;

    let ratings: Vec<MovieRatingResponse> = state
        .rating_service
        .get_all_ratings(user.id, &state.request_token())
        .await?
        .into_iter()
        .map(MovieRatingResponse::from)
        .collect();

    Ok(Json(ratings))
}
