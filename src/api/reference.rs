use crate::{
    error::AppResult,
    models::{Genre, State},
    schema::*,
    DbPool,
};
use axum::{routing::get, Extension, Json, Router};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

async fn list_genres(Extension(pool): Extension<DbPool>) -> AppResult<Json<Vec<Genre>>> {
    let conn = &mut pool.get().await?;

    let all_genres = genres::table
        .order(genres::genre_name)
        .load::<Genre>(conn)
        .await?;

    Ok(Json(all_genres))
}

async fn list_states(Extension(pool): Extension<DbPool>) -> AppResult<Json<Vec<State>>> {
    let conn = &mut pool.get().await?;

    let all_states = states::table
        .order(states::name)
        .load::<State>(conn)
        .await?;

    Ok(Json(all_states))
}

pub fn app() -> Router {
    Router::new()
        .route("/genres", get(list_genres))
        .route("/states", get(list_states))
}
