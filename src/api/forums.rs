use crate::{
    auth::ExtractAuth,
    error::{AppError, AppResult},
    models::Forum,
    schema::*,
    DbPool,
};
use axum::{
    extract::Path,
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::Deserialize;

#[derive(Insertable)]
#[diesel(table_name = forums)]
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewForum {
    club_id: i32,
    title: String,
    description: String,
    #[serde(rename = "isAdminOnly")]
    admin_only: bool,
}

async fn create(
    Extension(pool): Extension<DbPool>,
    ExtractAuth(_claims): ExtractAuth,
    Json(req): Json<NewForum>,
) -> AppResult<(StatusCode, Json<Forum>)> {
    let conn = &mut pool.get().await?;

    let forum = diesel::insert_into(forums::table)
        .values(req)
        .get_result::<Forum>(conn)
        .await?;

    Ok((StatusCode::CREATED, Json(forum)))
}

async fn list_by_club(
    Extension(pool): Extension<DbPool>,
    ExtractAuth(_claims): ExtractAuth,
    Path(club_id): Path<i32>,
) -> AppResult<Json<Vec<Forum>>> {
    let conn = &mut pool.get().await?;

    let club_forums = forums::table
        .filter(forums::club_id.eq(club_id))
        .load::<Forum>(conn)
        .await?;

    Ok(Json(club_forums))
}

async fn details(
    Extension(pool): Extension<DbPool>,
    ExtractAuth(_claims): ExtractAuth,
    Path(forum_id): Path<i32>,
) -> AppResult<Json<Forum>> {
    let conn = &mut pool.get().await?;

    let forum = forums::table
        .find(forum_id)
        .first::<Forum>(conn)
        .await
        .optional()?
        .ok_or_else(|| AppError::from(StatusCode::NOT_FOUND, "Forum not found"))?;

    Ok(Json(forum))
}

pub fn app() -> Router {
    Router::new()
        .route("/", post(create))
        .route("/club/:club_id", get(list_by_club))
        .route("/details/:forum_id", get(details))
}
