use crate::{
    auth::ExtractAuth,
    covers::CoverClient,
    error::{AppError, AppResult},
    models::UserBook,
    schema::*,
    DbPool,
};
use axum::{
    extract::Path,
    http::StatusCode,
    routing::{delete, get, patch, post},
    Extension, Json, Router,
};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use futures::future::join_all;
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddBookRequest {
    pub title: String,
    pub author: String,
    pub open_library_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BookWithCoverResponse {
    #[serde(flatten)]
    book: UserBook,
    cover_image: String,
}

async fn add_currently_reading(
    Extension(pool): Extension<DbPool>,
    ExtractAuth(claims): ExtractAuth,
    Json(req): Json<AddBookRequest>,
) -> AppResult<(StatusCode, Json<UserBook>)> {
    #[derive(Insertable)]
    #[diesel(table_name = user_books)]
    struct NewUserBook {
        user_id: i32,
        title: String,
        author: String,
        open_library_id: Option<String>,
        finished: bool,
    }

    let conn = &mut pool.get().await?;

    let book = diesel::insert_into(user_books::table)
        .values(NewUserBook {
            user_id: claims.user_id,
            title: req.title,
            author: req.author,
            open_library_id: req.open_library_id,
            finished: false,
        })
        .get_result::<UserBook>(conn)
        .await?;

    Ok((StatusCode::CREATED, Json(book)))
}

async fn currently_reading_for(
    pool: &DbPool,
    covers: &CoverClient,
    user_id: i32,
) -> AppResult<Vec<BookWithCoverResponse>> {
    let conn = &mut pool.get().await?;

    let books = user_books::table
        .filter(user_books::user_id.eq(user_id))
        .filter(user_books::finished.eq(false))
        .load::<UserBook>(conn)
        .await?;

    // Cover lookups are independent, resolve them concurrently.
    let with_covers = join_all(books.into_iter().map(|book| async move {
        let cover_image = covers.cover_for_title(&book.title).await;
        BookWithCoverResponse { book, cover_image }
    }))
    .await;
    Ok(with_covers)
}

async fn finished_books_for(pool: &DbPool, user_id: i32) -> AppResult<Vec<UserBook>> {
    let conn = &mut pool.get().await?;

    let books = user_books::table
        .filter(user_books::user_id.eq(user_id))
        .filter(user_books::finished.eq(true))
        .load::<UserBook>(conn)
        .await?;

    if books.is_empty() {
        return Err(AppError::from(
            StatusCode::NOT_FOUND,
            "No finished books found for this user.",
        ));
    }
    Ok(books)
}

async fn get_currently_reading(
    Extension(pool): Extension<DbPool>,
    Extension(covers): Extension<CoverClient>,
    ExtractAuth(claims): ExtractAuth,
) -> AppResult<Json<Vec<BookWithCoverResponse>>> {
    Ok(Json(
        currently_reading_for(&pool, &covers, claims.user_id).await?,
    ))
}

async fn get_currently_reading_for_user(
    Extension(pool): Extension<DbPool>,
    Extension(covers): Extension<CoverClient>,
    ExtractAuth(_claims): ExtractAuth,
    Path(user_id): Path<i32>,
) -> AppResult<Json<Vec<BookWithCoverResponse>>> {
    Ok(Json(currently_reading_for(&pool, &covers, user_id).await?))
}

async fn get_finished(
    Extension(pool): Extension<DbPool>,
    ExtractAuth(claims): ExtractAuth,
) -> AppResult<Json<Vec<UserBook>>> {
    Ok(Json(finished_books_for(&pool, claims.user_id).await?))
}

async fn get_finished_for_user(
    Extension(pool): Extension<DbPool>,
    ExtractAuth(_claims): ExtractAuth,
    Path(user_id): Path<i32>,
) -> AppResult<Json<Vec<UserBook>>> {
    Ok(Json(finished_books_for(&pool, user_id).await?))
}

async fn mark_finished(
    Extension(pool): Extension<DbPool>,
    ExtractAuth(_claims): ExtractAuth,
    Path(book_id): Path<i32>,
) -> AppResult<Json<UserBook>> {
    let conn = &mut pool.get().await?;

    let book = diesel::update(user_books::table.find(book_id))
        .set(user_books::finished.eq(true))
        .get_result::<UserBook>(conn)
        .await
        .optional()?
        .ok_or_else(|| AppError::from(StatusCode::NOT_FOUND, "Book not found"))?;

    Ok(Json(book))
}

#[derive(Serialize)]
struct RemoveBookResponse {
    message: String,
    book: UserBook,
}

async fn remove_currently_reading(
    Extension(pool): Extension<DbPool>,
    ExtractAuth(_claims): ExtractAuth,
    Path(book_id): Path<i32>,
) -> AppResult<Json<RemoveBookResponse>> {
    let conn = &mut pool.get().await?;

    let book = diesel::delete(user_books::table.find(book_id))
        .get_result::<UserBook>(conn)
        .await
        .optional()?
        .ok_or_else(|| AppError::from(StatusCode::NOT_FOUND, "Book not found"))?;

    Ok(Json(RemoveBookResponse {
        message: "Book removed successfully".to_string(),
        book,
    }))
}

pub fn app() -> Router {
    Router::new()
        .route(
            "/currently-reading",
            post(add_currently_reading).get(get_currently_reading),
        )
        .route("/currently-reading/:book_id", delete(remove_currently_reading))
        .route("/currently-reading/:book_id/finish", patch(mark_finished))
        .route("/finished", get(get_finished))
        .route(
            "/users/:user_id/currently-reading",
            get(get_currently_reading_for_user),
        )
        .route("/users/:user_id/finished", get(get_finished_for_user))
}
