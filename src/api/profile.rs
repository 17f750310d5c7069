use crate::{
    auth::ExtractAuth,
    error::{AppError, AppResult},
    models::User,
    schema::*,
    DbPool,
};
use axum::{
    extract::Path,
    routing::{get, put},
    Extension, Json, Router,
};
use diesel::prelude::*;
use diesel_async::{AsyncConnection, RunQueryDsl};
use scoped_futures::ScopedFutureExt;
use serde::{Deserialize, Serialize};

const NO_GENRE: &str = "No genre selected";
const NO_QUOTE: &str = "No quote selected";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PreferencesResponse {
    favorite_genre: String,
    favorite_book_quote: String,
}

async fn preferences_for(pool: &DbPool, user_id: i32) -> AppResult<PreferencesResponse> {
    let conn = &mut pool.get().await?;

    let user = users::table
        .find(user_id)
        .first::<User>(conn)
        .await
        .optional()?;

    let favorite_genre = match user.as_ref().and_then(|u| u.favorite_genre) {
        Some(genre_id) => genres::table
            .find(genre_id)
            .select(genres::genre_name)
            .first::<String>(conn)
            .await
            .optional()?
            .unwrap_or_else(|| NO_GENRE.to_string()),
        None => NO_GENRE.to_string(),
    };

    let favorite_book_quote = user
        .and_then(|u| u.favorite_quote)
        .unwrap_or_else(|| NO_QUOTE.to_string());

    Ok(PreferencesResponse {
        favorite_genre,
        favorite_book_quote,
    })
}

async fn get_preferences(
    Extension(pool): Extension<DbPool>,
    ExtractAuth(claims): ExtractAuth,
) -> AppResult<Json<PreferencesResponse>> {
    Ok(Json(preferences_for(&pool, claims.user_id).await?))
}

async fn get_preferences_for_user(
    Extension(pool): Extension<DbPool>,
    ExtractAuth(_claims): ExtractAuth,
    Path(user_id): Path<i32>,
) -> AppResult<Json<PreferencesResponse>> {
    Ok(Json(preferences_for(&pool, user_id).await?))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdatePreferencesRequest {
    pub favorite_genre: Option<i32>,
    pub favorite_book_quote: Option<String>,
}

#[derive(Serialize)]
struct UpdatePreferencesResponse {
    success: bool,
    message: String,
}

async fn update_preferences(
    Extension(pool): Extension<DbPool>,
    ExtractAuth(claims): ExtractAuth,
    Json(req): Json<UpdatePreferencesRequest>,
) -> AppResult<Json<UpdatePreferencesResponse>> {
    let conn = &mut pool.get().await?;

    // Both fields go in together or the whole update rolls back.
    conn.transaction::<(), AppError, _>(|conn| {
        async move {
            if let Some(genre_id) = req.favorite_genre {
                diesel::update(users::table.find(claims.user_id))
                    .set(users::favorite_genre.eq(genre_id))
                    .execute(conn)
                    .await?;
            }

            if let Some(quote) = req.favorite_book_quote {
                diesel::update(users::table.find(claims.user_id))
                    .set(users::favorite_quote.eq(quote))
                    .execute(conn)
                    .await?;
            }

            Ok(())
        }
        .scope_boxed()
    })
    .await?;

    Ok(Json(UpdatePreferencesResponse {
        success: true,
        message: "Preferences updated successfully.".to_string(),
    }))
}

pub fn app() -> Router {
    Router::new()
        .route("/preferences", get(get_preferences).put(update_preferences))
        .route("/preferences/:user_id", get(get_preferences_for_user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preferences_serialize_with_defaults() {
        let response = PreferencesResponse {
            favorite_genre: NO_GENRE.to_string(),
            favorite_book_quote: NO_QUOTE.to_string(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["favoriteGenre"], "No genre selected");
        assert_eq!(json["favoriteBookQuote"], "No quote selected");
    }
}
