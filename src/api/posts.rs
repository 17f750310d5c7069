use crate::{
    auth::ExtractAuth,
    error::{AppError, AppResult},
    models::{Forum, Post},
    schema::*,
    DbPool,
};
use axum::{
    extract::Path,
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatePostRequest {
    pub forum_id: i32,
    pub content: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PostResponse {
    #[serde(flatten)]
    post: Post,
    username: String,
    formatted_date: String,
}

fn format_post_date(posted_at: &DateTime<Utc>) -> String {
    posted_at.format("%Y-%m-%d %H:%M:%S").to_string()
}

async fn create(
    Extension(pool): Extension<DbPool>,
    ExtractAuth(claims): ExtractAuth,
    Json(req): Json<CreatePostRequest>,
) -> AppResult<(StatusCode, Json<Post>)> {
    #[derive(Insertable)]
    #[diesel(table_name = posts)]
    struct NewPost {
        club_id: i32,
        forum_id: i32,
        author_id: i32,
        content: String,
        posted_at: DateTime<Utc>,
    }

    let conn = &mut pool.get().await?;

    // The club reference is denormalized onto the post via its forum.
    let forum = forums::table
        .find(req.forum_id)
        .first::<Forum>(conn)
        .await
        .optional()?
        .ok_or_else(|| AppError::from(StatusCode::NOT_FOUND, "Forum not found"))?;

    let new_post = diesel::insert_into(posts::table)
        .values(NewPost {
            club_id: forum.club_id,
            forum_id: forum.id,
            author_id: claims.user_id,
            content: req.content,
            posted_at: Utc::now(),
        })
        .get_result::<Post>(conn)
        .await?;

    Ok((StatusCode::CREATED, Json(new_post)))
}

async fn list_by_forum(
    Extension(pool): Extension<DbPool>,
    ExtractAuth(_claims): ExtractAuth,
    Path(forum_id): Path<i32>,
) -> AppResult<Json<Vec<PostResponse>>> {
    let conn = &mut pool.get().await?;

    let forum_posts = posts::table
        .inner_join(users::table)
        .filter(posts::forum_id.eq(forum_id))
        .order(posts::posted_at.desc())
        .select((posts::all_columns, users::username))
        .load::<(Post, String)>(conn)
        .await?;

    Ok(Json(
        forum_posts
            .into_iter()
            .map(|(post, username)| PostResponse {
                formatted_date: format_post_date(&post.posted_at),
                post,
                username,
            })
            .collect(),
    ))
}

pub fn app() -> Router {
    Router::new()
        .route("/", post(create))
        .route("/forum/:forum_id", get(list_by_forum))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn post_dates_use_a_plain_timestamp_format() {
        let posted_at = Utc.with_ymd_and_hms(2024, 3, 9, 18, 5, 7).unwrap();
        assert_eq!(format_post_date(&posted_at), "2024-03-09 18:05:07");
    }

    #[test]
    fn post_response_carries_author_username() {
        let posted_at = Utc.with_ymd_and_hms(2024, 3, 9, 18, 5, 7).unwrap();
        let response = PostResponse {
            post: Post {
                id: 1,
                club_id: 2,
                forum_id: 3,
                author_id: 4,
                content: "Loved the ending".to_string(),
                posted_at,
            },
            username: "bookworm".to_string(),
            formatted_date: format_post_date(&posted_at),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["username"], "bookworm");
        assert_eq!(json["forumId"], 3);
        assert_eq!(json["formattedDate"], "2024-03-09 18:05:07");
    }
}
