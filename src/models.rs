use crate::schema::*;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;

#[derive(Debug, Clone, Queryable, Identifiable)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub profile_privacy: bool,
    pub favorite_genre: Option<i32>,
    pub favorite_quote: Option<String>,
}

#[derive(Debug, Clone, Queryable, Identifiable, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookClub {
    pub id: i32,
    pub club_name: String,
    pub description: Option<String>,
    pub club_type: String,
    pub state: Option<String>,
    pub city: Option<String>,
    pub club_privacy: bool,
    pub admin_user_id: i32,
    pub meeting_info: Option<String>,
    pub announcements: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations, Serialize)]
#[diesel(belongs_to(BookClub, foreign_key = club_id))]
#[diesel(belongs_to(User))]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub id: i32,
    pub user_id: i32,
    pub club_id: i32,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations, Serialize)]
#[diesel(belongs_to(BookClub, foreign_key = club_id))]
#[serde(rename_all = "camelCase")]
pub struct Forum {
    pub id: i32,
    pub club_id: i32,
    pub title: String,
    pub description: String,
    pub admin_only: bool,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations, Serialize)]
#[diesel(belongs_to(Forum, foreign_key = forum_id))]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i32,
    pub club_id: i32,
    pub forum_id: i32,
    pub author_id: i32,
    pub content: String,
    pub posted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations, Serialize)]
#[diesel(belongs_to(User))]
#[serde(rename_all = "camelCase")]
pub struct UserBook {
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub author: String,
    pub open_library_id: Option<String>,
    pub finished: bool,
}

#[derive(Debug, Clone, Queryable, Identifiable, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Genre {
    pub id: i32,
    pub genre_name: String,
}

#[derive(Debug, Clone, Queryable, Identifiable, Serialize)]
pub struct State {
    pub id: i32,
    pub name: String,
}
