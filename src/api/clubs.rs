use crate::{
    auth::ExtractAuth,
    error::{AppError, AppResult},
    models::{BookClub, Membership},
    schema::*,
    DbPool,
};
use axum::{
    extract::Path,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncConnection, RunQueryDsl};
use scoped_futures::ScopedFutureExt;
use serde::{Deserialize, Serialize};

/// Every new club starts with this fixed set of discussion boards.
const DEFAULT_FORUMS: [(&str, &str); 7] = [
    (
        "Member Introductions",
        "Introduce yourself to fellow book lovers.",
    ),
    (
        "Events and Meet Ups",
        "Stay updated on upcoming book club events.",
    ),
    (
        "Book Discussions",
        "Dive into detailed discussions about our current reads, and past selections.",
    ),
    (
        "Book Club Operations",
        "Participate in the behind-the-scenes decision-making process. Vote on book selections, \
         meeting times, and discuss how our club runs.",
    ),
    (
        "Book Recommendations",
        "Looking for your next great read? Get and give recommendations on what to dive into next.",
    ),
    (
        "Author Discussions",
        "A place to discuss specific authors, their works, and their impact on literature. Join \
         to celebrate your favorite authors and discover new ones.",
    ),
    (
        "General Chat",
        "For all off-topic conversations, non-book-related hobbies, and to get to know your \
         fellow club members beyond the books.",
    ),
];

const MAX_MEMBERSHIPS: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
enum ClubType {
    Online,
    #[serde(rename = "In-Person")]
    InPerson,
}

impl ClubType {
    fn as_str(self) -> &'static str {
        match self {
            ClubType::Online => "Online",
            ClubType::InPerson => "In-Person",
        }
    }
}

fn missing_location(club_type: ClubType, state: &Option<String>, city: &Option<String>) -> bool {
    club_type == ClubType::InPerson
        && (state.as_deref().map_or(true, |s| s.trim().is_empty())
            || city.as_deref().map_or(true, |c| c.trim().is_empty()))
}

// The limit check takes precedence over the duplicate check.
fn check_join(held: i64, already_member: bool) -> AppResult<()> {
    if held >= MAX_MEMBERSHIPS {
        return Err(AppError::from(
            StatusCode::BAD_REQUEST,
            "Cannot join more than 3 book clubs.",
        ));
    }
    if already_member {
        return Err(AppError::from(
            StatusCode::CONFLICT,
            "User is already a member of this book club.",
        ));
    }
    Ok(())
}

fn ensure_club_admin(club: &BookClub, user_id: i32) -> AppResult<()> {
    if club.admin_user_id != user_id {
        return Err(AppError::from(
            StatusCode::FORBIDDEN,
            "Unauthorized: Only the admin can update this info.",
        ));
    }
    Ok(())
}

fn leave_response(removed: usize) -> AppResult<LeaveResponse> {
    if removed == 0 {
        return Err(AppError::from(
            StatusCode::NOT_FOUND,
            "Membership not found.",
        ));
    }
    Ok(LeaveResponse {
        message: "Successfully left the book club.".to_string(),
    })
}

#[derive(Insertable)]
#[diesel(table_name = memberships)]
struct NewMembership {
    user_id: i32,
    club_id: i32,
    joined_at: DateTime<Utc>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateClubRequest {
    pub club_name: String,
    pub description: Option<String>,
    pub club_type: ClubType,
    pub state: Option<String>,
    pub city: Option<String>,
}

async fn create(
    Extension(pool): Extension<DbPool>,
    ExtractAuth(claims): ExtractAuth,
    Json(req): Json<CreateClubRequest>,
) -> AppResult<(StatusCode, Json<BookClub>)> {
    #[derive(Insertable)]
    #[diesel(table_name = book_clubs)]
    struct NewBookClub {
        club_name: String,
        description: Option<String>,
        club_type: String,
        state: Option<String>,
        city: Option<String>,
        club_privacy: bool,
        admin_user_id: i32,
        created_at: DateTime<Utc>,
    }

    #[derive(Insertable)]
    #[diesel(table_name = forums)]
    struct NewForum {
        club_id: i32,
        title: String,
        description: String,
        admin_only: bool,
    }

    if missing_location(req.club_type, &req.state, &req.city) {
        return Err(AppError::from(
            StatusCode::BAD_REQUEST,
            "State and city are required for in-person clubs.",
        ));
    }

    let conn = &mut pool.get().await?;

    // The club row, the creator's membership and the seven default forums
    // land together or not at all.
    let club = conn
        .transaction::<BookClub, AppError, _>(|conn| {
            async move {
                let club = diesel::insert_into(book_clubs::table)
                    .values(NewBookClub {
                        club_name: req.club_name,
                        description: req.description,
                        club_type: req.club_type.as_str().to_string(),
                        state: req.state,
                        city: req.city,
                        club_privacy: true,
                        admin_user_id: claims.user_id,
                        created_at: Utc::now(),
                    })
                    .get_result::<BookClub>(conn)
                    .await?;

                diesel::insert_into(memberships::table)
                    .values(NewMembership {
                        user_id: claims.user_id,
                        club_id: club.id,
                        joined_at: Utc::now(),
                    })
                    .execute(conn)
                    .await?;

                let default_forums: Vec<NewForum> = DEFAULT_FORUMS
                    .iter()
                    .map(|(title, description)| NewForum {
                        club_id: club.id,
                        title: title.to_string(),
                        description: description.to_string(),
                        admin_only: false,
                    })
                    .collect();

                diesel::insert_into(forums::table)
                    .values(default_forums)
                    .execute(conn)
                    .await?;

                Ok(club)
            }
            .scope_boxed()
        })
        .await?;

    Ok((StatusCode::CREATED, Json(club)))
}

async fn list(Extension(pool): Extension<DbPool>) -> AppResult<Json<Vec<BookClub>>> {
    let conn = &mut pool.get().await?;

    let clubs = book_clubs::table
        .filter(book_clubs::club_privacy.eq(true))
        .load::<BookClub>(conn)
        .await?;

    Ok(Json(clubs))
}

async fn list_by_state(
    Extension(pool): Extension<DbPool>,
    Path(state_name): Path<String>,
) -> AppResult<Json<Vec<BookClub>>> {
    let conn = &mut pool.get().await?;

    let clubs = book_clubs::table
        .filter(book_clubs::state.eq(state_name))
        .filter(book_clubs::club_privacy.eq(true))
        .load::<BookClub>(conn)
        .await?;

    Ok(Json(clubs))
}

async fn my_clubs(
    Extension(pool): Extension<DbPool>,
    ExtractAuth(claims): ExtractAuth,
) -> AppResult<Json<Vec<BookClub>>> {
    let conn = &mut pool.get().await?;

    let member_of = memberships::table
        .filter(memberships::user_id.eq(claims.user_id))
        .select(memberships::club_id)
        .load::<i32>(conn)
        .await?;

    let clubs = book_clubs::table
        .filter(
            book_clubs::admin_user_id
                .eq(claims.user_id)
                .or(book_clubs::id.eq_any(member_of)),
        )
        .load::<BookClub>(conn)
        .await?;

    Ok(Json(clubs))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClubDetailsResponse {
    #[serde(flatten)]
    club: BookClub,
    is_member: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClubSummaryResponse {
    club_name: String,
    description: Option<String>,
    is_member: bool,
}

async fn details(
    Extension(pool): Extension<DbPool>,
    ExtractAuth(claims): ExtractAuth,
    Path(club_id): Path<i32>,
) -> AppResult<Response> {
    let conn = &mut pool.get().await?;

    let club = book_clubs::table
        .find(club_id)
        .first::<BookClub>(conn)
        .await
        .optional()?
        .ok_or_else(|| AppError::from(StatusCode::NOT_FOUND, "Book club not found"))?;

    let membership = memberships::table
        .filter(memberships::user_id.eq(claims.user_id))
        .filter(memberships::club_id.eq(club_id))
        .first::<Membership>(conn)
        .await
        .optional()?;

    // Non-members only get to see the name and the blurb.
    if membership.is_some() || club.admin_user_id == claims.user_id {
        Ok(Json(ClubDetailsResponse {
            club,
            is_member: true,
        })
        .into_response())
    } else {
        Ok(Json(ClubSummaryResponse {
            club_name: club.club_name,
            description: club.description,
            is_member: false,
        })
        .into_response())
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JoinRequest {
    pub club_id: i32,
}

async fn join(
    Extension(pool): Extension<DbPool>,
    ExtractAuth(claims): ExtractAuth,
    Json(req): Json<JoinRequest>,
) -> AppResult<(StatusCode, Json<Membership>)> {
    let conn = &mut pool.get().await?;

    let held = memberships::table
        .filter(memberships::user_id.eq(claims.user_id))
        .count()
        .get_result::<i64>(conn)
        .await?;

    let existing = memberships::table
        .filter(memberships::user_id.eq(claims.user_id))
        .filter(memberships::club_id.eq(req.club_id))
        .first::<Membership>(conn)
        .await
        .optional()?;

    check_join(held, existing.is_some())?;

    let membership = diesel::insert_into(memberships::table)
        .values(NewMembership {
            user_id: claims.user_id,
            club_id: req.club_id,
            joined_at: Utc::now(),
        })
        .get_result::<Membership>(conn)
        .await?;

    Ok((StatusCode::CREATED, Json(membership)))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckMembershipResponse {
    is_member: bool,
}

async fn check_membership(
    Extension(pool): Extension<DbPool>,
    ExtractAuth(claims): ExtractAuth,
    Path(club_id): Path<i32>,
) -> AppResult<Json<CheckMembershipResponse>> {
    let conn = &mut pool.get().await?;

    let membership = memberships::table
        .filter(memberships::user_id.eq(claims.user_id))
        .filter(memberships::club_id.eq(club_id))
        .first::<Membership>(conn)
        .await
        .optional()?;

    Ok(Json(CheckMembershipResponse {
        is_member: membership.is_some(),
    }))
}

#[derive(Debug, Serialize)]
struct LeaveResponse {
    message: String,
}

async fn leave(
    Extension(pool): Extension<DbPool>,
    ExtractAuth(claims): ExtractAuth,
    Path(club_id): Path<i32>,
) -> AppResult<Json<LeaveResponse>> {
    let conn = &mut pool.get().await?;

    let removed = diesel::delete(
        memberships::table
            .filter(memberships::user_id.eq(claims.user_id))
            .filter(memberships::club_id.eq(club_id)),
    )
    .execute(conn)
    .await?;

    Ok(Json(leave_response(removed)?))
}

#[derive(AsChangeset)]
#[diesel(table_name = book_clubs)]
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClubEdit {
    meeting_info: Option<String>,
    announcements: Option<String>,
}

async fn update(
    Extension(pool): Extension<DbPool>,
    ExtractAuth(claims): ExtractAuth,
    Path(club_id): Path<i32>,
    Json(req): Json<ClubEdit>,
) -> AppResult<Json<BookClub>> {
    let conn = &mut pool.get().await?;

    let club = book_clubs::table
        .find(club_id)
        .first::<BookClub>(conn)
        .await
        .optional()?
        .ok_or_else(|| AppError::from(StatusCode::NOT_FOUND, "Book club not found"))?;

    ensure_club_admin(&club, claims.user_id)?;

    // An empty changeset is not a valid UPDATE statement.
    if req.meeting_info.is_none() && req.announcements.is_none() {
        return Ok(Json(club));
    }

    let updated = diesel::update(book_clubs::table.find(club_id))
        .set(req)
        .get_result::<BookClub>(conn)
        .await?;

    Ok(Json(updated))
}

pub fn app() -> Router {
    Router::new()
        .route("/bookclubs", post(create).get(list))
        .route("/bookclubs/join", post(join))
        .route("/bookclubs/state/:state_name", get(list_by_state))
        .route("/bookclubs/:club_id", get(details))
        .route("/bookclubs/:club_id/check-membership", get(check_membership))
        .route("/bookclubs/:club_id/leave", delete(leave))
        .route("/bookclubs/:club_id/update", put(update))
        .route("/user/bookclubs", get(my_clubs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(result: AppResult<()>) -> StatusCode {
        result.unwrap_err().into_response().status()
    }

    fn club_with_admin(admin_user_id: i32) -> BookClub {
        BookClub {
            id: 1,
            club_name: "Night Readers".to_string(),
            description: None,
            club_type: "Online".to_string(),
            state: None,
            city: None,
            club_privacy: true,
            admin_user_id,
            meeting_info: None,
            announcements: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn fourth_join_attempt_is_rejected() {
        assert!(check_join(0, false).is_ok());
        assert!(check_join(2, false).is_ok());
        assert_eq!(status_of(check_join(3, false)), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(check_join(4, false)), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn duplicate_join_is_a_conflict() {
        assert_eq!(status_of(check_join(1, true)), StatusCode::CONFLICT);
    }

    #[test]
    fn membership_limit_wins_over_duplicate() {
        assert_eq!(status_of(check_join(3, true)), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn only_the_stored_admin_may_update() {
        let club = club_with_admin(5);
        assert!(ensure_club_admin(&club, 5).is_ok());
        assert_eq!(
            ensure_club_admin(&club, 6)
                .unwrap_err()
                .into_response()
                .status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn leaving_without_a_membership_is_not_found() {
        assert_eq!(
            leave_response(0).unwrap_err().into_response().status(),
            StatusCode::NOT_FOUND
        );
        let left = leave_response(1).unwrap();
        assert_eq!(left.message, "Successfully left the book club.");
    }

    #[test]
    fn seven_default_forums_with_fixed_titles() {
        let titles: Vec<&str> = DEFAULT_FORUMS.iter().map(|(title, _)| *title).collect();
        assert_eq!(
            titles,
            [
                "Member Introductions",
                "Events and Meet Ups",
                "Book Discussions",
                "Book Club Operations",
                "Book Recommendations",
                "Author Discussions",
                "General Chat",
            ]
        );
    }

    #[test]
    fn club_type_parses_wire_names() {
        let online: ClubType = serde_json::from_str("\"Online\"").unwrap();
        let in_person: ClubType = serde_json::from_str("\"In-Person\"").unwrap();
        assert_eq!(online, ClubType::Online);
        assert_eq!(in_person, ClubType::InPerson);
        assert!(serde_json::from_str::<ClubType>("\"in-person\"").is_err());
    }

    #[test]
    fn in_person_clubs_need_state_and_city() {
        let state = Some("Ohio".to_string());
        let city = Some("Columbus".to_string());
        assert!(!missing_location(ClubType::InPerson, &state, &city));
        assert!(missing_location(ClubType::InPerson, &None, &city));
        assert!(missing_location(ClubType::InPerson, &state, &None));
        assert!(missing_location(
            ClubType::InPerson,
            &Some("  ".to_string()),
            &city
        ));
        assert!(!missing_location(ClubType::Online, &None, &None));
    }

    #[test]
    fn non_member_projection_is_reduced() {
        let summary = ClubSummaryResponse {
            club_name: "Night Readers".to_string(),
            description: Some("Late night fiction".to_string()),
            is_member: false,
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "clubName": "Night Readers",
                "description": "Late night fiction",
                "isMember": false,
            })
        );
    }
}
