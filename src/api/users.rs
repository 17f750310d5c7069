use crate::{
    auth::{self, ExtractAuth, TOKEN_LIFETIME},
    error::{AppError, AppResult},
    models::User,
    schema::*,
    DbPool,
};
use axum::{
    http::StatusCode,
    routing::{post, put},
    Extension, Json, Router,
};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UserResponse {
    id: i32,
    username: String,
    email: String,
    profile_privacy: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            profile_privacy: user.profile_privacy,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignupResponse {
    message: String,
    token: String,
    user: UserResponse,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    message: String,
    token: String,
    username: String,
    user_id: i32,
}

async fn signup(
    Extension(pool): Extension<DbPool>,
    Json(req): Json<SignupRequest>,
) -> AppResult<(StatusCode, Json<SignupResponse>)> {
    #[derive(Insertable)]
    #[diesel(table_name = users)]
    struct NewUser {
        username: String,
        email: String,
        password_hash: String,
        profile_privacy: bool,
    }

    let conn = &mut pool.get().await?;

    let taken = users::table
        .filter(
            users::username
                .eq(&req.username)
                .or(users::email.eq(&req.email)),
        )
        .count()
        .get_result::<i64>(conn)
        .await?;
    if taken > 0 {
        return Err(AppError::from(
            StatusCode::CONFLICT,
            "Username or email already exists.",
        ));
    }

    let new_user = diesel::insert_into(users::table)
        .values(NewUser {
            username: req.username,
            email: req.email,
            password_hash: auth::hash_password(req.password)?,
            profile_privacy: true,
        })
        .get_result::<User>(conn)
        .await?;

    let token = auth::generate_jwt(new_user.id, &new_user.username, TOKEN_LIFETIME)?;
    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: "User created successfully".to_string(),
            token,
            user: new_user.into(),
        }),
    ))
}

async fn login(
    Extension(pool): Extension<DbPool>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let conn = &mut pool.get().await?;

    if let Some(user) = users::table
        .filter(users::username.eq(&req.username))
        .first::<User>(conn)
        .await
        .optional()?
    {
        if auth::verify_password(req.password, &user.password_hash)? {
            let token = auth::generate_jwt(user.id, &user.username, TOKEN_LIFETIME)?;
            return Ok(Json(LoginResponse {
                message: "Login successful".to_string(),
                token,
                username: user.username,
                user_id: user.id,
            }));
        }
    }
    Err(AppError::from(
        StatusCode::UNAUTHORIZED,
        "Invalid credentials.",
    ))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdatePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Serialize)]
struct MessageResponse {
    message: String,
}

fn verify_old_password(old_password: &str, stored_hash: &str) -> AppResult<()> {
    if !auth::verify_password(old_password, stored_hash)? {
        return Err(AppError::from(
            StatusCode::FORBIDDEN,
            "Old password is incorrect",
        ));
    }
    Ok(())
}

async fn update_password(
    Extension(pool): Extension<DbPool>,
    ExtractAuth(claims): ExtractAuth,
    Json(req): Json<UpdatePasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    let conn = &mut pool.get().await?;

    let stored_hash = users::table
        .find(claims.user_id)
        .select(users::password_hash)
        .first::<String>(conn)
        .await
        .optional()?
        .ok_or_else(|| AppError::from(StatusCode::NOT_FOUND, "User not found"))?;

    verify_old_password(&req.old_password, &stored_hash)?;

    diesel::update(users::table.find(claims.user_id))
        .set(users::password_hash.eq(auth::hash_password(req.new_password)?))
        .execute(conn)
        .await?;

    Ok(Json(MessageResponse {
        message: "Password updated successfully".to_string(),
    }))
}

pub fn app() -> Router {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/users/updatePassword", put(update_password))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn wrong_old_password_is_forbidden() {
        let stored_hash = auth::hash_password("old-password").unwrap();
        assert_eq!(
            verify_old_password("not-the-old-password", &stored_hash)
                .unwrap_err()
                .into_response()
                .status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn matching_old_password_passes() {
        let stored_hash = auth::hash_password("old-password").unwrap();
        assert!(verify_old_password("old-password", &stored_hash).is_ok());
    }
}
