use axum::Router;

pub mod books;
pub mod clubs;
pub mod forums;
pub mod posts;
pub mod profile;
pub mod reference;
pub mod users;

pub fn app() -> Router {
    Router::new()
        .merge(users::app())
        .merge(clubs::app())
        .merge(books::app())
        .merge(reference::app())
        .nest("/forums", forums::app())
        .nest("/posts", posts::app())
        .nest("/profile", profile::app())
}
