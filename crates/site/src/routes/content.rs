//! Content route handlers: policies, blog, and team.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use crate::db::ContentRepository;
use crate::error::AppError;
use crate::models::{BlogPost, Policy, TeamMember};
use crate::state::AppState;

/// Build the content router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/policies", get(list_policies))
        .route("/api/blog", get(list_posts))
        .route("/api/blog/{slug}", get(get_post))
        .route("/api/team", get(list_team))
}

/// List company policies.
///
/// GET /api/policies
async fn list_policies(State(state): State<AppState>) -> Result<Json<Vec<Policy>>, AppError> {
    let repo = ContentRepository::new(state.pool());
    Ok(Json(repo.list_policies().await?))
}

/// List published blog posts, newest first.
///
/// GET /api/blog
async fn list_posts(State(state): State<AppState>) -> Result<Json<Vec<BlogPost>>, AppError> {
    let repo = ContentRepository::new(state.pool());
    Ok(Json(repo.list_published_posts().await?))
}

/// Get a single published post by slug.
///
/// GET /api/blog/:slug
async fn get_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<BlogPost>, AppError> {
    let repo = ContentRepository::new(state.pool());
    let post = repo
        .get_published_post(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("post {slug}")))?;

    Ok(Json(post))
}

/// List team members.
///
/// GET /api/team
async fn list_team(State(state): State<AppState>) -> Result<Json<Vec<TeamMember>>, AppError> {
    let repo = ContentRepository::new(state.pool());
    Ok(Json(repo.list_team_members().await?))
}
