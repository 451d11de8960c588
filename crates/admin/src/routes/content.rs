//! Content CRUD routes: policies, blog posts, team members, inquiries.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;

use harvestline_core::{BlogPostId, InquiryId, PolicyId, TeamMemberId};

use super::{non_empty, optional_url};
use crate::db::{BlogPostInput, ContentRepository, PolicyInput, TeamMemberInput};
use crate::error::{AppError, FieldError};
use crate::middleware::{RequireAdminAuth, ensure_can_write};
use crate::models::{BlogPost, ContactInquiry, Policy, TeamMember};
use crate::state::AppState;

/// Build the content router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/policies", get(list_policies).post(create_policy))
        .route(
            "/api/policies/{id}",
            get(get_policy).put(update_policy).delete(delete_policy),
        )
        .route("/api/blog", get(list_posts).post(create_post))
        .route(
            "/api/blog/{id}",
            get(get_post).put(update_post).delete(delete_post),
        )
        .route("/api/team", get(list_team).post(create_team_member))
        .route(
            "/api/team/{id}",
            get(get_team_member)
                .put(update_team_member)
                .delete(delete_team_member),
        )
        .route("/api/inquiries", get(list_inquiries))
        .route("/api/inquiries/{id}", axum::routing::delete(delete_inquiry))
}

// =============================================================================
// Policies
// =============================================================================

/// Policy create/replace payload.
#[derive(Debug, Deserialize)]
pub struct PolicyRequest {
    pub title: String,
    pub content: String,
}

impl PolicyRequest {
    fn validate(self) -> Result<PolicyInput, AppError> {
        let mut errors: Vec<FieldError> = Vec::new();
        let title = non_empty(&mut errors, "title", &self.title);
        let content = non_empty(&mut errors, "content", &self.content);

        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }
        Ok(PolicyInput { title, content })
    }
}

/// GET /api/policies
async fn list_policies(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Policy>>, AppError> {
    let repo = ContentRepository::new(state.pool());
    Ok(Json(repo.list_policies().await?))
}

/// GET /api/policies/:id
async fn get_policy(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Policy>, AppError> {
    let repo = ContentRepository::new(state.pool());
    let policy = repo
        .get_policy(PolicyId::new(id))
        .await
        .map_err(|e| AppError::for_entity(&format!("policy {id}"), e))?;
    Ok(Json(policy))
}

/// POST /api/policies
async fn create_policy(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Json(request): Json<PolicyRequest>,
) -> Result<(StatusCode, Json<Policy>), AppError> {
    ensure_can_write(&admin)?;
    let input = request.validate()?;

    let repo = ContentRepository::new(state.pool());
    let policy = repo.create_policy(input).await?;
    Ok((StatusCode::CREATED, Json(policy)))
}

/// PUT /api/policies/:id
async fn update_policy(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<PolicyRequest>,
) -> Result<Json<Policy>, AppError> {
    ensure_can_write(&admin)?;
    let input = request.validate()?;

    let repo = ContentRepository::new(state.pool());
    let policy = repo
        .update_policy(PolicyId::new(id), input)
        .await
        .map_err(|e| AppError::for_entity(&format!("policy {id}"), e))?;
    Ok(Json(policy))
}

/// DELETE /api/policies/:id
async fn delete_policy(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    ensure_can_write(&admin)?;
    let repo = ContentRepository::new(state.pool());
    repo.delete_policy(PolicyId::new(id))
        .await
        .map_err(|e| AppError::for_entity(&format!("policy {id}"), e))?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Blog posts
// =============================================================================

/// Blog post create/replace payload.
#[derive(Debug, Deserialize)]
pub struct BlogPostRequest {
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub excerpt: String,
    pub content: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub published: bool,
}

impl BlogPostRequest {
    fn validate(self) -> Result<BlogPostInput, AppError> {
        let mut errors: Vec<FieldError> = Vec::new();

        let title = non_empty(&mut errors, "title", &self.title);
        let slug = non_empty(&mut errors, "slug", &self.slug);
        if !slug.is_empty()
            && !slug
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
        {
            errors.push(FieldError::new(
                "slug",
                "must contain only lowercase letters, digits, and hyphens",
            ));
        }
        let content = non_empty(&mut errors, "content", &self.content);
        let cover_image = optional_url(&mut errors, "cover_image", self.cover_image);

        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        Ok(BlogPostInput {
            title,
            slug,
            excerpt: self.excerpt.trim().to_string(),
            content,
            cover_image,
            published: self.published,
        })
    }
}

/// GET /api/blog
async fn list_posts(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<BlogPost>>, AppError> {
    let repo = ContentRepository::new(state.pool());
    Ok(Json(repo.list_posts().await?))
}

/// GET /api/blog/:id
async fn get_post(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<BlogPost>, AppError> {
    let repo = ContentRepository::new(state.pool());
    let post = repo
        .get_post(BlogPostId::new(id))
        .await
        .map_err(|e| AppError::for_entity(&format!("post {id}"), e))?;
    Ok(Json(post))
}

/// POST /api/blog
async fn create_post(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Json(request): Json<BlogPostRequest>,
) -> Result<(StatusCode, Json<BlogPost>), AppError> {
    ensure_can_write(&admin)?;
    let input = request.validate()?;

    let repo = ContentRepository::new(state.pool());
    let post = repo.create_post(input).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// PUT /api/blog/:id
async fn update_post(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<BlogPostRequest>,
) -> Result<Json<BlogPost>, AppError> {
    ensure_can_write(&admin)?;
    let input = request.validate()?;

    let repo = ContentRepository::new(state.pool());
    let post = repo
        .update_post(BlogPostId::new(id), input)
        .await
        .map_err(|e| AppError::for_entity(&format!("post {id}"), e))?;
    Ok(Json(post))
}

/// DELETE /api/blog/:id
async fn delete_post(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    ensure_can_write(&admin)?;
    let repo = ContentRepository::new(state.pool());
    repo.delete_post(BlogPostId::new(id))
        .await
        .map_err(|e| AppError::for_entity(&format!("post {id}"), e))?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Team members
// =============================================================================

/// Team member create/replace payload.
#[derive(Debug, Deserialize)]
pub struct TeamMemberRequest {
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub photo_url: Option<String>,
}

impl TeamMemberRequest {
    fn validate(self) -> Result<TeamMemberInput, AppError> {
        let mut errors: Vec<FieldError> = Vec::new();

        let name = non_empty(&mut errors, "name", &self.name);
        let title = non_empty(&mut errors, "title", &self.title);
        let photo_url = optional_url(&mut errors, "photo_url", self.photo_url);

        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        Ok(TeamMemberInput {
            name,
            title,
            bio: self.bio.trim().to_string(),
            photo_url,
        })
    }
}

/// GET /api/team
async fn list_team(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<TeamMember>>, AppError> {
    let repo = ContentRepository::new(state.pool());
    Ok(Json(repo.list_team_members().await?))
}

/// GET /api/team/:id
async fn get_team_member(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<TeamMember>, AppError> {
    let repo = ContentRepository::new(state.pool());
    let member = repo
        .get_team_member(TeamMemberId::new(id))
        .await
        .map_err(|e| AppError::for_entity(&format!("team member {id}"), e))?;
    Ok(Json(member))
}

/// POST /api/team
async fn create_team_member(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Json(request): Json<TeamMemberRequest>,
) -> Result<(StatusCode, Json<TeamMember>), AppError> {
    ensure_can_write(&admin)?;
    let input = request.validate()?;

    let repo = ContentRepository::new(state.pool());
    let member = repo.create_team_member(input).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

/// PUT /api/team/:id
async fn update_team_member(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<TeamMemberRequest>,
) -> Result<Json<TeamMember>, AppError> {
    ensure_can_write(&admin)?;
    let input = request.validate()?;

    let repo = ContentRepository::new(state.pool());
    let member = repo
        .update_team_member(TeamMemberId::new(id), input)
        .await
        .map_err(|e| AppError::for_entity(&format!("team member {id}"), e))?;
    Ok(Json(member))
}

/// DELETE /api/team/:id
async fn delete_team_member(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    ensure_can_write(&admin)?;
    let repo = ContentRepository::new(state.pool());
    repo.delete_team_member(TeamMemberId::new(id))
        .await
        .map_err(|e| AppError::for_entity(&format!("team member {id}"), e))?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Contact inquiries
// =============================================================================

/// GET /api/inquiries
async fn list_inquiries(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<ContactInquiry>>, AppError> {
    let repo = ContentRepository::new(state.pool());
    Ok(Json(repo.list_inquiries().await?))
}

/// DELETE /api/inquiries/:id
async fn delete_inquiry(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    ensure_can_write(&admin)?;
    let repo = ContentRepository::new(state.pool());
    repo.delete_inquiry(InquiryId::new(id))
        .await
        .map_err(|e| AppError::for_entity(&format!("inquiry {id}"), e))?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blog_slug_validation() {
        let request = BlogPostRequest {
            title: "Feeding layers".to_string(),
            slug: "Feeding Layers!".to_string(),
            excerpt: String::new(),
            content: "body".to_string(),
            cover_image: None,
            published: false,
        };

        let Err(AppError::Validation(errors)) = request.validate() else {
            panic!("expected validation error");
        };
        assert!(errors.iter().any(|e| e.field == "slug"));
    }

    #[test]
    fn test_team_member_photo_url_checked() {
        let request = TeamMemberRequest {
            name: "Amina".to_string(),
            title: "Head of Sales".to_string(),
            bio: String::new(),
            photo_url: Some("javascript:alert(1)".to_string()),
        };

        let Err(AppError::Validation(errors)) = request.validate() else {
            panic!("expected validation error");
        };
        assert_eq!(errors[0].field, "photo_url");
    }
}
