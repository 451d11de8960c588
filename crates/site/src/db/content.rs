//! Read access to public content, plus contact inquiry writes.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use harvestline_core::{BlogPostId, Email, InquiryId, PolicyId, TeamMemberId};

use super::RepositoryError;
use crate::models::{BlogPost, ContactInquiry, Policy, TeamMember};

#[derive(Debug, sqlx::FromRow)]
struct PolicyRow {
    id: i32,
    title: String,
    content: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PolicyRow> for Policy {
    fn from(row: PolicyRow) -> Self {
        Self {
            id: PolicyId::new(row.id),
            title: row.title,
            content: row.content,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct BlogPostRow {
    id: i32,
    title: String,
    slug: String,
    excerpt: String,
    content: String,
    cover_image: Option<String>,
    published: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<BlogPostRow> for BlogPost {
    fn from(row: BlogPostRow) -> Self {
        Self {
            id: BlogPostId::new(row.id),
            title: row.title,
            slug: row.slug,
            excerpt: row.excerpt,
            content: row.content,
            cover_image: row.cover_image,
            published: row.published,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TeamMemberRow {
    id: i32,
    name: String,
    title: String,
    bio: String,
    photo_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TeamMemberRow> for TeamMember {
    fn from(row: TeamMemberRow) -> Self {
        Self {
            id: TeamMemberId::new(row.id),
            name: row.name,
            title: row.title,
            bio: row.bio,
            photo_url: row.photo_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ContactInquiryRow {
    id: i32,
    name: String,
    email: Email,
    message: String,
    created_at: DateTime<Utc>,
}

impl From<ContactInquiryRow> for ContactInquiry {
    fn from(row: ContactInquiryRow) -> Self {
        Self {
            id: InquiryId::new(row.id),
            name: row.name,
            email: row.email,
            message: row.message,
            created_at: row.created_at,
        }
    }
}

/// Repository for public content.
pub struct ContentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ContentRepository<'a> {
    /// Create a new content repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all policies.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_policies(&self) -> Result<Vec<Policy>, RepositoryError> {
        let rows = sqlx::query_as::<_, PolicyRow>(
            "SELECT id, title, content, created_at, updated_at FROM policy ORDER BY title ASC",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// List published blog posts, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_published_posts(&self) -> Result<Vec<BlogPost>, RepositoryError> {
        let rows = sqlx::query_as::<_, BlogPostRow>(
            r"
            SELECT id, title, slug, excerpt, content, cover_image, published,
                   created_at, updated_at
            FROM blog_post
            WHERE published = TRUE
            ORDER BY created_at DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get a published blog post by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_published_post(&self, slug: &str) -> Result<Option<BlogPost>, RepositoryError> {
        let row = sqlx::query_as::<_, BlogPostRow>(
            r"
            SELECT id, title, slug, excerpt, content, cover_image, published,
                   created_at, updated_at
            FROM blog_post
            WHERE slug = $1 AND published = TRUE
            ",
        )
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// List team members.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_team_members(&self) -> Result<Vec<TeamMember>, RepositoryError> {
        let rows = sqlx::query_as::<_, TeamMemberRow>(
            r"
            SELECT id, name, title, bio, photo_url, created_at, updated_at
            FROM team_member
            ORDER BY name ASC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Record a contact form submission.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create_inquiry(
        &self,
        name: &str,
        email: &Email,
        message: &str,
    ) -> Result<ContactInquiry, RepositoryError> {
        let row = sqlx::query_as::<_, ContactInquiryRow>(
            r"
            INSERT INTO contact_inquiry (name, email, message)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, message, created_at
            ",
        )
        .bind(name)
        .bind(email)
        .bind(message)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }
}
