//! Content CRUD: policies, blog posts, team members, contact inquiries.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use harvestline_core::{BlogPostId, InquiryId, PolicyId, TeamMemberId};

use super::{RepositoryError, conflict_on_unique};
use crate::models::{BlogPost, ContactInquiry, Policy, TeamMember};

/// Fields accepted when creating or replacing a policy.
#[derive(Debug, Clone)]
pub struct PolicyInput {
    pub title: String,
    pub content: String,
}

/// Fields accepted when creating or replacing a blog post.
#[derive(Debug, Clone)]
pub struct BlogPostInput {
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub cover_image: Option<String>,
    pub published: bool,
}

/// Fields accepted when creating or replacing a team member.
#[derive(Debug, Clone)]
pub struct TeamMemberInput {
    pub name: String,
    pub title: String,
    pub bio: String,
    pub photo_url: Option<String>,
}

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
struct InquiryRow {
    id: i32,
    name: String,
    email: String,
    message: String,
    created_at: DateTime<Utc>,
}

impl From<InquiryRow> for ContactInquiry {
    fn from(row: InquiryRow) -> Self {
        Self {
            id: InquiryId::new(row.id),
            name: row.name,
            email: row.email,
            message: row.message,
            created_at: row.created_at,
        }
    }
}

const BLOG_COLUMNS: &str =
    "id, title, slug, excerpt, content, cover_image, published, created_at, updated_at";

/// Repository for content reads and writes.
pub struct ContentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ContentRepository<'a> {
    /// Create a new content repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    // === Policies ===

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

    /// Get a policy by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such policy exists.
    pub async fn get_policy(&self, id: PolicyId) -> Result<Policy, RepositoryError> {
        let row = sqlx::query_as::<_, PolicyRow>(
            "SELECT id, title, content, created_at, updated_at FROM policy WHERE id = $1",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Insert a new policy.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create_policy(&self, input: PolicyInput) -> Result<Policy, RepositoryError> {
        let row = sqlx::query_as::<_, PolicyRow>(
            r"
            INSERT INTO policy (title, content)
            VALUES ($1, $2)
            RETURNING id, title, content, created_at, updated_at
            ",
        )
        .bind(&input.title)
        .bind(&input.content)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Replace a policy's fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such policy exists.
    pub async fn update_policy(
        &self,
        id: PolicyId,
        input: PolicyInput,
    ) -> Result<Policy, RepositoryError> {
        let row = sqlx::query_as::<_, PolicyRow>(
            r"
            UPDATE policy
            SET title = $2, content = $3, updated_at = now()
            WHERE id = $1
            RETURNING id, title, content, created_at, updated_at
            ",
        )
        .bind(id.as_i32())
        .bind(&input.title)
        .bind(&input.content)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Delete a policy.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such policy exists.
    pub async fn delete_policy(&self, id: PolicyId) -> Result<(), RepositoryError> {
        delete_by_id(self.pool, "policy", id.as_i32()).await
    }

    // === Blog posts ===

    /// List all blog posts, newest first, drafts included.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_posts(&self) -> Result<Vec<BlogPost>, RepositoryError> {
        let sql = format!("SELECT {BLOG_COLUMNS} FROM blog_post ORDER BY created_at DESC");
        let rows = sqlx::query_as::<_, BlogPostRow>(&sql)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get a blog post by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such post exists.
    pub async fn get_post(&self, id: BlogPostId) -> Result<BlogPost, RepositoryError> {
        let sql = format!("SELECT {BLOG_COLUMNS} FROM blog_post WHERE id = $1");
        let row = sqlx::query_as::<_, BlogPostRow>(&sql)
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Insert a new blog post.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` when the slug is already taken.
    pub async fn create_post(&self, input: BlogPostInput) -> Result<BlogPost, RepositoryError> {
        let sql = format!(
            r"
            INSERT INTO blog_post (title, slug, excerpt, content, cover_image, published)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {BLOG_COLUMNS}
            "
        );
        let row = sqlx::query_as::<_, BlogPostRow>(&sql)
            .bind(&input.title)
            .bind(&input.slug)
            .bind(&input.excerpt)
            .bind(&input.content)
            .bind(&input.cover_image)
            .bind(input.published)
            .fetch_one(self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, "slug already exists"))?;

        Ok(row.into())
    }

    /// Replace a blog post's fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such post exists,
    /// `RepositoryError::Conflict` when the new slug is already taken.
    pub async fn update_post(
        &self,
        id: BlogPostId,
        input: BlogPostInput,
    ) -> Result<BlogPost, RepositoryError> {
        let sql = format!(
            r"
            UPDATE blog_post
            SET title = $2, slug = $3, excerpt = $4, content = $5,
                cover_image = $6, published = $7, updated_at = now()
            WHERE id = $1
            RETURNING {BLOG_COLUMNS}
            "
        );
        let row = sqlx::query_as::<_, BlogPostRow>(&sql)
            .bind(id.as_i32())
            .bind(&input.title)
            .bind(&input.slug)
            .bind(&input.excerpt)
            .bind(&input.content)
            .bind(&input.cover_image)
            .bind(input.published)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, "slug already exists"))?
            .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Delete a blog post.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such post exists.
    pub async fn delete_post(&self, id: BlogPostId) -> Result<(), RepositoryError> {
        delete_by_id(self.pool, "blog_post", id.as_i32()).await
    }

    // === Team members ===

    /// List all team members.
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

    /// Get a team member by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such team member exists.
    pub async fn get_team_member(&self, id: TeamMemberId) -> Result<TeamMember, RepositoryError> {
        let row = sqlx::query_as::<_, TeamMemberRow>(
            r"
            SELECT id, name, title, bio, photo_url, created_at, updated_at
            FROM team_member
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Insert a new team member.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create_team_member(
        &self,
        input: TeamMemberInput,
    ) -> Result<TeamMember, RepositoryError> {
        let row = sqlx::query_as::<_, TeamMemberRow>(
            r"
            INSERT INTO team_member (name, title, bio, photo_url)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, title, bio, photo_url, created_at, updated_at
            ",
        )
        .bind(&input.name)
        .bind(&input.title)
        .bind(&input.bio)
        .bind(&input.photo_url)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Replace a team member's fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such team member exists.
    pub async fn update_team_member(
        &self,
        id: TeamMemberId,
        input: TeamMemberInput,
    ) -> Result<TeamMember, RepositoryError> {
        let row = sqlx::query_as::<_, TeamMemberRow>(
            r"
            UPDATE team_member
            SET name = $2, title = $3, bio = $4, photo_url = $5, updated_at = now()
            WHERE id = $1
            RETURNING id, name, title, bio, photo_url, created_at, updated_at
            ",
        )
        .bind(id.as_i32())
        .bind(&input.name)
        .bind(&input.title)
        .bind(&input.bio)
        .bind(&input.photo_url)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Delete a team member.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such team member exists.
    pub async fn delete_team_member(&self, id: TeamMemberId) -> Result<(), RepositoryError> {
        delete_by_id(self.pool, "team_member", id.as_i32()).await
    }

    // === Contact inquiries ===

    /// List contact inquiries, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_inquiries(&self) -> Result<Vec<ContactInquiry>, RepositoryError> {
        let rows = sqlx::query_as::<_, InquiryRow>(
            r"
            SELECT id, name, email, message, created_at
            FROM contact_inquiry
            ORDER BY created_at DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Delete a contact inquiry.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such inquiry exists.
    pub async fn delete_inquiry(&self, id: InquiryId) -> Result<(), RepositoryError> {
        delete_by_id(self.pool, "contact_inquiry", id.as_i32()).await
    }
}

/// Delete one row by ID from a fixed table name.
async fn delete_by_id(pool: &PgPool, table: &str, id: i32) -> Result<(), RepositoryError> {
    // table is a compile-time constant at every call site, never user input
    let sql = format!("DELETE FROM {table} WHERE id = $1");
    let result = sqlx::query(&sql).bind(id).execute(pool).await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }
    Ok(())
}
