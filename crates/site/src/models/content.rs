//! Content models served on the public site.

use chrono::{DateTime, Utc};
use serde::Serialize;

use harvestline_core::{BlogPostId, Email, InquiryId, PolicyId, TeamMemberId};

/// A company policy (shipping, returns, quality, payment terms).
#[derive(Debug, Clone, Serialize)]
pub struct Policy {
    pub id: PolicyId,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A blog post. Only published posts are served publicly.
#[derive(Debug, Clone, Serialize)]
pub struct BlogPost {
    pub id: BlogPostId,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub cover_image: Option<String>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A team member shown on the about page.
#[derive(Debug, Clone, Serialize)]
pub struct TeamMember {
    pub id: TeamMemberId,
    pub name: String,
    pub title: String,
    pub bio: String,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A contact form submission.
#[derive(Debug, Clone, Serialize)]
pub struct ContactInquiry {
    pub id: InquiryId,
    pub name: String,
    pub email: Email,
    pub message: String,
    pub created_at: DateTime<Utc>,
}
