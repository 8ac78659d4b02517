//! Knowledge-base content endpoints: categories, sections, articles,
//! bookmarks.

use reqwest::Method;
use serde::{Deserialize, Serialize};

use cuppa_core::Result;

use crate::client::{ApiClient, accept, required};
use crate::envelope::{Envelope, Page};

const CATEGORIES: &str = "/api/core/v1/content/categories/";
const BOOKMARKS: &str = "/api/core/v1/content/bookmarks/";

/// A content category.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Category {
    pub id: String,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub published_at: Option<String>,
}

/// A section within a category.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Section {
    pub id: String,
    pub category_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub published_at: Option<String>,
}

/// A knowledge article. `content` carries the full markdown body.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Article {
    pub id: String,
    pub category_id: String,
    // None when the article lives in the category's default section.
    #[serde(default)]
    pub section_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub author: String,
    /// Estimated read time in minutes.
    #[serde(default)]
    pub read_time: i64,
    /// Comma-separated tags.
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub published_at: Option<String>,
    /// Only present for authenticated users.
    #[serde(default)]
    pub is_bookmarked: bool,
}

/// A user's bookmarked article.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Bookmark {
    pub id: String,
    pub article_id: String,
    pub article: Article,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Serialize)]
struct BookmarkRequest<'a> {
    article_id: &'a str,
}

impl ApiClient {
    /// List all published categories.
    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        let response = self.execute_empty(Method::GET, CATEGORIES, false).await?;
        let envelope: Envelope<Page<Category>> = required(&response)?;
        Ok(envelope.data.results)
    }

    /// Fetch a category by slug.
    pub async fn get_category(&self, slug: &str) -> Result<Category> {
        let path = format!("{CATEGORIES}{slug}/");
        let response = self.execute_empty(Method::GET, &path, false).await?;
        let envelope: Envelope<Category> = required(&response)?;
        Ok(envelope.data)
    }

    /// List sections for a category.
    pub async fn list_category_sections(&self, category_slug: &str) -> Result<Vec<Section>> {
        let path = format!("{CATEGORIES}{category_slug}/sections/");
        let response = self.execute_empty(Method::GET, &path, false).await?;
        let envelope: Envelope<Vec<Section>> = required(&response)?;
        Ok(envelope.data)
    }

    /// List articles in a category's default section.
    pub async fn list_category_articles(&self, category_slug: &str) -> Result<Vec<Article>> {
        let path = format!("{CATEGORIES}{category_slug}/articles/");
        let response = self.execute_empty(Method::GET, &path, false).await?;
        let envelope: Envelope<Vec<Article>> = required(&response)?;
        Ok(envelope.data)
    }

    /// List articles in a specific section.
    pub async fn list_section_articles(&self, section_id: &str) -> Result<Vec<Article>> {
        let path = format!("/api/core/v1/content/sections/{section_id}/articles/");
        let response = self.execute_empty(Method::GET, &path, false).await?;
        let envelope: Envelope<Vec<Article>> = required(&response)?;
        Ok(envelope.data)
    }

    /// Fetch a full article, including its markdown content.
    pub async fn get_article(&self, article_id: &str) -> Result<Article> {
        let path = format!("/api/core/v1/content/articles/{article_id}/");
        let response = self.execute_empty(Method::GET, &path, false).await?;
        let envelope: Envelope<Article> = required(&response)?;
        Ok(envelope.data)
    }

    /// List the user's bookmarked articles (requires auth).
    pub async fn list_bookmarks(&self) -> Result<Vec<Bookmark>> {
        let response = self.execute_empty(Method::GET, BOOKMARKS, true).await?;
        let envelope: Envelope<Vec<Bookmark>> = required(&response)?;
        Ok(envelope.data)
    }

    /// Bookmark an article (requires auth).
    pub async fn create_bookmark(&self, article_id: &str) -> Result<Bookmark> {
        let request = BookmarkRequest { article_id };
        let response = self
            .execute(Method::POST, BOOKMARKS, Some(&request), true)
            .await?;
        let envelope: Envelope<Bookmark> = required(&response)?;
        Ok(envelope.data)
    }

    /// Remove a bookmark (requires auth). The backend answers 204.
    pub async fn delete_bookmark(&self, bookmark_id: &str) -> Result<()> {
        let path = format!("{BOOKMARKS}{bookmark_id}/");
        let response = self.execute_empty(Method::DELETE, &path, true).await?;
        accept(&response)
    }
}
