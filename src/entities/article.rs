//! News articles

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::core::api::ApiError;
use crate::core::entity::Record;
use crate::core::fetch::ListSource;
use crate::core::identity::RecordId;
use crate::core::mutation::require_fields;
use crate::core::summary::count_where;
use crate::entities::lenient;

pub const ENDPOINT: &str = "articles";

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    #[default]
    #[serde(alias = "Draft")]
    Draft,
    #[serde(alias = "Published")]
    Published,
    #[serde(other)]
    #[value(skip)]
    Unknown,
}

impl ArticleStatus {
    pub fn toggled(self) -> Self {
        match self {
            ArticleStatus::Draft => ArticleStatus::Published,
            ArticleStatus::Published => ArticleStatus::Draft,
            ArticleStatus::Unknown => ArticleStatus::Unknown,
        }
    }
}

impl std::fmt::Display for ArticleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArticleStatus::Draft => write!(f, "draft"),
            ArticleStatus::Published => write!(f, "published"),
            ArticleStatus::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    #[serde(alias = "article_id", alias = "articleId")]
    pub id: RecordId,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub content: String,

    #[serde(default)]
    pub author: String,

    #[serde(default)]
    pub category: String,

    #[serde(default, alias = "image_url", alias = "imageUrl")]
    pub image: Option<String>,

    #[serde(default)]
    pub status: ArticleStatus,

    #[serde(default, alias = "createdAt", deserialize_with = "lenient::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Record for Article {
    const RESOURCE: &'static str = "articles";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.author.as_str(), self.category.as_str()]
    }

    fn category(&self, name: &str) -> Option<String> {
        match name {
            "status" => Some(self.status.to_string()),
            "category" => Some(self.category.clone()),
            _ => None,
        }
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}

pub fn source() -> ListSource {
    ListSource::new(format!("/{}", ENDPOINT), "articles")
}

/// Flip one article's status in a local collection
pub fn toggle_local(articles: &mut [Article], id: &RecordId) {
    for article in articles.iter_mut().filter(|a| &a.id == id) {
        article.status = article.status.toggled();
    }
}

/// Fields for creating or editing an article
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArticleInput {
    pub title: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    /// Already-encoded data URL
    pub image: Option<String>,
    pub status: Option<ArticleStatus>,
}

impl ArticleInput {
    fn to_map(&self) -> Map<String, Value> {
        let mut body = Map::new();
        for (key, value) in [
            ("title", &self.title),
            ("content", &self.content),
            ("author", &self.author),
            ("category", &self.category),
            ("image", &self.image),
        ] {
            if let Some(v) = value {
                body.insert(key.to_string(), json!(v));
            }
        }
        if let Some(status) = self.status {
            body.insert("status".to_string(), json!(status));
        }
        body
    }

    pub fn create_body(&self) -> Result<Value, ApiError> {
        let mut map = self.to_map();
        map.entry("status")
            .or_insert_with(|| json!(ArticleStatus::Draft));
        let body = Value::Object(map);
        require_fields(&body, &["title", "content", "category"])?;
        Ok(body)
    }

    pub fn update_body(&self) -> Result<Value, ApiError> {
        let map = self.to_map();
        if map.is_empty() {
            return Err(ApiError::Validation("Nothing to update".to_string()));
        }
        Ok(Value::Object(map))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ArticleSummary {
    pub total: usize,
    pub published: usize,
    pub draft: usize,
}

impl ArticleSummary {
    pub fn compute<'a>(articles: impl IntoIterator<Item = &'a Article> + Clone) -> Self {
        Self {
            total: articles.clone().into_iter().count(),
            published: count_where(articles.clone(), |a: &Article| {
                a.status == ArticleStatus::Published
            }),
            draft: count_where(articles, |a: &Article| a.status == ArticleStatus::Draft),
        }
    }
}
