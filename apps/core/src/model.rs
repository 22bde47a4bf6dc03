use serde::{Deserialize, Serialize};

use crate::navigation::Route;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Prompt,
    Article,
}

impl ItemKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Prompt => "prompt",
            Self::Article => "article",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishStatus {
    Draft,
    Published,
    Archived,
}

impl PublishStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Archived => "archived",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "published" => Some(Self::Published),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }

    pub fn is_published(self) -> bool {
        self == Self::Published
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptSummary {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub image_url: Option<String>,
    pub status: PublishStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleSummary {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub image_url: Option<String>,
    pub status: PublishStatus,
}

/// One row of a merged result set, tagged by the collection it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchableItem {
    Prompt(PromptSummary),
    Article(ArticleSummary),
}

impl SearchableItem {
    pub fn kind(&self) -> ItemKind {
        match self {
            Self::Prompt(_) => ItemKind::Prompt,
            Self::Article(_) => ItemKind::Article,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Prompt(prompt) => &prompt.title,
            Self::Article(article) => &article.title,
        }
    }

    pub fn slug(&self) -> &str {
        match self {
            Self::Prompt(prompt) => &prompt.slug,
            Self::Article(article) => &article.slug,
        }
    }

    pub fn image_url(&self) -> Option<&str> {
        match self {
            Self::Prompt(prompt) => prompt.image_url.as_deref(),
            Self::Article(article) => article.image_url.as_deref(),
        }
    }

    pub fn destination(&self) -> Route {
        match self {
            Self::Prompt(prompt) => Route::Prompt {
                slug: prompt.slug.clone(),
            },
            Self::Article(article) => Route::Blog {
                slug: article.slug.clone(),
            },
        }
    }
}

/// Full prompt row as stored by the catalog. Searches only ever return the
/// [`PromptSummary`] projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptRecord {
    pub id: String,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub status: PublishStatus,
    #[serde(default)]
    pub views: u64,
}

impl PromptRecord {
    pub fn new(id: &str, title: &str, slug: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            slug: slug.to_string(),
            description: String::new(),
            body: String::new(),
            code: None,
            image_url: None,
            status: PublishStatus::Published,
            views: 0,
        }
    }

    pub fn with_code(mut self, code: &str) -> Self {
        self.code = Some(code.to_string());
        self
    }

    pub fn with_text(mut self, description: &str, body: &str) -> Self {
        self.description = description.to_string();
        self.body = body.to_string();
        self
    }

    pub fn with_status(mut self, status: PublishStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_views(mut self, views: u64) -> Self {
        self.views = views;
        self
    }

    pub fn summary(&self) -> PromptSummary {
        PromptSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            slug: self.slug.clone(),
            image_url: self.image_url.clone(),
            status: self.status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub id: String,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub status: PublishStatus,
}

impl ArticleRecord {
    pub fn new(id: &str, title: &str, slug: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            slug: slug.to_string(),
            excerpt: String::new(),
            content: String::new(),
            image_url: None,
            status: PublishStatus::Published,
        }
    }

    pub fn with_text(mut self, excerpt: &str, content: &str) -> Self {
        self.excerpt = excerpt.to_string();
        self.content = content.to_string();
        self
    }

    pub fn with_status(mut self, status: PublishStatus) -> Self {
        self.status = status;
        self
    }

    pub fn summary(&self) -> ArticleSummary {
        ArticleSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            slug: self.slug.clone(),
            image_url: self.image_url.clone(),
            status: self.status,
        }
    }
}
