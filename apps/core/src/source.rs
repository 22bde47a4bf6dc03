use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use thiserror::Error;

use crate::catalog::StoreError;
use crate::model::{ArticleRecord, ArticleSummary, PromptRecord, PromptSummary};
use crate::query::like_matches;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("read task failed: {0}")]
    Join(String),
    #[error("source unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromptOrder {
    #[default]
    Insertion,
    Popularity,
}

/// Published prompts whose title, slug, description or body match `pattern`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptQuery {
    pub pattern: String,
    pub order: PromptOrder,
    pub limit: usize,
}

/// Published articles whose title, slug, excerpt or content match `pattern`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleQuery {
    pub pattern: String,
    pub limit: usize,
}

/// Read capability over the two collections. Injected into the fetcher so
/// tests can substitute a fake.
#[async_trait]
pub trait CatalogSource: Send + Sync + 'static {
    async fn find_prompts(&self, query: &PromptQuery) -> Result<Vec<PromptSummary>, SourceError>;

    async fn find_articles(&self, query: &ArticleQuery)
        -> Result<Vec<ArticleSummary>, SourceError>;

    async fn find_prompt_by_code(&self, code: &str) -> Result<Option<PromptSummary>, SourceError>;
}

#[async_trait]
impl<S: CatalogSource + ?Sized> CatalogSource for Arc<S> {
    async fn find_prompts(&self, query: &PromptQuery) -> Result<Vec<PromptSummary>, SourceError> {
        (**self).find_prompts(query).await
    }

    async fn find_articles(
        &self,
        query: &ArticleQuery,
    ) -> Result<Vec<ArticleSummary>, SourceError> {
        (**self).find_articles(query).await
    }

    async fn find_prompt_by_code(&self, code: &str) -> Result<Option<PromptSummary>, SourceError> {
        (**self).find_prompt_by_code(code).await
    }
}

/// Vec-backed source with the same matching rules as the SQLite catalog.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    prompts: RwLock<Vec<PromptRecord>>,
    articles: RwLock<Vec<ArticleRecord>>,
}

impl InMemoryCatalog {
    pub fn new(prompts: Vec<PromptRecord>, articles: Vec<ArticleRecord>) -> Self {
        Self {
            prompts: RwLock::new(prompts),
            articles: RwLock::new(articles),
        }
    }

    pub fn push_prompt(&self, prompt: PromptRecord) {
        if let Ok(mut prompts) = self.prompts.write() {
            prompts.push(prompt);
        }
    }

    pub fn push_article(&self, article: ArticleRecord) {
        if let Ok(mut articles) = self.articles.write() {
            articles.push(article);
        }
    }
}

fn poisoned() -> SourceError {
    SourceError::Unavailable("in-memory catalog lock poisoned".to_string())
}

#[async_trait]
impl CatalogSource for InMemoryCatalog {
    async fn find_prompts(&self, query: &PromptQuery) -> Result<Vec<PromptSummary>, SourceError> {
        let prompts = self.prompts.read().map_err(|_| poisoned())?;
        let mut matched: Vec<(usize, &PromptRecord)> = prompts
            .iter()
            .enumerate()
            .filter(|(_, prompt)| prompt.status.is_published())
            .filter(|(_, prompt)| {
                [
                    &prompt.title,
                    &prompt.slug,
                    &prompt.description,
                    &prompt.body,
                ]
                .iter()
                .any(|field| like_matches(&query.pattern, field))
            })
            .collect();

        if query.order == PromptOrder::Popularity {
            matched.sort_by(|a, b| b.1.views.cmp(&a.1.views).then_with(|| a.0.cmp(&b.0)));
        }

        Ok(matched
            .into_iter()
            .take(query.limit)
            .map(|(_, prompt)| prompt.summary())
            .collect())
    }

    async fn find_articles(
        &self,
        query: &ArticleQuery,
    ) -> Result<Vec<ArticleSummary>, SourceError> {
        let articles = self.articles.read().map_err(|_| poisoned())?;
        Ok(articles
            .iter()
            .filter(|article| article.status.is_published())
            .filter(|article| {
                [
                    &article.title,
                    &article.slug,
                    &article.excerpt,
                    &article.content,
                ]
                .iter()
                .any(|field| like_matches(&query.pattern, field))
            })
            .take(query.limit)
            .map(ArticleRecord::summary)
            .collect())
    }

    async fn find_prompt_by_code(&self, code: &str) -> Result<Option<PromptSummary>, SourceError> {
        let prompts = self.prompts.read().map_err(|_| poisoned())?;
        Ok(prompts
            .iter()
            .find(|prompt| prompt.status.is_published() && prompt.code.as_deref() == Some(code))
            .map(PromptRecord::summary))
    }
}
