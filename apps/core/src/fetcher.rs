use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::ResultLimits;
use crate::model::{ArticleSummary, PromptSummary, SearchableItem};
use crate::query::SearchQuery;
use crate::source::{ArticleQuery, CatalogSource, PromptOrder, PromptQuery};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPlan {
    pub limits: ResultLimits,
    pub prompt_order: PromptOrder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Point lookup result for a code shortcut. No free-text fallback on miss.
    Shortcut(Option<PromptSummary>),
    /// Prompts first, then articles, each in upstream order.
    Merged(Vec<SearchableItem>),
    Cancelled,
}

pub struct DualFetcher<S> {
    source: Arc<S>,
}

impl<S> Clone for DualFetcher<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
        }
    }
}

impl<S: CatalogSource> DualFetcher<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    pub async fn fetch(
        &self,
        query: &SearchQuery,
        plan: FetchPlan,
        cancel: &CancellationToken,
    ) -> FetchOutcome {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!(raw = %query.raw, "fetch cancelled");
                FetchOutcome::Cancelled
            }
            outcome = self.run(query, plan) => outcome,
        }
    }

    async fn run(&self, query: &SearchQuery, plan: FetchPlan) -> FetchOutcome {
        if let Some(code) = query.code_value.as_deref() {
            let hit = match self.source.find_prompt_by_code(code).await {
                Ok(hit) => hit,
                Err(error) => {
                    tracing::warn!(code, %error, "prompt code lookup failed");
                    None
                }
            };
            return FetchOutcome::Shortcut(hit);
        }

        let pattern = query.normalized.clone();
        let prompt_query = PromptQuery {
            pattern: pattern.clone(),
            order: plan.prompt_order,
            limit: plan.limits.prompts,
        };
        let article_query = ArticleQuery {
            pattern,
            limit: plan.limits.articles,
        };

        let (prompts, articles) = tokio::join!(
            self.source.find_prompts(&prompt_query),
            self.source.find_articles(&article_query),
        );

        let prompts = prompts.unwrap_or_else(|error| {
            tracing::warn!(%error, "prompt search failed; showing articles only");
            Vec::new()
        });
        let articles = articles.unwrap_or_else(|error| {
            tracing::warn!(%error, "article search failed; showing prompts only");
            Vec::new()
        });

        FetchOutcome::Merged(merge(prompts, articles))
    }
}

pub fn merge(prompts: Vec<PromptSummary>, articles: Vec<ArticleSummary>) -> Vec<SearchableItem> {
    prompts
        .into_iter()
        .map(SearchableItem::Prompt)
        .chain(articles.into_iter().map(SearchableItem::Article))
        .collect()
}
