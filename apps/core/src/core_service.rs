use std::sync::Arc;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::catalog::{self, SqliteCatalog, StoreError};
use crate::config::{validate, Config, ConfigError};
use crate::fetcher::{DualFetcher, FetchOutcome, FetchPlan};
use crate::model::SearchableItem;
use crate::navigation::{Navigator, Route};
use crate::query::{passes_min_length, within_max_length, SearchQuery, MAX_QUERY_CHARS};
use crate::session::{SearchSession, SessionSettings};
use crate::source::{CatalogSource, PromptOrder};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

fn check_query_len(query: &str) -> Result<(), ServiceError> {
    if within_max_length(query) {
        return Ok(());
    }
    Err(ServiceError::InvalidRequest(format!(
        "query longer than {MAX_QUERY_CHARS} characters"
    )))
}

/// What a one-shot search resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// No query (or too short): nothing was fetched.
    Idle,
    Results(Vec<SearchableItem>),
    /// Completed search with no matches; carries the "browse all" link.
    Empty { browse: Route },
    /// Code shortcut hit.
    Redirect(Route),
}

pub struct SearchService<S> {
    config: Config,
    fetcher: DualFetcher<S>,
}

impl SearchService<SqliteCatalog> {
    pub fn open(config: Config) -> Result<Self, ServiceError> {
        validate(&config)?;
        let db = catalog::open_from_config(&config)?;
        Self::new(config, Arc::new(SqliteCatalog::new(db)))
    }
}

impl<S: CatalogSource> SearchService<S> {
    pub fn new(config: Config, source: Arc<S>) -> Result<Self, ServiceError> {
        validate(&config)?;
        Ok(Self {
            config,
            fetcher: DualFetcher::new(source),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn source(&self) -> &Arc<S> {
        self.fetcher.source()
    }

    fn page_plan(&self) -> FetchPlan {
        FetchPlan {
            limits: self.config.page_limits,
            prompt_order: PromptOrder::Popularity,
        }
    }

    /// Dedicated search page load for `?q=`. Runs immediately, no debounce.
    pub async fn search_page(&self, q: &str) -> Result<PageOutcome, ServiceError> {
        check_query_len(q)?;
        Ok(self.run_once(q, self.page_plan()).await)
    }

    /// One compact-widget round without the debounce timer.
    pub async fn suggest(&self, raw: &str) -> Result<PageOutcome, ServiceError> {
        check_query_len(raw)?;
        if !passes_min_length(raw, self.config.min_query_chars) {
            return Ok(PageOutcome::Idle);
        }
        let plan = SessionSettings::compact(&self.config).plan;
        Ok(self.run_once(raw, plan).await)
    }

    async fn run_once(&self, raw: &str, plan: FetchPlan) -> PageOutcome {
        let Some(query) = SearchQuery::parse(raw) else {
            return PageOutcome::Idle;
        };

        match self
            .fetcher
            .fetch(&query, plan, &CancellationToken::new())
            .await
        {
            FetchOutcome::Shortcut(Some(prompt)) => {
                PageOutcome::Redirect(Route::Prompt { slug: prompt.slug })
            }
            FetchOutcome::Merged(items) if !items.is_empty() => PageOutcome::Results(items),
            FetchOutcome::Shortcut(None) | FetchOutcome::Merged(_) => PageOutcome::Empty {
                browse: Route::Browse,
            },
            FetchOutcome::Cancelled => PageOutcome::Idle,
        }
    }

    /// New compact widget controller sharing this service's data source.
    pub fn session<N: Navigator>(&self, navigator: N) -> SearchSession<S, N> {
        SearchSession::new(
            Arc::clone(self.fetcher.source()),
            navigator,
            SessionSettings::compact(&self.config),
        )
    }
}
