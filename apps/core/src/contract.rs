use serde::{Deserialize, Serialize};

use crate::core_service::PageOutcome;
use crate::session::ResultEntry;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchPageRequest {
    pub q: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SuggestRequest {
    pub query: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PageResponse {
    Idle,
    Results { items: Vec<ResultEntry> },
    Empty { browse_href: String },
    Redirect { href: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "payload")]
pub enum CoreRequest {
    SearchPage(SearchPageRequest),
    Suggest(SuggestRequest),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "payload")]
pub enum CoreResponse {
    SearchPage(PageResponse),
    Suggest(PageResponse),
}

impl From<PageOutcome> for PageResponse {
    fn from(value: PageOutcome) -> Self {
        match value {
            PageOutcome::Idle => Self::Idle,
            PageOutcome::Results(items) => Self::Results {
                items: items.iter().map(ResultEntry::from).collect(),
            },
            PageOutcome::Empty { browse } => Self::Empty {
                browse_href: browse.path(),
            },
            PageOutcome::Redirect(route) => Self::Redirect { href: route.path() },
        }
    }
}
