use std::sync::Arc;

use async_trait::async_trait;
use pixico_core::catalog::{open_memory, upsert_article, upsert_prompt, SqliteCatalog};
use pixico_core::config::Config;
use pixico_core::core_service::{PageOutcome, SearchService, ServiceError};
use pixico_core::query::MAX_QUERY_CHARS;
use pixico_core::model::{ArticleRecord, ArticleSummary, ItemKind, PromptRecord, PromptSummary};
use pixico_core::navigation::Route;
use pixico_core::source::{
    ArticleQuery, CatalogSource, InMemoryCatalog, PromptQuery, SourceError,
};

fn seeded_service() -> SearchService<SqliteCatalog> {
    let db = open_memory().unwrap();
    upsert_prompt(
        &db,
        &PromptRecord::new("p1", "Cyberpunk Alley", "cyberpunk-alley").with_views(10),
    )
    .unwrap();
    upsert_prompt(
        &db,
        &PromptRecord::new("p2", "Rainy Cyberpunk Market", "rainy-market").with_views(80),
    )
    .unwrap();
    upsert_prompt(
        &db,
        &PromptRecord::new("p3", "Harbor at Dawn", "harbor-at-dawn").with_code("4521"),
    )
    .unwrap();
    upsert_article(
        &db,
        &ArticleRecord::new("a1", "Lighting Neon Scenes", "lighting-neon")
            .with_text("how to prompt cyberpunk scenes", ""),
    )
    .unwrap();

    SearchService::new(Config::default(), Arc::new(SqliteCatalog::new(db))).unwrap()
}

#[tokio::test]
async fn page_lists_prompts_before_articles() {
    let service = seeded_service();

    let PageOutcome::Results(items) = service.search_page("cyberpunk").await.unwrap() else {
        panic!("expected results");
    };

    let kinds: Vec<ItemKind> = items.iter().map(|i| i.kind()).collect();
    assert_eq!(kinds, vec![ItemKind::Prompt, ItemKind::Prompt, ItemKind::Article]);
    // search page orders prompts by views
    assert_eq!(items[0].slug(), "rainy-market");
    assert_eq!(items[1].slug(), "cyberpunk-alley");
}

#[tokio::test]
async fn suggest_keeps_insertion_order() {
    let service = seeded_service();

    let PageOutcome::Results(items) = service.suggest("cyberpunk").await.unwrap() else {
        panic!("expected results");
    };
    let slugs: Vec<&str> = items.iter().map(|i| i.slug()).collect();
    assert_eq!(slugs, vec!["cyberpunk-alley", "rainy-market", "lighting-neon"]);
}

#[tokio::test]
async fn no_matches_yields_empty_state_with_browse_link() {
    let service = seeded_service();

    let outcome = service.search_page("zzzzzznoresults").await.unwrap();
    assert_eq!(
        outcome,
        PageOutcome::Empty {
            browse: Route::Browse
        }
    );
    if let PageOutcome::Empty { browse } = outcome {
        assert_eq!(browse.path(), "/prompts");
    }
}

#[tokio::test]
async fn code_shortcut_redirects_to_prompt() {
    let service = seeded_service();

    assert_eq!(
        service.search_page("4521").await.unwrap(),
        PageOutcome::Redirect(Route::Prompt {
            slug: "harbor-at-dawn".into()
        })
    );
    assert_eq!(
        service.suggest("#4521").await.unwrap(),
        PageOutcome::Redirect(Route::Prompt {
            slug: "harbor-at-dawn".into()
        })
    );
}

#[tokio::test]
async fn code_shortcut_miss_does_not_fall_back_to_text() {
    let db = open_memory().unwrap();
    upsert_prompt(&db, &PromptRecord::new("p1", "Studio 1234", "studio-1234")).unwrap();
    let service = SearchService::new(Config::default(), Arc::new(SqliteCatalog::new(db))).unwrap();

    assert!(matches!(
        service.search_page("1234").await.unwrap(),
        PageOutcome::Empty { .. }
    ));
}

#[tokio::test]
async fn blank_or_short_input_fetches_nothing() {
    let service = seeded_service();
    assert_eq!(service.search_page("   ").await.unwrap(), PageOutcome::Idle);
    assert_eq!(service.suggest("c").await.unwrap(), PageOutcome::Idle);
}

#[tokio::test]
async fn page_limits_cap_each_group() {
    let mut config = Config::default();
    config.page_limits.prompts = 2;
    config.page_limits.articles = 1;

    let catalog = InMemoryCatalog::default();
    for i in 0..5 {
        catalog.push_prompt(PromptRecord::new(&format!("p{i}"), "Koi pond", &format!("koi-{i}")));
        catalog.push_article(ArticleRecord::new(&format!("a{i}"), "Koi notes", &format!("koi-notes-{i}")));
    }
    let service = SearchService::new(config, Arc::new(catalog)).unwrap();

    let PageOutcome::Results(items) = service.search_page("koi").await.unwrap() else {
        panic!("expected results");
    };
    assert_eq!(items.len(), 3);
}

struct ArticlesDown {
    prompts: InMemoryCatalog,
}

#[async_trait]
impl CatalogSource for ArticlesDown {
    async fn find_prompts(&self, query: &PromptQuery) -> Result<Vec<PromptSummary>, SourceError> {
        self.prompts.find_prompts(query).await
    }

    async fn find_articles(
        &self,
        _query: &ArticleQuery,
    ) -> Result<Vec<ArticleSummary>, SourceError> {
        Err(SourceError::Unavailable("articles backend offline".into()))
    }

    async fn find_prompt_by_code(&self, _code: &str) -> Result<Option<PromptSummary>, SourceError> {
        Err(SourceError::Unavailable("prompts backend offline".into()))
    }
}

#[tokio::test]
async fn failed_group_is_treated_as_empty() {
    let prompts = InMemoryCatalog::new(
        vec![PromptRecord::new("p1", "Koi pond", "koi-pond")],
        Vec::new(),
    );
    let service =
        SearchService::new(Config::default(), Arc::new(ArticlesDown { prompts })).unwrap();

    let PageOutcome::Results(items) = service.search_page("koi").await.unwrap() else {
        panic!("expected partial results");
    };
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].kind(), ItemKind::Prompt);

    assert!(matches!(
        service.search_page("9999").await.unwrap(),
        PageOutcome::Empty { .. }
    ));
}

#[test]
fn rejects_invalid_config() {
    let config = Config {
        debounce_ms: 60_000,
        ..Default::default()
    };
    let result = SearchService::new(config, Arc::new(InMemoryCatalog::default()));
    assert!(result.is_err());
}

#[tokio::test]
async fn oversized_query_is_rejected_on_every_entry_point() {
    let service = seeded_service();
    let long = "cyberpunk ".repeat(MAX_QUERY_CHARS / 10 + 1);

    assert!(matches!(
        service.search_page(&long).await,
        Err(ServiceError::InvalidRequest(_))
    ));
    assert!(matches!(
        service.suggest(&long).await,
        Err(ServiceError::InvalidRequest(_))
    ));
}
