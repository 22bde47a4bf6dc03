use pixico_core::contract::{CoreRequest, PageResponse, SearchPageRequest};
use pixico_core::core_service::PageOutcome;
use pixico_core::model::{ItemKind, PromptSummary, PublishStatus, SearchableItem};
use pixico_core::navigation::Route;

#[test]
fn serializes_and_deserializes_search_page_request() {
    let request = CoreRequest::SearchPage(SearchPageRequest {
        q: "cat girl".to_string(),
    });

    let encoded = serde_json::to_string(&request).unwrap();
    assert_eq!(encoded, r#"{"kind":"SearchPage","payload":{"q":"cat girl"}}"#);
    let decoded: CoreRequest = serde_json::from_str(&encoded).unwrap();

    assert_eq!(decoded, request);
}

#[test]
fn page_outcome_maps_to_hrefs() {
    let outcome = PageOutcome::Results(vec![SearchableItem::Prompt(PromptSummary {
        id: "p1".into(),
        title: "Neon Alley".into(),
        slug: "neon-alley".into(),
        image_url: Some("https://cdn.example/neon.webp".into()),
        status: PublishStatus::Published,
    })]);

    let PageResponse::Results { items } = PageResponse::from(outcome) else {
        panic!("expected results");
    };
    assert_eq!(items[0].kind, ItemKind::Prompt);
    assert_eq!(items[0].href, "/prompt/neon-alley");
    assert_eq!(items[0].image_url.as_deref(), Some("https://cdn.example/neon.webp"));

    let redirect = PageResponse::from(PageOutcome::Redirect(Route::Prompt {
        slug: "harbor".into(),
    }));
    assert_eq!(
        redirect,
        PageResponse::Redirect {
            href: "/prompt/harbor".into()
        }
    );
}

#[test]
fn idle_response_is_tagged() {
    let encoded = serde_json::to_string(&PageResponse::Idle).unwrap();
    assert_eq!(encoded, r#"{"outcome":"idle"}"#);
}
