use std::time::Instant;

use crate::catalog::{find_prompt_by_code, find_prompts, open_memory, upsert_prompt};
use crate::model::PromptRecord;
use crate::query::SearchQuery;
use crate::source::{PromptOrder, PromptQuery};

fn p95_ms(samples: &mut [f64]) -> f64 {
    samples.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let last = samples.len().saturating_sub(1);
    let idx = ((last as f64) * 0.95).round() as usize;
    samples[idx.min(last)]
}

fn median_batch_p95(mut run: impl FnMut()) -> f64 {
    for _ in 0..20 {
        run();
    }

    let mut batch_p95 = Vec::with_capacity(5);
    for _ in 0..5 {
        let mut samples = Vec::with_capacity(60);
        for _ in 0..60 {
            let start = Instant::now();
            run();
            samples.push(start.elapsed().as_secs_f64() * 1000.0);
        }
        batch_p95.push(p95_ms(&mut samples));
    }

    batch_p95.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    batch_p95[batch_p95.len() / 2]
}

#[test]
fn warm_catalog_lookups_p95_under_budget() {
    let db = open_memory().unwrap();
    for i in 0..5_000 {
        let record = PromptRecord::new(
            &format!("p{i}"),
            &format!("Prompt {i:05}"),
            &format!("prompt-{i:05}"),
        )
        .with_code(&format!("{:04}", i % 10_000))
        .with_text("studio portrait, soft light", "")
        .with_views(i as u64);
        upsert_prompt(&db, &record).unwrap();
    }

    let text = SearchQuery::parse("portrait").unwrap();
    let text_query = PromptQuery {
        pattern: text.normalized.clone(),
        order: PromptOrder::Insertion,
        limit: 5,
    };
    let text_p95 = median_batch_p95(|| {
        let _ = find_prompts(&db, &text_query).unwrap();
    });
    assert!(
        text_p95 <= 25.0,
        "free-text p95 too high: {text_p95:.3}ms (budget 25.0ms)"
    );

    let code_p95 = median_batch_p95(|| {
        let _ = find_prompt_by_code(&db, "4521").unwrap();
    });
    assert!(
        code_p95 <= 5.0,
        "code lookup p95 too high: {code_p95:.3}ms (budget 5.0ms)"
    );
}
