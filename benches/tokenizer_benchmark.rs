use async_trait::async_trait;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use neuron_lens::{
    batch::{BatchAggregator, BatchSettings},
    explain::{ExplanationClient, RawResponse, SearchRequest, SearchTransport},
    tokenizer::{token_count, tokenize},
    ModelConfig, RemoteError,
};
use std::sync::Arc;
use tokio::runtime::Runtime;

const SHORT_TEXT: &str = "Hello, how are you today?";
const MEDIUM_TEXT: &str = r#"
The quick brown fox jumps over the lazy dog. This is a sample text that contains
multiple sentences, some punctuation (like this!) and should give us a good idea of
tokenization performance for the kind of prompt a user pastes into the explorer.
"#;
const LONG_TEXT: &str = r#"
Sparse autoencoders trained on the residual stream of a language model decompose
its activations into features, many of which turn out to be interpretable: one fires
on closing brackets, another on French legal vocabulary, a third on the word "the"
when it follows a comma. Automated interpretability pipelines then run a second model
over the top-activating examples of each feature and ask it to describe, in one short
sentence, what the feature responds to. Searching those descriptions by token is a
quick way to get a feel for how a model represents a piece of text; it is not a
substitute for looking at activations directly, and the descriptions are sometimes
wrong, vague or describe only the strongest activations. Still, for a first look at
a sentence such as "Don't panic, it's only 42!" it is surprisingly informative.
"#;

/// Answers every search instantly with a single explanation.
struct InstantTransport;

#[async_trait]
impl SearchTransport for InstantTransport {
    async fn post_search(&self, request: &SearchRequest<'_>) -> Result<RawResponse, RemoteError> {
        let body = serde_json::json!({
            "result": [{"neuron": {"index": "1", "explanations": [{"description": request.text}]}}]
        });
        Ok(RawResponse::new(200, body.to_string()))
    }
}

fn bench_tokenization(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokenization");

    for (name, text) in [
        ("short_text", SHORT_TEXT),
        ("medium_text", MEDIUM_TEXT),
        ("long_text", LONG_TEXT),
    ] {
        group.bench_function(name, |b| b.iter(|| black_box(tokenize(black_box(text)))));
    }

    group.bench_function("long_text_count_only", |b| {
        b.iter(|| black_box(token_count(black_box(LONG_TEXT))))
    });

    group.finish();
}

fn bench_batch_overhead(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let client = ExplanationClient::new(Arc::new(InstantTransport));
    let aggregator = BatchAggregator::new(client, BatchSettings::default());
    let model = ModelConfig::gpt2_small();
    let tokens = tokenize(MEDIUM_TEXT);

    let mut group = c.benchmark_group("batch_overhead");
    group.bench_function("medium_text_instant_transport", |b| {
        b.iter(|| {
            let result = rt.block_on(aggregator.fetch_all(black_box(&tokens), &model));
            black_box(result)
        })
    });
    group.finish();
}

criterion_group!(benches, bench_tokenization, bench_batch_overhead);
criterion_main!(benches);
