// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Integration tests for the two fallback policies.

use anyspawn::Spawner;
use duofetch::{Mode, Response, Retriever, Source, Tag};
use duofetch_model::testing::StubFetch;
use futures::StreamExt;

fn retriever<T>() -> Retriever<T> {
    Retriever::new(Spawner::new_tokio())
}

#[tokio::test]
async fn local_hit_skips_the_remote_leg() {
    let stub = StubFetch::new();
    stub.succeed(Mode::ForceLocal, "cached".to_string());

    let responses: Vec<_> = retriever()
        .retrieve_local_fallback_remote(&Tag::new("key"), stub.fetcher())
        .collect()
        .await;

    assert_eq!(responses, vec![Response::local_success("cached".to_string())]);
    assert_eq!(stub.call_count(Mode::ForceRemote), 0);
}

#[tokio::test]
async fn local_miss_falls_back_to_remote() {
    let stub = StubFetch::new();
    stub.fail(Mode::ForceLocal, "empty cache");
    stub.succeed(Mode::ForceRemote, "fresh".to_string());

    let responses: Vec<_> = retriever()
        .retrieve_local_fallback_remote(&Tag::new("key"), stub.fetcher())
        .collect()
        .await;

    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0].source(), Source::Local);
    assert!(responses[0].is_failure());
    assert_eq!(responses[1], Response::remote_success("fresh".to_string()));
    assert_eq!(stub.calls(), vec![Mode::ForceLocal, Mode::ForceRemote]);
}

#[tokio::test]
async fn both_legs_failing_yields_both_failures() {
    let stub: StubFetch<String> = StubFetch::new();
    stub.fail(Mode::ForceLocal, "empty cache");
    stub.fail_with_status(Mode::ForceRemote, 503, "unavailable");

    let responses: Vec<_> = retriever()
        .retrieve_local_fallback_remote(&Tag::new("key"), stub.fetcher())
        .collect()
        .await;

    assert_eq!(responses.len(), 2);
    assert!(responses.iter().all(Response::is_failure));
    assert_eq!(responses[0].status(), None);
    assert_eq!(responses[1].status(), Some(503));
}

#[tokio::test]
async fn remote_hit_skips_the_local_leg() {
    let stub = StubFetch::new();
    stub.succeed(Mode::ForceRemote, "fresh".to_string());

    let responses: Vec<_> = retriever()
        .retrieve_remote_fallback_local(&Tag::new("key"), stub.fetcher())
        .collect()
        .await;

    assert_eq!(responses, vec![Response::remote_success("fresh".to_string())]);
    assert_eq!(stub.call_count(Mode::ForceLocal), 0);
}

#[tokio::test]
async fn remote_failure_falls_back_to_local() {
    let stub = StubFetch::new();
    stub.fail_with_status(Mode::ForceRemote, 500, "server error");
    stub.succeed(Mode::ForceLocal, "cached".to_string());

    let responses: Vec<_> = retriever()
        .retrieve_remote_fallback_local(&Tag::new("key"), stub.fetcher())
        .collect()
        .await;

    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0].source(), Source::Remote);
    assert_eq!(responses[0].status(), Some(500));
    assert_eq!(responses[1], Response::local_success("cached".to_string()));
    assert_eq!(stub.calls(), vec![Mode::ForceRemote, Mode::ForceLocal]);
}

#[tokio::test]
async fn nothing_is_fetched_until_the_stream_is_polled() {
    let stub = StubFetch::new();
    stub.succeed(Mode::ForceLocal, 1);

    let retriever = retriever();
    let tag = Tag::new("key");
    let stream = retriever.retrieve_local_fallback_remote(&tag, stub.fetcher());
    assert!(stub.calls().is_empty());

    let _responses: Vec<_> = stream.collect().await;
    assert_eq!(stub.calls(), vec![Mode::ForceLocal]);
}
