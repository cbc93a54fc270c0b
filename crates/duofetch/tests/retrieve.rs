// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Integration tests for the single-shot retrieval policies.

use std::{
    sync::{
        Arc,
        atomic::{
            AtomicUsize,
            Ordering::{AcqRel, Acquire},
        },
    },
    time::Duration,
};

use anyspawn::Spawner;
use duofetch::{FetchError, Mode, Response, Retriever, Source, Tag};
use duofetch_model::testing::StubFetch;

fn retriever<T>() -> Retriever<T> {
    Retriever::new(Spawner::new_tokio())
}

#[tokio::test]
async fn local_success() {
    let stub = StubFetch::new();
    stub.succeed(Mode::ForceLocal, "cached".to_string());

    let response = retriever().retrieve_local(&Tag::new("key"), stub.fetcher()).await;

    assert_eq!(response, Response::local_success("cached".to_string()));
    assert_eq!(stub.calls(), vec![Mode::ForceLocal]);
}

#[tokio::test]
async fn local_failure_carries_no_status() {
    let stub: StubFetch<String> = StubFetch::new();
    stub.fail(Mode::ForceLocal, "empty cache");

    let response = retriever().retrieve_local(&Tag::new("key"), stub.fetcher()).await;

    assert_eq!(response.source(), Source::Local);
    assert!(response.is_failure());
    assert_eq!(response.status(), None);
    assert!(response.error().is_some_and(|e| e.to_string().contains("empty cache")));
}

#[tokio::test]
async fn remote_success() {
    let stub = StubFetch::new();
    stub.succeed(Mode::ForceRemote, "fresh".to_string());

    let response = retriever().retrieve_remote(&Tag::new("key"), stub.fetcher()).await;

    assert_eq!(response, Response::remote_success("fresh".to_string()));
    assert_eq!(stub.calls(), vec![Mode::ForceRemote]);
}

#[tokio::test]
async fn remote_failure_carries_transport_status() {
    let stub: StubFetch<String> = StubFetch::new();
    stub.fail_with_status(Mode::ForceRemote, 404, "not found");

    let response = retriever().retrieve_remote(&Tag::new("key"), stub.fetcher()).await;

    assert_eq!(response.source(), Source::Remote);
    assert!(response.is_failure());
    assert_eq!(response.status(), Some(404));
}

#[tokio::test]
async fn concurrent_remote_retrievals_coalesce() {
    let counter = Arc::new(AtomicUsize::new(0));
    let retriever = retriever();
    let tag = Tag::new("key");

    let fetch = {
        let counter = Arc::clone(&counter);
        move |_mode: Mode| {
            let counter = Arc::clone(&counter);
            async move {
                tokio::time::sleep(Duration::from_millis(30)).await;
                counter.fetch_add(1, AcqRel);
                Ok("fresh".to_string())
            }
        }
    };

    let (first, second) = futures::join!(
        retriever.retrieve_remote(&tag, fetch.clone()),
        retriever.retrieve_remote(&tag, fetch),
    );

    assert_eq!(first.value(), Some(&"fresh".to_string()));
    assert_eq!(second.value(), Some(&"fresh".to_string()));
    assert_eq!(counter.load(Acquire), 1);
}

#[tokio::test]
async fn local_retrievals_never_coalesce() {
    let stub = StubFetch::new();
    stub.succeed(Mode::ForceLocal, 7);
    let retriever = retriever();
    let tag = Tag::new("key");

    let (first, second) = futures::join!(
        retriever.retrieve_local(&tag, stub.fetcher()),
        retriever.retrieve_local(&tag, stub.fetcher()),
    );

    assert_eq!(first.value(), Some(&7));
    assert_eq!(second.value(), Some(&7));
    assert_eq!(stub.call_count(Mode::ForceLocal), 2);
    assert_eq!(retriever.call_manager().in_flight(), 0);
}

#[tokio::test]
async fn fetch_error_wraps_plain_errors() {
    let parse_failure = "garbage".parse::<u32>().expect_err("not a number");
    let response: Response<String> = Response::remote_failure(FetchError::from_message(parse_failure));

    assert!(response.is_failure());
    assert_eq!(response.status(), None);
}
