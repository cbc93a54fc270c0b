// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The fallback policies against a simulated cache and network.
//! Shows how the same fetch source serves both legs.

use anyspawn::Spawner;
use duofetch::{FetchError, Mode, Retriever, Tag};
use futures::StreamExt;

#[tokio::main]
async fn main() {
    let retriever: Retriever<String> = Retriever::new(Spawner::new_tokio());
    let tag = Tag::new("profile:alice");

    // The cache is cold, so the local leg misses and the network answers.
    let fetch = |mode: Mode| async move {
        match mode {
            Mode::ForceLocal => Err(FetchError::from_message("not in cache")),
            Mode::ForceRemote => Ok("Alice".to_string()),
        }
    };

    println!("local, falling back to remote:");
    let responses = retriever.retrieve_local_fallback_remote(&tag, fetch);
    futures::pin_mut!(responses);
    while let Some(response) = responses.next().await {
        match response.value() {
            Some(value) => println!("  {}: {value}", response.source()),
            None => println!("  {}: miss", response.source()),
        }
    }

    println!("remote, falling back to local:");
    let responses = retriever.retrieve_remote_fallback_local(&tag, fetch);
    futures::pin_mut!(responses);
    while let Some(response) = responses.next().await {
        match response.value() {
            Some(value) => println!("  {}: {value}", response.source()),
            None => println!("  {}: miss", response.source()),
        }
    }
}
