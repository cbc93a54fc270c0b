// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The concurrent policy racing a fast cache against a slow network.
//! The stale cached value is shown first, then replaced by fresh data.

use std::time::Duration;

use anyspawn::Spawner;
use duofetch::{Mode, Retriever, Tag};
use futures::StreamExt;

#[tokio::main]
async fn main() {
    let retriever: Retriever<String> = Retriever::new(Spawner::new_tokio());
    let tag = Tag::new("weather:seattle");

    let fetch = |mode: Mode| async move {
        match mode {
            Mode::ForceLocal => Ok("cloudy (cached yesterday)".to_string()),
            Mode::ForceRemote => {
                tokio::time::sleep(Duration::from_millis(200)).await;
                Ok("raining".to_string())
            }
        }
    };

    // The cache wins the race, so both envelopes arrive: render the stale
    // value immediately, then overwrite it when the network answers. Had the
    // network won, the stale value would have been suppressed entirely.
    let responses = retriever.retrieve_local_and_remote(&tag, fetch);
    futures::pin_mut!(responses);
    while let Some(response) = responses.next().await {
        match response.value() {
            Some(value) => println!("{}: {value}", response.source()),
            None => println!("{}: failed", response.source()),
        }
    }
}
