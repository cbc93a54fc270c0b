// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Fan-in and suppression for the concurrent local+remote policy.

use duofetch_model::{Response, Tag};
use futures::{Stream, StreamExt, channel::mpsc, stream};

struct RaceState<T> {
    rx: mpsc::UnboundedReceiver<Response<T>>,
    tag: Tag,
    local_pending: bool,
    remote_pending: bool,
}

/// Merges the completions of the two legs onto one stream.
///
/// Envelopes flow through in arrival order with one exception: a remote
/// success arriving while the local result is still undelivered suppresses
/// the local result, and the stream ends without forwarding it. A remote
/// failure never suppresses anything.
pub(crate) fn merge<T>(tag: Tag, rx: mpsc::UnboundedReceiver<Response<T>>) -> impl Stream<Item = Response<T>> {
    let state = RaceState {
        rx,
        tag,
        local_pending: true,
        remote_pending: true,
    };

    stream::unfold(state, |mut state| async move {
        if !state.local_pending && !state.remote_pending {
            return None;
        }
        // A closed channel means both senders are gone; end the stream even
        // if a leg never reported (e.g. its task was shut down).
        let response = state.rx.next().await?;
        match &response {
            Response::Local(_) => state.local_pending = false,
            Response::Remote(outcome) => {
                state.remote_pending = false;
                if outcome.is_success() && state.local_pending {
                    tracing::debug!(tag = %state.tag, "remote success won the race, suppressing the local result");
                    state.local_pending = false;
                }
            }
        }
        Some((response, state))
    })
}

#[cfg(test)]
mod tests {
    use duofetch_model::FetchError;

    use super::*;

    fn raced(tag: &str) -> (mpsc::UnboundedSender<Response<u32>>, impl Stream<Item = Response<u32>>) {
        let (tx, rx) = mpsc::unbounded();
        (tx, merge(Tag::new(tag), rx))
    }

    #[tokio::test]
    async fn remote_success_first_suppresses_local() {
        let (tx, merged) = raced("race");
        tx.unbounded_send(Response::remote_success(1)).expect("receiver alive");
        tx.unbounded_send(Response::local_success(2)).expect("receiver alive");
        drop(tx);

        let responses: Vec<_> = merged.collect().await;
        assert_eq!(responses, vec![Response::remote_success(1)]);
    }

    #[tokio::test]
    async fn remote_failure_first_does_not_suppress() {
        let (tx, merged) = raced("race");
        tx.unbounded_send(Response::remote_failure(FetchError::with_status(503, "unavailable"))).expect("receiver alive");
        tx.unbounded_send(Response::local_success(2)).expect("receiver alive");
        drop(tx);

        let responses: Vec<_> = merged.collect().await;
        assert_eq!(responses.len(), 2);
        assert!(responses[0].is_failure());
        assert_eq!(responses[1], Response::local_success(2));
    }

    #[tokio::test]
    async fn local_first_then_remote_both_delivered() {
        let (tx, merged) = raced("race");
        tx.unbounded_send(Response::local_success(2)).expect("receiver alive");
        tx.unbounded_send(Response::remote_success(1)).expect("receiver alive");
        drop(tx);

        let responses: Vec<_> = merged.collect().await;
        assert_eq!(responses, vec![Response::local_success(2), Response::remote_success(1)]);
    }

    #[tokio::test]
    async fn closed_channel_ends_the_stream() {
        let (tx, merged) = raced("race");
        drop(tx);

        let responses: Vec<_> = merged.collect().await;
        assert!(responses.is_empty());
    }
}
