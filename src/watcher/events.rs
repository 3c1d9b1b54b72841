//! Incremental watch events
//!
//! Applies the event stream of a kube-rs watcher to a store. The watcher's own
//! (re)list phase is collected and applied as one full replace, so objects
//! deleted while the watch was down disappear as well.

use super::state::ResyncStatus;
use crate::store::{DeleteEvent, ObjectStore, Transform};
use futures::{Stream, StreamExt};
use kube::runtime::watcher::Event;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// Apply one watch event, buffering relist items until the relist completes
pub(crate) fn apply_event<T: Transform>(
    store: &ObjectStore<T>,
    event: Event<T::Raw>,
    relist: &mut Vec<T::Raw>,
) {
    match event {
        Event::Apply(obj) => {
            store.add(&obj);
        }
        Event::Delete(obj) => {
            store.delete(&DeleteEvent::Live(obj));
        }
        Event::Init => relist.clear(),
        Event::InitApply(obj) => relist.push(obj),
        Event::InitDone => {
            let objects = std::mem::take(relist);
            // The watcher does not expose the list version; the newest object
            // is a lower bound for it.
            let hint = objects
                .iter()
                .filter_map(|obj| store.transform().version(obj))
                .max()
                .map(|v| v.to_string());

            store.relist(&objects, hint.as_deref());
            tracing::info!(objects = objects.len(), "Watch relist applied");
        }
    }
}

/// Pump watch events into the store until the stream ends or `token` fires
pub(crate) async fn run_event_pump<T, S, E>(
    store: Arc<ObjectStore<T>>,
    events: S,
    token: CancellationToken,
    status: Arc<ResyncStatus>,
) where
    T: Transform,
    S: Stream<Item = Result<Event<T::Raw>, E>>,
    E: Display,
{
    let mut events = std::pin::pin!(events);
    let mut relist = Vec::new();
    let mut error_count = 0u32;

    loop {
        let next = tokio::select! {
            biased;
            _ = token.cancelled() => break,
            next = events.next() => next,
        };

        match next {
            Some(Ok(event)) => {
                error_count = 0;
                status.record_watch_event();
                apply_event(&store, event, &mut relist);
            }
            Some(Err(e)) => {
                error_count += 1;
                status.record_watch_error(e.to_string());
                // Only log errors occasionally to avoid spam
                if error_count == 1 || error_count % 10 == 0 {
                    tracing::warn!("EndpointSlice watch error ({}): {}", error_count, e);
                }

                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = tokio::time::sleep(ERROR_BACKOFF) => {}
                }
            }
            None => {
                tracing::debug!("Watch stream ended");
                break;
            }
        }
    }

    tracing::info!("Watch pump stopped");
}
