//! Background consumer for the click queue.
//!
//! Each event is recorded through a [`ClickSink`] with a small retry budget,
//! then fanned out to the owner's webhooks. Events that exhaust their retries
//! are written to the `dead_letter` log target.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

use crate::domain::click_event::{ClickEvent, WebhookPayload};
use crate::domain::entities::{Click, WebhookTarget};
use crate::error::AppError;

/// Total attempts per click, including the first.
pub const RECORD_ATTEMPTS: usize = 3;

/// Persists a click event and returns the stored row.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickSink: Send + Sync {
    async fn record(&self, event: &ClickEvent) -> Result<Click, AppError>;
}

/// Delivers a webhook notification. Implementations enforce their own timeout.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WebhookDispatcher: Send + Sync {
    async fn dispatch(
        &self,
        target: &WebhookTarget,
        payload: &WebhookPayload,
    ) -> Result<(), AppError>;
}

/// Consumes click events until every sender is dropped.
///
/// At most `concurrency` events are processed at once. In-flight events are
/// drained before the function returns.
pub async fn run_click_worker(
    mut rx: mpsc::Receiver<ClickEvent>,
    sink: Arc<dyn ClickSink>,
    dispatcher: Arc<dyn WebhookDispatcher>,
    concurrency: usize,
) {
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = JoinSet::new();

    tracing::info!(concurrency, "Click worker started");

    while let Some(event) = rx.recv().await {
        let Ok(permit) = semaphore.clone().acquire_owned().await else {
            break;
        };

        let sink = sink.clone();
        let dispatcher = dispatcher.clone();
        tasks.spawn(async move {
            process_event(event, sink.as_ref(), dispatcher.as_ref()).await;
            drop(permit);
        });

        while tasks.try_join_next().is_some() {}
    }

    while tasks.join_next().await.is_some() {}

    tracing::info!("Click worker stopped");
}

/// Only server-side failures are worth another attempt; a rejected event
/// (for example a link that no longer exists) fails the same way every time.
fn is_transient(error: &AppError) -> bool {
    error.status().is_server_error()
}

/// Records one event with retries, then notifies its webhooks.
pub async fn process_event(
    event: ClickEvent,
    sink: &dyn ClickSink,
    dispatcher: &dyn WebhookDispatcher,
) {
    let strategy = ExponentialBackoff::from_millis(10)
        .map(jitter)
        .take(RECORD_ATTEMPTS - 1);

    let click = match RetryIf::spawn(strategy, || sink.record(&event), is_transient).await {
        Ok(click) => {
            metrics::counter!("clicks_recorded_total").increment(1);
            click
        }
        Err(e) => {
            metrics::counter!("clicks_failed_total").increment(1);
            tracing::error!(
                target: "dead_letter",
                link_id = event.link_id,
                short_code = %event.short_code,
                clicked_at = %event.clicked_at,
                ip = ?event.ip,
                user_agent = ?event.user_agent,
                referer = ?event.referer,
                error = %e,
                "Click dropped"
            );
            return;
        }
    };

    if event.webhooks.is_empty() {
        return;
    }

    let payload = WebhookPayload::link_clicked(&event, &click);
    for target in &event.webhooks {
        match dispatcher.dispatch(target, &payload).await {
            Ok(()) => {
                metrics::counter!("webhooks_delivered_total").increment(1);
            }
            Err(e) => {
                metrics::counter!("webhooks_failed_total").increment(1);
                tracing::warn!(
                    target: "dead_letter",
                    integration_id = target.integration_id,
                    url = %target.url,
                    link_id = event.link_id,
                    error = %e,
                    "Webhook delivery failed"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::click_event::fixtures::{click_for, event};
    use serde_json::json;

    fn webhook(id: i64) -> WebhookTarget {
        WebhookTarget {
            integration_id: id,
            url: format!("https://hooks.example/{}", id),
            secret: None,
        }
    }

    #[tokio::test]
    async fn test_records_and_skips_webhooks_when_none() {
        let mut sink = MockClickSink::new();
        sink.expect_record()
            .times(1)
            .returning(|ev| Ok(click_for(ev)));

        let mut dispatcher = MockWebhookDispatcher::new();
        dispatcher.expect_dispatch().never();

        process_event(event(1, "abc"), &sink, &dispatcher).await;
    }

    #[tokio::test]
    async fn test_retries_then_succeeds() {
        let mut sink = MockClickSink::new();
        let mut calls = 0;
        sink.expect_record().times(2).returning(move |ev| {
            calls += 1;
            if calls == 1 {
                Err(AppError::internal("Database error", json!({})))
            } else {
                Ok(click_for(ev))
            }
        });

        let mut dispatcher = MockWebhookDispatcher::new();
        dispatcher.expect_dispatch().never();

        process_event(event(1, "abc"), &sink, &dispatcher).await;
    }

    #[tokio::test]
    async fn test_gives_up_after_budget() {
        let mut sink = MockClickSink::new();
        sink.expect_record()
            .times(RECORD_ATTEMPTS)
            .returning(|_| Err(AppError::internal("Database error", json!({}))));

        let mut dispatcher = MockWebhookDispatcher::new();
        dispatcher.expect_dispatch().never();

        let mut ev = event(1, "abc");
        ev.webhooks = vec![webhook(1)];
        process_event(ev, &sink, &dispatcher).await;
    }

    #[tokio::test]
    async fn test_rejected_click_is_not_retried() {
        let mut sink = MockClickSink::new();
        sink.expect_record().times(1).returning(|ev| {
            Err(AppError::bad_request(
                "Link does not exist",
                json!({ "link_id": ev.link_id }),
            ))
        });

        let mut dispatcher = MockWebhookDispatcher::new();
        dispatcher.expect_dispatch().never();

        let mut ev = event(424242, "gone");
        ev.webhooks = vec![webhook(1)];
        process_event(ev, &sink, &dispatcher).await;
    }

    #[tokio::test]
    async fn test_each_webhook_notified_once() {
        let mut sink = MockClickSink::new();
        sink.expect_record().returning(|ev| Ok(click_for(ev)));

        let mut dispatcher = MockWebhookDispatcher::new();
        dispatcher
            .expect_dispatch()
            .withf(|target, payload| target.integration_id == 1 && payload.short_code == "abc")
            .times(1)
            .returning(|_, _| Err(AppError::internal("timeout", json!({}))));
        dispatcher
            .expect_dispatch()
            .withf(|target, _| target.integration_id == 2)
            .times(1)
            .returning(|_, _| Ok(()));

        let mut ev = event(1, "abc");
        ev.webhooks = vec![webhook(1), webhook(2)];
        process_event(ev, &sink, &dispatcher).await;
    }

    #[tokio::test]
    async fn test_worker_drains_queue_and_stops() {
        let mut sink = MockClickSink::new();
        sink.expect_record()
            .times(5)
            .returning(|ev| Ok(click_for(ev)));

        let (tx, rx) = mpsc::channel(16);
        for i in 0..5 {
            tx.send(event(i, "abc")).await.unwrap();
        }
        drop(tx);

        run_click_worker(
            rx,
            Arc::new(sink),
            Arc::new(MockWebhookDispatcher::new()),
            2,
        )
        .await;
    }
}
