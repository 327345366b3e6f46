use std::time::Instant;

use tide::{Middleware, Next, Request};
use tracing::{info, warn, Instrument};

/// Wraps every request in an `http.request` span and logs how it ended.
#[derive(Clone, Copy, Debug, Default)]
pub struct RequestTracing;

#[async_trait::async_trait]
impl<S: Clone + Send + Sync + 'static> Middleware<S> for RequestTracing {
    async fn handle(&self, req: Request<S>, next: Next<'_, S>) -> tide::Result {
        let span = tracing::info_span!(
            "http.request",
            method = %req.method(),
            path = %req.url().path(),
        );

        async move {
            let started = Instant::now();
            let res = next.run(req).await;
            let status = res.status();
            let elapsed_ms = started.elapsed().as_millis() as u64;

            match res.error() {
                Some(err) => warn!(status = %status, elapsed_ms, error = %err, "request failed"),
                None => info!(status = %status, elapsed_ms, "request finished"),
            }

            Ok(res)
        }
        .instrument(span)
        .await
    }
}
