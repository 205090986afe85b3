//! HTTP request metrics in the Prometheus text format.
//!
//! Every request is recorded by [`track_http`] under the route template it
//! matched (`/api/v1/recipes/{id}`, not the concrete URL), so label
//! cardinality stays bounded. Requests that match no route share the
//! `unmatched` path label.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{MatchedPath, Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;
use prometheus_client::encoding::{EncodeLabelSet, text::encode};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::metrics::histogram::{Histogram, exponential_buckets};
use prometheus_client::registry::Registry;

const UNMATCHED_PATH: &str = "unmatched";

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct RequestLabels {
    pub method: String,
    pub path: String,
    /// `2xx`, `3xx`, `4xx`, `5xx`.
    pub status_class: String,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct ErrorLabels {
    pub method: String,
    pub path: String,
    pub status_code: String,
}

/// Traffic, latency, errors and in-flight requests, with their registry.
#[derive(Clone)]
pub struct HttpMetrics {
    inner: Arc<Inner>,
}

struct Inner {
    registry: Registry,
    requests: Family<RequestLabels, Counter>,
    duration: Family<RequestLabels, Histogram>,
    errors: Family<ErrorLabels, Counter>,
    in_flight: Gauge,
}

impl HttpMetrics {
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let requests = Family::<RequestLabels, Counter>::default();
        registry.register(
            "http_requests",
            "Total number of HTTP requests",
            requests.clone(),
        );

        let duration = Family::<RequestLabels, Histogram>::new_with_constructor(|| {
            // 1ms .. ~4s
            Histogram::new(exponential_buckets(0.001, 2.0, 13))
        });
        registry.register(
            "http_request_duration_seconds",
            "Request latency in seconds, successful and failed responses",
            duration.clone(),
        );

        let errors = Family::<ErrorLabels, Counter>::default();
        registry.register(
            "http_errors",
            "Total number of 4xx and 5xx responses",
            errors.clone(),
        );

        let in_flight = Gauge::default();
        registry.register(
            "http_requests_in_flight",
            "Requests currently being served",
            in_flight.clone(),
        );

        Self {
            inner: Arc::new(Inner {
                registry,
                requests,
                duration,
                errors,
                in_flight,
            }),
        }
    }

    /// Record one finished request.
    pub fn observe(&self, method: &str, path: &str, status: StatusCode, elapsed: Duration) {
        let labels = RequestLabels {
            method: method.to_owned(),
            path: path.to_owned(),
            status_class: status_class(status).to_owned(),
        };
        self.inner.requests.get_or_create(&labels).inc();
        self.inner
            .duration
            .get_or_create(&labels)
            .observe(elapsed.as_secs_f64());

        if status.is_client_error() || status.is_server_error() {
            self.inner
                .errors
                .get_or_create(&ErrorLabels {
                    method: labels.method,
                    path: labels.path,
                    status_code: status.as_u16().to_string(),
                })
                .inc();
        }
    }

    /// Count a request as in flight until the returned guard drops.
    fn start(&self) -> InFlight {
        self.inner.in_flight.inc();
        InFlight(self.inner.in_flight.clone())
    }

    /// Render every metric in the OpenMetrics text format.
    pub fn encode(&self) -> Result<String, std::fmt::Error> {
        let mut buffer = String::new();
        encode(&mut buffer, &self.inner.registry)?;
        Ok(buffer)
    }
}

impl Default for HttpMetrics {
    fn default() -> Self {
        Self::new()
    }
}

struct InFlight(Gauge);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.dec();
    }
}

fn status_class(status: StatusCode) -> &'static str {
    match status.as_u16() {
        100..=199 => "1xx",
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        _ => "5xx",
    }
}

/// Middleware recording latency, traffic and errors for every request.
pub async fn track_http(
    State(metrics): State<HttpMetrics>,
    request: Request,
    next: Next,
) -> Response {
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| UNMATCHED_PATH.to_owned());
    let method = request.method().to_string();

    let _in_flight = metrics.start();
    let started = Instant::now();
    let response = next.run(request).await;

    metrics.observe(&method, &path, response.status(), started.elapsed());
    response
}
