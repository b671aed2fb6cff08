use axum::{
    extract::{MatchedPath, Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use prometheus_client::encoding::text::encode;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::metrics::histogram::Histogram;
use prometheus_client::registry::Registry;
use std::sync::Arc;
use std::time::Instant;

type Labels = Vec<(String, String)>;
type HistogramCtor = fn() -> Histogram;

/// Same bucket layout as the Prometheus client defaults.
const DURATION_BUCKETS: [f64; 11] = [
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

fn duration_histogram() -> Histogram {
    Histogram::new(DURATION_BUCKETS.into_iter())
}

struct MetricsInner {
    registry: Registry,
    requests: Family<Labels, Counter>,
    duration: Family<Labels, Histogram, HistogramCtor>,
    in_flight: Gauge,
    leaves: Counter,
    roots: Counter,
}

/// HTTP and reducer metrics, exported in the OpenMetrics text format.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

impl Metrics {
    pub fn new() -> Self {
        let mut registry = Registry::with_prefix("merkled");

        let requests = Family::<Labels, Counter>::default();
        registry.register(
            "http_requests",
            "Total number of HTTP requests by path, method and status",
            requests.clone(),
        );

        let duration = Family::<Labels, Histogram, HistogramCtor>::new_with_constructor(
            duration_histogram as HistogramCtor,
        );
        registry.register(
            "http_request_duration_seconds",
            "HTTP request duration in seconds",
            duration.clone(),
        );

        let in_flight = Gauge::default();
        registry.register(
            "http_in_flight_requests",
            "Current number of in-flight HTTP requests",
            in_flight.clone(),
        );

        let leaves = Counter::default();
        registry.register("leaves_hashed", "Leaves hashed into a root", leaves.clone());

        let roots = Counter::default();
        registry.register("roots_computed", "Merkle roots computed", roots.clone());

        Self {
            inner: Arc::new(MetricsInner {
                registry,
                requests,
                duration,
                in_flight,
                leaves,
                roots,
            }),
        }
    }

    pub fn record_root(&self, leaf_count: usize) {
        self.inner.roots.inc();
        self.inner.leaves.inc_by(leaf_count as u64);
    }

    pub fn render(&self) -> Result<String, std::fmt::Error> {
        let mut out = String::new();
        encode(&mut out, &self.inner.registry)?;
        Ok(out)
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Middleware recording request count, duration and in-flight requests per matched route.
pub async fn track(State(m): State<Metrics>, req: Request, next: Next) -> Response {
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());
    let method = req.method().to_string();

    m.inner.in_flight.inc();
    let start = Instant::now();
    let resp = next.run(req).await;
    let elapsed = start.elapsed().as_secs_f64();
    m.inner.in_flight.dec();

    m.inner
        .duration
        .get_or_create(&vec![
            ("path".to_string(), path.clone()),
            ("method".to_string(), method.clone()),
        ])
        .observe(elapsed);
    m.inner
        .requests
        .get_or_create(&vec![
            ("path".to_string(), path),
            ("method".to_string(), method),
            ("status".to_string(), resp.status().as_u16().to_string()),
        ])
        .inc();
    resp
}

pub async fn export(State(m): State<Metrics>) -> impl IntoResponse {
    match m.render() {
        Ok(body) => (
            StatusCode::OK,
            [(
                header::CONTENT_TYPE,
                "application/openmetrics-text; version=1.0.0; charset=utf-8",
            )],
            body,
        )
            .into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_lists_registered_metrics() {
        let m = Metrics::new();
        m.record_root(3);
        let text = m.render().unwrap();
        assert!(text.contains("merkled_roots_computed_total 1"));
        assert!(text.contains("merkled_leaves_hashed_total 3"));
        assert!(text.contains("merkled_http_in_flight_requests 0"));
        assert!(text.ends_with("# EOF\n"));
    }
}
