//! Integration Tests - End-to-end HTTP Surface
//!
//! Spawns the real router on an ephemeral port and drives it with
//! reqwest. Uses mockall for the delay port and tokio::test for async
//! tests.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::future::join_all;
use mockall::mock;
use mockall::predicate::eq;
use reqwest::{Method, StatusCode};

use metrics_demo_server::adapters::delay::SeededDelay;
use metrics_demo_server::adapters::http::{self, AppState};
use metrics_demo_server::adapters::metrics::MetricsRegistry;
use metrics_demo_server::domain::DelayBounds;
use metrics_demo_server::ports::DelaySource;

// ---- Mock Definitions ----

mock! {
    pub Delays {}

    impl DelaySource for Delays {
        fn draw(&self, max: Duration) -> Duration;
    }
}

// ---- Helpers ----

struct TestServer {
    base: String,
    metrics: Arc<MetricsRegistry>,
    client: reqwest::Client,
}

impl TestServer {
    async fn spawn(delays: Arc<dyn DelaySource>) -> Self {
        let metrics = Arc::new(MetricsRegistry::new("test").unwrap());
        let state = AppState::new(Arc::clone(&metrics), delays, DelayBounds::default());
        let listener = http::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(http::serve(listener, http::create_router(state)));

        Self {
            base: format!("http://{addr}"),
            metrics,
            client: reqwest::Client::new(),
        }
    }

    async fn no_delay() -> Self {
        let mut delays = MockDelays::new();
        delays.expect_draw().returning(|_| Duration::ZERO);
        Self::spawn(Arc::new(delays)).await
    }

    async fn request(&self, method: Method, path: &str) -> (StatusCode, String) {
        let resp = self
            .client
            .request(method, format!("{}{path}", self.base))
            .send()
            .await
            .unwrap();
        let status = resp.status();
        (status, resp.text().await.unwrap())
    }

    async fn get(&self, path: &str) -> (StatusCode, String) {
        self.request(Method::GET, path).await
    }

    fn requests_total(&self, code: &str, method: &str) -> u64 {
        self.metrics
            .requests_total
            .with_label_values(&[code, method])
            .get()
    }
}

/// Sum of every `http_requests_total` sample in an exposition.
fn scraped_requests_total(text: &str) -> f64 {
    text.lines()
        .filter(|l| l.starts_with("http_requests_total{"))
        .filter_map(|l| l.rsplit(' ').next())
        .map(|v| v.parse::<f64>().unwrap())
        .sum()
}

/// Cumulative histogram bucket `le` for `endpoint`, GET/200 series.
fn bucket_count(text: &str, endpoint: &str, le: &str) -> Option<u64> {
    let prefix = format!(
        "http_request_duration_seconds_bucket{{code=\"200\",endpoint=\"{endpoint}\",handler=\"found\",method=\"GET\",le=\"{le}\"}} "
    );
    text.lines()
        .find_map(|l| l.strip_prefix(&prefix))
        .map(|v| v.parse().unwrap())
}

/// Value of the first sample line starting with `prefix`.
fn sample_value(text: &str, prefix: &str) -> Option<f64> {
    text.lines()
        .find(|l| l.starts_with(prefix))
        .and_then(|l| l.rsplit(' ').next())
        .map(|v| v.parse().unwrap())
}

// ---- Integration Tests ----

#[tokio::test]
async fn test_root_is_stable_for_any_method() {
    let server = TestServer::no_delay().await;

    for method in [Method::GET, Method::POST, Method::PUT, Method::DELETE] {
        let (status, body) = server.request(method, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Endpoint estável");
    }

    assert_eq!(server.requests_total("200", "GET"), 1);
    assert_eq!(server.requests_total("200", "POST"), 1);
    assert_eq!(server.requests_total("200", "DELETE"), 1);
}

#[tokio::test]
async fn test_simulated_failures() {
    let server = TestServer::no_delay().await;

    let (status, body) = server.get("/error").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.is_empty());

    let (status, body) = server.get("/internal-error").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.is_empty());

    assert_eq!(server.requests_total("404", "GET"), 1);
    assert_eq!(server.requests_total("500", "GET"), 1);
}

#[tokio::test]
async fn test_random_endpoints_draw_from_their_bounds() {
    let mut delays = MockDelays::new();
    delays
        .expect_draw()
        .with(eq(Duration::from_millis(500)))
        .times(2)
        .returning(|_| Duration::from_millis(120));
    delays
        .expect_draw()
        .with(eq(Duration::from_millis(2000)))
        .times(1)
        .returning(|_| Duration::from_millis(150));
    let server = TestServer::spawn(Arc::new(delays)).await;

    let start = Instant::now();
    let (status, body) = server.get("/fast-random").await;
    assert!(start.elapsed() >= Duration::from_millis(120));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Endpoint com resposta aleatória (0-0.5s)");

    let start = Instant::now();
    let (status, body) = server.get("/slow-random").await;
    assert!(start.elapsed() >= Duration::from_millis(150));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Endpoint com resposta aleatória (0-2s)");

    let (status, body) = server.get("/summary").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Endpoint com resposta aleatória (0-0.5s)");

    // Recorded durations include the artificial delay.
    let hist = server
        .metrics
        .request_duration
        .with_label_values(&["200", "found", "GET", "/slow-random"]);
    assert_eq!(hist.get_sample_count(), 1);
    assert!(hist.get_sample_sum() >= 0.15);
}

#[tokio::test]
async fn test_fast_random_latency_below_bound() {
    let server = TestServer::spawn(Arc::new(SeededDelay::from_clock())).await;

    for _ in 0..5 {
        let start = Instant::now();
        let (status, _) = server.get("/fast-random").await;
        // Local round trip adds milliseconds at most.
        assert!(start.elapsed() < Duration::from_millis(700), "took {:?}", start.elapsed());
        assert_eq!(status, StatusCode::OK);
    }

    // Every recorded duration fits the first bucket past the 0.5s bound.
    let (_, text) = server.get("/metrics").await;
    assert_eq!(bucket_count(&text, "/fast-random", "0.75"), Some(5));
    assert_eq!(bucket_count(&text, "/fast-random", "+Inf"), Some(5));
}

#[tokio::test]
async fn test_counter_tracks_exact_request_count() {
    let server = TestServer::no_delay().await;
    let n = 25;

    for _ in 0..n {
        server.get("/").await;
    }

    assert_eq!(server.requests_total("200", "GET"), n);
    let (_, text) = server.get("/metrics").await;
    assert!(text.contains(&format!("http_requests_total{{code=\"200\",method=\"GET\"}} {n}")));
}

#[tokio::test]
async fn test_metrics_scrape_is_not_counted() {
    let server = TestServer::no_delay().await;

    for _ in 0..3 {
        let (status, text) = server.get("/metrics").await;
        assert_eq!(status, StatusCode::OK);
        assert!(text.contains("# HELP version Version information about this binary"));
        assert!(text.contains("version{version=\"test\"} 1"));
        assert_eq!(scraped_requests_total(&text), 0.0);
    }

    server.get("/").await;
    let (_, text) = server.get("/metrics").await;
    assert_eq!(scraped_requests_total(&text), 1.0);
}

#[tokio::test]
async fn test_unknown_path_is_plain_404() {
    let server = TestServer::no_delay().await;

    let (status, _) = server.get("/does-not-exist").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(server.requests_total("404", "GET"), 0);
}

#[tokio::test]
async fn test_summary_counted_once() {
    let server = TestServer::no_delay().await;

    server.get("/summary").await;
    server.get("/summary").await;

    assert_eq!(server.requests_total("200", "GET"), 2);

    let (_, text) = server.get("/metrics").await;
    assert!(text.contains(
        "http_request_summary_duration_seconds_count{code=\"200\",endpoint=\"/summary\",handler=\"found\",method=\"GET\"} 2"
    ));
    for q in ["0.5", "0.9", "0.99"] {
        assert!(text.contains(&format!("method=\"GET\",quantile=\"{q}\"}}")));
    }
    // Timed into the summary only.
    assert!(!text.contains("endpoint=\"/summary\",handler=\"found\",method=\"GET\",le="));
}

#[tokio::test]
async fn test_histogram_buckets_cumulative() {
    let server = TestServer::no_delay().await;

    for _ in 0..4 {
        server.get("/").await;
    }
    server.get("/slow-random").await;

    let (_, text) = server.get("/metrics").await;
    for endpoint in ["/", "/slow-random"] {
        let prefix = format!(
            "http_request_duration_seconds_bucket{{code=\"200\",endpoint=\"{endpoint}\",handler=\"found\",method=\"GET\",le="
        );
        let counts: Vec<u64> = text
            .lines()
            .filter(|l| l.starts_with(&prefix))
            .map(|l| l.rsplit(' ').next().unwrap().parse().unwrap())
            .collect();
        // Nine boundaries plus +Inf.
        assert_eq!(counts.len(), 10, "buckets for {endpoint}");
        assert!(counts.windows(2).all(|w| w[0] <= w[1]));
    }
}

#[tokio::test]
async fn test_concurrent_requests_counted_exactly() {
    let server = TestServer::spawn(Arc::new(SeededDelay::from_clock())).await;

    let calls = (0..100).map(|_| server.get("/fast-random"));
    let results = join_all(calls).await;
    assert!(results.iter().all(|(status, _)| *status == StatusCode::OK));

    assert_eq!(server.requests_total("200", "GET"), 100);
    let hist = server
        .metrics
        .request_duration
        .with_label_values(&["200", "found", "GET", "/fast-random"]);
    assert_eq!(hist.get_sample_count(), 100);
}

#[tokio::test]
async fn test_scrapes_during_live_traffic() {
    let server = Arc::new(TestServer::spawn(Arc::new(SeededDelay::from_clock())).await);
    let per_path: u32 = 50;

    let mut traffic = Vec::new();
    for path in ["/summary", "/fast-random"] {
        for _ in 0..per_path {
            let server = Arc::clone(&server);
            traffic.push(tokio::spawn(async move { server.get(path).await.0 }));
        }
    }

    let scraper = {
        let server = Arc::clone(&server);
        tokio::spawn(async move {
            let mut scrapes = 0;
            for _ in 0..20 {
                let (status, text) = server.get("/metrics").await;
                assert_eq!(status, StatusCode::OK);
                // Every sample line must end in a parseable value.
                for line in text.lines().filter(|l| !l.starts_with('#') && !l.is_empty()) {
                    let value = line.rsplit(' ').next().unwrap();
                    assert!(value.parse::<f64>().is_ok(), "unparseable line {line:?}");
                }
                assert!(scraped_requests_total(&text) <= f64::from(2 * per_path));
                scrapes += 1;
                tokio::time::sleep(Duration::from_millis(25)).await;
            }
            scrapes
        })
    };

    for status in join_all(traffic).await {
        assert_eq!(status.unwrap(), StatusCode::OK);
    }
    assert_eq!(scraper.await.unwrap(), 20);

    let total = u64::from(2 * per_path);
    assert_eq!(server.requests_total("200", "GET"), total);

    let (_, text) = server.get("/metrics").await;
    assert_eq!(scraped_requests_total(&text), f64::from(2 * per_path));
    assert_eq!(
        sample_value(
            &text,
            "http_request_summary_duration_seconds_count{code=\"200\",endpoint=\"/summary\",handler=\"found\",method=\"GET\"}"
        ),
        Some(f64::from(per_path))
    );
    assert_eq!(bucket_count(&text, "/fast-random", "+Inf"), Some(u64::from(per_path)));
}
