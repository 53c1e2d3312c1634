//! Single-target HTTP prober
//!
//! Issues one timed GET per target and classifies the outcome. Nothing here
//! fails upward: every path ends in exactly one [`ProbeResult`].

use std::fmt::Write;
use std::time::{Duration, Instant};

use reqwest::StatusCode;
use tracing::{instrument, trace};

use crate::observer::{RunEvent, SharedObserver};
use crate::{ProbeResult, Target};

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Performs probes against individual targets
///
/// Cloning is cheap: the HTTP client is reference counted and shared by every
/// concurrent probe.
#[derive(Clone)]
pub struct Prober {
    /// HTTP client (reused across requests)
    client: reqwest::Client,

    timeout: Duration,

    observer: SharedObserver,
}

impl Prober {
    pub fn new(timeout: Duration, observer: SharedObserver) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            timeout,
            observer,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Probe a single target
    ///
    /// Outcomes, in order of precedence:
    /// 1. the request cannot be built → `RequestBuildError`, status 0, 0ms
    /// 2. no response (timeout, refused, DNS, ...) → `NetworkError`, status 0
    /// 3. response with a status other than 200 → `NonOkStatus`
    /// 4. response with 200 → `Success`
    #[instrument(skip(self), fields(url = %target))]
    pub async fn probe(&self, target: &Target) -> ProbeResult {
        let url = target.url();

        let request = match self.client.get(url).build() {
            Ok(request) => request,
            Err(e) => return self.build_failed(url, &e),
        };

        trace!("sending request");

        let start = Instant::now();
        let response = self.client.execute(request).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        let result = match response {
            // reqwest validates some parts of the URL (like the scheme) only
            // when the request is executed
            Err(e) if e.is_builder() => return self.build_failed(url, &e),
            Err(e) => {
                let error = describe_error(&e);
                self.observer.on_event(&RunEvent::NetworkFailed {
                    url: url.to_string(),
                    error: error.clone(),
                });
                ProbeResult::network_error(url, duration_ms, error)
            }
            Ok(response) => {
                let status = response.status();
                // Dropping the response releases its body and connection.
                drop(response);

                if status != StatusCode::OK {
                    self.observer.on_event(&RunEvent::NonOkStatus {
                        url: url.to_string(),
                        status: status.as_u16(),
                    });
                }

                ProbeResult::responded(url, status.as_u16(), duration_ms)
            }
        };

        self.completed(&result);
        result
    }

    fn build_failed(&self, url: &str, error: &reqwest::Error) -> ProbeResult {
        let error = describe_error(error);
        self.observer.on_event(&RunEvent::RequestBuildFailed {
            url: url.to_string(),
            error: error.clone(),
        });

        let result = ProbeResult::request_build_error(url, error);
        self.completed(&result);
        result
    }

    fn completed(&self, result: &ProbeResult) {
        self.observer.on_event(&RunEvent::ProbeCompleted {
            url: result.url.clone(),
            outcome: result.outcome,
            duration_ms: result.duration_ms,
        });
    }
}

/// Render an error together with its chain of causes
pub fn describe_error(mut err: &(dyn std::error::Error + 'static)) -> String {
    let mut s = err.to_string();
    while let Some(src) = err.source() {
        let _ = write!(s, ": {src}");
        err = src;
    }
    s
}
