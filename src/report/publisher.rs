//! Result Publisher
//!
//! Delivers computed results to the reporting API. Executors hand a result to
//! `publish` and move on immediately; a single delivery worker drains the
//! outbound queue and performs the HTTP calls. A failed delivery is logged
//! and dropped; it never feeds back into task state. Retries are bounded and
//! off unless configured (`DELIVERY_ATTEMPTS` > 1).

use anyhow::Result;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::mpsc;

const DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP semantics of a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Append a new result under a collection (predictor, genotype,
    /// distance, tree).
    Create,
    /// Overwrite a pre-allocated result slot (search).
    Replace,
}

impl Delivery {
    pub fn method(&self) -> reqwest::Method {
        match self {
            Delivery::Create => reqwest::Method::POST,
            Delivery::Replace => reqwest::Method::PUT,
        }
    }
}

/// The envelope sent to the reporting API.
#[derive(Debug, Clone, Serialize)]
pub struct ResultEnvelope {
    #[serde(rename = "type")]
    pub kind: String,
    pub result: Value,
    #[serde(rename = "subType", skip_serializing_if = "Option::is_none")]
    pub sub_type: Option<String>,
}

/// One queued outbound call.
#[derive(Debug)]
pub struct Outbound {
    pub envelope: ResultEnvelope,
    pub url: String,
    pub delivery: Delivery,
}

/// Handle used by executors to queue results for delivery.
#[derive(Clone)]
pub struct Publisher {
    tx: mpsc::UnboundedSender<Outbound>,
    base_url: String,
}

impl Publisher {
    /// Spawns the delivery worker and returns the handle.
    pub fn spawn(base_url: String, attempts: usize) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Outbound>();
        let client = reqwest::Client::new();
        let attempts = attempts.max(1);

        tokio::spawn(async move {
            while let Some(outbound) = rx.recv().await {
                deliver(&client, outbound, attempts).await;
            }
        });

        Self {
            tx,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Test seam: a publisher whose queue drains into the returned receiver
    /// instead of a delivery worker.
    #[cfg(test)]
    pub fn probe(base_url: &str) -> (Self, mpsc::UnboundedReceiver<Outbound>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                tx,
                base_url: base_url.trim_end_matches('/').to_string(),
            },
            rx,
        )
    }

    /// Queues a result for delivery and returns immediately. Delivery is
    /// best-effort; the caller is never told whether it succeeded.
    pub fn publish(
        &self,
        kind: &str,
        result: Value,
        path: &str,
        sub_type: Option<&str>,
        delivery: Delivery,
    ) {
        let outbound = Outbound {
            envelope: ResultEnvelope {
                kind: kind.to_string(),
                result,
                sub_type: sub_type.map(str::to_string),
            },
            url: self.url_for(path),
            delivery,
        };

        if self.tx.send(outbound).is_err() {
            tracing::error!("Delivery worker is gone, dropping {} result", kind);
        }
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

/// Performs one outbound call with bounded retry and jittered backoff.
async fn deliver(client: &reqwest::Client, outbound: Outbound, attempts: usize) {
    let mut delay_ms = 150u64;

    for attempt in 0..attempts {
        let request = client
            .request(outbound.delivery.method(), &outbound.url)
            .json(&outbound.envelope)
            .timeout(DELIVERY_TIMEOUT);

        match request.send().await {
            Ok(response) => {
                // The reporting API's verdict is advisory only.
                if !response.status().is_success() {
                    tracing::warn!(
                        "Reporting API rejected {} result at {}: {}",
                        outbound.envelope.kind,
                        outbound.url,
                        response.status()
                    );
                } else {
                    tracing::debug!(
                        "Delivered {} result to {}",
                        outbound.envelope.kind,
                        outbound.url
                    );
                }
                return;
            }
            Err(e) => {
                if attempt + 1 == attempts {
                    tracing::error!(
                        "Dropping {} result for {}: {}",
                        outbound.envelope.kind,
                        outbound.url,
                        e
                    );
                    return;
                }
                // Simple jitter to prevent thundering herd
                let jitter = rand::random::<u64>() % 50;
                tokio::time::sleep(Duration::from_millis(delay_ms + jitter)).await;
                delay_ms = (delay_ms * 2).min(1200);
            }
        }
    }
}

/// Convenience used by startup code to fail fast on an unusable base URL.
pub fn check_base_url(base_url: &str) -> Result<()> {
    reqwest::Url::parse(base_url)
        .map_err(|e| anyhow::anyhow!("invalid reporting API base URL {}: {}", base_url, e))?;
    Ok(())
}
