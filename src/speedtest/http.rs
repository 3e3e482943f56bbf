//! HTTP speed tester

use super::{
    servers::{parse_server_list, SelectedServer, ServerEntry},
    SpeedTester, Throughput,
};
use crate::{
    defaults::{DOWNLOAD_REPEATS, DOWNLOAD_SIZES, UPLOAD_REPEATS, UPLOAD_SIZES, USER_AGENT},
    error::ErrorContext,
    logging::NetworkLogger,
    models::Config,
    AppError, Result,
};
use async_trait::async_trait;
use futures::{future::join_all, stream, StreamExt};
use reqwest::{header::CONTENT_TYPE, Client};
use std::time::{Duration, Instant};
use url::Url;

const UPLOAD_FILLER: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Knobs of one speed test run
#[derive(Debug, Clone, PartialEq)]
pub struct TestSettings {
    pub server_list_url: String,
    pub candidate_servers: usize,
    pub latency_samples: u32,
    /// Budget for each transfer phase; no new request starts after it
    pub test_duration: Duration,
    /// Transfer requests in flight at once
    pub concurrency: usize,
    pub timeout: Duration,
}

impl TestSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            server_list_url: config.server_list_url.clone(),
            candidate_servers: config.candidate_servers.max(1),
            latency_samples: config.latency_samples.max(1),
            test_duration: config.test_duration(),
            concurrency: config.concurrency.max(1),
            timeout: config.timeout(),
        }
    }
}

/// Speed tester speaking the speedtest.net legacy HTTP protocol
pub struct HttpSpeedTester {
    client: Client,
    settings: TestSettings,
    logger: NetworkLogger,
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}

/// Form-encoded upload body of exactly `size` bytes
fn upload_payload(size: usize) -> Vec<u8> {
    let mut payload = b"content1=".to_vec();
    payload.extend(UPLOAD_FILLER.iter().cycle().take(size.saturating_sub(payload.len())));
    payload.truncate(size);
    payload
}

impl HttpSpeedTester {
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_logger(config, NetworkLogger::new(config))
    }

    /// Create a tester that reports through an existing network logger
    pub fn with_logger(config: &Config, logger: NetworkLogger) -> Result<Self> {
        let settings = TestSettings::from_config(config);
        let client = Client::builder()
            .timeout(settings.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, settings, logger })
    }

    pub fn settings(&self) -> &TestSettings {
        &self.settings
    }

    /// Download and parse the server list
    pub async fn fetch_servers(&self) -> Result<Vec<ServerEntry>> {
        let started = Instant::now();
        let response = self
            .client
            .get(&self.settings.server_list_url)
            .send()
            .await
            .context("Failed to fetch speed test server list")?;

        let status = response.status();
        self.logger.log_http_request(&self.settings.server_list_url, "GET", Some(status.as_u16()), elapsed_ms(started));
        if !status.is_success() {
            return Err(AppError::http_request(format!("Server list request returned HTTP {}", status)));
        }

        let body = response.text().await.context("Failed to read speed test server list")?;
        parse_server_list(&body)
    }

    /// Mean round trip to `latency.txt`, or `None` if any probe fails
    async fn probe_latency(&self, server: &ServerEntry) -> Option<f64> {
        let url = server.latency_url().ok()?;
        let mut total_ms = 0.0;

        for _ in 0..self.settings.latency_samples {
            let started = Instant::now();
            let response = self.client.get(url.clone()).send().await.ok()?;
            let status = response.status();
            response.bytes().await.ok()?;
            let round_trip = elapsed_ms(started);

            self.logger.log_http_request(url.as_str(), "GET", Some(status.as_u16()), round_trip);
            if !status.is_success() {
                return None;
            }
            total_ms += round_trip;
        }

        Some(total_ms / f64::from(self.settings.latency_samples))
    }

    async fn download_one(&self, url: Url, deadline: Instant) -> u64 {
        if Instant::now() >= deadline {
            return 0;
        }

        let started = Instant::now();
        let mut response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                self.logger.log_http_request(url.as_str(), "GET", e.status().map(|s| s.as_u16()), elapsed_ms(started));
                return 0;
            }
        };

        let status = response.status();
        let mut bytes = 0u64;
        if status.is_success() {
            // A body cut short by the deadline or an error still counts what arrived
            while let Ok(Some(chunk)) = response.chunk().await {
                bytes += chunk.len() as u64;
                if Instant::now() >= deadline {
                    break;
                }
            }
        }

        self.logger.log_http_request(url.as_str(), "GET", Some(status.as_u16()), elapsed_ms(started));
        bytes
    }

    async fn upload_one(&self, url: Url, payload: Vec<u8>, deadline: Instant) -> u64 {
        if Instant::now() >= deadline {
            return 0;
        }

        let size = payload.len() as u64;
        let started = Instant::now();
        let result = self
            .client
            .post(url.clone())
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(payload)
            .send()
            .await;

        match result {
            Ok(response) => {
                let status = response.status();
                let _ = response.bytes().await;
                self.logger.log_http_request(url.as_str(), "POST", Some(status.as_u16()), elapsed_ms(started));
                if status.is_success() {
                    size
                } else {
                    0
                }
            }
            Err(e) => {
                self.logger.log_http_request(url.as_str(), "POST", e.status().map(|s| s.as_u16()), elapsed_ms(started));
                0
            }
        }
    }

    async fn download_phase(&self, server: &SelectedServer) -> Result<Throughput> {
        let urls = DOWNLOAD_SIZES
            .iter()
            .flat_map(|&size| std::iter::repeat(size).take(DOWNLOAD_REPEATS))
            .map(|size| server.entry.download_url(size))
            .collect::<Result<Vec<_>>>()?;

        let started = Instant::now();
        let deadline = started + self.settings.test_duration;
        let transfers: Vec<u64> = stream::iter(urls)
            .map(|url| self.download_one(url, deadline))
            .buffer_unordered(self.settings.concurrency)
            .collect()
            .await;

        Ok(Throughput {
            bytes: transfers.iter().sum(),
            elapsed: started.elapsed(),
            requests: transfers.iter().filter(|bytes| **bytes > 0).count(),
        })
    }

    async fn upload_phase(&self, server: &SelectedServer) -> Result<Throughput> {
        let url = server.entry.upload_url()?;
        let sizes: Vec<usize> = UPLOAD_SIZES
            .iter()
            .flat_map(|&size| std::iter::repeat(size).take(UPLOAD_REPEATS))
            .collect();

        let started = Instant::now();
        let deadline = started + self.settings.test_duration;
        let transfers: Vec<u64> = stream::iter(sizes)
            .map(|size| self.upload_one(url.clone(), upload_payload(size), deadline))
            .buffer_unordered(self.settings.concurrency)
            .collect()
            .await;

        Ok(Throughput {
            bytes: transfers.iter().sum(),
            elapsed: started.elapsed(),
            requests: transfers.iter().filter(|bytes| **bytes > 0).count(),
        })
    }
}

#[async_trait]
impl SpeedTester for HttpSpeedTester {
    async fn select_server(&self) -> Result<SelectedServer> {
        let servers = self.fetch_servers().await?;
        let candidates: Vec<ServerEntry> = servers.into_iter().take(self.settings.candidate_servers).collect();
        let latencies = join_all(candidates.iter().map(|server| self.probe_latency(server))).await;

        let mut best: Option<SelectedServer> = None;
        for (entry, latency) in candidates.into_iter().zip(latencies) {
            self.logger.log_server_probe(entry.label(), latency);
            if let Some(latency_ms) = latency {
                if best.as_ref().map_or(true, |current| latency_ms < current.latency_ms) {
                    best = Some(SelectedServer { entry, latency_ms });
                }
            }
        }

        best.ok_or_else(|| AppError::measurement("No speed test server answered the latency probe"))
    }

    async fn measure_download(&self, server: &SelectedServer) -> Result<f64> {
        let throughput = self.download_phase(server).await?;
        self.logger.log_transfer("Download", throughput.bytes, throughput.elapsed.as_secs_f64(), throughput.requests);
        throughput.mbps("Download")
    }

    async fn measure_upload(&self, server: &SelectedServer) -> Result<f64> {
        let throughput = self.upload_phase(server).await?;
        self.logger.log_transfer("Upload", throughput.bytes, throughput.elapsed.as_secs_f64(), throughput.requests);
        throughput.mbps("Upload")
    }
}
