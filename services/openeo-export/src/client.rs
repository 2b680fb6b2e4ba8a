//! Minimal openEO batch-job client.
//!
//! Covers the slice of the API the export needs: basic-auth token exchange,
//! job creation from a process graph, job start, status polling, and asset
//! download.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use atmos_common::BoundingBox;

/// A connected, authenticated openEO session.
pub struct OpeneoClient {
    client: Client,
    base_url: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct JobStatus {
    status: String,
}

#[derive(Debug, Deserialize)]
struct JobResults {
    #[serde(default)]
    assets: HashMap<String, Asset>,
}

#[derive(Debug, Deserialize)]
struct Asset {
    href: String,
}

impl OpeneoClient {
    /// Connect and exchange basic credentials for a bearer token.
    pub async fn connect(base_url: &str, username: &str, password: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = base_url.trim_end_matches('/').to_string();
        let response = client
            .get(format!("{base_url}/credentials/basic"))
            .basic_auth(username, Some(password))
            .send()
            .await
            .context("Token request failed")?;

        if !response.status().is_success() {
            bail!("authentication rejected: HTTP {}", response.status());
        }
        let token: TokenResponse = response.json().await.context("Bad token response")?;

        info!(backend = %base_url, "Authenticated with openEO backend");
        Ok(Self {
            client,
            base_url,
            // openEO basic-auth tokens carry the basic// prefix
            token: format!("basic//{}", token.access_token),
        })
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// The load_collection → save_result(netCDF) graph for one band and
    /// one temporal/spatial extent.
    pub fn extraction_graph(
        collection: &str,
        band: &str,
        bbox: &BoundingBox,
        temporal_extent: (&str, &str),
    ) -> Value {
        json!({
            "load1": {
                "process_id": "load_collection",
                "arguments": {
                    "id": collection,
                    "temporal_extent": [temporal_extent.0, temporal_extent.1],
                    "spatial_extent": {
                        "west": bbox.min_lon,
                        "south": bbox.min_lat,
                        "east": bbox.max_lon,
                        "north": bbox.max_lat,
                    },
                    "bands": [band],
                },
            },
            "save1": {
                "process_id": "save_result",
                "arguments": {
                    "data": {"from_node": "load1"},
                    "format": "netCDF",
                },
                "result": true,
            },
        })
    }

    /// Create a batch job; returns the job id.
    pub async fn create_job(&self, title: &str, process_graph: Value) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/jobs", self.base_url))
            .header("Authorization", self.bearer())
            .json(&json!({
                "title": title,
                "process": {"process_graph": process_graph},
            }))
            .send()
            .await
            .context("Job creation request failed")?;

        if !response.status().is_success() {
            bail!("job creation rejected: HTTP {}", response.status());
        }

        // The id arrives in the OpenEO-Identifier header; some backends
        // also echo it in the body
        if let Some(id) = response
            .headers()
            .get("openeo-identifier")
            .and_then(|v| v.to_str().ok())
        {
            return Ok(id.to_string());
        }
        let body: Value = response.json().await.unwrap_or_default();
        body.get("id")
            .and_then(Value::as_str)
            .map(String::from)
            .ok_or_else(|| anyhow!("backend returned no job id"))
    }

    /// Queue the job for execution.
    pub async fn start_job(&self, job_id: &str) -> Result<()> {
        let response = self
            .client
            .post(format!("{}/jobs/{job_id}/results", self.base_url))
            .header("Authorization", self.bearer())
            .send()
            .await
            .context("Job start request failed")?;

        if !response.status().is_success() {
            bail!("job start rejected: HTTP {}", response.status());
        }
        Ok(())
    }

    /// Poll until the job finishes. Errors if the backend reports `error`
    /// or `canceled`.
    pub async fn wait_for_job(&self, job_id: &str, poll_interval: Duration) -> Result<()> {
        loop {
            let response = self
                .client
                .get(format!("{}/jobs/{job_id}", self.base_url))
                .header("Authorization", self.bearer())
                .send()
                .await
                .context("Job status request failed")?;

            if !response.status().is_success() {
                bail!("job status rejected: HTTP {}", response.status());
            }
            let status: JobStatus = response.json().await.context("Bad status response")?;

            match status.status.as_str() {
                "finished" => return Ok(()),
                "error" | "canceled" => bail!("job {job_id} ended as {}", status.status),
                other => {
                    debug!(job = job_id, status = other, "Waiting for job");
                }
            }

            tokio::time::sleep(poll_interval).await;
        }
    }

    /// Download every result asset into the output directory. Returns the
    /// number of files written.
    pub async fn download_results(&self, job_id: &str, output: &Path, stem: &str) -> Result<usize> {
        let response = self
            .client
            .get(format!("{}/jobs/{job_id}/results", self.base_url))
            .header("Authorization", self.bearer())
            .send()
            .await
            .context("Result listing request failed")?;

        if !response.status().is_success() {
            bail!("result listing rejected: HTTP {}", response.status());
        }
        let results: JobResults = response.json().await.context("Bad results response")?;

        if results.assets.is_empty() {
            warn!(job = job_id, "Job finished with no assets");
            return Ok(0);
        }

        let mut written = 0usize;
        for (name, asset) in &results.assets {
            let target = if results.assets.len() == 1 {
                output.join(format!("{stem}.nc"))
            } else {
                output.join(format!("{stem}_{name}"))
            };

            let bytes = self
                .client
                .get(&asset.href)
                .header("Authorization", self.bearer())
                .send()
                .await
                .with_context(|| format!("Asset download failed: {name}"))?
                .bytes()
                .await?;
            tokio::fs::write(&target, &bytes).await?;

            info!(job = job_id, asset = %name, path = %target.display(), "Downloaded result");
            written += 1;
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_graph_shape() {
        let bbox = BoundingBox::new(-53.371582, -25.363882, -43.813477, -19.580493);
        let graph = OpeneoClient::extraction_graph(
            "SENTINEL_5P_L2",
            "O3",
            &bbox,
            ("2023-01-01", "2023-02-01"),
        );

        assert_eq!(graph["load1"]["process_id"], "load_collection");
        assert_eq!(graph["load1"]["arguments"]["bands"][0], "O3");
        assert_eq!(graph["load1"]["arguments"]["spatial_extent"]["west"], -53.371582);
        assert_eq!(graph["save1"]["arguments"]["format"], "netCDF");
        assert_eq!(graph["save1"]["result"], true);
    }
}
