//! HTTP client for the RIPEstat data API.
//!
//! Two queries are supported: announced prefixes for an autonomous system,
//! and the resource list associated with an ISO-3166 alpha-2 country code.
//! Queries are issued sequentially and the first failure aborts the whole
//! run - there is no retry and no partial result. IPv6 prefixes are returned
//! and counted but never aggregated; only the IPv4 list feeds the engine.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::info;

use crate::error::NetfoldError;

const RIPESTAT_BASE: &str = "https://stat.ripe.net/data";
const TIMEOUT_SECS: u64 = 30;

/// Raw CIDR strings returned by one query, split by address family.
#[derive(Debug, Default)]
pub struct PrefixBatch {
    pub ipv4: Vec<String>,
    pub ipv6: Vec<String>,
}

/// Every RIPEstat endpoint wraps its payload in the same envelope.
#[derive(Deserialize)]
struct RipeResponse<T> {
    status: String,
    data: T,
}

#[derive(Deserialize)]
struct AnnouncedPrefixesData {
    prefixes: Vec<AnnouncedPrefix>,
}

#[derive(Deserialize)]
struct AnnouncedPrefix {
    prefix: String,
}

#[derive(Deserialize)]
struct CountryResourceData {
    resources: CountryResources,
}

#[derive(Deserialize)]
struct CountryResources {
    ipv4: Vec<String>,
    ipv6: Vec<String>,
}

/// HTTP client for prefix queries.
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .user_agent(format!("netfold/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client })
    }

    /// Fetch all prefixes announced by one AS.
    pub async fn fetch_as_prefixes(&self, asn: u32) -> Result<PrefixBatch> {
        let url = format!(
            "{}/announced-prefixes/data.json?resource=AS{}",
            RIPESTAT_BASE, asn
        );
        let body = self
            .fetch(&url)
            .await
            .with_context(|| format!("Failed to query prefixes for AS{}", asn))?;
        let batch = parse_announced_response(&body)
            .with_context(|| format!("Failed to parse response for AS{}", asn))?;
        info!(
            "AS{} announces {} IPv4 prefixes and {} IPv6 prefixes",
            asn,
            batch.ipv4.len(),
            batch.ipv6.len()
        );
        Ok(batch)
    }

    /// Fetch all prefixes associated with a country code.
    pub async fn fetch_country_prefixes(&self, cc: &str) -> Result<PrefixBatch> {
        if cc.len() != 2 {
            return Err(NetfoldError::InvalidCountryCode(cc.to_string()).into());
        }
        let url = format!(
            "{}/country-resource-list/data.json?resource={}&v4_format=prefix",
            RIPESTAT_BASE, cc
        );
        let body = self
            .fetch(&url)
            .await
            .with_context(|| format!("Failed to query prefixes for country '{}'", cc))?;
        let batch = parse_country_response(&body)
            .with_context(|| format!("Failed to parse response for country '{}'", cc))?;
        info!(
            "Country '{}' is associated with {} IPv4 prefixes and {} IPv6 prefixes",
            cc,
            batch.ipv4.len(),
            batch.ipv6.len()
        );
        Ok(batch)
    }

    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            anyhow::bail!("HTTP {}", response.status());
        }
        Ok(response.text().await.context("Failed to read response body")?)
    }
}

/// Decode an announced-prefixes response, splitting families on ':'.
fn parse_announced_response(body: &str) -> Result<PrefixBatch> {
    let response: RipeResponse<AnnouncedPrefixesData> =
        serde_json::from_str(body).context("JSON parsing failed")?;
    if response.status != "ok" {
        anyhow::bail!("Query returned status '{}'", response.status);
    }
    let mut batch = PrefixBatch::default();
    for entry in response.data.prefixes {
        if entry.prefix.contains(':') {
            batch.ipv6.push(entry.prefix);
        } else {
            batch.ipv4.push(entry.prefix);
        }
    }
    Ok(batch)
}

/// Decode a country-resource-list response.
fn parse_country_response(body: &str) -> Result<PrefixBatch> {
    let response: RipeResponse<CountryResourceData> =
        serde_json::from_str(body).context("JSON parsing failed")?;
    if response.status != "ok" {
        anyhow::bail!("Query returned status '{}'", response.status);
    }
    Ok(PrefixBatch {
        ipv4: response.data.resources.ipv4,
        ipv6: response.data.resources.ipv6,
    })
}
