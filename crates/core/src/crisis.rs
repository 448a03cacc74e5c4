//! Crisis support resources.
//!
//! When the safety gate classifies input as needing help, the engine looks
//! up region-appropriate crisis hotlines. The lookup is best effort: any
//! failure falls back to the default entry and never fails the turn.
//!
//! Hotline data adapted from <https://github.com/sashabaranov/suicide-hotlines>
//! (Apache License 2.0).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// One region's crisis support record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CrisisResource {
    pub phone: Vec<String>,
    pub website: Option<String>,
    pub email: Option<String>,
    pub description: Option<String>,
}

fn resource(
    phone: &[&str],
    website: Option<&str>,
    email: Option<&str>,
    description: &str,
) -> CrisisResource {
    CrisisResource {
        phone: phone.iter().map(|p| p.to_string()).collect(),
        website: website.map(str::to_owned),
        email: email.map(str::to_owned),
        description: Some(description.to_string()),
    }
}

/// The fallback entry used whenever lookup is unavailable or the country
/// code is unrecognized.
pub fn default_resources() -> CrisisResource {
    resource(
        &["988", "1-800-273-8255"],
        Some("https://988lifeline.org/"),
        None,
        "International Crisis Support - 24/7 support available",
    )
}

/// Hard-coded table keyed by ISO country code.
pub fn resources_for(country_code: &str) -> CrisisResource {
    match country_code {
        "US" => resource(
            &["988", "1-800-273-8255"],
            Some("https://988lifeline.org/"),
            None,
            "988 Suicide & Crisis Lifeline - 24/7 free and confidential support",
        ),
        "GB" => resource(
            &["116 123"],
            Some("https://www.samaritans.org"),
            Some("jo@samaritans.org"),
            "Samaritans - 24/7 listening and support service",
        ),
        "CA" => resource(
            &["1-833-456-4566", "45645 (Text)"],
            Some("https://www.crisisservicescanada.ca/"),
            None,
            "Canada Suicide Prevention Service - 24/7 support in English and French",
        ),
        "AU" => resource(
            &["13 11 14"],
            Some("https://www.lifeline.org.au/"),
            None,
            "Lifeline Australia - 24/7 crisis support and suicide prevention",
        ),
        "NZ" => resource(
            &["1737", "0800 543 354"],
            Some("https://1737.org.nz"),
            None,
            "Need to talk? 1737 - Free call or text 24/7",
        ),
        "IN" => resource(
            &["91529 87821"],
            Some("https://www.aasra.info/"),
            None,
            "AASRA - 24/7 helpline for emotional support and crisis intervention",
        ),
        _ => default_resources(),
    }
}

/// Resolves the caller's region to a crisis-resource record.
///
/// `Some` means the lookup succeeded (possibly resolving to the default
/// entry for an unrecognized country); `None` means no address was available
/// or the lookup failed, and the caller should use [`default_resources`].
#[async_trait]
pub trait ResourceLocator: Send + Sync {
    async fn locate(&self, ip_address: Option<&str>) -> Option<CrisisResource>;
}

#[derive(Debug, Deserialize)]
struct GeoLookup {
    #[serde(rename = "countryCode")]
    country_code: Option<String>,
}

/// IP-based locator backed by ip-api.com.
pub struct IpApiLocator {
    http: reqwest::Client,
}

impl Default for IpApiLocator {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

impl IpApiLocator {
    pub fn new(timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
        }
    }

    async fn country_code(&self, ip_address: &str) -> Option<String> {
        let url = format!("http://ip-api.com/json/{ip_address}");
        let lookup: GeoLookup = self.http.get(&url).send().await.ok()?.json().await.ok()?;
        lookup.country_code
    }
}

#[async_trait]
impl ResourceLocator for IpApiLocator {
    async fn locate(&self, ip_address: Option<&str>) -> Option<CrisisResource> {
        let ip = ip_address?;
        match self.country_code(ip).await {
            Some(code) => {
                debug!(country_code = %code, "resolved caller region");
                Some(resources_for(&code))
            }
            None => {
                warn!("IP geolocation lookup failed; using default resources");
                None
            }
        }
    }
}

/// Locator that never performs network calls. Useful for tests and for
/// deployments that opt out of geolocation.
pub struct StaticLocator;

#[async_trait]
impl ResourceLocator for StaticLocator {
    async fn locate(&self, _ip_address: Option<&str>) -> Option<CrisisResource> {
        None
    }
}
