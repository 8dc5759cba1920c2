use anyhow::Context as _;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use serde::Deserialize;
use url::Url;

use crate::fetch::fetch_html;

static PUBLICATION_INFO_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("[data-testid='publicationInfo'], #details .row")
        .expect("valid publication info selector")
});
static FIRST_PUBLISHED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"First published (.+)").expect("valid first published regex"));

const FIRST_PUBLISHED_FORMAT: &str = "%B %d, %Y";
const OUTPUT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Fields filled in by enrichment. Empty strings mean "looked up, nothing found".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Enrichment {
    pub image: String,
    pub publication_date: String,
}

#[derive(Debug, Deserialize)]
struct VolumesResponse {
    #[serde(default)]
    items: Option<Vec<Volume>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Volume {
    volume_info: VolumeInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VolumeInfo {
    #[serde(default)]
    image_links: Option<ImageLinks>,
}

#[derive(Debug, Deserialize)]
struct ImageLinks {
    #[serde(default)]
    thumbnail: Option<String>,
}

/// Looks up a cover image by title and a first-publication date from the book's detail page.
pub struct Enricher {
    client: reqwest::Client,
    volumes_endpoint: Url,
    detail_base_url: Url,
}

impl Enricher {
    pub fn new(client: reqwest::Client, volumes_endpoint: Url, detail_base_url: Url) -> Self {
        Self {
            client,
            volumes_endpoint,
            detail_base_url,
        }
    }

    /// Any transport, status or payload error from either lookup is returned; the caller
    /// drops the record. Missing data (no search hits, no publication info) is not an error.
    pub async fn enrich(&self, title: &str, detail_href: &str) -> anyhow::Result<Enrichment> {
        let image = self
            .lookup_thumbnail(title)
            .await
            .context("look up cover image")?;
        let publication_date = self
            .lookup_publication_date(detail_href)
            .await
            .context("look up publication date")?;

        Ok(Enrichment {
            image,
            publication_date,
        })
    }

    pub async fn lookup_thumbnail(&self, title: &str) -> anyhow::Result<String> {
        let endpoint = &self.volumes_endpoint;
        let query = format!("intitle:{title}");
        tracing::debug!(%endpoint, q = %query, "GET");

        let response = self
            .client
            .get(endpoint.clone())
            .query(&[("q", query.as_str())])
            .send()
            .await
            .with_context(|| format!("GET {endpoint}"))?;

        let status = response.status();
        let raw = response
            .text()
            .await
            .context("read volumes response body")?;
        if !status.is_success() {
            anyhow::bail!("volumes API error ({status}): {}", raw.trim());
        }

        let parsed: VolumesResponse =
            serde_json::from_str(&raw).context("parse volumes response")?;
        Ok(first_thumbnail(parsed).unwrap_or_default())
    }

    pub async fn lookup_publication_date(&self, detail_href: &str) -> anyhow::Result<String> {
        let url = self
            .detail_base_url
            .join(detail_href)
            .with_context(|| format!("resolve detail link: {detail_href}"))?;

        let html = fetch_html(&self.client, &url).await?;
        Ok(publication_date_from_html(&html).unwrap_or_default())
    }
}

fn first_thumbnail(response: VolumesResponse) -> Option<String> {
    response
        .items?
        .into_iter()
        .next()?
        .volume_info
        .image_links?
        .thumbnail
}

/// Finds the "First published <Month D, YYYY>" phrase on a detail page and returns it as
/// `yyyy-MM-dd`.
pub fn publication_date_from_html(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    document
        .select(&PUBLICATION_INFO_SELECTOR)
        .map(|node| {
            node.text()
                .flat_map(str::split_whitespace)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .find_map(|text| {
            let captures = FIRST_PUBLISHED_RE.captures(&text)?;
            normalize_first_published(captures.get(1)?.as_str())
        })
}

/// `"March 3, 2009"` becomes `"2009-03-03"`.
pub fn normalize_first_published(date: &str) -> Option<String> {
    let parsed = NaiveDate::parse_from_str(date.trim(), FIRST_PUBLISHED_FORMAT).ok()?;
    Some(parsed.format(OUTPUT_DATE_FORMAT).to_string())
}
