use anyhow::Context as _;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use url::Url;

const USER_AGENT_VALUE: &str = concat!("bookscrape/", env!("CARGO_PKG_VERSION"));
const HTML_ACCEPT: &str = "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8";

/// Client shared by every request of a run. No timeout is set; a hung request blocks the run.
pub fn build_client() -> anyhow::Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

    reqwest::Client::builder()
        .default_headers(headers)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .context("build http client")
}

/// GETs an HTML page and returns its body. Transport errors and non-2xx statuses are errors.
pub async fn fetch_html(client: &reqwest::Client, url: &Url) -> anyhow::Result<String> {
    tracing::debug!(%url, "GET");

    let response = client
        .get(url.clone())
        .header(ACCEPT, HTML_ACCEPT)
        .send()
        .await
        .with_context(|| format!("GET {url}"))?
        .error_for_status()
        .with_context(|| format!("GET {url}"))?;

    response
        .text()
        .await
        .with_context(|| format!("read body of {url}"))
}
