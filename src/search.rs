use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;

use reqwest::header::COOKIE;
use reqwest::{StatusCode, Url};
use scraper::{Html, Selector};
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::config::Config;
use crate::error::SearchError;

/// Skips the consent interstitial served to cookieless clients.
const CONSENT_COOKIE: &str = "CONSENT=PENDING+987; SOCS=CAESHAgBEhIaAB";
const RESULT_BLOCK_SELECTOR: &str = "div.ezO2md, div.g";
const LINK_SELECTOR: &str = "a[href]";

/// Something that turns a query into an ordered list of result urls.
pub trait SearchProvider {
    fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<String>, SearchError>> + Send;
}

/// Enforces a minimum gap between page fetches. Shared by every row in
/// flight, so it also acts as the global rate limiter.
pub struct Pacer {
    delay: Duration,
    last: Mutex<Option<Instant>>,
}

impl Pacer {
    pub fn new(delay: Duration) -> Pacer {
        Pacer {
            delay,
            last: Mutex::new(None),
        }
    }

    pub async fn wait(&self) {
        let mut last = self.last.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.delay {
                tokio::time::sleep(self.delay - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

pub struct GoogleSearch {
    client: reqwest::Client,
    search_url: Url,
    lang: String,
    pacer: Pacer,
    block_selector: Selector,
    link_selector: Selector,
}

impl GoogleSearch {
    pub fn new(config: &Config) -> Result<GoogleSearch, SearchError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout)
            .build()?;
        GoogleSearch::with_client(client, config)
    }

    /// Use a prebuilt client. User agent and timeout then come from the
    /// client, not from `config`.
    pub fn with_client(client: reqwest::Client, config: &Config) -> Result<GoogleSearch, SearchError> {
        let search_url =
            Url::parse(&config.search_url).map_err(|e| SearchError::Url(e.to_string()))?;

        Ok(GoogleSearch {
            client,
            search_url,
            lang: config.lang.clone(),
            pacer: Pacer::new(config.request_delay),
            block_selector: selector(RESULT_BLOCK_SELECTOR)?,
            link_selector: selector(LINK_SELECTOR)?,
        })
    }

    async fn fetch_page(&self, query: &str, num: usize, start: usize) -> Result<String, SearchError> {
        let num = num.to_string();
        let start = start.to_string();
        let res = self
            .client
            .get(self.search_url.clone())
            .query(&[
                ("q", query),
                ("num", num.as_str()),
                ("hl", self.lang.as_str()),
                ("start", start.as_str()),
                ("safe", "active"),
            ])
            .header(COOKIE, CONSENT_COOKIE)
            .send()
            .await?;

        match res.status() {
            StatusCode::TOO_MANY_REQUESTS => return Err(SearchError::RateLimited),
            status if !status.is_success() => return Err(SearchError::Status(status)),
            _ => {}
        }
        Ok(res.text().await?)
    }

    /// Pull the result links out of one page of results, in page order.
    /// The first link of each result block counts; redirect links are
    /// unwrapped to their target.
    pub fn parse_results(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        document
            .select(&self.block_selector)
            .filter_map(|block| block.select(&self.link_selector).next())
            .filter_map(|link| link.value().attr("href"))
            .filter_map(|href| unwrap_result_link(&self.search_url, href))
            .collect()
    }
}

impl SearchProvider for GoogleSearch {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<String>, SearchError> {
        let mut results = Vec::new();
        let mut seen = HashSet::new();
        let mut start = 0usize;

        while results.len() < limit {
            self.pacer.wait().await;
            let html = self.fetch_page(query, limit - results.len() + 2, start).await?;
            let links = self.parse_results(&html);
            log::debug!(
                "fetched results page for {query:?} at offset {start}: {} links",
                links.len()
            );
            if links.is_empty() {
                break;
            }
            start += links.len();

            let mut fresh = 0;
            for link in links {
                if results.len() >= limit {
                    break;
                }
                if seen.insert(link.clone()) {
                    results.push(link);
                    fresh += 1;
                }
            }
            if fresh == 0 {
                break;
            }
        }

        Ok(results)
    }
}

/// Resolve an anchor href from a results page into the url it points at.
/// `/url?q=<target>&...` redirects yield the decoded target; other
/// relative links are dropped.
pub fn unwrap_result_link(base: &Url, href: &str) -> Option<String> {
    let resolved = base.join(href).ok()?;
    if resolved.host_str() == base.host_str() && resolved.path() == "/url" {
        let target = resolved
            .query_pairs()
            .find(|(k, _)| k == "q" || k == "url")
            .map(|(_, v)| v.into_owned())?;
        return is_web_url(&target).then_some(target);
    }
    is_web_url(href).then(|| href.to_string())
}

fn is_web_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

fn selector(css: &str) -> Result<Selector, SearchError> {
    Selector::parse(css).map_err(|e| SearchError::Selector(format!("{css}: {e:?}")))
}

#[test]
fn test_unwrap_result_link() {
    let base = Url::parse("https://www.google.com/search").unwrap();

    assert_eq!(
        unwrap_result_link(
            &base,
            "/url?q=https://www.facebook.com/groups/2324243/&sa=U&ved=2ahUKE"
        ),
        Some("https://www.facebook.com/groups/2324243/".to_string())
    );
    assert_eq!(
        unwrap_result_link(&base, "/url?q=https%3A%2F%2Fexample.com%2Fa%3Fb%3D1&sa=U"),
        Some("https://example.com/a?b=1".to_string())
    );
    assert_eq!(
        unwrap_result_link(&base, "https://example.com/page"),
        Some("https://example.com/page".to_string())
    );
    assert_eq!(unwrap_result_link(&base, "/search?q=next&start=10"), None);
    assert_eq!(unwrap_result_link(&base, "/url?q=/relative&sa=U"), None);
}
