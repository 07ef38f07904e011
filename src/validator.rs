use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::DEFAULT_GROUP_HOST;
use crate::data_models::Outcome;
use crate::search::SearchProvider;

static FACEBOOK_GROUPS: Lazy<GroupPattern> = Lazy::new(|| {
    GroupPattern::new(DEFAULT_GROUP_HOST).expect("default group pattern compiles")
});

/// Matches `https://<host>/groups/<digits>` with an optional trailing slash
/// and nothing else: no extra segments, no query, no fragment.
#[derive(Debug, Clone)]
pub struct GroupPattern {
    regex: Regex,
}

impl GroupPattern {
    pub fn new(host: &str) -> Result<GroupPattern, regex::Error> {
        let pattern = format!(r"^https://{}/groups/([0-9]+)/?$", regex::escape(host));
        Ok(GroupPattern {
            regex: Regex::new(&pattern)?,
        })
    }

    pub fn facebook() -> &'static GroupPattern {
        &FACEBOOK_GROUPS
    }

    /// The group id in `url`, as written (leading zeros kept).
    pub fn extract<'a>(&self, url: &'a str) -> Option<&'a str> {
        self.regex
            .captures(url)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
    }
}

/// Split the raw `Expected Groups` cell into trimmed text tokens. Never
/// fails: a cell without commas, empty included, is a single token.
pub fn parse_expected_ids(raw: &str) -> Vec<String> {
    raw.split(',').map(|id| id.trim().to_string()).collect()
}

/// First url whose extracted group id is one of `expected`.
pub fn find_match<'a>(
    pattern: &GroupPattern,
    urls: &'a [String],
    expected: &[String],
) -> Option<(&'a str, &'a str)> {
    for url in urls {
        if let Some(found) = pattern.extract(url) {
            log::info!("  found potential group in search results: {url} (id: {found})");
            if expected.iter().any(|id| id == found) {
                return Some((found, url.as_str()));
            }
        }
    }
    None
}

pub struct Validator<P> {
    provider: P,
    pattern: GroupPattern,
    result_cap: usize,
}

impl<P: SearchProvider> Validator<P> {
    pub fn new(provider: P, pattern: GroupPattern, result_cap: usize) -> Validator<P> {
        Validator {
            provider,
            pattern,
            result_cap,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub async fn validate(&self, query: &str, expected_groups: &str) -> Outcome {
        log::info!("--- validating query: {query:?} ---");
        let expected = parse_expected_ids(expected_groups);
        log::info!("expected group ids: {expected:?}");

        let urls = match self.provider.search(query, self.result_cap).await {
            Ok(urls) => urls,
            Err(e) => {
                log::error!("error searching for {query:?}, error: {:#}", e);
                return Outcome::Error(e.to_string());
            }
        };

        match find_match(&self.pattern, &urls, &expected) {
            Some((group_id, url)) => {
                log::info!("  matched group id {group_id}");
                Outcome::Matched {
                    group_id: group_id.to_string(),
                    url: url.to_string(),
                }
            }
            None => {
                log::info!("  no matching group in the top {} results", urls.len());
                Outcome::NotMatched
            }
        }
    }
}

#[test]
fn test_parse_expected_ids() {
    assert_eq!(
        parse_expected_ids("2324243,425343141"),
        vec!["2324243", "425343141"]
    );
    assert_eq!(
        parse_expected_ids(" 2324243 ,  425343141 "),
        vec!["2324243", "425343141"]
    );
    assert_eq!(parse_expected_ids("007"), vec!["007"]);
    assert_eq!(parse_expected_ids(""), vec![""]);
    assert_eq!(parse_expected_ids("   "), vec![""]);
    assert_eq!(parse_expected_ids("n/a"), vec!["n/a"]);
    assert_eq!(parse_expected_ids("12,,34"), vec!["12", "", "34"]);
}

#[test]
fn test_group_pattern_is_anchored() {
    let pattern = GroupPattern::facebook();
    assert_eq!(
        pattern.extract("https://www.facebook.com/groups/2324243"),
        Some("2324243")
    );
    assert_eq!(
        pattern.extract("https://www.facebook.com/groups/2324243/"),
        Some("2324243")
    );
    assert_eq!(pattern.extract("https://www.facebook.com/groups/007/"), Some("007"));

    for url in [
        "https://www.facebook.com/groups/2324243//",
        "https://www.facebook.com/groups/2324243/posts/1",
        "https://www.facebook.com/groups/2324243?ref=share",
        "https://www.facebook.com/groups/2324243/#top",
        "https://www.facebook.com/groups/tradersclub",
        "https://www.facebook.com/groups/",
        "https://www.facebook.com/groups/١٢٣",
        "http://www.facebook.com/groups/2324243",
        "https://m.facebook.com/groups/2324243",
        "https://wwwxfacebook.com/groups/2324243",
        "https://example.com/?u=https://www.facebook.com/groups/2324243",
        " https://www.facebook.com/groups/2324243",
    ] {
        assert_eq!(pattern.extract(url), None, "{url}");
    }
}

#[test]
fn test_group_pattern_custom_host() {
    let pattern = GroupPattern::new("groups.example.org").unwrap();
    assert_eq!(
        pattern.extract("https://groups.example.org/groups/42/"),
        Some("42")
    );
    assert_eq!(pattern.extract("https://www.facebook.com/groups/42"), None);
}
