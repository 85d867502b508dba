//! Scraping [`MetadataSource`] adapter built on `reqwest` and `scraper`.
//!
//! Fetches the page once, then walks ordered selector candidates per field:
//! Open Graph first, Twitter card second, generic tags last. Parsing happens
//! in a plain function after the body has been read, because `scraper`'s DOM
//! is not `Send` and must not be held across an await point.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use crate::domain::ports::MetadataSource;
use crate::domain::bookmark::PageMetadata;

const FETCH_TIMEOUT: Duration = Duration::from_secs(5);
const USER_AGENT: &str = concat!("bookmark-backend/", env!("CARGO_PKG_VERSION"));

const TITLE_SELECTORS: &[&str] = &[
    r#"meta[property="og:title"]"#,
    r#"meta[name="twitter:title"]"#,
    "title",
];
const DESCRIPTION_SELECTORS: &[&str] = &[
    r#"meta[property="og:description"]"#,
    r#"meta[name="twitter:description"]"#,
    r#"meta[name="description"]"#,
];
const IMAGE_SELECTORS: &[&str] = &[
    r#"meta[property="og:image"]"#,
    r#"meta[name="twitter:image"]"#,
    r#"link[rel="image_src"]"#,
];
const VIDEO_SELECTORS: &[&str] = &[
    r#"meta[property="og:video"]"#,
    r#"meta[property="og:video:url"]"#,
    r#"meta[name="twitter:player"]"#,
];
const SITE_NAME_SELECTORS: &[&str] = &[
    r#"meta[property="og:site_name"]"#,
    r#"meta[name="application-name"]"#,
];
const PUBLISHED_SELECTORS: &[&str] = &[
    r#"meta[property="article:published_time"]"#,
    r#"meta[name="date"]"#,
    "time[datetime]",
];
const AUTHOR_SELECTORS: &[&str] = &[
    r#"meta[property="article:author"]"#,
    r#"meta[name="author"]"#,
];
const TYPE_SELECTORS: &[&str] = &[r#"meta[property="og:type"]"#];

/// Fetches page metadata over HTTP.
#[derive(Clone)]
pub struct HttpMetadataSource {
    client: reqwest::Client,
}

impl HttpMetadataSource {
    /// Build the source with its own bounded-timeout client.
    ///
    /// # Errors
    /// Returns the underlying builder error when the TLS backend cannot be
    /// initialised.
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }

    async fn try_fetch(&self, url: &str) -> Result<PageMetadata, reqwest::Error> {
        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(extract(url, &body))
    }
}

#[async_trait]
impl MetadataSource for HttpMetadataSource {
    async fn fetch(&self, url: &str) -> PageMetadata {
        match self.try_fetch(url).await {
            Ok(meta) => meta,
            Err(err) => {
                debug!(url, error = %err, "metadata fetch failed");
                PageMetadata::default()
            }
        }
    }
}

/// First non-empty value among the candidate selectors.
///
/// Attribute values are preferred over element text so `<meta>` and `<time>`
/// tags resolve before a fallback like `<title>`.
fn first_value(document: &Html, selectors: &[&str]) -> Option<String> {
    for raw in selectors {
        let Ok(selector) = Selector::parse(raw) else {
            continue;
        };
        for element in document.select(&selector) {
            let attr_value = ["content", "src", "href", "datetime"]
                .iter()
                .find_map(|attr| element.value().attr(attr));
            let value = match attr_value {
                Some(v) => v.trim().to_owned(),
                None => element.text().collect::<String>().trim().to_owned(),
            };
            if !value.is_empty() {
                return Some(value);
            }
        }
    }
    None
}

/// Lenient publication date parsing; anything unrecognised becomes `None`.
fn parse_published(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Resolve a possibly relative image URL against the page it was found on.
///
/// `Url::join` covers absolute values, scheme-relative `//host/path` values
/// and relative paths with or without a leading slash.
fn absolutise(page: Option<&Url>, value: &str) -> Option<String> {
    match page {
        Some(base) => base.join(value).ok().map(|joined| joined.to_string()),
        None => Url::parse(value).ok().map(|parsed| parsed.to_string()),
    }
}

/// Extract metadata from a fetched page body. Synchronous: the `scraper` DOM
/// stays on the stack and never crosses an await.
fn extract(page_url: &str, body: &str) -> PageMetadata {
    let document = Html::parse_document(body);
    let page = Url::parse(page_url).ok();

    let image = first_value(&document, IMAGE_SELECTORS)
        .and_then(|value| absolutise(page.as_ref(), &value));
    let video = first_value(&document, VIDEO_SELECTORS)
        .and_then(|value| absolutise(page.as_ref(), &value));
    let site_name = first_value(&document, SITE_NAME_SELECTORS).or_else(|| {
        page.as_ref()
            .and_then(|url| url.host_str())
            .map(str::to_owned)
    });
    let published_at =
        first_value(&document, PUBLISHED_SELECTORS).and_then(|value| parse_published(&value));

    PageMetadata {
        title: first_value(&document, TITLE_SELECTORS),
        description: first_value(&document, DESCRIPTION_SELECTORS),
        image,
        video,
        site_name,
        published_at,
        author: first_value(&document, AUTHOR_SELECTORS),
        content_type: first_value(&document, TYPE_SELECTORS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const PAGE: &str = "https://example.com/articles/rust";

    #[rstest]
    fn open_graph_wins_over_the_title_element() {
        let body = r#"<html><head>
            <meta property="og:title" content="OG Title">
            <title>Document Title</title>
        </head></html>"#;
        let meta = extract(PAGE, body);
        assert_eq!(meta.title.as_deref(), Some("OG Title"));
    }

    #[rstest]
    fn title_element_text_is_the_fallback() {
        let body = "<html><head><title>  Plain Title  </title></head></html>";
        let meta = extract(PAGE, body);
        assert_eq!(meta.title.as_deref(), Some("Plain Title"));
    }

    #[rstest]
    fn site_name_falls_back_to_the_host() {
        let meta = extract(PAGE, "<html></html>");
        assert_eq!(meta.site_name.as_deref(), Some("example.com"));
    }

    #[rstest]
    #[case("/img/cover.png", "https://example.com/img/cover.png")]
    #[case("cover.png", "https://example.com/articles/cover.png")]
    #[case("//cdn.example.com/c.png", "https://cdn.example.com/c.png")]
    #[case("https://other.example/c.png", "https://other.example/c.png")]
    fn images_are_absolutised_against_the_page(#[case] raw: &str, #[case] expected: &str) {
        let body = format!(r#"<html><head><meta property="og:image" content="{raw}"></head></html>"#);
        let meta = extract(PAGE, &body);
        assert_eq!(meta.image.as_deref(), Some(expected));
    }

    #[rstest]
    #[case("2024-05-01T12:30:00Z")]
    #[case("Wed, 01 May 2024 12:30:00 GMT")]
    fn published_at_accepts_common_formats(#[case] raw: &str) {
        assert!(parse_published(raw).is_some());
    }

    #[rstest]
    fn published_at_accepts_bare_dates_and_rejects_noise() {
        let parsed = parse_published("2024-05-01").map(|dt| dt.date_naive().to_string());
        assert_eq!(parsed.as_deref(), Some("2024-05-01"));
        assert_eq!(parse_published("next tuesday"), None);
    }

    #[rstest]
    fn time_element_datetime_attribute_is_read() {
        let body = r#"<html><body>
            <time datetime="2024-05-01T00:00:00Z">1 May 2024</time>
        </body></html>"#;
        let meta = extract(PAGE, body);
        assert!(meta.published_at.is_some());
    }

    #[rstest]
    fn malformed_html_yields_a_partial_record() {
        let meta = extract(PAGE, "<html><head><meta property=\"og:title\" content=\"T\"");
        // html5ever recovers what it can; nothing panics.
        assert!(meta.site_name.is_some());
    }
}
