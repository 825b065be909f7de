// src/services/extractor.rs

//! Article extraction from issue pages.
//!
//! Issue pages are scanned line by line while they stream in. A trigger line
//! arms the scanner; the next line carries the article name and the line
//! after it the PDF link:
//!
//! ```text
//! Idle ──trigger──▶ AwaitingName ──name──▶ AwaitingPdf ──pdf──▶ Idle (+1 article)
//! ```
//!
//! A trigger seen in any state re-arms the scanner and drops a half-built
//! record. A line that fails to match is handled by [`MismatchPolicy`].

use regex::Regex;

use crate::error::{AppError, Result};
use crate::models::{Article, ExtractionConfig, MismatchPolicy};
use crate::utils::http::Fetch;
use crate::utils::lines::LineReader;
use crate::utils::url::is_pdf_url;

/// Result of applying a pattern to one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineMatch {
    Matched(String),
    NoMatch,
}

/// Where the scanner is within one article record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    AwaitingName,
    AwaitingPdf { name: String },
}

/// Articles pulled from one issue page.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub articles: Vec<Article>,
    /// Half-built records that were dropped
    pub skipped: usize,
}

/// Compiled extraction rules, shared by every issue scan.
pub struct ArticleExtractor {
    trigger: String,
    name_re: Regex,
    pdf_re: Regex,
    policy: MismatchPolicy,
}

impl ArticleExtractor {
    /// Compile the extraction patterns.
    pub fn new(config: &ExtractionConfig) -> Result<Self> {
        if config.trigger_marker.is_empty() {
            return Err(AppError::config("extraction.trigger_marker is empty"));
        }
        Ok(Self {
            trigger: config.trigger_marker.clone(),
            name_re: Regex::new(&config.name_pattern)?,
            pdf_re: Regex::new(&config.pdf_pattern)?,
            policy: config.on_mismatch,
        })
    }

    /// Fetch one issue page and extract its articles while it streams.
    pub async fn extract(&self, fetcher: &dyn Fetch, url: &str) -> Result<Extraction> {
        let stream = fetcher.fetch(url).await?;
        let mut lines = LineReader::new(stream);
        let mut scanner = self.scanner(url);

        while let Some(line) = lines.next_line().await? {
            scanner.feed(&line)?;
        }

        Ok(scanner.finish())
    }

    /// Start a fresh scan; `context` names the page in log and error messages.
    pub fn scanner<'a>(&'a self, context: &'a str) -> ArticleScanner<'a> {
        ArticleScanner {
            rules: self,
            context,
            state: ScanState::Idle,
            extraction: Extraction::default(),
        }
    }

    fn match_name(&self, line: &str) -> LineMatch {
        let name = self.name_re.captures(line).and_then(|caps| {
            caps.get(1)
                .or_else(|| caps.get(0))
                .map(|m| m.as_str().to_string())
        });
        match name {
            Some(name) if !name.is_empty() => LineMatch::Matched(name),
            _ => LineMatch::NoMatch,
        }
    }

    fn match_pdf(&self, line: &str) -> LineMatch {
        match self.pdf_re.find(line) {
            Some(m) if is_pdf_url(m.as_str()) => LineMatch::Matched(m.as_str().to_string()),
            _ => LineMatch::NoMatch,
        }
    }
}

/// Single-pass line scanner for one issue page.
pub struct ArticleScanner<'a> {
    rules: &'a ArticleExtractor,
    context: &'a str,
    state: ScanState,
    extraction: Extraction,
}

impl ArticleScanner<'_> {
    pub fn state(&self) -> &ScanState {
        &self.state
    }

    /// Advance the state machine by one line.
    ///
    /// Returns the article completed by this line, if any.
    pub fn feed(&mut self, line: &str) -> Result<Option<&Article>> {
        if line.contains(&self.rules.trigger) {
            if let ScanState::AwaitingPdf { name } = &self.state {
                log::debug!(
                    "{}: trigger before PDF link, dropping '{}'",
                    self.context,
                    name
                );
                self.extraction.skipped += 1;
            }
            self.state = ScanState::AwaitingName;
            return Ok(None);
        }

        match std::mem::replace(&mut self.state, ScanState::Idle) {
            ScanState::Idle => Ok(None),
            ScanState::AwaitingName => match self.rules.match_name(line) {
                LineMatch::Matched(name) => {
                    self.state = ScanState::AwaitingPdf { name };
                    Ok(None)
                }
                LineMatch::NoMatch => self.mismatch("article name", line).map(|_| None),
            },
            ScanState::AwaitingPdf { name } => match self.rules.match_pdf(line) {
                LineMatch::Matched(pdf) => {
                    self.extraction.articles.push(Article { name, pdf });
                    Ok(self.extraction.articles.last())
                }
                LineMatch::NoMatch => self
                    .mismatch(&format!("PDF link for '{name}'"), line)
                    .map(|_| None),
            },
        }
    }

    /// End the scan, dropping any record still waiting for its PDF link.
    pub fn finish(mut self) -> Extraction {
        if let ScanState::AwaitingPdf { name } = &self.state {
            log::debug!(
                "{}: page ended before PDF link, dropping '{}'",
                self.context,
                name
            );
            self.extraction.skipped += 1;
        }
        self.extraction
    }

    fn mismatch(&mut self, expected: &str, line: &str) -> Result<()> {
        match self.rules.policy {
            MismatchPolicy::Skip => {
                log::warn!(
                    "{}: expected {} on line {:?}, skipping record",
                    self.context,
                    expected,
                    line.trim()
                );
                self.extraction.skipped += 1;
                Ok(())
            }
            MismatchPolicy::Abort => Err(AppError::extract(
                self.context,
                format!("expected {} on line {:?}", expected, line.trim()),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use futures::{StreamExt, stream};

    use crate::utils::http::ByteStream;

    const TRIGGER: &str = r#"<h3 class="absTitle">"#;

    fn extractor(policy: MismatchPolicy) -> ArticleExtractor {
        ArticleExtractor::new(&ExtractionConfig {
            on_mismatch: policy,
            ..ExtractionConfig::default()
        })
        .unwrap()
    }

    fn scan(extractor: &ArticleExtractor, lines: &[&str]) -> Result<Extraction> {
        let mut scanner = extractor.scanner("test");
        for line in lines {
            scanner.feed(line)?;
        }
        Ok(scanner.finish())
    }

    /// Serves one page split into fixed-size chunks.
    struct ChunkedPage {
        body: String,
        chunk_size: usize,
    }

    #[async_trait]
    impl Fetch for ChunkedPage {
        async fn fetch(&self, _url: &str) -> Result<ByteStream> {
            let chunks: Vec<Result<Vec<u8>>> = self
                .body
                .as_bytes()
                .chunks(self.chunk_size)
                .map(|c| Ok(c.to_vec()))
                .collect();
            Ok(stream::iter(chunks).boxed())
        }
    }

    #[test]
    fn test_single_record() {
        let result = scan(
            &extractor(MismatchPolicy::Skip),
            &[TRIGGER, ">Article Title<", "https://host/path/file.pdf"],
        )
        .unwrap();

        assert_eq!(
            result.articles,
            vec![Article::new("Article Title", "https://host/path/file.pdf")]
        );
        assert_eq!(result.skipped, 0);
    }

    #[test]
    fn test_two_records_in_order() {
        let result = scan(
            &extractor(MismatchPolicy::Skip),
            &[
                TRIGGER,
                ">First<",
                "https://host/a.pdf",
                TRIGGER,
                ">Second<",
                "https://host/b.pdf",
            ],
        )
        .unwrap();

        let names: Vec<_> = result.articles.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Second"]);
    }

    #[test]
    fn test_realistic_markup() {
        let result = scan(
            &extractor(MismatchPolicy::Skip),
            &[
                r#"<div class="abstract">"#,
                r#"  <h3 class="absTitle">"#,
                r#"    <a href="https://www.complex-systems.com/abstracts/v32_i01_a01/">Cultivating the Garden of Eden</a>"#,
                r#"    <a class="pdf" href="https://content.wolfram.com/sites/13/2023/06/32-1-1.pdf">PDF</a>"#,
                r#"  <p>Abstract text</p>"#,
            ],
        )
        .unwrap();

        assert_eq!(
            result.articles,
            vec![Article::new(
                "Cultivating the Garden of Eden",
                "https://content.wolfram.com/sites/13/2023/06/32-1-1.pdf"
            )]
        );
    }

    #[test]
    fn test_name_spans_first_gt_to_last_lt() {
        let result = scan(
            &extractor(MismatchPolicy::Skip),
            &[TRIGGER, "<a><em>A</em> B</a>", "https://host/a.pdf"],
        )
        .unwrap();

        assert_eq!(result.articles[0].name, "<em>A</em> B");
    }

    #[test]
    fn test_lines_before_trigger_are_ignored() {
        let result = scan(
            &extractor(MismatchPolicy::Abort),
            &[">Not an article<", "https://host/a.pdf", "<p>text</p>"],
        )
        .unwrap();

        assert!(result.articles.is_empty());
    }

    #[test]
    fn test_missing_pdf_skips_record_and_continues() {
        let extractor = extractor(MismatchPolicy::Skip);
        let result = scan(
            &extractor,
            &[
                TRIGGER,
                ">Broken<",
                "<p>no link here</p>",
                TRIGGER,
                ">Good<",
                "https://host/good.pdf",
            ],
        )
        .unwrap();

        assert_eq!(result.articles, vec![Article::new("Good", "https://host/good.pdf")]);
        assert_eq!(result.skipped, 1);
    }

    #[test]
    fn test_mismatch_aborts_issue() {
        let result = scan(
            &extractor(MismatchPolicy::Abort),
            &[TRIGGER, "no markup at all", "https://host/a.pdf"],
        );

        assert!(matches!(result, Err(AppError::Extract { .. })));
    }

    #[test]
    fn test_trigger_while_armed_rearms() {
        let extractor = extractor(MismatchPolicy::Abort);
        let mut scanner = extractor.scanner("test");

        scanner.feed(TRIGGER).unwrap();
        scanner.feed(">Orphan<").unwrap();
        assert!(matches!(scanner.state(), ScanState::AwaitingPdf { .. }));

        scanner.feed(TRIGGER).unwrap();
        assert_eq!(scanner.state(), &ScanState::AwaitingName);

        scanner.feed(">Kept<").unwrap();
        let article = scanner.feed("https://host/kept.pdf").unwrap().cloned();
        assert_eq!(article, Some(Article::new("Kept", "https://host/kept.pdf")));

        let result = scanner.finish();
        assert_eq!(result.articles.len(), 1);
        assert_eq!(result.skipped, 1);
    }

    #[test]
    fn test_half_record_at_end_is_dropped() {
        let result = scan(&extractor(MismatchPolicy::Skip), &[TRIGGER, ">Orphan<"]).unwrap();

        assert!(result.articles.is_empty());
        assert_eq!(result.skipped, 1);
    }

    #[test]
    fn test_first_of_two_links_on_one_line() {
        let result = scan(
            &extractor(MismatchPolicy::Skip),
            &[
                TRIGGER,
                ">Title<",
                r#"<a href="https://a.com/x.pdf">PDF</a> <a href="https://b.com/y.pdf">Mirror</a>"#,
            ],
        )
        .unwrap();

        assert_eq!(result.articles, vec![Article::new("Title", "https://a.com/x.pdf")]);
    }

    #[test]
    fn test_greedy_pattern_span_is_rejected() {
        let extractor = ArticleExtractor::new(&ExtractionConfig {
            pdf_pattern: r"https://.*\.pdf".to_string(),
            ..ExtractionConfig::default()
        })
        .unwrap();
        let result = scan(
            &extractor,
            &[
                TRIGGER,
                ">Title<",
                r#"<a href="https://a.com/x.pdf">PDF</a> <a href="https://b.com/y.pdf">Mirror</a>"#,
            ],
        )
        .unwrap();

        assert!(result.articles.is_empty());
        assert_eq!(result.skipped, 1);
    }

    #[test]
    fn test_relative_pdf_link_is_no_match() {
        let result = scan(
            &extractor(MismatchPolicy::Skip),
            &[TRIGGER, ">Title<", r#"<a href="/files/a.pdf">"#],
        )
        .unwrap();

        assert!(result.articles.is_empty());
        assert_eq!(result.skipped, 1);
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let config = ExtractionConfig {
            name_pattern: "(".to_string(),
            ..ExtractionConfig::default()
        };
        assert!(ArticleExtractor::new(&config).is_err());
    }

    #[tokio::test]
    async fn test_extract_is_independent_of_chunking() {
        let body = format!(
            "<html>\r\n{TRIGGER}\r\n>Spatial Scale Effects<\r\nhttps://host/32-1-4.pdf\r\n\
             {TRIGGER}\r\n>Use of Recurrence Plots<\r\nhttps://host/32-1-5.pdf"
        );
        let extractor = extractor(MismatchPolicy::Abort);

        let whole = extractor
            .extract(
                &ChunkedPage {
                    body: body.clone(),
                    chunk_size: body.len(),
                },
                "https://host/issues/32-1/",
            )
            .await
            .unwrap();

        for chunk_size in [1, 2, 7, 64] {
            let page = ChunkedPage {
                body: body.clone(),
                chunk_size,
            };
            let chunked = extractor.extract(&page, "https://host/issues/32-1/").await.unwrap();
            assert_eq!(chunked, whole);
        }

        assert_eq!(whole.articles.len(), 2);
        assert_eq!(whole.articles[1].pdf, "https://host/32-1-5.pdf");
    }
}
