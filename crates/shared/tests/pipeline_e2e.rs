use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use std::path::Path;
use std::sync::Mutex;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shared::layout::{SectionPlan, CATEGORY_PLANS, INSIGHT_PLAN, TOTAL_SLIDES};
use shared::slides::{NO_DATA_MARKER, UNAVAILABLE_MARKER};
use shared::{
    analyzer, collector, generator, io, pipeline, Category, Config, ConfigError, DocumentRenderer,
    FeedSource, GenerationOptions, NewsItem, Pacing, PdfRenderer, ReportSlide, TextModel,
};

// ==================== Fixtures ====================

fn test_config(temp: &TempDir) -> Config {
    let lookup = |key: &str| match key {
        "REPORT_START_DATE" => Some("2026-10-07".to_string()),
        "REPORT_END_DATE" => Some("2026-10-14".to_string()),
        _ => None,
    };
    let now = Utc.with_ymd_and_hms(2026, 10, 14, 12, 0, 0).unwrap();

    let mut config = Config::from_lookup(lookup, now).unwrap();
    config.run_date = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();
    config.data_dir = temp.path().join("data");
    config.output_dir = temp.path().join("output");
    config.feeds = Vec::new();
    config.arxiv.queries = Vec::new();
    config.pacing = Pacing::none();
    config
}

fn rss(items: &[(&str, &str, &str)]) -> String {
    let mut body = String::from(
        "<?xml version=\"1.0\"?>\n<rss version=\"2.0\"><channel><title>Test</title><link>https://news.example</link><description>d</description>\n",
    );
    for (title, link, date) in items {
        body.push_str(&format!(
            "<item><title>{}</title><link>{}</link><description>&lt;p&gt;About {}&lt;/p&gt;</description><pubDate>{}</pubDate></item>\n",
            title, link, title, date
        ));
    }
    body.push_str("</channel></rss>");
    body
}

fn atom(entries: &[(&str, &str)]) -> String {
    let mut body = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<feed xmlns=\"http://www.w3.org/2005/Atom\"><title>arXiv</title><id>urn:arxiv</id><updated>2026-10-13T00:00:00Z</updated>\n",
    );
    for (title, link) in entries {
        body.push_str(&format!(
            "<entry><id>{}</id><title>{}</title><link href=\"{}\"/><summary>Paper abstract</summary><published>2026-10-12T08:00:00Z</published><updated>2026-10-12T08:00:00Z</updated></entry>\n",
            link, title, link
        ));
    }
    body.push_str("</feed>");
    body
}

async fn mount_feed(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

fn write_items(config: &Config, items: &[NewsItem]) {
    io::save_json(items, &config.raw_news_path()).unwrap();
}

fn news(category: Category, url: &str) -> NewsItem {
    NewsItem {
        title: format!("{} story", category.as_str()),
        url: url.to_string(),
        summary: "Summary".to_string(),
        published: None,
        source: "Wire".to_string(),
        category,
    }
}

/// Answers each section prompt with a full set of well-formed slides.
struct StubModel {
    fenced: bool,
    prompts: Mutex<Vec<String>>,
}

impl StubModel {
    fn new() -> Self {
        Self {
            fenced: false,
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn fenced() -> Self {
        Self {
            fenced: true,
            ..Self::new()
        }
    }

    fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    fn section_for(prompt: &str) -> Option<&'static SectionPlan> {
        CATEGORY_PLANS
            .iter()
            .chain(std::iter::once(&INSIGHT_PLAN))
            .find(|plan| prompt.contains(&format!("slides {} to {}", plan.start, plan.end())))
    }
}

#[async_trait]
impl TextModel for StubModel {
    async fn generate(&self, _system: &str, prompt: &str, _options: &GenerationOptions) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        let plan = Self::section_for(prompt).ok_or_else(|| anyhow::anyhow!("unexpected prompt"))?;
        let slides: Vec<serde_json::Value> = plan
            .numbers()
            .map(|n| {
                serde_json::json!({
                    "slide_number": n,
                    "title": format!("{} slide {}", plan.label, n),
                    "lead": "A clear weekly conclusion",
                    "insights": ["First point", "Second point", "Third point"],
                    "visualization": {"kind": "bar-chart", "labels": ["A", "B"], "values": [1, 2]},
                    "sources": ["https://news.example/source"]
                })
            })
            .collect();

        let body = serde_json::to_string(&slides)?;
        if self.fenced {
            Ok(format!("```json\n{}\n```", body))
        } else {
            Ok(body)
        }
    }
}

/// Declines the policy section and answers every other section normally.
struct DecliningPolicyModel {
    inner: StubModel,
}

#[async_trait]
impl TextModel for DecliningPolicyModel {
    async fn generate(&self, system: &str, prompt: &str, options: &GenerationOptions) -> Result<String> {
        if prompt.contains("slides 3 to 8") {
            return Ok("Sorry, I cannot help".to_string());
        }
        self.inner.generate(system, prompt, options).await
    }
}

struct FailingModel;

#[async_trait]
impl TextModel for FailingModel {
    async fn generate(&self, _system: &str, _prompt: &str, _options: &GenerationOptions) -> Result<String> {
        anyhow::bail!("Gemini API error 503 Service Unavailable: overloaded")
    }
}

struct FailingRenderer;

impl DocumentRenderer for FailingRenderer {
    fn render(&self, _slides: &[ReportSlide], _path: &Path) -> Result<()> {
        anyhow::bail!("renderer exploded")
    }
}

fn section<'a>(slides: &'a [ReportSlide], plan: &SectionPlan) -> Vec<&'a ReportSlide> {
    slides
        .iter()
        .filter(|s| plan.contains(s.slide_number))
        .collect()
}

// ==================== Collector Tests ====================

#[tokio::test]
async fn test_collect_two_feeds_tags_categories() {
    let temp = TempDir::new().unwrap();
    let server = MockServer::start().await;
    mount_feed(
        &server,
        "/business.xml",
        rss(&[("Launch deal", "https://news.example/deal", "Mon, 12 Oct 2026 10:00:00 GMT")]),
    )
    .await;
    mount_feed(
        &server,
        "/policy.xml",
        rss(&[("New licensing rule", "https://news.example/rule", "Tue, 13 Oct 2026 09:00:00 GMT")]),
    )
    .await;

    let mut config = test_config(&temp);
    config.feeds = vec![
        FeedSource::url("Business Wire", Category::Business, format!("{}/business.xml", server.uri())),
        FeedSource::url("Policy Wire", Category::Policy, format!("{}/policy.xml", server.uri())),
    ];

    let items = collector::collect(&config).await.unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].category, Category::Business);
    assert_eq!(items[0].summary, "About Launch deal");
    assert_eq!(items[1].category, Category::Policy);

    let saved: Vec<NewsItem> = io::load_json(&config.raw_news_path()).unwrap();
    assert_eq!(saved, items);
}

#[tokio::test]
async fn test_collect_drops_items_outside_window() {
    let temp = TempDir::new().unwrap();
    let server = MockServer::start().await;
    mount_feed(
        &server,
        "/feed.xml",
        rss(&[
            ("Fresh", "https://news.example/fresh", "Mon, 12 Oct 2026 10:00:00 GMT"),
            ("Stale", "https://news.example/stale", "Sat, 10 Jan 2026 10:00:00 GMT"),
        ]),
    )
    .await;

    let mut config = test_config(&temp);
    config.feeds = vec![FeedSource::url("Wire", Category::Business, format!("{}/feed.xml", server.uri()))];

    let items = collector::collect(&config).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title, "Fresh");
}

#[tokio::test]
async fn test_collect_feed_wins_over_arxiv_duplicate() {
    let temp = TempDir::new().unwrap();
    let server = MockServer::start().await;
    let shared_url = "https://arxiv.example/abs/2610.00001";
    mount_feed(
        &server,
        "/feed.xml",
        rss(&[("Commercial space paper", shared_url, "Mon, 12 Oct 2026 10:00:00 GMT")]),
    )
    .await;
    mount_feed(
        &server,
        "/api/query",
        atom(&[
            ("Commercial space paper", shared_url),
            ("Exoplanet survey", "https://arxiv.example/abs/2610.00002"),
        ]),
    )
    .await;

    let mut config = test_config(&temp);
    config.feeds = vec![FeedSource::url("Wire", Category::Business, format!("{}/feed.xml", server.uri()))];
    config.arxiv.base_url = format!("{}/api/query", server.uri());
    config.arxiv.queries = vec!["cat:astro-ph.IM".to_string()];

    let items = collector::collect(&config).await.unwrap();

    assert_eq!(items.len(), 2);
    let kept: Vec<&NewsItem> = items.iter().filter(|i| i.url == shared_url).collect();
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].source, "Wire");
    assert_eq!(kept[0].category, Category::Business);
    assert_eq!(items[1].source, "arXiv");
    assert_eq!(items[1].category, Category::Research);
}

#[tokio::test]
async fn test_collect_survives_failing_feed() {
    let temp = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/broken.xml"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_feed(
        &server,
        "/ok.xml",
        rss(&[("Still here", "https://news.example/ok", "Mon, 12 Oct 2026 10:00:00 GMT")]),
    )
    .await;

    let mut config = test_config(&temp);
    config.feeds = vec![
        FeedSource::url("Broken", Category::Policy, format!("{}/broken.xml", server.uri())),
        FeedSource::url("Ok", Category::Policy, format!("{}/ok.xml", server.uri())),
    ];

    let items = collector::collect(&config).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].source, "Ok");
}

// ==================== Analyzer Tests ====================

#[tokio::test]
async fn test_analyze_builds_full_deck() {
    let temp = TempDir::new().unwrap();
    let config = test_config(&temp);
    write_items(
        &config,
        &[
            news(Category::Business, "https://news.example/b"),
            news(Category::Policy, "https://news.example/p"),
        ],
    );
    let model = StubModel::new();

    let slides = analyzer::analyze_with(&config, &model).await.unwrap();

    assert_eq!(slides.len(), TOTAL_SLIDES as usize);
    let numbers: Vec<u32> = slides.iter().map(|s| s.slide_number).collect();
    assert_eq!(numbers, (1..=TOTAL_SLIDES).collect::<Vec<_>>());

    let policy = shared::layout::plan_for(Category::Policy).unwrap();
    let business = shared::layout::plan_for(Category::Business).unwrap();
    for plan in [policy, business, &INSIGHT_PLAN] {
        let generated = section(&slides, plan);
        assert_eq!(generated.len(), plan.count as usize);
        assert!(generated.iter().all(|s| !s.placeholder));
    }

    // Policy, business and insight; research and funding had no items
    assert_eq!(model.calls(), 3);

    let saved: Vec<ReportSlide> = io::load_json(&config.report_path()).unwrap();
    assert_eq!(saved, slides);
}

#[tokio::test]
async fn test_analyze_empty_category_gets_no_data_placeholders() {
    let temp = TempDir::new().unwrap();
    let config = test_config(&temp);
    write_items(&config, &[news(Category::Policy, "https://news.example/p")]);
    let model = StubModel::new();

    let slides = analyzer::analyze_with(&config, &model).await.unwrap();

    let funding = section(&slides, shared::layout::plan_for(Category::Funding).unwrap());
    assert_eq!(funding.len(), 6);
    assert!(funding.iter().all(|s| s.placeholder));
    assert!(funding.iter().all(|s| s.lead == NO_DATA_MARKER));
    assert!(funding.iter().all(|s| s.sources.is_empty()));
    assert!(model
        .prompts
        .lock()
        .unwrap()
        .iter()
        .all(|p| !p.contains("slides 21 to 26")));
}

#[tokio::test]
async fn test_analyze_accepts_fenced_response() {
    let temp = TempDir::new().unwrap();
    let config = test_config(&temp);
    write_items(&config, &[news(Category::Research, "https://arxiv.example/1")]);

    let slides = analyzer::analyze_with(&config, &StubModel::fenced()).await.unwrap();

    let research = section(&slides, shared::layout::plan_for(Category::Research).unwrap());
    assert_eq!(research.len(), 6);
    assert!(research.iter().all(|s| !s.placeholder));
    assert_eq!(research[0].insights.len(), 3);
}

#[tokio::test]
async fn test_analyze_model_failure_degrades_to_placeholders() {
    let temp = TempDir::new().unwrap();
    let config = test_config(&temp);
    write_items(
        &config,
        &[
            news(Category::Policy, "https://news.example/p"),
            news(Category::Funding, "https://news.example/f"),
        ],
    );

    let slides = analyzer::analyze_with(&config, &FailingModel).await.unwrap();

    assert_eq!(slides.len(), TOTAL_SLIDES as usize);
    let policy = section(&slides, shared::layout::plan_for(Category::Policy).unwrap());
    assert!(policy.iter().all(|s| s.placeholder && s.lead == UNAVAILABLE_MARKER));
    let insight = section(&slides, &INSIGHT_PLAN);
    assert_eq!(insight.len(), 4);
    assert!(insight.iter().all(|s| s.placeholder));
    assert!(config.report_path().exists());
}

#[tokio::test]
async fn test_analyze_unparseable_section_does_not_stop_later_sections() {
    let temp = TempDir::new().unwrap();
    let config = test_config(&temp);
    write_items(
        &config,
        &[
            news(Category::Policy, "https://news.example/p"),
            news(Category::Business, "https://news.example/b"),
        ],
    );
    let model = DecliningPolicyModel {
        inner: StubModel::new(),
    };

    let slides = analyzer::analyze_with(&config, &model).await.unwrap();

    let policy = section(&slides, shared::layout::plan_for(Category::Policy).unwrap());
    assert_eq!(policy.len(), 6);
    assert!(policy.iter().all(|s| s.placeholder && s.lead == UNAVAILABLE_MARKER));

    let business = section(&slides, shared::layout::plan_for(Category::Business).unwrap());
    assert_eq!(business.len(), 6);
    assert!(business.iter().all(|s| !s.placeholder));
    assert!(business.iter().all(|s| s.sources == vec!["https://news.example/source"]));

    // Business was still requested after the policy response failed to decode
    assert!(model
        .inner
        .prompts
        .lock()
        .unwrap()
        .iter()
        .any(|p| p.contains("slides 15 to 20")));
}

#[tokio::test]
async fn test_analyze_without_key_fails_before_network() {
    let temp = TempDir::new().unwrap();
    let config = test_config(&temp);
    write_items(&config, &[news(Category::Policy, "https://news.example/p")]);

    let err = analyzer::analyze(&config).await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::MissingCredential { var: "GEMINI_API_KEY" })
    ));
    assert!(!config.report_path().exists());
}

#[tokio::test]
async fn test_analyze_without_input_names_missing_file() {
    let temp = TempDir::new().unwrap();
    let config = test_config(&temp);

    let err = analyzer::analyze_with(&config, &StubModel::new()).await.unwrap_err();

    match err.downcast_ref::<ConfigError>() {
        Some(ConfigError::MissingInput { path, .. }) => assert_eq!(path, &config.raw_news_path()),
        other => panic!("unexpected error: {:?}", other),
    }
}

// ==================== Generator Tests ====================

async fn analyzed(config: &Config) {
    write_items(config, &[news(Category::Business, "https://news.example/b")]);
    analyzer::analyze_with(config, &StubModel::new()).await.unwrap();
}

#[tokio::test]
async fn test_generate_falls_back_to_markdown() {
    let temp = TempDir::new().unwrap();
    let config = test_config(&temp);
    analyzed(&config).await;

    let artifact = generator::generate_with(&config, &FailingRenderer).await.unwrap();

    assert_eq!(artifact, config.artifact_path("md"));
    assert!(artifact.ends_with("space_report_20261014.md"));
    let markdown = std::fs::read_to_string(&artifact).unwrap();
    assert!(markdown.contains("# Space Business Weekly Report"));
    assert!(!config.artifact_path("pdf").exists());
}

#[tokio::test]
async fn test_generate_writes_pdf_with_builtin_font() {
    let temp = TempDir::new().unwrap();
    let config = test_config(&temp);
    analyzed(&config).await;

    let renderer = PdfRenderer::with_font_candidates(Vec::new());
    let artifact = generator::generate_with(&config, &renderer).await.unwrap();

    assert_eq!(artifact, config.artifact_path("pdf"));
    assert!(std::fs::read(&artifact).unwrap().starts_with(b"%PDF"));
    assert!(config.artifact_path("md").exists());
    let html = std::fs::read_to_string(config.artifact_path("html")).unwrap();
    assert_eq!(html.matches("<section class=\"slide").count(), TOTAL_SLIDES as usize);
}

#[tokio::test]
async fn test_generate_without_report_names_missing_file() {
    let temp = TempDir::new().unwrap();
    let config = test_config(&temp);

    let err = generator::generate_with(&config, &FailingRenderer).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::MissingInput { .. })
    ));
}

// ==================== Pipeline Tests ====================

#[tokio::test]
async fn test_pipeline_without_key_makes_no_requests() {
    let temp = TempDir::new().unwrap();
    let server = MockServer::start().await;
    mount_feed(
        &server,
        "/feed.xml",
        rss(&[("Launch deal", "https://news.example/deal", "Mon, 12 Oct 2026 10:00:00 GMT")]),
    )
    .await;

    let mut config = test_config(&temp);
    config.feeds = vec![FeedSource::url("Wire", Category::Business, format!("{}/feed.xml", server.uri()))];

    let err = pipeline::run(&config).await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::MissingCredential { var: "GEMINI_API_KEY" })
    ));
    assert!(server.received_requests().await.unwrap().is_empty());
    assert!(!config.raw_news_path().exists());
    assert!(!config.output_dir.exists());
}

#[tokio::test]
async fn test_pipeline_stops_after_failed_stage() {
    let temp = TempDir::new().unwrap();
    let mut config = test_config(&temp);
    config.gemini_api_key = Some("test-key".to_string());
    // A file where the data directory should be: the collector cannot save
    config.data_dir = temp.path().join("blocked");
    std::fs::write(&config.data_dir, b"not a directory").unwrap();

    let err = pipeline::run(&config).await.unwrap_err();

    assert!(format!("{:#}", err).contains("collector stage failed"));
    assert!(!config.output_dir.exists());
}
