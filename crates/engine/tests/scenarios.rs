//! Click-to-completion cycles against an in-memory page, on virtual time.

use dlwatch_core::{
    query::query_parameter, CookieStore, Document, ErrorCategory, Host, Indicator, ListenOptions,
    SharedParams, Target,
};
use dlwatch_engine::{listen, Click, CompletionReason};
use dlwatch_headless::{MemoryIndicator, RecordingNavigator, StaticDocument};
use dlwatch_storage::{DisabledCookieJar, MemoryCookieJar};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};

const PAGE: &str = r#"
    <html><body>
      <a id="exportBtn" href="https://example.com/export?id=7">Export</a>
      <a class="report" href="https://example.com/report.xlsx">Report</a>
      <a class="report" href="https://example.com/report.pdf?v=1">Report PDF</a>
      <a class="broken">Nowhere</a>
    </body></html>
"#;

struct Page {
    document: Arc<StaticDocument>,
    indicator: Arc<MemoryIndicator>,
    navigator: Arc<RecordingNavigator>,
}

impl Page {
    fn new() -> Self {
        Self {
            document: Arc::new(StaticDocument::parse(PAGE)),
            indicator: Arc::new(MemoryIndicator::new()),
            navigator: Arc::new(RecordingNavigator::new()),
        }
    }

    fn host(&self, cookies: Arc<dyn CookieStore>) -> Host {
        Host::new(
            self.document.clone(),
            cookies,
            self.indicator.clone(),
            self.navigator.clone(),
        )
    }

    async fn href(&self, target: Target, position: usize) -> String {
        let elements = self.document.resolve(&target).await.unwrap();
        self.document.href(&elements[position]).await.unwrap().unwrap()
    }

    async fn shown(&self) -> bool {
        self.indicator.is_shown().await.unwrap()
    }
}

fn counting_callback(calls: &Arc<AtomicUsize>) -> impl Fn(&dlwatch_core::BindingContext) -> anyhow::Result<()> + Send + Sync + 'static {
    let calls = Arc::clone(calls);
    move |_: &dlwatch_core::BindingContext| {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn gives_up_after_attempts_without_cookie_support() {
    let page = Page::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let options = ListenOptions::new().attempts(3).callback(counting_callback(&calls));
    let listener = listen(page.host(Arc::new(DisabledCookieJar)), "exportBtn", options).await;

    let started = Instant::now();
    let cycle = listener.click(0).await.unwrap().cycle().unwrap();
    assert!(page.shown().await);

    let outcome = cycle.finished().await.unwrap();
    assert_eq!(outcome.reason, CompletionReason::GaveUp);
    assert_eq!(outcome.ticks, 4);
    assert_eq!(started.elapsed(), Duration::from_secs(4));
    assert!(!page.shown().await);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn empty_cookie_falls_back_to_attempts() {
    let page = Page::new();
    let jar = Arc::new(MemoryCookieJar::new());
    let listener = listen(page.host(jar.clone()), "exportBtn", ListenOptions::new().attempts(2)).await;

    let started = Instant::now();
    let cycle = listener.click(0).await.unwrap().cycle().unwrap();
    jar.set("downloadToken", "").await.unwrap();

    let outcome = cycle.finished().await.unwrap();
    assert_eq!(outcome.reason, CompletionReason::GaveUp);
    assert_eq!(outcome.ticks, 3);
    assert_eq!(started.elapsed(), Duration::from_secs(3));
    assert!(!page.shown().await);
}

#[tokio::test(start_paused = true)]
async fn completes_on_the_tick_that_sees_the_token() {
    let page = Page::new();
    let jar = Arc::new(MemoryCookieJar::new());
    let calls = Arc::new(AtomicUsize::new(0));
    let options = ListenOptions::new().callback(counting_callback(&calls));
    let listener = listen(page.host(jar.clone()), "exportBtn", options).await;
    assert_eq!(jar.get("downloadToken").await.unwrap().as_deref(), Some("0"));

    let cycle = listener.click(0).await.unwrap().cycle().unwrap();
    let token = cycle.token().clone();

    // The server answers between the first and second tick.
    sleep(Duration::from_millis(1500)).await;
    assert!(!cycle.is_finished());
    jar.set("downloadToken", token.as_str()).await.unwrap();

    let outcome = cycle.finished().await.unwrap();
    assert_eq!(outcome.reason, CompletionReason::Matched);
    assert_eq!(outcome.ticks, 2);
    assert_eq!(outcome.token, token);
    assert!(!page.shown().await);
    assert_eq!(jar.get("downloadToken").await.unwrap(), None);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn selector_binding_rewrites_every_element() {
    let page = Page::new();
    let jar = Arc::new(MemoryCookieJar::new());
    let options = ListenOptions::new().param(SharedParams::new([("lang", "en")]));
    let listener = listen(page.host(jar), Target::selector("a.report"), options).await;
    assert_eq!(listener.elements().len(), 2);

    let cycle = listener.click(0).await.unwrap().cycle().unwrap();
    let token = cycle.token().as_str().to_string();

    for position in 0..2 {
        let href = page.href(Target::selector("a.report"), position).await;
        assert_eq!(query_parameter(&href, "lang").as_deref(), Some("en"));
        assert_eq!(query_parameter(&href, "downloadTokenName").as_deref(), Some("downloadToken"));
        assert_eq!(query_parameter(&href, "downloadTokenValue").as_deref(), Some(token.as_str()));
    }

    let pdf = page.href(Target::selector("a.report"), 1).await;
    assert!(pdf.starts_with("https://example.com/report.pdf?v=1&lang=en&"));

    // Only the clicked element is followed.
    let visited = page.navigator.visited().await;
    assert_eq!(visited, vec![page.href(Target::selector("a.report"), 0).await]);
}

#[tokio::test(start_paused = true)]
async fn disabled_binding_suppresses_every_click() {
    let page = Page::new();
    let jar = Arc::new(MemoryCookieJar::new());
    let evaluations = Arc::new(AtomicUsize::new(0));
    let calls = Arc::new(AtomicUsize::new(0));

    let seen = Arc::clone(&evaluations);
    let options = ListenOptions::new()
        .is_disabled(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
            true
        })
        .callback(counting_callback(&calls));
    let listener = listen(page.host(jar), Target::selector("a.report"), options).await;
    assert!(listener.is_disabled());

    for position in [0, 1, 0] {
        assert!(matches!(listener.click(position).await.unwrap(), Click::Suppressed));
        assert!(!page.shown().await);
    }

    sleep(Duration::from_secs(60)).await;
    assert_eq!(evaluations.load(Ordering::SeqCst), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(page.navigator.visited().await.is_empty());
    assert_eq!(page.href(Target::selector("a.report"), 0).await, "https://example.com/report.xlsx");
}

#[tokio::test(start_paused = true)]
async fn param_changes_apply_on_the_next_click() {
    let page = Page::new();
    let params = SharedParams::new([("lang", "en")]);
    let options = ListenOptions::new().attempts(1).param(params.clone());
    let listener = listen(page.host(Arc::new(DisabledCookieJar)), "exportBtn", options).await;

    listener.click(0).await.unwrap().cycle().unwrap().finished().await.unwrap();
    let first = page.href(Target::id("exportBtn"), 0).await;
    assert_eq!(query_parameter(&first, "lang").as_deref(), Some("en"));

    params.set("lang", "de").await;
    params.set("fmt", "csv").await;
    std::thread::sleep(Duration::from_millis(2));

    listener.click(0).await.unwrap().cycle().unwrap().finished().await.unwrap();
    let second = page.href(Target::id("exportBtn"), 0).await;
    assert_eq!(query_parameter(&second, "lang").as_deref(), Some("de"));
    assert_eq!(query_parameter(&second, "fmt").as_deref(), Some("csv"));
    assert_eq!(second.matches("lang=").count(), 1);
    assert_eq!(second.matches("downloadTokenValue=").count(), 1);
    assert_ne!(
        query_parameter(&first, "downloadTokenValue"),
        query_parameter(&second, "downloadTokenValue")
    );
}

#[tokio::test(start_paused = true)]
async fn stale_cookie_cannot_finish_a_new_cycle() {
    let page = Page::new();
    let jar = Arc::new(MemoryCookieJar::new());
    let listener = listen(page.host(jar.clone()), "exportBtn", ListenOptions::new()).await;

    let first = listener.click(0).await.unwrap().cycle().unwrap();
    let stale = first.token().clone();
    jar.set("downloadToken", stale.as_str()).await.unwrap();
    first.finished().await.unwrap();
    assert_eq!(jar.get("downloadToken").await.unwrap(), None);

    std::thread::sleep(Duration::from_millis(2));
    let second = listener.click(0).await.unwrap().cycle().unwrap();
    assert_ne!(second.token(), &stale);
    assert_eq!(jar.get("downloadToken").await.unwrap().as_deref(), Some("0"));

    jar.set("downloadToken", stale.as_str()).await.unwrap();
    sleep(Duration::from_millis(5500)).await;
    assert!(!second.is_finished());
    assert!(page.shown().await);

    let fresh = second.token().clone();
    jar.set("downloadToken", fresh.as_str()).await.unwrap();
    let outcome = second.finished().await.unwrap();
    assert_eq!(outcome.reason, CompletionReason::Matched);
    assert_eq!(outcome.ticks, 6);
}

#[tokio::test(start_paused = true)]
async fn failing_callback_still_tears_down() {
    let page = Page::new();
    let jar = Arc::new(MemoryCookieJar::new());
    let options = ListenOptions::new().callback(|_| anyhow::bail!("report service offline"));
    let listener = listen(page.host(jar.clone()), "exportBtn", options).await;

    let cycle = listener.click(0).await.unwrap().cycle().unwrap();
    jar.set("downloadToken", cycle.token().as_str()).await.unwrap();
    let outcome = cycle.finished().await.unwrap();

    assert_eq!(outcome.reason, CompletionReason::Matched);
    assert!(!page.shown().await);
    assert_eq!(jar.get("downloadToken").await.unwrap(), None);
}

#[tokio::test(start_paused = true)]
async fn panicking_callback_still_tears_down() {
    let page = Page::new();
    let options = ListenOptions::new().attempts(1).callback(|_| panic!("boom"));
    let listener = listen(page.host(Arc::new(DisabledCookieJar)), "exportBtn", options).await;

    let outcome = listener.click(0).await.unwrap().cycle().unwrap().finished().await.unwrap();
    assert_eq!(outcome.reason, CompletionReason::GaveUp);
    assert!(!page.shown().await);
}

#[tokio::test(start_paused = true)]
async fn overlapping_clicks_share_one_indicator() {
    let page = Page::new();
    let listener = listen(page.host(Arc::new(DisabledCookieJar)), Target::selector("a.report"), ListenOptions::new().attempts(2)).await;

    let first = listener.click(0).await.unwrap().cycle().unwrap();
    let second = listener.click(1).await.unwrap().cycle().unwrap();
    assert_eq!(page.indicator.insertions(), 1);

    first.finished().await.unwrap();
    second.finished().await.unwrap();
    assert!(!page.shown().await);
}

#[tokio::test(start_paused = true)]
async fn click_follows_the_current_url() {
    let page = Page::new();
    let listener = listen(page.host(Arc::new(DisabledCookieJar)), "exportBtn", ListenOptions::new()).await;

    let element = &listener.elements()[0];
    page.document.set_href(element, "https://example.com/export?id=8").await.unwrap();

    let cycle = listener.click(0).await.unwrap().cycle().unwrap();
    let visited = page.navigator.visited().await;
    assert_eq!(
        visited,
        vec![format!(
            "https://example.com/export?id=8&downloadTokenName=downloadToken&downloadTokenValue={}",
            cycle.token()
        )]
    );
}

#[tokio::test(start_paused = true)]
async fn elements_without_url_are_skipped() {
    let page = Page::new();
    let listener = listen(page.host(Arc::new(DisabledCookieJar)), Target::selector("a"), ListenOptions::new().attempts(1)).await;
    assert_eq!(listener.elements().len(), 4);

    // The fourth anchor has no href; clicking it still runs a cycle.
    let outcome = listener.click(3).await.unwrap().cycle().unwrap().finished().await.unwrap();
    assert_eq!(outcome.reason, CompletionReason::GaveUp);
    assert!(page.navigator.visited().await.is_empty());
    assert!(page.href(Target::selector("a"), 1).await.contains("downloadTokenValue="));
}

#[tokio::test(start_paused = true)]
async fn unmatched_target_binds_nothing() {
    let page = Page::new();
    let jar = Arc::new(MemoryCookieJar::new());
    let listener = listen(page.host(jar.clone()), Target::selector("button.export"), ListenOptions::new()).await;

    assert!(listener.elements().is_empty());
    assert_eq!(jar.get("downloadToken").await.unwrap(), None);
    let err = listener.click(0).await.unwrap_err();
    assert_eq!(err.category, ErrorCategory::TargetNotFound);
}

#[tokio::test(start_paused = true)]
async fn custom_token_name_drives_the_handshake() {
    let page = Page::new();
    let jar = Arc::new(MemoryCookieJar::new());
    let options = ListenOptions::new().token_name("reportToken").message("Building report...");
    let listener = listen(page.host(jar.clone()), "exportBtn", options).await;
    assert_eq!(jar.get("reportToken").await.unwrap().as_deref(), Some("0"));
    assert_eq!(listener.config().token_name, "reportToken");
    assert_eq!(listener.config().message, "Building report...");
    assert_eq!(listener.context().target, Target::id("exportBtn"));
    assert_eq!(listener.context().token_name, "reportToken");

    let cycle = listener.click(0).await.unwrap().cycle().unwrap();
    assert_eq!(page.indicator.node().await.unwrap().message, "Building report...");
    let href = page.href(Target::id("exportBtn"), 0).await;
    assert_eq!(query_parameter(&href, "downloadTokenName").as_deref(), Some("reportToken"));

    jar.set("downloadToken", cycle.token().as_str()).await.unwrap();
    sleep(Duration::from_millis(2500)).await;
    assert!(!cycle.is_finished());

    jar.set("reportToken", cycle.token().as_str()).await.unwrap();
    assert_eq!(cycle.finished().await.unwrap().reason, CompletionReason::Matched);
    assert_eq!(jar.get("reportToken").await.unwrap(), None);
}
