use dlwatch_core::{
    query, BindingContext, ElementHandle, Host, ListenConfig, ListenError, Token, COOKIE_SENTINEL,
    TOKEN_NAME_PARAM, TOKEN_VALUE_PARAM,
};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tokio::task::{JoinError, JoinHandle};

use crate::session::{CompletionReason, Observation, PollSession};
use crate::timer::PollTimer;
use crate::timing::PollTiming;

/// Everything a binding's cycles share. Immutable after `listen`.
pub(crate) struct Binding {
    pub host: Host,
    pub config: ListenConfig,
    pub context: BindingContext,
    pub timing: PollTiming,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleOutcome {
    pub token: Token,
    pub reason: CompletionReason,
    pub ticks: u32,
}

/// One click-to-completion cycle running in the background.
#[derive(Debug)]
pub struct Cycle {
    token: Token,
    handle: JoinHandle<CycleOutcome>,
}

impl Cycle {
    pub fn token(&self) -> &Token {
        &self.token
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub async fn finished(self) -> Result<CycleOutcome, JoinError> {
        self.handle.await
    }
}

pub(crate) async fn start(binding: Arc<Binding>, clicked: &ElementHandle) -> Cycle {
    let host = &binding.host;
    let config = &binding.config;

    if let Some(param) = &config.param {
        let pairs = param.snapshot().await;
        rewrite_all(&binding, |href| {
            query::update_query_parameters(href, pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        })
        .await;
    }

    let token = Token::now();
    rewrite_all(&binding, |href| {
        query::update_query_parameters(
            href,
            [(TOKEN_NAME_PARAM, config.token_name.as_str()), (TOKEN_VALUE_PARAM, token.as_str())],
        )
    })
    .await;

    if let Err(e) = host.cookies.set(&config.token_name, COOKIE_SENTINEL).await {
        tracing::warn!(error = %e, cookie = %config.token_name, "could not reset handshake cookie");
    }

    if let Err(e) = host.indicator.show(&config.message).await {
        tracing::warn!(error = %e, "could not show indicator");
    }

    tracing::debug!(token = %token, element = ?clicked, "download cycle started");
    let session = PollSession::new(token.clone(), config.attempts);
    let handle = tokio::spawn(poll(Arc::clone(&binding), session));

    match host.document.href(clicked).await {
        Ok(Some(url)) if !url.is_empty() => {
            if let Err(e) = host.navigator.navigate(&url).await {
                tracing::warn!(error = %e, url = %url, "navigation failed");
            }
        }
        Ok(_) => tracing::warn!(element = ?clicked, "clicked element has no URL to follow"),
        Err(e) => tracing::warn!(error = %e, element = ?clicked, "could not read clicked element URL"),
    }

    Cycle { token, handle }
}

/// Rewrite every bound element's URL; elements without one are skipped.
async fn rewrite_all<F>(binding: &Binding, rewrite: F)
where
    F: Fn(&str) -> Result<String, ListenError>,
{
    let document = &binding.host.document;
    for element in &binding.context.elements {
        let href = match document.href(element).await {
            Ok(Some(href)) if !href.is_empty() => href,
            Ok(_) => {
                let err = ListenError::malformed_url("Bound element has no URL");
                tracing::warn!(error = %err, element = ?element, "skipping URL rewrite");
                continue;
            }
            Err(e) => {
                tracing::warn!(error = %e, element = ?element, "skipping URL rewrite");
                continue;
            }
        };

        let rewritten = match rewrite(&href) {
            Ok(rewritten) => rewritten,
            Err(e) => {
                tracing::warn!(error = %e, href = %href, "skipping URL rewrite");
                continue;
            }
        };

        if let Err(e) = document.set_href(element, &rewritten).await {
            tracing::warn!(error = %e, element = ?element, "could not write element URL");
        }
    }
}

async fn poll(binding: Arc<Binding>, mut session: PollSession) -> CycleOutcome {
    let cookie_name = binding.config.token_name.as_str();
    let mut timer = PollTimer::start(binding.timing.interval);

    let reason = loop {
        timer.tick().await;

        let cookie = match binding.host.cookies.get(cookie_name).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, cookie = cookie_name, "cookie read failed, treating as absent");
                None
            }
        };

        match session.observe(cookie.as_deref()) {
            Observation::Pending => {
                tracing::trace!(session = %session.snapshot(), "still waiting");
            }
            Observation::Done(reason) => break reason,
        }
    };

    timer.stop();
    teardown(&binding).await;

    let outcome = CycleOutcome {
        token: session.token().clone(),
        reason,
        ticks: session.ticks(),
    };
    tracing::info!(token = %outcome.token, reason = ?outcome.reason, ticks = outcome.ticks, "download cycle finished");

    run_callback(&binding);
    outcome
}

async fn teardown(binding: &Binding) {
    let host = &binding.host;
    if let Err(e) = host.indicator.hide().await {
        tracing::warn!(error = %e, "could not hide indicator");
    }
    if let Err(e) = host.cookies.expire(&binding.config.token_name).await {
        tracing::warn!(error = %e, cookie = %binding.config.token_name, "could not expire handshake cookie");
    }
}

fn run_callback(binding: &Binding) {
    let Some(callback) = &binding.config.callback else {
        return;
    };
    let failure = match catch_unwind(AssertUnwindSafe(|| callback(&binding.context))) {
        Ok(Ok(())) => return,
        Ok(Err(e)) => ListenError::callback_failed(format!("Completion callback failed: {:#}", e)),
        Err(_) => ListenError::callback_failed("Completion callback panicked"),
    };
    tracing::warn!(error = %failure, binding = %binding.context.target, "callback failed");
}
