use dlwatch_core::{
    BindingContext, ElementHandle, Host, ListenConfig, ListenError, ListenOptions, Target,
    COOKIE_SENTINEL,
};
use std::sync::Arc;

use crate::cycle::{self, Binding, Cycle};
use crate::timing::PollTiming;

/// What a click on a bound element did.
#[derive(Debug)]
pub enum Click {
    /// The binding was disabled at bind time; the default action was cancelled.
    Suppressed,
    Started(Cycle),
}

impl Click {
    pub fn cycle(self) -> Option<Cycle> {
        match self {
            Click::Started(cycle) => Some(cycle),
            Click::Suppressed => None,
        }
    }
}

/// A binding of download detection to the elements of one target.
pub struct Listener {
    binding: Arc<Binding>,
    disabled: bool,
}

impl Clone for Listener {
    fn clone(&self) -> Self {
        Self {
            binding: Arc::clone(&self.binding),
            disabled: self.disabled,
        }
    }
}

/// Bind with the default one-second poll interval.
pub async fn listen(host: Host, target: impl Into<Target>, options: ListenOptions) -> Listener {
    listen_with(host, target, options, PollTiming::default()).await
}

pub async fn listen_with(
    host: Host,
    target: impl Into<Target>,
    options: ListenOptions,
    timing: PollTiming,
) -> Listener {
    let target = target.into();
    let config = ListenConfig::merge(options);

    let elements = match host.document.resolve(&target).await {
        Ok(elements) => elements,
        Err(e) => {
            tracing::warn!(error = %e, binding = %target, "could not resolve binding target");
            Vec::new()
        }
    };

    let context = BindingContext {
        target,
        elements,
        token_name: config.token_name.clone(),
    };

    if context.elements.is_empty() {
        let err = ListenError::target_not_found(&context.target);
        tracing::warn!(error = %err, "nothing to bind");
        return Listener {
            binding: Arc::new(Binding { host, config, context, timing }),
            disabled: false,
        };
    }

    // Decided once; later clicks never re-evaluate it.
    let disabled = (config.is_disabled_func)(&context);

    if let Err(e) = host.cookies.set(&config.token_name, COOKIE_SENTINEL).await {
        tracing::warn!(error = %e, cookie = %config.token_name, "could not initialize handshake cookie");
    }

    tracing::debug!(
        binding = %context.target,
        elements = context.elements.len(),
        disabled,
        "binding ready"
    );

    Listener {
        binding: Arc::new(Binding { host, config, context, timing }),
        disabled,
    }
}

impl Listener {
    pub fn elements(&self) -> &[ElementHandle] {
        &self.binding.context.elements
    }

    pub fn context(&self) -> &BindingContext {
        &self.binding.context
    }

    pub fn config(&self) -> &ListenConfig {
        &self.binding.config
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Click the bound element at `position`.
    pub async fn click(&self, position: usize) -> Result<Click, ListenError> {
        let element = self
            .elements()
            .get(position)
            .cloned()
            .ok_or_else(|| {
                ListenError::target_not_found(format!("{} [{}]", self.binding.context.target, position))
            })?;

        if self.disabled {
            tracing::debug!(element = ?element, "click suppressed");
            return Ok(Click::Suppressed);
        }

        Ok(Click::Started(cycle::start(Arc::clone(&self.binding), &element).await))
    }
}
