//! Observation points for embedding applications.

use std::fmt;
use std::sync::Arc;

use trellis_value::AnyValue;

type RequestObserver = Arc<dyn Fn(&str, &AnyValue) + Send + Sync>;

/// Callbacks invoked by the adapter around dispatch.
#[derive(Clone, Default)]
pub struct AdapterHooks {
    pre_handle_request: Option<RequestObserver>,
}

impl AdapterHooks {
    /// Hooks that observe nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Observes every inbound request's method and parameters before it is
    /// routed, including requests for unknown methods.
    #[must_use]
    pub fn with_pre_handle_request<F>(mut self, observer: F) -> Self
    where
        F: Fn(&str, &AnyValue) + Send + Sync + 'static,
    {
        self.pre_handle_request = Some(Arc::new(observer));
        self
    }

    pub(crate) fn before_request(&self, method: &str, params: &AnyValue) {
        if let Some(observer) = &self.pre_handle_request {
            observer(method, params);
        }
    }
}

impl fmt::Debug for AdapterHooks {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AdapterHooks")
            .field("pre_handle_request", &self.pre_handle_request.is_some())
            .finish()
    }
}
