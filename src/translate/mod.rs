//! Translation routing across the bilingual and multilingual pivot backends.

use std::future::Future;

use tracing::{debug, warn};

use crate::inference::InferenceError;
use crate::lang::Lang;

/// A direction served by a dedicated bilingual model. The two directions are
/// separate models, not one symmetric model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    EnToHi,
    HiToEn,
}

/// Remote translation capabilities.
/// Implemented by `HfClient` for production; mock implementations used in tests.
pub trait TranslationBackend: Send + Sync {
    fn translate_bilingual(
        &self,
        text: &str,
        direction: Direction,
    ) -> impl Future<Output = Result<String, InferenceError>> + Send;

    /// Many-to-many translation. The backend sets `source` on the encoder and
    /// forces `target` as the first generated token.
    fn translate_pivot(
        &self,
        text: &str,
        source: Lang,
        target: Lang,
    ) -> impl Future<Output = Result<String, InferenceError>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Identity,
    Bilingual(Direction),
    Pivot,
}

/// Dispatch table for every canonical pair. Adding a language must extend
/// this match; there is no catch-all arm.
pub fn route(source: Lang, target: Lang) -> Route {
    use Lang::{En, Hi, Te};

    match (source, target) {
        (En, En) | (Hi, Hi) | (Te, Te) => Route::Identity,
        (En, Hi) => Route::Bilingual(Direction::EnToHi),
        (Hi, En) => Route::Bilingual(Direction::HiToEn),
        (En, Te) | (Te, En) | (Hi, Te) | (Te, Hi) => Route::Pivot,
    }
}

pub struct TranslationRouter<B> {
    backend: B,
}

impl<B: TranslationBackend> TranslationRouter<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    #[cfg(test)]
    pub(crate) fn backend(&self) -> &B {
        &self.backend
    }

    /// Translates `text`, degrading to the untranslated input on any backend
    /// failure. The result is therefore only nominally in `target`.
    pub async fn translate(&self, text: &str, source: Lang, target: Lang) -> String {
        let route = route(source, target);
        let result = match route {
            Route::Identity => return text.to_string(),
            Route::Bilingual(direction) => self.backend.translate_bilingual(text, direction).await,
            Route::Pivot => self.backend.translate_pivot(text, source, target).await,
        };

        match result {
            Ok(translated) => {
                debug!(%source, %target, ?route, "translated");
                translated
            }
            Err(e) => {
                warn!(error = %e, %source, %target, ?route, "translation failed, passing text through");
                text.to_string()
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;

    /// Records every backend call; tags output with the route taken.
    #[derive(Default)]
    pub struct MockBackend {
        pub calls: Mutex<Vec<String>>,
        pub fail: bool,
        pub delay: Option<Duration>,
    }

    impl MockBackend {
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        pub fn slow(delay: Duration) -> Self {
            Self {
                delay: Some(delay),
                ..Self::default()
            }
        }

        pub fn captured(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        async fn wait(&self) {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
        }

        fn outcome(&self, tag: String, text: &str) -> Result<String, InferenceError> {
            self.calls.lock().unwrap().push(tag.clone());
            if self.fail {
                Err(InferenceError::ModelLoading)
            } else {
                Ok(format!("[{tag}] {text}"))
            }
        }
    }

    impl TranslationBackend for MockBackend {
        async fn translate_bilingual(
            &self,
            text: &str,
            direction: Direction,
        ) -> Result<String, InferenceError> {
            self.wait().await;
            self.outcome(format!("{direction:?}"), text)
        }

        async fn translate_pivot(
            &self,
            text: &str,
            source: Lang,
            target: Lang,
        ) -> Result<String, InferenceError> {
            self.wait().await;
            self.outcome(format!("pivot:{source}->{target}"), text)
        }
    }
}
