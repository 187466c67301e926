//! Single-flight wrapper around an advice generator.

use crate::advice::{AdviceGenerator, UNAVAILABLE_MESSAGE};
use crate::models::{GlobalMetrics, WealthRecord};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Generator that answers every request with the same text.
pub struct FixedAdvice(pub String);

#[async_trait]
impl AdviceGenerator for FixedAdvice {
    async fn get_advice(&self, _record: &WealthRecord, _metrics: &GlobalMetrics) -> String {
        self.0.clone()
    }
}

/// Holds the latest advice and allows at most one request in flight.
pub struct AdvicePanel {
    generator: Box<dyn AdviceGenerator>,
    in_flight: AtomicBool,
    latest: Mutex<Option<String>>,
}

/// Clears the in-flight flag when the request finishes or is dropped.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl AdvicePanel {
    pub fn new(generator: Box<dyn AdviceGenerator>) -> Self {
        Self {
            generator,
            in_flight: AtomicBool::new(false),
            latest: Mutex::new(None),
        }
    }

    /// Panel over a freshly built generator. A generator that failed to
    /// build is replaced by the unavailable message.
    pub fn from_advisor<G>(advisor: anyhow::Result<G>) -> Self
    where
        G: AdviceGenerator + 'static,
    {
        match advisor {
            Ok(generator) => Self::new(Box::new(generator)),
            Err(e) => {
                warn!("Advice client unavailable: {:#}", e);
                Self::new(Box::new(FixedAdvice(UNAVAILABLE_MESSAGE.to_string())))
            }
        }
    }

    /// Whether a request is pending.
    #[allow(dead_code)] // The CLI awaits each request to completion
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Last advice received, if any.
    #[allow(dead_code)] // The CLI uses the value returned by `request`
    pub fn latest(&self) -> Option<String> {
        self.latest.lock().ok().and_then(|latest| latest.clone())
    }

    /// Request advice for `record`.
    ///
    /// Returns `None` without calling the generator when another request is
    /// still pending.
    pub async fn request(&self, record: &WealthRecord, metrics: &GlobalMetrics) -> Option<String> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Advice request for {} ignored, one is already pending", record.id);
            return None;
        }
        let _guard = InFlightGuard(&self.in_flight);

        let advice = self.generator.get_advice(record, metrics).await;
        if let Ok(mut latest) = self.latest.lock() {
            *latest = Some(advice.clone());
        }
        Some(advice)
    }
}
