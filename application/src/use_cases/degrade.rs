//! Three-tier degradation
//!
//! Every evaluation step that can fail follows the same sequence: an
//! AI-assisted primary, a deterministic secondary, then a static fallback.
//! [`run_tiered`] implements that sequence once.

use futures::FutureExt;
use std::any::Any;
use std::fmt::Display;
use std::future::Future;
use std::panic::{AssertUnwindSafe, catch_unwind};
use tracing::{debug, warn};

/// Which tier produced a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Primary,
    Secondary,
    Fallback,
}

/// Run `primary`; on error or panic run `secondary`; if that panics too,
/// use `fallback`.
///
/// Each step down logs a `warn!` mentioning `label`. `fallback` is expected
/// to be a plain constructor and is not guarded.
pub async fn run_tiered<T, E, Fut, S, F>(
    label: &str,
    primary: Fut,
    secondary: S,
    fallback: F,
) -> (T, Tier)
where
    Fut: Future<Output = Result<T, E>>,
    E: Display,
    S: FnOnce() -> T,
    F: FnOnce() -> T,
{
    match AssertUnwindSafe(primary).catch_unwind().await {
        Ok(Ok(value)) => {
            debug!("{}: primary tier succeeded", label);
            return (value, Tier::Primary);
        }
        Ok(Err(e)) => warn!("{}: primary tier failed, degrading: {}", label, e),
        Err(payload) => warn!(
            "{}: primary tier panicked, degrading: {}",
            label,
            panic_message(&*payload)
        ),
    }

    match catch_unwind(AssertUnwindSafe(secondary)) {
        Ok(value) => (value, Tier::Secondary),
        Err(payload) => {
            warn!(
                "{}: secondary tier panicked, using static fallback: {}",
                label,
                panic_message(&*payload)
            );
            (fallback(), Tier::Fallback)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
