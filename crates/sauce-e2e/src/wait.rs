//! Explicit waits
//!
//! Bounded polling for DOM conditions. Every helper blocks on one of these
//! instead of sleeping for a fixed time:
//!
//! - [`until`]: a [`Locator`] reaches a [`Condition`]
//! - [`until_true`]: a custom predicate returns `true`
//! - [`any_of`]: the first of several independent [`Probe`]s to hold wins
//!
//! Time is read from `tokio::time`, so tests can pause the clock.

use crate::driver::StoreDriver;
use crate::locator::Locator;
use crate::result::{SauceError, SauceResult};
use futures::future::{self, FutureExt, LocalBoxFuture};
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Default timeout for wait operations (5 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 5_000;

/// Default polling interval (100ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

// =============================================================================
// CONDITIONS
// =============================================================================

/// What a located element must satisfy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    /// Attached to the DOM
    Present,
    /// Attached and rendered with a non-empty box
    Visible,
    /// Visible and enabled
    Clickable,
}

impl Condition {
    /// Name used in diagnostics
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Visible => "visible",
            Self::Clickable => "clickable",
        }
    }

    /// Keep the elements that satisfy this condition, preserving order
    async fn select<D: StoreDriver>(
        self,
        driver: &D,
        elements: Vec<D::Element>,
    ) -> SauceResult<Vec<D::Element>> {
        if self == Self::Present {
            return Ok(elements);
        }
        let mut kept = Vec::with_capacity(elements.len());
        for element in elements {
            if !driver.is_displayed(&element).await? {
                continue;
            }
            if self == Self::Clickable && !driver.is_enabled(&element).await? {
                continue;
            }
            kept.push(element);
        }
        Ok(kept)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Bound and polling interval for one wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self::new(DEFAULT_WAIT_TIMEOUT_MS, DEFAULT_POLL_INTERVAL_MS)
    }
}

impl WaitOptions {
    /// Create wait options
    #[must_use]
    pub const fn new(timeout_ms: u64, poll_interval_ms: u64) -> Self {
        Self {
            timeout_ms,
            poll_interval_ms,
        }
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// =============================================================================
// LOCATOR WAITS
// =============================================================================

/// Poll until `locator` matches at least one element satisfying `condition`.
///
/// Returns the satisfying elements in document order. Stale or missing
/// elements during a poll count as "not yet"; any other driver error aborts.
pub async fn until<D: StoreDriver>(
    driver: &D,
    locator: &Locator,
    condition: Condition,
    options: &WaitOptions,
) -> SauceResult<Vec<D::Element>> {
    let start = Instant::now();

    loop {
        let attempt = match driver.find_all(locator).await {
            Ok(found) => condition.select(driver, found).await,
            Err(e) => Err(e),
        };
        match attempt {
            Ok(found) if !found.is_empty() => {
                tracing::debug!(
                    %locator,
                    %condition,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "wait satisfied"
                );
                return Ok(found);
            }
            Ok(_) => {}
            Err(e) if e.is_transient() => {
                tracing::trace!(%locator, error = %e, "transient error while waiting");
            }
            Err(e) => return Err(e),
        }

        if start.elapsed() >= options.timeout() {
            return Err(SauceError::WaitTimeout {
                locator: locator.to_string(),
                condition: condition.to_string(),
                timeout_ms: options.timeout_ms,
            });
        }

        sleep(options.poll_interval()).await;
    }
}

/// Like [`until`], returning only the first satisfying element
pub async fn until_first<D: StoreDriver>(
    driver: &D,
    locator: &Locator,
    condition: Condition,
    options: &WaitOptions,
) -> SauceResult<D::Element> {
    until(driver, locator, condition, options)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| SauceError::ElementNotFound {
            locator: locator.to_string(),
        })
}

// =============================================================================
// CUSTOM PREDICATES
// =============================================================================

/// Poll a custom predicate until it returns `true`
pub async fn until_true<F, Fut>(
    description: &str,
    mut predicate: F,
    options: &WaitOptions,
) -> SauceResult<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = SauceResult<bool>>,
{
    let start = Instant::now();

    loop {
        match predicate().await {
            Ok(true) => return Ok(()),
            Ok(false) => {}
            Err(e) if e.is_transient() => {}
            Err(e) => return Err(e),
        }

        if start.elapsed() >= options.timeout() {
            return Err(SauceError::WaitTimeout {
                locator: description.to_string(),
                condition: "true".to_string(),
                timeout_ms: options.timeout_ms,
            });
        }

        sleep(options.poll_interval()).await;
    }
}

/// A named predicate that can take part in an [`any_of`] race
pub struct Probe<'a> {
    description: String,
    check: Box<dyn Fn() -> LocalBoxFuture<'a, SauceResult<bool>> + 'a>,
}

impl fmt::Debug for Probe<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Probe")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl<'a> Probe<'a> {
    /// Create a probe from an async predicate
    pub fn new<F, Fut>(description: impl Into<String>, check: F) -> Self
    where
        F: Fn() -> Fut + 'a,
        Fut: Future<Output = SauceResult<bool>> + 'a,
    {
        Self {
            description: description.into(),
            check: Box::new(move || check().boxed_local()),
        }
    }

    /// Holds once `locator` matches any element in the DOM
    pub fn present<D: StoreDriver>(driver: &'a D, locator: Locator) -> Self {
        let description = format!("{locator} present");
        Self::new(description, move || {
            let locator = locator.clone();
            async move { Ok::<_, SauceError>(!driver.find_all(&locator).await?.is_empty()) }
        })
    }

    /// Description used in diagnostics
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    async fn poll(&self, options: &WaitOptions) -> SauceResult<()> {
        loop {
            match (self.check)().await {
                Ok(true) => return Ok(()),
                Ok(false) => {}
                Err(e) if e.is_transient() => {}
                Err(e) => return Err(e),
            }
            sleep(options.poll_interval()).await;
        }
    }
}

/// Race independent probes under one shared timeout.
///
/// Every probe polls on its own; the index of the first one to hold is
/// returned. A probe failing with a non-transient error drops out of the
/// race, and the error surfaces only if every probe fails that way.
pub async fn any_of(probes: &[Probe<'_>], options: &WaitOptions) -> SauceResult<usize> {
    let timed_out = || SauceError::WaitTimeout {
        locator: probes
            .iter()
            .map(Probe::description)
            .collect::<Vec<_>>()
            .join(" | "),
        condition: "any satisfied".to_string(),
        timeout_ms: options.timeout_ms,
    };

    if probes.is_empty() {
        return Err(timed_out());
    }

    let racers = probes.iter().enumerate().map(|(index, probe)| {
        async move {
            probe.poll(options).await?;
            Ok::<usize, SauceError>(index)
        }
        .boxed_local()
    });

    match tokio::time::timeout(options.timeout(), future::select_ok(racers)).await {
        Ok(Ok((index, _still_racing))) => {
            tracing::debug!(probe = probes[index].description(), "race won");
            Ok(index)
        }
        Ok(Err(e)) => Err(e),
        Err(_) => Err(timed_out()),
    }
}
