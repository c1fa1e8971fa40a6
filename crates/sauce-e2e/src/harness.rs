//! Ordered scenario runner.
//!
//! Scenarios run one at a time, in declared order, over one shared
//! [`Storefront`]. A failing scenario is recorded and the run moves on.

use crate::driver::StoreDriver;
use crate::result::SauceResult;
use crate::scenarios;
use crate::storefront::Storefront;
use console::{style, Style, Term};
use futures::future::{FutureExt, LocalBoxFuture};
use serde::Serialize;
use std::fmt;
use std::io;
use std::time::Duration;
use tokio::time::Instant;
use tracing::Instrument;

/// Entry point of one scenario
pub type ScenarioFn<D> =
    for<'s> fn(&'s Storefront<'s, D>) -> LocalBoxFuture<'s, SauceResult<()>>;

/// A named scenario with its position in the run
pub struct Scenario<D: StoreDriver> {
    /// Declared position; lower runs first
    pub order: u32,
    /// Scenario name
    pub name: &'static str,
    /// One-line summary
    pub description: &'static str,
    run: ScenarioFn<D>,
}

impl<D: StoreDriver> Scenario<D> {
    /// Create a scenario
    #[must_use]
    pub const fn new(
        order: u32,
        name: &'static str,
        description: &'static str,
        run: ScenarioFn<D>,
    ) -> Self {
        Self {
            order,
            name,
            description,
            run,
        }
    }
}

impl<D: StoreDriver> Clone for Scenario<D> {
    fn clone(&self) -> Self {
        Self {
            order: self.order,
            name: self.name,
            description: self.description,
            run: self.run,
        }
    }
}

impl<D: StoreDriver> fmt::Debug for Scenario<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario")
            .field("order", &self.order)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

fn order_confirmation<'s, D: StoreDriver>(
    shop: &'s Storefront<'s, D>,
) -> LocalBoxFuture<'s, SauceResult<()>> {
    scenarios::order_confirmation(shop).boxed_local()
}

fn order_cancellation<'s, D: StoreDriver>(
    shop: &'s Storefront<'s, D>,
) -> LocalBoxFuture<'s, SauceResult<()>> {
    scenarios::order_cancellation(shop).boxed_local()
}

fn checkout_details_verification<'s, D: StoreDriver>(
    shop: &'s Storefront<'s, D>,
) -> LocalBoxFuture<'s, SauceResult<()>> {
    scenarios::checkout_details_verification(shop).boxed_local()
}

/// Result of running a single scenario
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResult {
    /// Scenario name
    pub name: String,
    /// Whether the scenario passed
    pub passed: bool,
    /// Error message if failed
    pub error: Option<String>,
    /// Scenario duration
    pub duration: Duration,
}

impl ScenarioResult {
    /// Create a passing result
    #[must_use]
    pub fn pass(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            error: None,
            duration: Duration::ZERO,
        }
    }

    /// Create a failing result
    #[must_use]
    pub fn fail(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: false,
            error: Some(error.into()),
            duration: Duration::ZERO,
        }
    }

    /// Set duration
    #[must_use]
    pub const fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

/// Results from one suite run
#[derive(Debug, Clone, Serialize)]
pub struct SuiteResults {
    /// Suite name
    pub suite_name: String,
    /// Per-scenario results, in run order
    pub results: Vec<ScenarioResult>,
    /// Total duration
    pub duration: Duration,
}

impl SuiteResults {
    /// Check if all scenarios passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }

    /// Count passed scenarios
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    /// Count failed scenarios
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| !r.passed).count()
    }

    /// Number of scenarios that ran
    #[must_use]
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Failed scenarios
    #[must_use]
    pub fn failures(&self) -> Vec<&ScenarioResult> {
        self.results.iter().filter(|r| !r.passed).collect()
    }

    /// Render a per-scenario report followed by a one-line verdict
    #[must_use]
    pub fn summary(&self, use_color: bool) -> String {
        let passed_style = Style::new().green().bold();
        let failed_style = Style::new().red().bold();

        let mut lines = Vec::with_capacity(self.results.len() + 1);
        for result in &self.results {
            let seconds = result.duration.as_secs_f64();
            let line = match (&result.error, use_color) {
                (None, true) => format!("{} {} ({seconds:.2}s)", style("✓").green().bold(), result.name),
                (None, false) => format!("PASS {} ({seconds:.2}s)", result.name),
                (Some(e), true) => format!("{} {}: {e}", style("✗").red().bold(), result.name),
                (Some(e), false) => format!("FAIL {}: {e}", result.name),
            };
            lines.push(line);
        }

        let verdict = if self.all_passed() { "PASSED" } else { "FAILED" };
        let verdict = if use_color {
            let chosen = if self.all_passed() { &passed_style } else { &failed_style };
            chosen.apply_to(verdict).to_string()
        } else {
            verdict.to_string()
        };
        lines.push(format!(
            "{verdict} {}: {} scenarios in {:.2}s ({} passed, {} failed)",
            self.suite_name,
            self.total(),
            self.duration.as_secs_f64(),
            self.passed_count(),
            self.failed_count(),
        ));
        lines.join("\n")
    }

    /// Machine-readable report
    pub fn to_json(&self) -> SauceResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the summary and a trailing newline to `out`
    pub fn write_summary(&self, out: &mut impl io::Write, use_color: bool) -> io::Result<()> {
        writeln!(out, "{}", self.summary(use_color))?;
        out.flush()
    }

    /// Write the summary to stderr, colored when stderr is a terminal
    pub fn print_summary(&self) {
        let mut term = Term::stderr();
        let use_color = term.features().colors_supported();
        if let Err(e) = self.write_summary(&mut term, use_color) {
            tracing::warn!(error = %e, "could not write the suite summary");
        }
    }
}

/// Scenarios run in declared order over one storefront
pub struct ScenarioSuite<D: StoreDriver> {
    /// Suite name
    pub name: String,
    scenarios: Vec<Scenario<D>>,
    fail_fast: bool,
}

impl<D: StoreDriver> fmt::Debug for ScenarioSuite<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScenarioSuite")
            .field("name", &self.name)
            .field("scenarios", &self.scenarios)
            .field("fail_fast", &self.fail_fast)
            .finish()
    }
}

impl<D: StoreDriver> ScenarioSuite<D> {
    /// Create an empty suite
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scenarios: Vec::new(),
            fail_fast: false,
        }
    }

    /// The storefront suite: confirmation, cancellation, details
    #[must_use]
    pub fn storefront() -> Self {
        let mut suite = Self::new("storefront");
        suite.add(Scenario::new(
            1,
            "order_confirmation",
            "buy one item and see the thank-you banner",
            order_confirmation::<D>,
        ));
        suite.add(Scenario::new(
            2,
            "order_cancellation",
            "cancel checkout and keep the item in the cart",
            order_cancellation::<D>,
        ));
        suite.add(Scenario::new(
            3,
            "checkout_details_verification",
            "check line item details and overview quantity",
            checkout_details_verification::<D>,
        ));
        suite
    }

    /// Add a scenario, keeping declared order (ties run in insertion order)
    pub fn add(&mut self, scenario: Scenario<D>) {
        self.scenarios.push(scenario);
        self.scenarios.sort_by_key(|s| s.order);
    }

    /// Stop after the first failing scenario
    #[must_use]
    pub const fn with_fail_fast(mut self) -> Self {
        self.fail_fast = true;
        self
    }

    /// Number of scenarios
    #[must_use]
    pub fn scenario_count(&self) -> usize {
        self.scenarios.len()
    }

    /// Scenario names in run order
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.scenarios.iter().map(|s| s.name).collect()
    }

    /// Run every scenario in order against `shop`
    pub async fn run(&self, shop: &Storefront<'_, D>) -> SuiteResults {
        let start = Instant::now();
        let mut results = Vec::with_capacity(self.scenarios.len());
        tracing::info!(suite = %self.name, scenarios = self.scenarios.len(), "suite started");

        for scenario in &self.scenarios {
            let span = tracing::info_span!("scenario", name = scenario.name, order = scenario.order);
            let began = Instant::now();
            let outcome = (scenario.run)(shop).instrument(span).await;
            let duration = began.elapsed();

            let result = match outcome {
                Ok(()) => {
                    tracing::info!(scenario = scenario.name, ?duration, "scenario passed");
                    ScenarioResult::pass(scenario.name)
                }
                Err(e) => {
                    tracing::error!(scenario = scenario.name, error = %e, "scenario failed");
                    ScenarioResult::fail(scenario.name, e.to_string())
                }
            };
            let failed = !result.passed;
            results.push(result.with_duration(duration));
            if failed && self.fail_fast {
                tracing::warn!(suite = %self.name, "stopping after first failure");
                break;
            }
        }

        SuiteResults {
            suite_name: self.name.clone(),
            results,
            duration: start.elapsed(),
        }
    }
}

/// Launch chromium, run the storefront suite, and always close the browser
#[cfg(feature = "browser")]
pub async fn run_live(config: &crate::config::SuiteConfig) -> SauceResult<SuiteResults> {
    let session = crate::browser::Session::launch(&config.browser).await?;
    let results = {
        let shop = Storefront::new(session.driver(), config);
        ScenarioSuite::storefront().run(&shop).await
    };
    if let Err(e) = session.close().await {
        tracing::warn!(error = %e, "browser did not close cleanly");
    }
    Ok(results)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::SuiteConfig;
    use crate::mock::{Confirmation, MockStorefront};
    use crate::result::SauceError;

    fn always_fails<'s>(
        _shop: &'s Storefront<'s, MockStorefront>,
    ) -> LocalBoxFuture<'s, SauceResult<()>> {
        async { Err(SauceError::assertion("deliberate")) }.boxed_local()
    }

    fn always_passes<'s>(
        _shop: &'s Storefront<'s, MockStorefront>,
    ) -> LocalBoxFuture<'s, SauceResult<()>> {
        async { Ok(()) }.boxed_local()
    }

    mod suite_tests {
        use super::*;

        #[test]
        fn test_declared_order() {
            let suite = ScenarioSuite::<MockStorefront>::storefront();
            assert_eq!(
                suite.names(),
                vec![
                    "order_confirmation",
                    "order_cancellation",
                    "checkout_details_verification"
                ]
            );
        }

        #[test]
        fn test_add_sorts_by_order() {
            let mut suite = ScenarioSuite::<MockStorefront>::new("custom");
            suite.add(Scenario::new(2, "second", "", always_passes));
            suite.add(Scenario::new(1, "first", "", always_passes));
            suite.add(Scenario::new(2, "third", "", always_passes));
            assert_eq!(suite.names(), vec!["first", "second", "third"]);
            assert_eq!(suite.scenario_count(), 3);
        }

        #[tokio::test(start_paused = true)]
        async fn test_failure_does_not_stop_the_run() {
            let shop = MockStorefront::new();
            let config = SuiteConfig::default();
            let mut suite = ScenarioSuite::new("custom");
            suite.add(Scenario::new(1, "broken", "", always_fails));
            suite.add(Scenario::new(2, "fine", "", always_passes));

            let results = suite.run(&Storefront::new(&shop, &config)).await;
            assert_eq!(results.total(), 2);
            assert_eq!(results.passed_count(), 1);
            assert_eq!(results.failures()[0].name, "broken");
            assert!(!results.all_passed());
        }

        #[tokio::test(start_paused = true)]
        async fn test_fail_fast() {
            let shop = MockStorefront::new();
            let config = SuiteConfig::default();
            let mut suite = ScenarioSuite::new("custom").with_fail_fast();
            suite.add(Scenario::new(1, "broken", "", always_fails));
            suite.add(Scenario::new(2, "fine", "", always_passes));

            let results = suite.run(&Storefront::new(&shop, &config)).await;
            assert_eq!(results.total(), 1);
            assert_eq!(results.failed_count(), 1);
        }
    }

    mod storefront_suite_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_all_scenarios_pass_on_one_session() {
            let shop = MockStorefront::new();
            let config = SuiteConfig::default();
            let results = ScenarioSuite::storefront()
                .run(&Storefront::new(&shop, &config))
                .await;
            assert!(results.all_passed(), "{}", results.summary(false));
            assert_eq!(results.passed_count(), 3);
        }

        #[tokio::test(start_paused = true)]
        async fn test_silent_store_fails_every_scenario() {
            let shop = MockStorefront::new().with_confirmation(Confirmation::Silent);
            let config = SuiteConfig::default();
            let results = ScenarioSuite::storefront()
                .run(&Storefront::new(&shop, &config))
                .await;
            assert_eq!(results.failed_count(), 3);
        }
    }

    mod summary_tests {
        use super::*;

        #[test]
        fn test_plain_summary() {
            let results = SuiteResults {
                suite_name: "storefront".to_string(),
                results: vec![
                    ScenarioResult::pass("order_confirmation")
                        .with_duration(Duration::from_millis(1_500)),
                    ScenarioResult::fail("order_cancellation", "Assertion failed: cart lists []"),
                ],
                duration: Duration::from_secs(3),
            };
            let summary = results.summary(false);
            assert!(summary.contains("PASS order_confirmation (1.50s)"));
            assert!(summary.contains("FAIL order_cancellation: Assertion failed: cart lists []"));
            assert!(summary.ends_with("FAILED storefront: 2 scenarios in 3.00s (1 passed, 1 failed)"));
        }

        #[test]
        fn test_json_report() {
            let results = SuiteResults {
                suite_name: "storefront".to_string(),
                results: vec![ScenarioResult::fail("order_cancellation", "boom")],
                duration: Duration::from_millis(250),
            };
            let value: serde_json::Value = serde_json::from_str(&results.to_json().unwrap()).unwrap();
            assert_eq!(value["suite_name"], "storefront");
            assert_eq!(value["results"][0]["passed"], false);
            assert_eq!(value["results"][0]["error"], "boom");
        }

        struct BrokenPipe;

        impl io::Write for BrokenPipe {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        fn one_pass() -> SuiteResults {
            SuiteResults {
                suite_name: "storefront".to_string(),
                results: vec![ScenarioResult::pass("order_confirmation")],
                duration: Duration::ZERO,
            }
        }

        #[test]
        fn test_write_summary() {
            let mut out = Vec::new();
            one_pass().write_summary(&mut out, false).unwrap();
            let text = String::from_utf8(out).unwrap();
            assert!(text.starts_with("PASS order_confirmation"));
            assert!(text.ends_with("(1 passed, 0 failed)\n"));
        }

        #[test]
        fn test_write_failure_is_reported() {
            let err = one_pass().write_summary(&mut BrokenPipe, false).unwrap_err();
            assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        }

        #[test]
        fn test_colored_summary_names_every_scenario() {
            let results = SuiteResults {
                suite_name: "storefront".to_string(),
                results: vec![ScenarioResult::pass("order_confirmation")],
                duration: Duration::ZERO,
            };
            let summary = results.summary(true);
            assert!(summary.contains("order_confirmation"));
            assert!(summary.contains("PASSED"));
        }
    }
}
