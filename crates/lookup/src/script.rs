//! The ordered search script.
//!
//! Resolution drives the lookup site through a fixed sequence of bounded
//! steps. Every step carries its own timeout and a declared failure
//! policy, so a slow or changed site degrades the attempt instead of
//! hanging it: a failed step either runs its fallback action or is logged
//! and skipped, and the attempt continues on passive capture alone.

use std::time::Duration;

use tracing::{debug, warn};

use rekkari_core::error::LookupError;
use rekkari_config::LookupConfig;
use rekkari_core::RegistrationToken;

use crate::driver::PageDriver;

/// Search form selectors on the lookup site.
const SEARCH_INPUT: &str = "input[name='rekisterinumero']";
const SEARCH_BUTTON: &str = "button[type='submit']";

/// A single page operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepAction {
    Navigate { url: String },
    Fill { selector: String, text: String },
    Click { selector: String },
    PressEnter { selector: String },
    Wait { secs: u64 },
}

/// What to do when a step's action fails or times out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OnFailure {
    /// Log and move on.
    Continue,
    /// Try this action once with the same timeout, then move on either way.
    Fallback(StepAction),
}

#[derive(Debug, Clone)]
pub struct ScriptStep {
    pub name: &'static str,
    pub action: StepAction,
    pub timeout: Duration,
    pub on_failure: OnFailure,
}

/// How a step ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Completed,
    /// Primary action failed, fallback action completed.
    RecoveredViaFallback,
    /// Both primary and any fallback failed; the script continued.
    Skipped,
}

/// The script for one registration search.
///
/// Navigation failures and timeouts are tolerated: the direct-URL spelling
/// often answers before the page finishes loading, and the form steps
/// below retry the search interactively. The trigger step falls back to a
/// keyboard confirmation when the site's button is not where we expect it.
pub fn build_search_script(config: &LookupConfig, token: &RegistrationToken) -> Vec<ScriptStep> {
    let base = config.base_url.trim_end_matches('/');
    vec![
        ScriptStep {
            name: "navigate",
            action: StepAction::Navigate {
                url: format!("{base}/{}", token.formatted()),
            },
            timeout: Duration::from_secs(config.navigation_timeout_secs),
            on_failure: OnFailure::Continue,
        },
        ScriptStep {
            name: "fill-registration",
            action: StepAction::Fill {
                selector: SEARCH_INPUT.into(),
                text: token.formatted(),
            },
            timeout: Duration::from_secs(5),
            on_failure: OnFailure::Continue,
        },
        ScriptStep {
            name: "trigger-search",
            action: StepAction::Click {
                selector: SEARCH_BUTTON.into(),
            },
            timeout: Duration::from_secs(5),
            on_failure: OnFailure::Fallback(StepAction::PressEnter {
                selector: SEARCH_INPUT.into(),
            }),
        },
        ScriptStep {
            name: "settle",
            action: StepAction::Wait {
                secs: config.settle_secs,
            },
            timeout: Duration::from_secs(config.settle_secs + 1),
            on_failure: OnFailure::Continue,
        },
        ScriptStep {
            name: "confirm",
            action: StepAction::Wait {
                secs: config.confirm_secs,
            },
            timeout: Duration::from_secs(config.confirm_secs + 1),
            on_failure: OnFailure::Continue,
        },
    ]
}

/// Run every step in order. Never fails: per-step failures are downgraded
/// according to the step's policy and the script always runs to the end.
pub async fn run_script(driver: &dyn PageDriver, steps: &[ScriptStep]) -> Vec<StepOutcome> {
    let mut outcomes = Vec::with_capacity(steps.len());
    for step in steps {
        let outcome = run_step(driver, step).await;
        outcomes.push(outcome);
    }
    outcomes
}

async fn run_step(driver: &dyn PageDriver, step: &ScriptStep) -> StepOutcome {
    match run_action(driver, &step.action, step.timeout, step.name).await {
        Ok(()) => {
            debug!(step = step.name, "Step completed");
            StepOutcome::Completed
        }
        Err(e) => {
            warn!(step = step.name, error = %e, "Step failed");
            match &step.on_failure {
                OnFailure::Continue => StepOutcome::Skipped,
                OnFailure::Fallback(action) => {
                    match run_action(driver, action, step.timeout, step.name).await {
                        Ok(()) => {
                            debug!(step = step.name, "Fallback action completed");
                            StepOutcome::RecoveredViaFallback
                        }
                        Err(e) => {
                            warn!(step = step.name, error = %e, "Fallback action failed");
                            StepOutcome::Skipped
                        }
                    }
                }
            }
        }
    }
}

async fn run_action(
    driver: &dyn PageDriver,
    action: &StepAction,
    timeout: Duration,
    step: &str,
) -> Result<(), LookupError> {
    let fut = async {
        match action {
            StepAction::Navigate { url } => driver.goto(url).await,
            StepAction::Fill { selector, text } => driver.fill(selector, text).await,
            StepAction::Click { selector } => driver.click(selector).await,
            StepAction::PressEnter { selector } => driver.press_enter(selector).await,
            StepAction::Wait { secs } => {
                driver.wait(Duration::from_secs(*secs)).await;
                Ok(())
            }
        }
    };
    tokio::time::timeout(timeout, fut)
        .await
        .map_err(|_| LookupError::StepTimeout {
            step: step.to_string(),
            timeout_secs: timeout.as_secs(),
        })?
}
