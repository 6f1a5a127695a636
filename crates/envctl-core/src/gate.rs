//! Cost confirmation gate
//!
//! Shows what an action will cost and blocks until the operator types every
//! required phrase, in order. One mismatch ends the invocation: there is no
//! retry loop. Input is compared exactly, only the line terminator is
//! stripped.

use crate::error::Result;
use crate::model::{ConfirmationPolicy, CostEstimate};
use colored::Colorize;
use std::io::{BufRead, Write};
use std::time::Duration;

/// What the operator is asked to approve
#[derive(Debug, Clone)]
pub struct GatePrompt<'a> {
    /// "Shut down", "Start up", ...
    pub action: &'a str,

    /// Environment or scope the action targets
    pub target: &'a str,

    /// Resource group(s) affected, shown verbatim
    pub scope: &'a str,

    pub cost: CostEstimate,

    pub policy: &'a ConfirmationPolicy,

    /// Irreversible actions get a red banner
    pub destructive: bool,
}

/// Outcome of a gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Confirmed,
    /// Phrase number `step` (1-based) did not match
    Aborted { step: usize, expected: String },
}

impl GateDecision {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, GateDecision::Confirmed)
    }
}

/// Anything that can approve or refuse a [`GatePrompt`]
pub trait Confirm {
    fn confirm(&mut self, prompt: &GatePrompt<'_>) -> Result<GateDecision>;
}

/// Gate used for `--force`: always confirms without prompting
#[derive(Debug, Default, Clone, Copy)]
pub struct Preconfirmed;

impl Confirm for Preconfirmed {
    fn confirm(&mut self, prompt: &GatePrompt<'_>) -> Result<GateDecision> {
        tracing::info!(
            action = prompt.action,
            target = prompt.target,
            "Confirmation skipped (--force)"
        );
        Ok(GateDecision::Confirmed)
    }
}

/// Interactive gate reading phrases from `input` and writing to `output`
///
/// Reading a phrase and the production countdown both block the calling
/// thread. Gate before spawning any concurrent work, or swap the countdown
/// out with [`CostGate::with_pause`].
pub struct CostGate<R, W> {
    input: R,
    output: W,
    pause: Box<dyn FnMut(Duration) + Send>,
}

impl CostGate<std::io::StdinLock<'static>, std::io::Stdout> {
    /// Gate on the process terminal
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> CostGate<R, W> {
    /// Counts down with `std::thread::sleep`
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            pause: Box::new(std::thread::sleep),
        }
    }

    /// Replace the countdown sleep
    pub fn with_pause(mut self, pause: impl FnMut(Duration) + Send + 'static) -> Self {
        self.pause = Box::new(pause);
        self
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn print_banner(&mut self, prompt: &GatePrompt<'_>) -> Result<()> {
        let out = &mut self.output;
        writeln!(out)?;
        let heading = format!("{} {}", prompt.action, prompt.target);
        if prompt.destructive {
            writeln!(out, "{}", format!("⚠ {}", heading).red().bold())?;
        } else {
            writeln!(out, "{}", heading.blue().bold())?;
        }
        writeln!(out, "  Resource group: {}", prompt.scope.cyan())?;
        writeln!(
            out,
            "  Estimated cost: {} ({})",
            prompt.cost.hourly_display().yellow(),
            prompt.cost.monthly_display()
        )?;
        if prompt.cost.monthly_budget_usd.is_some() {
            writeln!(out, "  Monthly budget: {}", prompt.cost.budget_display())?;
        }
        if prompt.cost.exceeds_budget() {
            writeln!(
                out,
                "  {}",
                "Running all month would exceed the budget".yellow()
            )?;
        }
        if prompt.destructive {
            writeln!(
                out,
                "  {}",
                "All resources will be deleted. Data cannot be recovered.".red()
            )?;
        }
        writeln!(out)?;
        Ok(())
    }

    fn read_phrase(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']);
        Ok(Some(trimmed.to_string()))
    }

    fn countdown(&mut self, secs: u64) -> Result<()> {
        for remaining in (1..=secs).rev() {
            writeln!(
                self.output,
                "  Proceeding in {}... (Ctrl-C to cancel)",
                remaining.to_string().red().bold()
            )?;
            self.output.flush()?;
            (self.pause)(Duration::from_secs(1));
        }
        Ok(())
    }
}

impl<R: BufRead, W: Write> Confirm for CostGate<R, W> {
    fn confirm(&mut self, prompt: &GatePrompt<'_>) -> Result<GateDecision> {
        self.print_banner(prompt)?;

        let total = prompt.policy.phrases.len();
        for (i, expected) in prompt.policy.phrases.iter().enumerate() {
            if total > 1 {
                write!(self.output, "[{}/{}] ", i + 1, total)?;
            }
            write!(self.output, "Type '{}' to continue: ", expected.bold())?;
            self.output.flush()?;

            let matched = matches!(self.read_phrase()?, Some(ref typed) if typed == expected);
            if !matched {
                writeln!(self.output)?;
                writeln!(
                    self.output,
                    "{}",
                    "Confirmation did not match. Nothing was changed.".yellow()
                )?;
                tracing::info!(
                    action = prompt.action,
                    target = prompt.target,
                    step = i + 1,
                    "Gate aborted"
                );
                return Ok(GateDecision::Aborted {
                    step: i + 1,
                    expected: expected.clone(),
                });
            }
        }

        self.countdown(prompt.policy.countdown_secs)?;
        tracing::info!(action = prompt.action, target = prompt.target, "Gate confirmed");
        Ok(GateDecision::Confirmed)
    }
}
