//! Environment lifecycle controller
//!
//! Sequences the phases of every command: authenticate, enumerate, gate,
//! act, verify. All cloud access goes through the provider handle, so the
//! whole flow runs against the in-memory provider in tests.

use crate::utils;
use anyhow::Context;
use colored::Colorize;
use envctl_cloud::{
    CloudProvider, DeletionGraph, Expectation, JobResult, ProvisionTarget, TeardownPlan,
    TeardownReport, Verifier, VerifyOutcome, run_all, teardown,
};
use envctl_core::{Confirm, ConfirmationPolicy, CostEstimate, Environment, GateDecision, GatePrompt, Manifest};
use std::sync::Arc;
use std::time::Duration;

/// Result of tearing one environment down, after the gate
#[derive(Debug)]
pub enum TeardownOutcome {
    /// The resource group did not exist; nothing was done
    AlreadyAbsent,
    Completed {
        report: TeardownReport,
        /// `None` when the group deletion failed and there was nothing to wait for
        verify: Option<VerifyOutcome>,
    },
}

impl TeardownOutcome {
    /// Only a failed resource-group deletion fails a teardown
    pub fn succeeded(&self) -> bool {
        match self {
            TeardownOutcome::AlreadyAbsent => true,
            TeardownOutcome::Completed { report, .. } => report.group_deleted(),
        }
    }
}

#[derive(Debug)]
pub enum ShutdownOutcome {
    Aborted(GateDecision),
    Finished(TeardownOutcome),
}

#[derive(Debug)]
pub enum StartupOutcome {
    Aborted(GateDecision),
    Provisioned(VerifyOutcome),
}

#[derive(Debug)]
pub enum EmergencyOutcome {
    Aborted(GateDecision),
    /// One entry per environment, in configuration order
    Finished(Vec<JobResult<Result<TeardownOutcome, String>>>),
}

impl EmergencyOutcome {
    /// Environments whose teardown failed or panicked
    pub fn failures(&self) -> Vec<String> {
        match self {
            EmergencyOutcome::Aborted(_) => Vec::new(),
            EmergencyOutcome::Finished(results) => results
                .iter()
                .filter(|r| !matches!(&r.outcome, Ok(Ok(outcome)) if outcome.succeeded()))
                .map(|r| r.label.clone())
                .collect(),
        }
    }
}

#[derive(Clone)]
pub struct LifecycleController {
    provider: Arc<dyn CloudProvider>,
    graph: DeletionGraph,
    verifier: Verifier,
    default_location: String,
}

impl LifecycleController {
    /// Build the controller and check the teardown graph
    ///
    /// Teardown rules from the config are added on top of the provider's
    /// catalog. A cycle is rejected here, before any cloud call.
    pub fn new(provider: Arc<dyn CloudProvider>, manifest: &Manifest) -> anyhow::Result<Self> {
        let graph = teardown_graph(provider.as_ref(), manifest)?;
        let verifier = Verifier::new(
            Duration::from_secs(manifest.verify.interval_secs),
            manifest.verify.attempts,
        );
        Ok(Self {
            provider,
            graph,
            verifier,
            default_location: manifest.location.clone(),
        })
    }

    pub fn with_verifier(mut self, verifier: Verifier) -> Self {
        self.verifier = verifier;
        self
    }

    pub fn provider(&self) -> &dyn CloudProvider {
        self.provider.as_ref()
    }

    /// Fail fast unless the provider CLI is logged in
    pub async fn authenticate(&self) -> anyhow::Result<String> {
        let status = self.provider.check_auth().await?;
        if !status.authenticated {
            anyhow::bail!(
                "Not authenticated with {}: {}",
                self.provider.display_name(),
                status.error.unwrap_or_else(|| "unknown reason".to_string())
            );
        }
        let account = status.account_info.unwrap_or_default();
        println!("  ✓ Authenticated: {}", account.cyan());
        Ok(account)
    }

    /// Teardown plan for an environment, `None` when its group is absent
    pub async fn plan(&self, env: &Environment) -> anyhow::Result<Option<TeardownPlan>> {
        if !self.provider.group_exists(&env.resource_group).await? {
            return Ok(None);
        }
        let resources = self
            .provider
            .list_resources(&env.resource_group)
            .await
            .with_context(|| format!("Failed to list resources in {}", env.resource_group))?;
        let plan = TeardownPlan::build(&env.resource_group, resources, &self.graph)?;
        Ok(Some(plan))
    }

    /// auth → enumerate → gate → teardown → verify
    pub async fn shutdown(
        &self,
        env: &Environment,
        gate: &mut dyn Confirm,
    ) -> anyhow::Result<ShutdownOutcome> {
        println!(
            "{}",
            format!("Shutting down environment '{}'...", env.name)
                .blue()
                .bold()
        );
        self.authenticate().await?;

        let Some(plan) = self.plan(env).await? else {
            println!(
                "  ✓ Resource group {} does not exist, nothing to shut down",
                env.resource_group.cyan()
            );
            return Ok(ShutdownOutcome::Finished(TeardownOutcome::AlreadyAbsent));
        };

        println!();
        utils::print_plan(&plan);

        let prompt = GatePrompt {
            action: "Shut down",
            target: &env.name,
            scope: &env.resource_group,
            cost: env.cost,
            policy: &env.shutdown,
            destructive: true,
        };
        let decision = gate.confirm(&prompt)?;
        if !decision.is_confirmed() {
            return Ok(ShutdownOutcome::Aborted(decision));
        }

        let outcome = self.run_teardown(&plan, None).await;
        Ok(ShutdownOutcome::Finished(outcome))
    }

    /// Plan and tear down without a gate (emergency fan-out)
    pub async fn teardown_environment(
        &self,
        env: &Environment,
    ) -> anyhow::Result<TeardownOutcome> {
        match self.plan(env).await? {
            Some(plan) => Ok(self.run_teardown(&plan, Some(&env.name)).await),
            None => {
                println!(
                    "{}  ✓ Resource group {} does not exist",
                    format!("[{}]", env.name).cyan(),
                    env.resource_group
                );
                Ok(TeardownOutcome::AlreadyAbsent)
            }
        }
    }

    async fn run_teardown(&self, plan: &TeardownPlan, prefix: Option<&str>) -> TeardownOutcome {
        let report = teardown::execute(self.provider.as_ref(), plan, &mut |event| {
            utils::print_teardown_event(prefix, &event)
        })
        .await;
        utils::print_report(prefix, &report);

        let verify = if report.group_deleted() {
            Some(
                self.wait_for(&plan.resource_group, Expectation::Absent, prefix)
                    .await,
            )
        } else {
            None
        };

        TeardownOutcome::Completed { report, verify }
    }

    /// auth → gate → provision → verify
    pub async fn startup(
        &self,
        env: &Environment,
        gate: &mut dyn Confirm,
    ) -> anyhow::Result<StartupOutcome> {
        println!(
            "{}",
            format!("Starting environment '{}'...", env.name)
                .blue()
                .bold()
        );
        self.authenticate().await?;

        if self.provider.group_exists(&env.resource_group).await? {
            println!(
                "  Resource group {} already exists, provisioning will update it",
                env.resource_group.cyan()
            );
        }

        let prompt = GatePrompt {
            action: "Start up",
            target: &env.name,
            scope: &env.resource_group,
            cost: env.cost,
            policy: &env.startup,
            destructive: false,
        };
        let decision = gate.confirm(&prompt)?;
        if !decision.is_confirmed() {
            return Ok(StartupOutcome::Aborted(decision));
        }

        let target = ProvisionTarget {
            environment: env.name.clone(),
            resource_group: env.resource_group.clone(),
            location: env
                .location
                .clone()
                .unwrap_or_else(|| self.default_location.clone()),
        };

        let spinner = utils::Spinner::new(&format!("Provisioning {}...", env.resource_group));
        if let Err(e) = self.provider.provision(&target).await {
            spinner.finish_error(&e.to_string());
            return Err(e).with_context(|| format!("Provisioning '{}' failed", env.name));
        }
        spinner.finish_success(&format!("Provisioned {}", env.resource_group));

        let expectation = Expectation::Present {
            min_resources: env.expected_resources.unwrap_or(0),
        };
        let verify = self.wait_for(&env.resource_group, expectation, None).await;
        Ok(StartupOutcome::Provisioned(verify))
    }

    /// Poll until the group matches `expectation`, printing each check
    pub async fn wait_for(
        &self,
        group: &str,
        expectation: Expectation,
        prefix: Option<&str>,
    ) -> VerifyOutcome {
        let max_attempts = self.verifier.max_attempts();
        utils::print_wait_start(prefix, group, expectation, &self.verifier);
        let outcome = self
            .verifier
            .wait_for(
                self.provider.as_ref(),
                group,
                expectation,
                &mut |attempt, observation| {
                    utils::print_poll(prefix, attempt, max_attempts, observation)
                },
            )
            .await;
        utils::print_verify_outcome(prefix, group, expectation, &outcome);
        outcome
    }

    /// One gate, then every environment torn down concurrently
    ///
    /// Returns only after every environment's teardown has finished.
    pub async fn emergency_shutdown(
        &self,
        environments: &[Environment],
        policy: &ConfirmationPolicy,
        gate: &mut dyn Confirm,
    ) -> anyhow::Result<EmergencyOutcome> {
        println!("{}", "EMERGENCY SHUTDOWN OF ALL ENVIRONMENTS".red().bold());
        self.authenticate().await?;

        let groups: Vec<&str> = environments
            .iter()
            .map(|e| e.resource_group.as_str())
            .collect();
        let scope = groups.join(", ");
        let cost = CostEstimate::combined(environments.iter().map(|e| &e.cost));
        let prompt = GatePrompt {
            action: "EMERGENCY shutdown of",
            target: "all environments",
            scope: &scope,
            cost,
            policy,
            destructive: true,
        };
        let decision = gate.confirm(&prompt)?;
        if !decision.is_confirmed() {
            return Ok(EmergencyOutcome::Aborted(decision));
        }

        let jobs = environments
            .iter()
            .map(|env| {
                let controller = self.clone();
                let label = env.name.clone();
                let env = env.clone();
                let job = async move {
                    controller
                        .teardown_environment(&env)
                        .await
                        .map_err(|e| format!("{:#}", e))
                };
                (label, job)
            })
            .collect::<Vec<_>>();

        tracing::info!(environments = jobs.len(), "Starting emergency teardown");
        let results = run_all(jobs).await;
        Ok(EmergencyOutcome::Finished(results))
    }
}

/// Provider catalog plus config rules, checked for cycles
pub fn teardown_graph(provider: &dyn CloudProvider, manifest: &Manifest) -> anyhow::Result<DeletionGraph> {
    let mut graph = provider.deletion_graph();
    for rule in &manifest.teardown_rules {
        graph.delete_before(&rule.resource_type, &rule.before);
    }
    graph
        .validate()
        .context("Invalid teardown rules in configuration")?;
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use envctl_cloud::mock::MockProvider;
    use envctl_cloud::{CloudResource, Observation};
    use envctl_cloud_azure::catalog;
    use envctl_core::defaults::builtin_manifest;
    use envctl_core::{CostGate, Preconfirmed, TeardownRule};
    use std::io::Cursor;

    fn res(group: &str, name: &str, resource_type: &str) -> CloudResource {
        CloudResource::new(
            format!("/subscriptions/0000/resourceGroups/{}/providers/{}/{}", group, resource_type, name),
            name,
            resource_type,
        )
        .with_location("eastus")
    }

    fn it_resources() -> Vec<CloudResource> {
        let g = "rg-webplatform-it";
        vec![
            res(g, "kv-webplatform-it", catalog::KEY_VAULT),
            res(g, "kv-webplatform-it-secrets", catalog::KEY_VAULT),
            res(g, "cae-webplatform-it", catalog::MANAGED_ENVIRONMENTS),
            res(g, "ca-web", catalog::CONTAINER_APPS),
            res(g, "ca-api", catalog::CONTAINER_APPS),
            res(g, "stwebplatformit", "Microsoft.Storage/storageAccounts"),
            res(g, "psql-webplatform-it", "Microsoft.DBforPostgreSQL/flexibleServers"),
            res(g, "log-webplatform-it", "Microsoft.OperationalInsights/workspaces"),
            res(g, "appi-webplatform-it", "Microsoft.Insights/components"),
            res(g, "id-webplatform-it", "Microsoft.ManagedIdentity/userAssignedIdentities"),
        ]
    }

    fn provider_with_it() -> MockProvider {
        MockProvider::builder()
            .graph(catalog::deletion_graph())
            .group("rg-webplatform-it", it_resources())
            .build()
    }

    fn controller(provider: Arc<MockProvider>) -> LifecycleController {
        LifecycleController::new(provider, &builtin_manifest())
            .unwrap()
            .with_verifier(Verifier::new(Duration::from_millis(1), 3))
    }

    fn typed(input: &str) -> CostGate<Cursor<Vec<u8>>, Vec<u8>> {
        CostGate::new(Cursor::new(input.as_bytes().to_vec()), Vec::new()).with_pause(|_| {})
    }

    fn env(name: &str) -> Environment {
        builtin_manifest().environment(name).unwrap().clone()
    }

    fn position(calls: &[String], call: &str) -> usize {
        calls
            .iter()
            .position(|c| c == call)
            .unwrap_or_else(|| panic!("{} was not called", call))
    }

    #[tokio::test]
    async fn test_it_shutdown_scenario() {
        let provider = Arc::new(provider_with_it());
        let ctl = controller(provider.clone());
        let mut gate = typed("DELETE-IT-ENVIRONMENT\n");

        let outcome = ctl.shutdown(&env("it"), &mut gate).await.unwrap();

        match outcome {
            ShutdownOutcome::Finished(TeardownOutcome::Completed { report, verify }) => {
                assert!(report.result.is_success());
                assert_eq!(report.deleted(), it_resources().len());
                assert_eq!(report.purged(), 2);
                assert!(verify.unwrap().is_confirmed());
            }
            other => panic!("unexpected outcome {:?}", other),
        }

        // Zero resources, no group, every vault purged
        assert!(!provider.has_group("rg-webplatform-it"));
        assert!(provider.soft_deleted().is_empty());

        let calls = provider.calls();
        assert!(position(&calls, "delete:ca-web") < position(&calls, "delete:cae-webplatform-it"));
        assert!(position(&calls, "delete:ca-api") < position(&calls, "delete:cae-webplatform-it"));
        assert!(
            position(&calls, "delete:appi-webplatform-it")
                < position(&calls, "delete:log-webplatform-it")
        );
        assert_eq!(calls.last().unwrap(), "delete_group:rg-webplatform-it");
    }

    #[tokio::test]
    async fn test_mismatched_phrase_changes_nothing() {
        let provider = Arc::new(provider_with_it());
        let ctl = controller(provider.clone());

        for input in ["DELETE-QA-ENVIRONMENT\n", "delete-it-environment\n", " DELETE-IT-ENVIRONMENT\n", ""] {
            let mut gate = typed(input);
            let outcome = ctl.shutdown(&env("it"), &mut gate).await.unwrap();
            assert!(matches!(outcome, ShutdownOutcome::Aborted(_)), "input {:?}", input);
        }

        assert!(provider.calls().is_empty());
        assert_eq!(provider.resources("rg-webplatform-it").len(), it_resources().len());
    }

    #[tokio::test]
    async fn test_shutdown_of_absent_group_is_noop() {
        let provider = Arc::new(MockProvider::builder().graph(catalog::deletion_graph()).build());
        let ctl = controller(provider.clone());
        // No input: the gate must not even be reached
        let mut gate = typed("");

        let outcome = ctl.shutdown(&env("it"), &mut gate).await.unwrap();

        match outcome {
            ShutdownOutcome::Finished(outcome) => {
                assert!(matches!(outcome, TeardownOutcome::AlreadyAbsent));
                assert!(outcome.succeeded());
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(provider.calls().is_empty());
        assert!(gate.into_output().is_empty());
    }

    #[tokio::test]
    async fn test_shutdown_twice_is_idempotent() {
        let provider = Arc::new(provider_with_it());
        let ctl = controller(provider.clone());

        let first = ctl.shutdown(&env("it"), &mut Preconfirmed).await.unwrap();
        assert!(matches!(first, ShutdownOutcome::Finished(TeardownOutcome::Completed { .. })));
        let calls_after_first = provider.calls().len();

        let second = ctl.shutdown(&env("it"), &mut Preconfirmed).await.unwrap();
        assert!(matches!(second, ShutdownOutcome::Finished(TeardownOutcome::AlreadyAbsent)));
        assert_eq!(provider.calls().len(), calls_after_first);
    }

    #[tokio::test]
    async fn test_production_needs_every_phrase() {
        let resources = vec![res("rg-webplatform-prod", "ca-web", catalog::CONTAINER_APPS)];
        let provider = Arc::new(
            MockProvider::builder()
                .graph(catalog::deletion_graph())
                .group("rg-webplatform-prod", resources)
                .build(),
        );
        let ctl = controller(provider.clone());

        // Right phrases, wrong order
        let mut gate = typed("I UNDERSTAND THIS CANNOT BE UNDONE\nDELETE-PRODUCTION\nDELETE-PROD-ENVIRONMENT\n");
        let outcome = ctl.shutdown(&env("prod"), &mut gate).await.unwrap();
        assert!(matches!(outcome, ShutdownOutcome::Aborted(GateDecision::Aborted { step: 1, .. })));
        assert!(provider.calls().is_empty());

        let mut gate = typed("DELETE-PRODUCTION\nI UNDERSTAND THIS CANNOT BE UNDONE\nDELETE-PROD-ENVIRONMENT\n");
        let outcome = ctl.shutdown(&env("prod"), &mut gate).await.unwrap();
        assert!(matches!(outcome, ShutdownOutcome::Finished(ref o) if o.succeeded()));
        assert!(!provider.has_group("rg-webplatform-prod"));
    }

    #[tokio::test]
    async fn test_group_deletion_failure_fails_teardown() {
        let provider = Arc::new(
            MockProvider::builder()
                .graph(catalog::deletion_graph())
                .group("rg-webplatform-it", it_resources())
                .failing_delete("psql-webplatform-it")
                .failing_group_delete("rg-webplatform-it")
                .build(),
        );
        let ctl = controller(provider.clone());

        let outcome = ctl.shutdown(&env("it"), &mut Preconfirmed).await.unwrap();
        match outcome {
            ShutdownOutcome::Finished(outcome) => {
                assert!(!outcome.succeeded());
                if let TeardownOutcome::Completed { report, verify } = outcome {
                    assert_eq!(report.result.failed.len(), 2);
                    assert!(verify.is_none());
                }
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_resource_failure_does_not_fail_teardown() {
        let provider = Arc::new(
            MockProvider::builder()
                .graph(catalog::deletion_graph())
                .group("rg-webplatform-it", it_resources())
                .failing_delete("ca-web")
                .build(),
        );
        let ctl = controller(provider.clone());

        let outcome = ctl.shutdown(&env("it"), &mut Preconfirmed).await.unwrap();
        match outcome {
            ShutdownOutcome::Finished(outcome) => assert!(outcome.succeeded()),
            other => panic!("unexpected outcome {:?}", other),
        }
        // Later steps still ran
        assert!(provider.calls().contains(&"delete:cae-webplatform-it".to_string()));
    }

    #[tokio::test]
    async fn test_unauthenticated_fails_fast() {
        let provider = Arc::new(
            MockProvider::builder()
                .graph(catalog::deletion_graph())
                .group("rg-webplatform-it", it_resources())
                .logged_out()
                .build(),
        );
        let ctl = controller(provider.clone());

        let err = ctl.shutdown(&env("it"), &mut Preconfirmed).await.unwrap_err();
        assert!(err.to_string().contains("Not authenticated"));
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn test_startup_provisions_and_verifies() {
        let template: Vec<CloudResource> = it_resources();
        let mut it = env("it");
        it.expected_resources = Some(template.len());
        let provider = Arc::new(
            MockProvider::builder()
                .graph(catalog::deletion_graph())
                .template("rg-webplatform-it", template)
                .build(),
        );
        let ctl = controller(provider.clone());
        let mut gate = typed("Yes\n");

        let outcome = ctl.startup(&it, &mut gate).await.unwrap();

        match outcome {
            StartupOutcome::Provisioned(verify) => assert!(verify.is_confirmed()),
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(provider.calls(), vec!["provision:rg-webplatform-it"]);
    }

    #[tokio::test]
    async fn test_startup_short_of_expected_resources_times_out() {
        let provider = Arc::new(
            MockProvider::builder()
                .template("rg-webplatform-it", it_resources())
                .build(),
        );
        let ctl = controller(provider.clone());

        // Built-in `it` expects 14 resources
        let outcome = ctl.startup(&env("it"), &mut Preconfirmed).await.unwrap();
        match outcome {
            StartupOutcome::Provisioned(VerifyOutcome::TimedOut { last, .. }) => {
                assert_eq!(
                    last,
                    Some(Observation {
                        exists: true,
                        resources: it_resources().len()
                    })
                );
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_startup_aborted_never_provisions() {
        let provider = Arc::new(MockProvider::new());
        let ctl = controller(provider.clone());
        let mut gate = typed("yes\n");

        let outcome = ctl.startup(&env("qa"), &mut gate).await.unwrap();
        assert!(matches!(outcome, StartupOutcome::Aborted(_)));
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn test_startup_provision_failure_is_fatal() {
        let provider = Arc::new(MockProvider::builder().failing_provision().build());
        let ctl = controller(provider.clone());

        let err = ctl.startup(&env("qa"), &mut Preconfirmed).await.unwrap_err();
        assert!(format!("{:#}", err).contains("deployment failed"));
    }

    #[tokio::test]
    async fn test_emergency_joins_every_environment() {
        let manifest = builtin_manifest();
        let mut builder = MockProvider::builder()
            .graph(catalog::deletion_graph())
            .delay(Duration::from_millis(5));
        for env in &manifest.environments {
            let g = env.resource_group.as_str();
            builder = builder.group(
                g,
                vec![
                    res(g, &format!("ca-{}", env.name), catalog::CONTAINER_APPS),
                    res(g, &format!("kv-{}", env.name), catalog::KEY_VAULT),
                ],
            );
        }
        let provider = Arc::new(builder.build());
        let ctl = controller(provider.clone());
        let mut gate = typed("EMERGENCY-SHUTDOWN-ALL\n");

        let outcome = ctl
            .emergency_shutdown(&manifest.environments, &manifest.emergency, &mut gate)
            .await
            .unwrap();

        // Every child finished before the call returned
        for env in &manifest.environments {
            assert!(!provider.has_group(&env.resource_group));
        }
        assert!(provider.soft_deleted().is_empty());
        assert!(outcome.failures().is_empty());
        match outcome {
            EmergencyOutcome::Finished(results) => {
                let labels: Vec<&str> = results.iter().map(|r| r.label.as_str()).collect();
                assert_eq!(labels, vec!["it", "qa", "prod"]);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_emergency_reports_partial_failure() {
        let manifest = builtin_manifest();
        let provider = Arc::new(
            MockProvider::builder()
                .graph(catalog::deletion_graph())
                .group("rg-webplatform-it", Vec::new())
                .group("rg-webplatform-qa", Vec::new())
                .failing_group_delete("rg-webplatform-qa")
                .build(),
        );
        let ctl = controller(provider.clone());

        let outcome = ctl
            .emergency_shutdown(&manifest.environments, &manifest.emergency, &mut Preconfirmed)
            .await
            .unwrap();

        assert_eq!(outcome.failures(), vec!["qa"]);
        assert!(!provider.has_group("rg-webplatform-it"));
    }

    #[tokio::test]
    async fn test_emergency_gate_mismatch() {
        let manifest = builtin_manifest();
        let provider = Arc::new(
            MockProvider::builder()
                .group("rg-webplatform-it", Vec::new())
                .build(),
        );
        let ctl = controller(provider.clone());
        let mut gate = typed("EMERGENCY-SHUTDOWN\n");

        let outcome = ctl
            .emergency_shutdown(&manifest.environments, &manifest.emergency, &mut gate)
            .await
            .unwrap();

        assert!(matches!(outcome, EmergencyOutcome::Aborted(_)));
        assert!(provider.has_group("rg-webplatform-it"));
        assert!(provider.calls().is_empty());
    }

    #[test]
    fn test_cyclic_rules_rejected_before_cloud_calls() {
        let mut manifest = builtin_manifest();
        manifest.teardown_rules.push(TeardownRule::new(
            catalog::MANAGED_ENVIRONMENTS,
            catalog::CONTAINER_APPS,
        ));
        let provider = Arc::new(provider_with_it());

        let result = LifecycleController::new(provider.clone(), &manifest);
        assert!(result.is_err());
        assert!(provider.calls().is_empty());
    }

    #[test]
    fn test_config_rules_extend_catalog() {
        let mut manifest = builtin_manifest();
        manifest.teardown_rules.push(TeardownRule::new(
            "Microsoft.Search/searchServices",
            "Microsoft.Storage/storageAccounts",
        ));
        let provider = MockProvider::builder().graph(catalog::deletion_graph()).build();

        let graph = teardown_graph(&provider, &manifest).unwrap();
        let order: Vec<String> = graph
            .order()
            .unwrap()
            .iter()
            .map(|k| k.resource_type.clone())
            .collect();
        let search = order.iter().position(|t| t == "Microsoft.Search/searchServices").unwrap();
        let storage = order.iter().position(|t| t == "Microsoft.Storage/storageAccounts").unwrap();
        assert!(search < storage);
    }
}
