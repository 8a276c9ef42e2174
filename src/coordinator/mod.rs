//! Build coordinator: plan → initialize → queue → drain → preview.
//!
//! Planning and initialization failures halt the build before any task is
//! queued. Once draining starts, each task fails on its own and the queue
//! keeps going. The coordinator exclusively owns the project directory for
//! the duration of a build; running two builds against the same codename at
//! once is the caller's responsibility to avoid.

pub mod preview;
pub mod project;
pub mod queue;
pub mod reporter;

pub use preview::PreviewServer;
pub use project::{initialize_project, validate_repo_url};
pub use queue::TaskQueue;
pub use reporter::{ConsoleReporter, Reporter};

use crate::agent::{prompts, AgentTurn, ComponentAgent, DependencyAgent, InstallKind, PlannerAgent};
use crate::config::ForgeConfig;
use crate::error::{BuildError, PlanError};
use crate::inference::ChatBackend;
use crate::types::*;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// How a drained task ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TaskOutcome {
    Completed { outputs: Vec<String> },
    Failed { reason: String },
    Skipped { reason: String },
}

impl TaskOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskReport {
    pub task: Task,
    pub outcome: TaskOutcome,
}

/// What a finished build produced.
#[derive(Debug, Clone, Serialize)]
pub struct BuildSummary {
    pub build_id: String,
    pub codename: String,
    pub project_path: PathBuf,
    pub reports: Vec<TaskReport>,
    /// Set when the preview server started.
    pub preview_url: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BuildSummary {
    pub fn failed_tasks(&self) -> usize {
        self.reports.iter().filter(|r| !r.outcome.is_completed()).count()
    }
}

/// Read the template-conventions document, or return an empty string.
pub fn load_template_context(path: &Path) -> String {
    match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            warn!("Template context {} not loaded: {}", path.display(), e);
            String::new()
        }
    }
}

pub struct Coordinator {
    config: ForgeConfig,
    planner: PlannerAgent,
    component_agent: ComponentAgent,
    dependency_agent: DependencyAgent,
    reporter: Arc<dyn Reporter>,
    queue: TaskQueue,
    phase: BuildPhase,
    project_path: Option<PathBuf>,
    preview: Option<PreviewServer>,
}

impl Coordinator {
    /// Build a coordinator, loading template conventions from the configured path.
    pub fn new(
        config: ForgeConfig,
        backend: Arc<dyn ChatBackend>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        let template_context = load_template_context(&config.resolved_template_context_path());
        Self::with_template_context(config, backend, reporter, &template_context)
    }

    pub fn with_template_context(
        config: ForgeConfig,
        backend: Arc<dyn ChatBackend>,
        reporter: Arc<dyn Reporter>,
        template_context: &str,
    ) -> Self {
        Self {
            planner: PlannerAgent::new(backend.clone(), template_context),
            component_agent: ComponentAgent::new(backend.clone(), template_context),
            dependency_agent: DependencyAgent::new(backend),
            config,
            reporter,
            queue: TaskQueue::new(),
            phase: BuildPhase::Idle,
            project_path: None,
            preview: None,
        }
    }

    pub fn phase(&self) -> BuildPhase {
        self.phase
    }

    pub fn project_path(&self) -> Option<&Path> {
        self.project_path.as_deref()
    }

    pub fn preview(&self) -> Option<&PreviewServer> {
        self.preview.as_ref()
    }

    pub fn queue(&self) -> &TaskQueue {
        &self.queue
    }

    fn enter(&mut self, phase: BuildPhase) {
        info!("Build phase: {} -> {}", self.phase, phase);
        self.phase = phase;
    }

    fn halt(&mut self, err: BuildError) -> BuildError {
        self.enter(BuildPhase::Halted);
        err
    }

    /// Run a full build for `user_request` on top of `base_repo_url`.
    pub async fn run_frontend_build(
        &mut self,
        user_request: &str,
        base_repo_url: &str,
    ) -> Result<BuildSummary, BuildError> {
        let build_id = ulid::Ulid::new().to_string();
        let started_at = Utc::now();
        self.queue.clear();
        self.stop_preview().await;

        if let Err(reason) = validate_repo_url(base_repo_url, &self.config.allowed_repo_hosts) {
            self.reporter.error(&reason);
            return Err(self.halt(BuildError::InvalidRepo(reason)));
        }

        self.enter(BuildPhase::Planning);
        self.reporter.info("Step 1: Creating a high-level plan...");
        let plan = match self
            .planner
            .create_plan(&prompts::planning_context(user_request))
            .await
        {
            Ok(plan) => plan,
            Err(e) => {
                self.report_plan_failure(&e);
                return Err(self.halt(e.into()));
            }
        };
        self.reporter.success(&format!(
            "Plan created! Project codename: '{}'",
            plan.codename
        ));
        self.reporter.show_plan(&plan);

        self.enter(BuildPhase::Initializing);
        let workspace = self.config.resolved_workspace_dir();
        let project_path = std::path::absolute(&workspace)
            .unwrap_or(workspace)
            .join(&plan.codename);
        self.reporter.info(&format!(
            "Step 2: Initializing project '{}'...",
            project_path.display()
        ));
        if let Err(e) = initialize_project(&self.config, &project_path, base_repo_url).await {
            self.reporter.error(&e.to_string());
            return Err(self.halt(e.into()));
        }
        self.reporter.success("Project initialized successfully.");
        self.project_path = Some(project_path.clone());

        self.enter(BuildPhase::Queueing);
        self.queue = TaskQueue::from_plan(&plan);
        info!("Queued {} tasks for '{}'", self.queue.len(), plan.codename);

        self.enter(BuildPhase::Draining);
        let reports = self.process_task_queue().await;

        self.enter(BuildPhase::Finalizing);
        let preview_url = self.finalize_and_run_project(&plan.codename);

        self.enter(BuildPhase::Complete);
        Ok(BuildSummary {
            build_id,
            codename: plan.codename,
            project_path,
            reports,
            preview_url,
            started_at,
            finished_at: Utc::now(),
        })
    }

    fn report_plan_failure(&self, err: &PlanError) {
        self.reporter.error(&format!("Failed to create a valid plan: {err}"));
        match err.raw() {
            Some(raw) => self.reporter.tool_output(raw),
            None => self.reporter.tool_output("No plan returned."),
        }
    }

    /// Drain the queue strictly in FIFO order, one task at a time.
    pub async fn process_task_queue(&mut self) -> Vec<TaskReport> {
        self.reporter.info("Step 3: Processing task queue...");
        let project_path = self.project_path.clone().unwrap_or_else(|| PathBuf::from("."));

        let mut reports = Vec::with_capacity(self.queue.len());
        while let Some(task) = self.queue.pop() {
            self.reporter.info(&format!("Task: {}", task.kind()));
            let outcome = self.run_task(&task, &project_path).await;
            reports.push(TaskReport { task, outcome });
        }

        let failed = reports.iter().filter(|r| !r.outcome.is_completed()).count();
        if failed == 0 {
            self.reporter.success("All tasks completed!");
        } else {
            self.reporter.error(&format!(
                "{} of {} tasks did not complete.",
                failed,
                reports.len()
            ));
        }
        reports
    }

    async fn run_task(&self, task: &Task, project_path: &Path) -> TaskOutcome {
        match task {
            Task::NpmDependencies(deps) => self.install(InstallKind::Npm, deps, project_path).await,
            Task::ShadcnDependencies(deps) => {
                self.install(InstallKind::Shadcn, deps, project_path).await
            }
            Task::Component(spec) => self.write_component(spec, project_path).await,
        }
    }

    async fn install(&self, kind: InstallKind, deps: &[String], project_path: &Path) -> TaskOutcome {
        let turn = self
            .dependency_agent
            .install(deps, project_path, kind.instruction())
            .await;

        for result in turn.tool_results() {
            self.reporter.tool_output(&result.output);
        }

        if turn.all_tools_succeeded() {
            self.reporter.success(&format!("Finished {kind} installation."));
            return TaskOutcome::Completed {
                outputs: outputs_of(&turn),
            };
        }

        let reason = failure_reason(&turn);
        self.reporter
            .error(&format!("{kind} installation failed: {reason}"));
        TaskOutcome::Failed { reason }
    }

    async fn write_component(&self, spec: &ComponentSpec, project_path: &Path) -> TaskOutcome {
        let Some(file_path) = spec.path() else {
            let payload = serde_json::to_string(spec).unwrap_or_default();
            let reason = format!("Component missing file_path: {payload}");
            self.reporter.error(&reason);
            return TaskOutcome::Skipped { reason };
        };

        self.reporter.info(&format!("Creating Component: {file_path}"));
        let turn = self.component_agent.create_component(spec, project_path).await;

        let results = turn.tool_results();
        if results.is_empty() {
            let reason = failure_reason(&turn);
            self.reporter
                .error(&format!("Component agent failed for {file_path}: {reason}"));
            return TaskOutcome::Failed { reason };
        }

        for result in results {
            if result.success {
                self.reporter.success(&result.output);
            } else {
                self.reporter.error(&result.output);
            }
        }

        if turn.all_tools_succeeded() {
            TaskOutcome::Completed {
                outputs: outputs_of(&turn),
            }
        } else {
            TaskOutcome::Failed {
                reason: failure_reason(&turn),
            }
        }
    }

    /// Start the preview server. Failure is reported; the build still counts
    /// as complete.
    fn finalize_and_run_project(&mut self, codename: &str) -> Option<String> {
        self.reporter.info("Step 4: Starting the dev server...");
        let project_path = self.project_path.clone()?;

        match PreviewServer::start(
            &self.config.dev_command,
            &project_path,
            &self.config.preview_url,
        ) {
            Ok(server) => {
                let url = server.url().to_string();
                self.preview = Some(server);
                self.reporter.success("Dev server is starting...");
                self.reporter.success(&format!(
                    "Build Complete! Your project '{codename}' is running at {url}"
                ));
                Some(url)
            }
            Err(e) => {
                self.reporter
                    .error(&format!("Failed to start dev server: {e}"));
                None
            }
        }
    }

    /// Whether a preview server was started and has not exited.
    pub fn preview_running(&mut self) -> bool {
        self.preview.as_mut().is_some_and(PreviewServer::is_running)
    }

    /// Terminate the preview server, if one is running.
    pub async fn stop_preview(&mut self) {
        if let Some(mut server) = self.preview.take() {
            server.stop().await;
        }
    }
}

fn outputs_of(turn: &AgentTurn) -> Vec<String> {
    turn.tool_results().iter().map(|r| r.output.clone()).collect()
}

fn failure_reason(turn: &AgentTurn) -> String {
    match turn {
        AgentTurn::Unavailable(e) => format!("{}: {e}", crate::agent::UNAVAILABLE_TEXT),
        AgentTurn::Text(text) if text.trim().is_empty() => "agent made no tool call".into(),
        AgentTurn::Text(text) => format!("agent made no tool call: {}", text.trim()),
        AgentTurn::ToolResults(results) => results
            .iter()
            .filter(|r| !r.success)
            .map(|r| r.output.as_str())
            .collect::<Vec<_>>()
            .join("\n"),
    }
}
