//! Warehouse transformation runner.
//!
//! The transform stage is a fixed sequence of external tool invocations:
//! build the silver models, take snapshots, build the gold models, then
//! generate documentation. Each step runs in the project directory with
//! `--profiles-dir` appended and the first failing step stops the run.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;

use tracing::{error, info, info_span};

use crate::error::{PipelineError, Result};

/// Default transformation tool executable.
pub const DEFAULT_TOOL: &str = "dbt";

/// One invocation of the transformation tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformStep {
    pub task_id: String,
    /// Tool arguments, `--profiles-dir` excluded.
    pub args: Vec<String>,
}

impl TransformStep {
    fn new(task_id: &str, args: &[&str]) -> Self {
        Self {
            task_id: task_id.to_string(),
            args: args.iter().map(|arg| (*arg).to_string()).collect(),
        }
    }
}

/// Ordered transformation steps and where to run them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformPlan {
    pub tool: String,
    pub project_dir: PathBuf,
    pub profiles_dir: PathBuf,
    pub steps: Vec<TransformStep>,
}

impl TransformPlan {
    /// Silver build, snapshots, gold build, docs.
    pub fn standard(
        tool: impl Into<String>,
        project_dir: impl Into<PathBuf>,
        profiles_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            tool: tool.into(),
            project_dir: project_dir.into(),
            profiles_dir: profiles_dir.into(),
            steps: vec![
                TransformStep::new("dbt_build_silver", &["build", "--select", "silver"]),
                TransformStep::new("dbt_snapshots", &["snapshot"]),
                TransformStep::new("dbt_build_gold", &["build", "--select", "gold"]),
                TransformStep::new("dbt_docs_generate", &["docs", "generate"]),
            ],
        }
    }

    /// Full argument list for `step`.
    pub fn command_args(&self, step: &TransformStep) -> Vec<String> {
        let mut args = step.args.clone();
        args.push("--profiles-dir".to_string());
        args.push(self.profiles_dir.display().to_string());
        args
    }

    /// Printable command line for `step`.
    pub fn command_line(&self, step: &TransformStep) -> String {
        std::iter::once(self.tool.clone())
            .chain(self.command_args(step))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Executes external programs.
pub trait CommandRunner {
    /// Runs `program` to completion in `cwd` and returns its exit code
    /// (`None` when terminated by a signal).
    fn run(&mut self, program: &str, args: &[String], cwd: &Path) -> io::Result<Option<i32>>;
}

/// Runs commands as child processes sharing this process's stdio.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&mut self, program: &str, args: &[String], cwd: &Path) -> io::Result<Option<i32>> {
        let status = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .status()?;
        Ok(status.code())
    }
}

/// A step that ran successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub task_id: String,
    pub command: String,
    pub duration_ms: u128,
}

/// Runs every step of `plan` in order, stopping at the first failure.
pub fn run_transform(
    plan: &TransformPlan,
    runner: &mut dyn CommandRunner,
) -> Result<Vec<StepOutcome>> {
    let mut outcomes = Vec::with_capacity(plan.steps.len());
    for step in &plan.steps {
        let span = info_span!("transform_step", task_id = %step.task_id);
        let _guard = span.enter();
        let command = plan.command_line(step);
        info!(command = %command, "running step");

        let start = Instant::now();
        let code = runner
            .run(&plan.tool, &plan.command_args(step), &plan.project_dir)
            .map_err(|source| PipelineError::Spawn {
                step: step.task_id.clone(),
                program: plan.tool.clone(),
                source,
            })?;
        if code != Some(0) {
            error!(?code, "step failed");
            return Err(PipelineError::StepFailed {
                step: step.task_id.clone(),
                code,
            });
        }

        let duration_ms = start.elapsed().as_millis();
        info!(duration_ms, "step finished");
        outcomes.push(StepOutcome {
            task_id: step.task_id.clone(),
            command,
            duration_ms,
        });
    }
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingRunner {
        calls: Vec<(String, Vec<String>, PathBuf)>,
        fail_on_call: Option<(usize, Option<i32>)>,
        spawn_error: bool,
    }

    impl CommandRunner for RecordingRunner {
        fn run(&mut self, program: &str, args: &[String], cwd: &Path) -> io::Result<Option<i32>> {
            if self.spawn_error {
                return Err(io::Error::new(io::ErrorKind::NotFound, "no such program"));
            }
            let index = self.calls.len();
            self.calls
                .push((program.to_string(), args.to_vec(), cwd.to_path_buf()));
            match self.fail_on_call {
                Some((fail, code)) if fail == index => Ok(code),
                _ => Ok(Some(0)),
            }
        }
    }

    fn plan() -> TransformPlan {
        TransformPlan::standard("dbt", "/opt/airflow/dbt", "/opt/airflow/dbt")
    }

    #[test]
    fn standard_plan_orders_steps() {
        let ids: Vec<_> = plan().steps.into_iter().map(|s| s.task_id).collect();
        assert_eq!(
            ids,
            [
                "dbt_build_silver",
                "dbt_snapshots",
                "dbt_build_gold",
                "dbt_docs_generate"
            ]
        );
    }

    #[test]
    fn command_line_appends_profiles_dir() {
        let plan = plan();
        assert_eq!(
            plan.command_line(&plan.steps[0]),
            "dbt build --select silver --profiles-dir /opt/airflow/dbt"
        );
        assert_eq!(
            plan.command_line(&plan.steps[3]),
            "dbt docs generate --profiles-dir /opt/airflow/dbt"
        );
    }

    #[test]
    fn runs_all_steps_in_project_dir() {
        let mut runner = RecordingRunner::default();
        let outcomes = run_transform(&plan(), &mut runner).unwrap();
        assert_eq!(outcomes.len(), 4);
        assert_eq!(runner.calls.len(), 4);
        for (program, args, cwd) in &runner.calls {
            assert_eq!(program, "dbt");
            assert_eq!(cwd, Path::new("/opt/airflow/dbt"));
            assert_eq!(args[args.len() - 2], "--profiles-dir");
        }
        assert_eq!(runner.calls[1].1[0], "snapshot");
    }

    #[test]
    fn stops_at_first_failure() {
        let mut runner = RecordingRunner {
            fail_on_call: Some((1, Some(2))),
            ..Default::default()
        };
        let err = run_transform(&plan(), &mut runner).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::StepFailed { ref step, code: Some(2) } if step == "dbt_snapshots"
        ));
        assert_eq!(runner.calls.len(), 2);
        assert_eq!(err.to_string(), "step dbt_snapshots failed with exit code 2");
    }

    #[test]
    fn signal_termination_is_a_failure() {
        let mut runner = RecordingRunner {
            fail_on_call: Some((0, None)),
            ..Default::default()
        };
        let err = run_transform(&plan(), &mut runner).unwrap_err();
        assert!(matches!(err, PipelineError::StepFailed { code: None, .. }));
    }

    #[test]
    fn spawn_error_names_the_step() {
        let mut runner = RecordingRunner {
            spawn_error: true,
            ..Default::default()
        };
        let err = run_transform(&plan(), &mut runner).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Spawn { ref step, .. } if step == "dbt_build_silver"
        ));
    }
}
