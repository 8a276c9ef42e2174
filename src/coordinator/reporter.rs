//! Operator-facing progress output.

use crate::types::{Plan, Severity};
use colored::Colorize;
use tracing::{error, info};

/// Where build progress is shown to the operator.
///
/// Every halted or degraded step reaches at least one `log` call.
pub trait Reporter: Send + Sync {
    fn log(&self, severity: Severity, message: &str);

    /// Show the plan the build will follow.
    fn show_plan(&self, plan: &Plan) {
        let body = serde_json::to_string_pretty(plan).unwrap_or_else(|e| e.to_string());
        self.log(Severity::Info, &body);
    }

    /// Show raw tool output (command transcripts, write confirmations).
    fn tool_output(&self, output: &str) {
        self.log(Severity::Info, output);
    }

    fn info(&self, message: &str) {
        self.log(Severity::Info, message);
    }

    fn success(&self, message: &str) {
        self.log(Severity::Success, message);
    }

    fn error(&self, message: &str) {
        self.log(Severity::Error, message);
    }
}

/// Coloured terminal output, mirrored into `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn log(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Info => {
                info!("{}", message);
                println!("{} {}", "::".cyan().bold(), message);
            }
            Severity::Success => {
                info!("{}", message);
                println!("{} {}", "ok".green().bold(), message);
            }
            Severity::Error => {
                error!("{}", message);
                eprintln!("{} {}", "!!".red().bold(), message.red());
            }
        }
    }

    fn tool_output(&self, output: &str) {
        info!("tool output: {} chars", output.len());
        for line in output.lines() {
            println!("   {}", line.dimmed());
        }
    }
}

/// Collects every line in memory.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct MemoryReporter {
    lines: std::sync::Mutex<Vec<(Severity, String)>>,
}

#[cfg(test)]
impl MemoryReporter {
    pub fn lines(&self) -> Vec<(Severity, String)> {
        self.lines.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|(s, _)| *s == Severity::Error)
            .map(|(_, m)| m)
            .collect()
    }
}

#[cfg(test)]
impl Reporter for MemoryReporter {
    fn log(&self, severity: Severity, message: &str) {
        self.lines.lock().unwrap().push((severity, message.to_string()));
    }
}
