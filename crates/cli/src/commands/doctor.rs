use anyhow::{bail, Context};
use edubot_agent::build_llm_client;
use edubot_core::config::{AppConfig, LlmProvider, LoadOptions};
use edubot_core::faq::FaqMatcher;
use edubot_core::knowledge::KnowledgeBase;
use serde::Serialize;

use crate::commands::{CommandResult, EXIT_DOCTOR};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code = if report.overall_status == CheckStatus::Fail { EXIT_DOCTOR } else { 0 };

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(to_check("knowledge_base", check_knowledge_base(&config)));
            checks.push(check_llm_readiness(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["knowledge_base", "llm_readiness"] {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    let any_failed = checks.iter().any(|check| check.status == CheckStatus::Fail);
    let overall_status = if any_failed { CheckStatus::Fail } else { CheckStatus::Pass };
    let summary = if any_failed {
        "doctor: one or more readiness checks failed".to_string()
    } else {
        "doctor: all readiness checks passed".to_string()
    };

    tracing::debug!(
        event_name = "system.cli.doctor_completed",
        failed = any_failed,
        checks = checks.len(),
        "doctor report built"
    );

    DoctorReport { overall_status, summary, checks }
}

fn to_check(name: &'static str, result: anyhow::Result<String>) -> DoctorCheck {
    match result {
        Ok(details) => DoctorCheck { name, status: CheckStatus::Pass, details },
        Err(error) => DoctorCheck { name, status: CheckStatus::Fail, details: format!("{error:#}") },
    }
}

fn check_knowledge_base(config: &AppConfig) -> anyhow::Result<String> {
    let source = config
        .knowledge
        .path
        .as_ref()
        .map(|path| format!("`{}`", path.display()))
        .unwrap_or_else(|| "builtin catalogue".to_string());

    let knowledge = KnowledgeBase::load(config.knowledge.path.as_deref())
        .with_context(|| format!("failed to load knowledge base from {source}"))?;
    let faq = FaqMatcher::from_knowledge(&knowledge).context("failed to render FAQ answers")?;

    Ok(format!("loaded {source} with {} FAQ entries", faq.len()))
}

fn check_llm_readiness(config: &AppConfig) -> DoctorCheck {
    if config.llm.provider == LlmProvider::Disabled {
        return DoctorCheck {
            name: "llm_readiness",
            status: CheckStatus::Skipped,
            details: "llm provider disabled; unmatched messages get fallback replies".to_string(),
        };
    }

    to_check("llm_readiness", describe_llm(config))
}

fn describe_llm(config: &AppConfig) -> anyhow::Result<String> {
    let Some(endpoint) = config.llm.effective_base_url() else {
        bail!("no endpoint configured for provider {:?}", config.llm.provider);
    };
    build_llm_client(&config.llm).context("failed to build completion client")?;

    let credentials = if config.llm.api_key.is_some() { "present" } else { "not required" };
    Ok(format!(
        "{:?} model `{}` at `{endpoint}`; credentials {credentials}",
        config.llm.provider, config.llm.model
    ))
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
