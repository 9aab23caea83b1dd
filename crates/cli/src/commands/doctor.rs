use std::time::Duration;

use palmsure_core::config::{AppConfig, LoadOptions};
use serde::Serialize;

use super::{build_runtime, escape_json};

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

pub fn run(json_output: bool) -> String {
    let report = build_report();

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
    }

    render_human(&report)
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
            checks.push(check_mail_transport(&config));
            checks.push(check_server_reachability(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(DoctorCheck {
                name: "mail_transport_readiness",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
            checks.push(DoctorCheck {
                name: "server_reachability",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_mail_transport(config: &AppConfig) -> DoctorCheck {
    if config.email.api_key.is_some() {
        DoctorCheck {
            name: "mail_transport_readiness",
            status: CheckStatus::Pass,
            details: "resend api key configured".to_string(),
        }
    } else {
        DoctorCheck {
            name: "mail_transport_readiness",
            status: CheckStatus::Fail,
            details: "RESEND_API_KEY is not set; the server will acknowledge submissions without sending email"
                .to_string(),
        }
    }
}

fn check_server_reachability(config: &AppConfig) -> DoctorCheck {
    let runtime = match build_runtime() {
        Ok(runtime) => runtime,
        Err(error) => {
            return DoctorCheck {
                name: "server_reachability",
                status: CheckStatus::Fail,
                details: format!("could not start a runtime for the probe: {error}"),
            };
        }
    };

    let url = format!(
        "http://{}:{}/health",
        config.server.bind_address, config.server.health_check_port
    );

    runtime.block_on(async {
        let client = match reqwest::Client::builder().timeout(Duration::from_secs(5)).build() {
            Ok(client) => client,
            Err(error) => {
                return DoctorCheck {
                    name: "server_reachability",
                    status: CheckStatus::Fail,
                    details: format!("could not build the probe client: {error}"),
                };
            }
        };

        match client.get(&url).send().await {
            Ok(response) if response.status().is_success() => DoctorCheck {
                name: "server_reachability",
                status: CheckStatus::Pass,
                details: format!("health endpoint answered at {url}"),
            },
            Ok(response) => DoctorCheck {
                name: "server_reachability",
                status: CheckStatus::Fail,
                details: format!("health endpoint at {url} answered {}", response.status()),
            },
            Err(error) => DoctorCheck {
                name: "server_reachability",
                status: CheckStatus::Fail,
                details: format!("health endpoint at {url} unreachable: {error}"),
            },
        }
    })
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = vec![report.summary.clone()];
    for check in &report.checks {
        let label = match check.status {
            CheckStatus::Pass => "pass",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("  [{label}] {}: {}", check.name, check.details));
    }
    lines.join("\n")
}
