//! Text assistant boundary
//!
//! The conversational assistant is an external service. The crate only
//! renders an analysis into a plain-text context block and forwards the
//! composed prompt through [`TextAssistant`].

use crate::analysis::AnalysisReport;
use std::fmt::Write;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssistantError {
    #[error("Assistant service error: {0}")]
    Service(String),

    #[error("Question is empty")]
    EmptyQuestion,
}

pub type AssistantResult<T> = Result<T, AssistantError>;

/// An external text-completion service
pub trait TextAssistant {
    fn complete(&self, prompt: &str) -> AssistantResult<String>;
}

const MAX_LISTED: usize = 5;

/// Render the findings of a report as the assistant's context block
pub fn summarize_findings(report: &AnalysisReport) -> String {
    let stats = &report.statistics;
    let patterns = &report.patterns;
    let mut out = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(
        out,
        "Fraud graph: {} nodes ({} policies, {} claims, {} agents, {} third parties), {} edges.",
        stats.node_count,
        stats.policies,
        stats.claims,
        stats.agents,
        stats.third_parties,
        stats.edge_count
    );
    let _ = writeln!(
        out,
        "Risk filter '{}' keeps {} nodes and {} edges.",
        report.filter,
        report.view.nodes.len(),
        report.view.edges.len()
    );

    let _ = writeln!(out, "Suspicious third parties: {}", patterns.suspicious_third_parties.len());
    for tp in patterns.suspicious_third_parties.iter().take(MAX_LISTED) {
        let _ = writeln!(
            out,
            "- {} ({}): {} claim connections, risk {:.2}",
            tp.id, tp.subtype, tp.claim_connections, tp.risk_score
        );
    }

    let _ = writeln!(out, "Agent clusters: {}", patterns.agent_clusters.len());
    for agent in patterns.agent_clusters.iter().take(MAX_LISTED) {
        let _ = writeln!(
            out,
            "- {}: {} policies, {} claims, average claim {:.0}, risk {:.2}",
            agent.agent_id,
            agent.policy_count,
            agent.claim_count,
            agent.average_claim_amount,
            agent.risk_score
        );
    }

    let _ = writeln!(out, "Amount anomalies: {}", patterns.amount_anomalies.len());
    for anomaly in patterns.amount_anomalies.iter().take(MAX_LISTED) {
        let _ = writeln!(
            out,
            "- {} ({}): amount {:.2}, z-score {:.2}",
            anomaly.claim_id, anomaly.claim_type, anomaly.amount, anomaly.z_score
        );
    }

    let _ = writeln!(out, "Policies with repeated claims: {}", patterns.policy_claim_patterns.len());
    let _ = writeln!(out, "Fraud rings: {}", patterns.fraud_rings.len());
    for ring in patterns.fraud_rings.iter().take(MAX_LISTED) {
        let _ = writeln!(
            out,
            "- {} agents and {} third parties, total weight {:.1}",
            ring.agents.len(),
            ring.third_parties.len(),
            ring.total_weight
        );
    }

    if let Some(top) = patterns.location_risks.first() {
        let _ = writeln!(
            out,
            "Riskiest location: {} (average risk {:.2}, {} high-risk nodes)",
            top.location, top.average_risk, top.high_risk_nodes
        );
    }
    out
}

/// Ask the assistant a question about a report
pub fn ask<A: TextAssistant + ?Sized>(
    assistant: &A,
    report: &AnalysisReport,
    question: &str,
) -> AssistantResult<String> {
    let question = question.trim();
    if question.is_empty() {
        return Err(AssistantError::EmptyQuestion);
    }
    let prompt = format!(
        "Context: {}\nUser question: {}",
        summarize_findings(report).trim_end(),
        question
    );
    assistant.complete(&prompt)
}
