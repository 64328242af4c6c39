//! Human-readable rendering of poll progress and claim records.
use claims::{ClaimRecord, PollPhase, PollState, RecommendedAction, RiskLevel};
use std::fmt::Write;

/// One progress line per poll attempt.
pub fn progress_line(state: &PollState) -> String {
    let status = state.status().unwrap_or("pending");
    let mut line = format!(
        "[{}] attempt {} status={}",
        state.job_id(),
        state.attempt(),
        status
    );
    if let Some(err) = state.last_error() {
        if err.is_not_found() {
            line.push_str(" (record not created yet)");
        } else {
            let _ = write!(line, " (error: {err})");
        }
    }
    if state.phase() == PollPhase::Completed {
        line.push_str(" done");
    }
    line
}

fn level_label(level: &RiskLevel) -> &'static str {
    match level {
        RiskLevel::Low => "LOW",
        RiskLevel::Medium => "MEDIUM",
        RiskLevel::High => "HIGH",
        RiskLevel::Unknown => "unknown",
    }
}

fn action_label(action: &RecommendedAction) -> &'static str {
    match action {
        RecommendedAction::AutoApprove => "auto approve",
        RecommendedAction::ManualReview => "manual review",
        RecommendedAction::DetailedInvestigation => "detailed investigation",
        RecommendedAction::Unknown => "unknown",
    }
}

/// Multi-line risk summary for `fetch --summary` and the end of `submit`.
pub fn render_summary(record: &ClaimRecord) -> String {
    let mut out = String::new();
    let job = record
        .job_id()
        .map(|id| id.to_string())
        .unwrap_or_else(|| "(unknown)".to_string());
    let _ = writeln!(out, "Claim:    {job}");
    let _ = writeln!(out, "Status:   {}", record.status().unwrap_or("unknown"));

    if !record.has_risk_analysis() {
        let _ = writeln!(out, "Risk:     not scored yet");
        return out;
    }

    let risk = record.risk_analysis();
    let _ = writeln!(
        out,
        "Risk:     {} (score {:.0}, confidence {:.0}%)",
        level_label(&risk.risk_level),
        risk.risk_score,
        risk.confidence_score
    );
    let _ = writeln!(out, "Action:   {}", action_label(&risk.recommended_action));
    for factor in &risk.risk_breakdown {
        let _ = writeln!(
            out,
            "  +{:<3} {} [{}] {}",
            factor.points, factor.category, factor.severity, factor.details
        );
    }
    for flag in &risk.flags {
        let _ = writeln!(out, "  ! {flag}");
    }

    let entities = record.medical_entities();
    if !entities.patient.name.is_empty() {
        let _ = writeln!(out, "Patient:  {}", entities.patient.name);
    }
    if !entities.diagnosis_codes.is_empty() {
        let _ = writeln!(out, "Diagnoses: {}", entities.diagnosis_codes.join(", "));
    }
    out
}
