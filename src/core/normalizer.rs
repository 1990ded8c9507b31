// src/core/normalizer.rs

//! Normalization of a raw scanner report into canonical findings.
//!
//! One pass over the nested sites/alerts/instances tree, yielding one
//! `Vulnerability` per (alert, instance) pair. The returned iterator is
//! lazy and consumes the report; callers drive it exactly once.

use regex::Regex;
use tracing::{info, warn};

use crate::core::dna;
use crate::core::knowledge_base::{self, Entry};
use crate::core::markup;
use crate::core::models::{
    Alert, ConfidenceLevel, DomainAsset, Instance, LocationMetadata, MetadataKind, RiskRating,
    ScanReport, Site, Vulnerability, VulnerabilityLocation,
};

/// Flattens a report into a lazy sequence of normalized findings.
///
/// Sites whose recorded target name does not match `scope` are skipped
/// wholesale; a `None` scope keeps everything.
pub fn normalize<'a>(
    report: ScanReport,
    scope: Option<&'a Regex>,
) -> impl Iterator<Item = Vulnerability> + 'a {
    report
        .site
        .into_iter()
        .filter(move |site| {
            let in_scope = matches_scope(scope, &site.name);
            if !in_scope {
                info!(target = %site.name, "site does not match the scope pattern, skipping");
            }
            in_scope
        })
        .flat_map(|site| {
            let Site { name: target, host, port, alerts } = site;
            alerts
                .into_iter()
                .flat_map(move |alert| normalize_alert(target.clone(), host.clone(), port.clone(), alert))
        })
}

/// Scope semantics: the pattern must match at the very start of the
/// target, not merely somewhere inside it.
pub fn matches_scope(scope: Option<&Regex>, target: &str) -> bool {
    match scope {
        None => true,
        Some(pattern) => pattern.find(target).is_some_and(|m| m.start() == 0),
    }
}

/// Derives the canonical severity from the scanner's risk/confidence pair.
///
/// Only findings the scanner itself is confident about keep their direct
/// severity; everything else is demoted to POTENTIALLY rather than
/// asserting a severity the evidence does not support.
pub fn map_risk_rating(risk_code: u8, confidence: ConfidenceLevel) -> RiskRating {
    match confidence {
        ConfidenceLevel::Confirmed | ConfidenceLevel::High => direct_rating(risk_code),
        _ => RiskRating::Potentially,
    }
}

fn direct_rating(risk_code: u8) -> RiskRating {
    match risk_code {
        0 => RiskRating::Info,
        1 => RiskRating::Low,
        2 => RiskRating::Medium,
        3 => RiskRating::High,
        other => {
            warn!(code = other, "risk code out of range, assuming INFO");
            RiskRating::Info
        }
    }
}

fn parse_code(raw: &str, field: &'static str) -> u8 {
    raw.trim().parse().unwrap_or_else(|_| {
        warn!(field, value = raw, "unparseable code in report, defaulting to 0");
        0
    })
}

fn normalize_alert(
    target: String,
    host: String,
    port: String,
    alert: Alert,
) -> impl Iterator<Item = Vulnerability> {
    let title = alert.name;
    let description = markup::html_to_markdown(&alert.desc);
    let recommendation = markup::html_to_markdown(&alert.solution);
    let detail_header = markup::html_to_markdown(&alert.otherinfo);
    let risk_rating = map_risk_rating(
        parse_code(&alert.riskcode, "riskcode"),
        ConfidenceLevel::from_code(parse_code(&alert.confidence, "confidence")),
    );
    let references = knowledge_base::parse_references(&alert.reference, &alert.cweid);

    alert.instances.into_iter().map(move |instance| {
        let technical_detail = build_technical_detail(&title, &target, &detail_header, &instance);
        let location = build_location(&host, &instance.uri, &port);
        let dna = dna::compute(&title, Some(&location), &technical_detail);
        Vulnerability {
            entry: Entry::for_alert(
                &title,
                risk_rating,
                &description,
                &recommendation,
                references.clone(),
            ),
            technical_detail,
            risk_rating,
            vulnerability_location: location,
            dna,
        }
    })
}

/// Builds the technical-detail text for one instance.
///
/// "Header not set" findings collapse to a one-line summary; everything
/// else gets the converted extra-info header, a target line and a fenced
/// block carrying the request fields in fixed order.
fn build_technical_detail(title: &str, target: &str, header: &str, instance: &Instance) -> String {
    if title.to_lowercase().contains("header not set") {
        format!("{title} at {uri}", uri = instance.uri)
    } else {
        format!(
            "{header}\n\n* Target: {target}\n\n```http\n{method} {uri}\n{param}\n{attack}\n{evidence}\n```\n",
            method = instance.method,
            uri = instance.uri,
            param = instance.param,
            attack = instance.attack,
            evidence = instance.evidence,
        )
    }
}

/// Location metadata is URL first, then PORT when the site recorded one.
/// The DNA serializes this order verbatim, so it must not change.
fn build_location(host: &str, uri: &str, port: &str) -> VulnerabilityLocation {
    let mut metadata = vec![LocationMetadata {
        kind: MetadataKind::Url,
        value: uri.to_string(),
    }];
    if !port.is_empty() {
        metadata.push(LocationMetadata { kind: MetadataKind::Port, value: port.to_string() });
    }
    VulnerabilityLocation {
        asset: DomainAsset { name: host.to_string() },
        metadata,
    }
}
