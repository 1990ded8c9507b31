// src/core/knowledge_base.rs

//! Knowledge-base entry construction.
//!
//! Every normalized finding carries an `Entry`: the title, descriptions,
//! remediation advice and reference links the reporting side renders to a
//! user. Unlike a static findings database, these entries are synthesized
//! per alert from the scanner's own free text.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::core::models::RiskRating;

/// Standard vulnerability database URL a CWE identifier resolves to.
const CWE_REFERENCE_URL: &str = "https://nvd.nist.gov/vuln/detail";

/// A knowledge-base entry describing one vulnerability class.
///
/// The boolean classification flags are fixed for web-scan findings:
/// everything the scanner reports is a security issue, and nothing it
/// reports carries exploit-intelligence annotations.
#[derive(Debug, Clone, Serialize)]
pub struct Entry {
    pub title: String,
    pub risk_rating: String,
    pub short_description: String,
    pub description: String,
    pub recommendation: String,
    pub references: BTreeMap<String, String>,
    pub security_issue: bool,
    pub privacy_issue: bool,
    pub has_public_exploit: bool,
    pub targeted_by_malware: bool,
    pub targeted_by_ransomware: bool,
    pub targeted_by_nation_state: bool,
    pub cvss_v3_vector: String,
}

impl Entry {
    /// Builds the entry for one alert. `description` and `recommendation`
    /// are expected to already be markup-converted plain text.
    pub fn for_alert(
        title: &str,
        risk_rating: RiskRating,
        description: &str,
        recommendation: &str,
        references: BTreeMap<String, String>,
    ) -> Self {
        Entry {
            title: title.to_string(),
            risk_rating: risk_rating.to_string(),
            short_description: description.to_string(),
            description: description.to_string(),
            recommendation: recommendation.to_string(),
            references,
            security_issue: true,
            privacy_issue: false,
            has_public_exploit: false,
            targeted_by_malware: false,
            targeted_by_ransomware: false,
            targeted_by_nation_state: false,
            cvss_v3_vector: String::new(),
        }
    }
}

/// Builds the reference map for an alert: the `<p>`-delimited reference
/// blob becomes one self-keyed link per chunk, then a synthesized
/// `cwe-<id>` link pointing at the standard vulnerability database.
pub fn parse_references(reference: &str, cweid: &str) -> BTreeMap<String, String> {
    let mut references: BTreeMap<String, String> = reference
        .replace("<p>", "")
        .split("</p>")
        .filter(|chunk| !chunk.is_empty())
        .map(|chunk| (chunk.to_string(), chunk.to_string()))
        .collect();
    references.insert(
        format!("cwe-{cweid}"),
        format!("{CWE_REFERENCE_URL}/{cweid}.html"),
    );
    references
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_blob_splits_into_self_keyed_links() {
        let references = parse_references(
            "<p>http://projects.webappsec.org/Cross-Site-Request-Forgery</p><p>http://cwe.mitre.org/data/definitions/352.html</p>",
            "352",
        );
        assert_eq!(
            references.get("http://projects.webappsec.org/Cross-Site-Request-Forgery"),
            Some(&"http://projects.webappsec.org/Cross-Site-Request-Forgery".to_string()),
        );
        assert_eq!(
            references.get("cwe-352"),
            Some(&"https://nvd.nist.gov/vuln/detail/352.html".to_string()),
        );
        assert_eq!(references.len(), 3);
    }

    #[test]
    fn empty_reference_blob_still_yields_cwe_link() {
        let references = parse_references("", "79");
        assert_eq!(references.len(), 1);
        assert_eq!(
            references.get("cwe-79"),
            Some(&"https://nvd.nist.gov/vuln/detail/79.html".to_string()),
        );
    }

    #[test]
    fn entry_classification_flags_are_fixed() {
        let entry = Entry::for_alert(
            "Absence of Anti-CSRF Tokens",
            RiskRating::Potentially,
            "desc",
            "fix it",
            BTreeMap::new(),
        );
        assert_eq!(entry.risk_rating, "POTENTIALLY");
        assert!(entry.security_issue);
        assert!(!entry.privacy_issue);
        assert!(!entry.has_public_exploit);
        assert_eq!(entry.cvss_v3_vector, "");
        assert_eq!(entry.short_description, entry.description);
    }
}
