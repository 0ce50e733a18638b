//! Deterministic keyword/regex classifier with LLM fallback (§4.3).

use async_trait::async_trait;
use mcb_domain::entities::DocumentType;
use mcb_domain::error::Result;
use mcb_domain::ports::{ClassificationOutcome, LlmClient, SegmentClassifier};
use regex::Regex;
use std::sync::{Arc, LazyLock};

const CONFIDENCE_CUTOFF: f32 = 0.6;
const HEADER_LINES: usize = 40;

const DOCUMENT_TYPE_LABELS: &[&str] = &[
    "Unknown",
    "Motion",
    "Deposition",
    "Exhibit",
    "Contract",
    "Email",
    "MedicalRecord",
    "PoliceReport",
    "IncidentReport",
    "ExpertReport",
    "Affidavit",
    "WitnessStatement",
    "Invoice",
    "FinancialRecord",
    "EmploymentRecord",
    "InsurancePolicy",
    "InterrogatoryResponse",
    "AdmissionResponse",
    "DriverQualificationFile",
    "MaintenanceRecord",
    "InspectionReport",
    "HoursOfServiceLog",
    "BillOfLading",
    "Correspondence",
    "Other",
];

struct Rule {
    pattern: Regex,
    document_type: DocumentType,
    confidence: f32,
}

static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    let rule = |pattern: &str, document_type: DocumentType, confidence: f32| Rule {
        pattern: Regex::new(pattern).expect("static pattern is valid"),
        document_type,
        confidence,
    };
    vec![
        rule(r"(?i)^\s*DEPOSITION OF", DocumentType::Deposition, 0.95),
        rule(r"(?i)^\s*BILL OF LADING", DocumentType::BillOfLading, 0.95),
        rule(r"(?i)^\s*EXPERT REPORT", DocumentType::ExpertReport, 0.9),
        rule(r"(?i)^\s*EXHIBIT\s+\S+", DocumentType::Exhibit, 0.85),
        rule(r"(?i)^\s*MOTION TO", DocumentType::Motion, 0.9),
        rule(r"(?i)^\s*INVOICE\s*#?\s*\d+", DocumentType::Invoice, 0.9),
        rule(r"(?i)^\s*AFFIDAVIT OF", DocumentType::Affidavit, 0.9),
        rule(r"(?i)^\s*POLICE REPORT", DocumentType::PoliceReport, 0.9),
        rule(r"(?i)^\s*INCIDENT REPORT", DocumentType::IncidentReport, 0.9),
        rule(r"(?im)^\s*(From:.*\n\s*To:.*\n\s*Subject:)", DocumentType::Email, 0.9),
        rule(r"(?i)medical record|patient name|diagnosis", DocumentType::MedicalRecord, 0.75),
        rule(r"(?i)witness statement", DocumentType::WitnessStatement, 0.85),
        rule(r"(?i)insurance policy|policy number", DocumentType::InsurancePolicy, 0.75),
        rule(r"(?i)interrogator", DocumentType::InterrogatoryResponse, 0.8),
        rule(r"(?i)request for admission", DocumentType::AdmissionResponse, 0.8),
        rule(r"(?i)driver qualification file", DocumentType::DriverQualificationFile, 0.85),
        rule(r"(?i)maintenance (log|record)", DocumentType::MaintenanceRecord, 0.75),
        rule(r"(?i)inspection report", DocumentType::InspectionReport, 0.8),
        rule(r"(?i)hours?.of.service", DocumentType::HoursOfServiceLog, 0.8),
        rule(r"(?i)employment (record|history)", DocumentType::EmploymentRecord, 0.7),
        rule(r"(?i)\b(invoice|statement of account)\b", DocumentType::FinancialRecord, 0.6),
        rule(r"(?i)^\s*(dear|re:)", DocumentType::Correspondence, 0.55),
        rule(r"(?i)\bagreement\b.*\bbetween\b", DocumentType::Contract, 0.6),
    ]
});

fn header_window(text: &str) -> String {
    text.lines().take(HEADER_LINES).collect::<Vec<_>>().join("\n")
}

fn deterministic_classify(text: &str) -> Option<ClassificationOutcome> {
    let window = header_window(text);
    RULES
        .iter()
        .find(|rule| rule.pattern.is_match(&window) || rule.pattern.is_match(text))
        .map(|rule| ClassificationOutcome {
            document_type: rule.document_type,
            confidence: rule.confidence,
            title: None,
        })
}

fn clamp_to_taxonomy(label: &str) -> DocumentType {
    label.parse::<DocumentType>().unwrap_or(DocumentType::Other)
}

/// Deterministic rules first; below [`CONFIDENCE_CUTOFF`] falls back to an LLM.
pub struct RuleBasedSegmentClassifier {
    llm: Arc<dyn LlmClient>,
}

impl RuleBasedSegmentClassifier {
    #[must_use]
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl SegmentClassifier for RuleBasedSegmentClassifier {
    async fn classify(&self, text: &str, boundary_indicators: &[String]) -> Result<ClassificationOutcome> {
        if let Some(outcome) = deterministic_classify(text) {
            if outcome.confidence >= CONFIDENCE_CUTOFF {
                return Ok(outcome);
            }
        }
        let allowed_labels: Vec<String> = DOCUMENT_TYPE_LABELS.iter().map(|&s| s.to_owned()).collect();
        let classification = self.llm.classify(text, &allowed_labels, boundary_indicators).await?;
        Ok(ClassificationOutcome {
            document_type: clamp_to_taxonomy(&classification.label),
            confidence: classification.confidence,
            title: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mcb_domain::ports::LlmClassification;
    use serde_json::Value;

    struct StubLlm;

    #[async_trait]
    impl LlmClient for StubLlm {
        async fn classify(&self, _text: &str, _allowed_labels: &[String], _hints: &[String]) -> Result<LlmClassification> {
            Ok(LlmClassification {
                label: "Contract".to_owned(),
                confidence: 0.7,
            })
        }

        async fn extract_facts(&self, _text: &str, _schema_hint: &str) -> Result<Vec<Value>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn deposition_header_classifies_deterministically() {
        let classifier = RuleBasedSegmentClassifier::new(Arc::new(StubLlm));
        let outcome = classifier
            .classify("DEPOSITION OF JANE DOE\nsome testimony", &[])
            .await
            .expect("ok");
        assert_eq!(outcome.document_type, DocumentType::Deposition);
        assert!(outcome.confidence >= CONFIDENCE_CUTOFF);
    }

    #[tokio::test]
    async fn ambiguous_text_falls_back_to_llm() {
        let classifier = RuleBasedSegmentClassifier::new(Arc::new(StubLlm));
        let outcome = classifier.classify("nothing recognizable here at all", &[]).await.expect("ok");
        assert_eq!(outcome.document_type, DocumentType::Contract);
    }

    #[test]
    fn unknown_llm_label_clamps_to_other() {
        assert_eq!(clamp_to_taxonomy("SomeNewThing"), DocumentType::Other);
    }
}
