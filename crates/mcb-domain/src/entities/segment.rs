//! Segment entity and the closed document-type taxonomy (§3, §6.4).

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::value_objects::{BatesRange, DocumentId, PageSpan, SegmentId};

/// Closed legal document-type taxonomy.
///
/// `Unknown` is the boundary detector's pre-classification default (gap-fill
/// segments, single-page documents with no header match); `Other` is the
/// classifier's open-ended fallback once classification has actually run
/// and found nothing closer. Exhaustive matching is required everywhere this
/// enum is consumed (§9 redesign flag: closed enums replace `isinstance`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
pub enum DocumentType {
    /// Not yet classified
    Unknown,
    Motion,
    Deposition,
    Exhibit,
    Contract,
    Email,
    MedicalRecord,
    PoliceReport,
    IncidentReport,
    ExpertReport,
    Affidavit,
    WitnessStatement,
    Invoice,
    FinancialRecord,
    EmploymentRecord,
    InsurancePolicy,
    InterrogatoryResponse,
    AdmissionResponse,
    DriverQualificationFile,
    MaintenanceRecord,
    InspectionReport,
    HoursOfServiceLog,
    BillOfLading,
    Correspondence,
    /// Classified but not in the closed taxonomy; the LLM-classifier clamp target (§4.3)
    Other,
}

impl DocumentType {
    /// Whether the fact extractor gate (§4.8) allows this document type to run,
    /// absent an explicit force flag. Primary evidence, sworn testimony, business
    /// records and discovery responses are allowed; motions, pleadings and
    /// discovery requests are excluded.
    #[must_use]
    pub fn fact_extraction_allowed(self) -> bool {
        match self {
            Self::Deposition
            | Self::Exhibit
            | Self::Email
            | Self::MedicalRecord
            | Self::PoliceReport
            | Self::IncidentReport
            | Self::ExpertReport
            | Self::Affidavit
            | Self::WitnessStatement
            | Self::Invoice
            | Self::FinancialRecord
            | Self::EmploymentRecord
            | Self::InsurancePolicy
            | Self::InterrogatoryResponse
            | Self::AdmissionResponse
            | Self::DriverQualificationFile
            | Self::MaintenanceRecord
            | Self::InspectionReport
            | Self::HoursOfServiceLog
            | Self::BillOfLading
            | Self::Correspondence
            | Self::Other => true,
            Self::Motion | Self::Unknown => false,
        }
    }
}

/// A contiguous page range of a document, treated as one logical document
/// after boundary detection (§3, §4.2).
///
/// Invariant: `page_span.start <= page_span.end`; the segments of one
/// document form a partition of its page range (enforced by the boundary
/// detector, not by this type).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    pub id: SegmentId,
    pub document_id: DocumentId,
    pub case_name: String,
    pub page_span: PageSpan,
    pub document_type: DocumentType,
    pub title: Option<String>,
    /// 0..1
    pub confidence: f32,
    pub bates_range: Option<BatesRange>,
    /// Human-readable indicators explaining why this boundary was drawn.
    /// Every segment carries at least one (§4.2 output invariant).
    pub boundary_indicators: Vec<String>,
    /// Informational only: set when a page in this segment produced empty
    /// text during extraction (§4.4). Does not trigger re-segmentation (§9
    /// open question: left intact, no automatic re-run).
    pub needs_ocr: bool,
}

impl Segment {
    /// Number of pages in this segment.
    #[must_use]
    pub fn page_count(&self) -> u32 {
        self.page_span.page_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn motion_is_excluded_from_fact_extraction() {
        assert!(!DocumentType::Motion.fact_extraction_allowed());
    }

    #[test]
    fn email_is_allowed_for_fact_extraction() {
        assert!(DocumentType::Email.fact_extraction_allowed());
    }

    #[test]
    fn unknown_is_excluded_from_fact_extraction() {
        assert!(!DocumentType::Unknown.fact_extraction_allowed());
    }

    #[test]
    fn display_matches_enum_name() {
        assert_eq!(DocumentType::Deposition.to_string(), "Deposition");
    }
}
