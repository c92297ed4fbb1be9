use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use super::ResponseSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citations {
    pub apa7: String,
    pub mla9: String,
    pub chicago: String,
}

/// A contiguous page range that forms one logical reading unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub start_page: u32,
    pub end_page: u32,
}

impl Segment {
    pub fn page_count(&self) -> u32 {
        self.end_page
            .checked_sub(self.start_page)
            .map_or(0, |span| span + 1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentAnalysis {
    pub total_pages: u32,
    pub citations: Citations,
    pub parts: Vec<Segment>,
}

impl DocumentAnalysis {
    pub fn response_schema() -> ResponseSchema {
        let citations = ResponseSchema::object()
            .required_property("apa7", ResponseSchema::string())
            .required_property("mla9", ResponseSchema::string())
            .required_property("chicago", ResponseSchema::string());
        let segment = ResponseSchema::object()
            .required_property("id", ResponseSchema::integer())
            .required_property("title", ResponseSchema::string())
            .required_property("description", ResponseSchema::string())
            .required_property("startPage", ResponseSchema::integer())
            .required_property("endPage", ResponseSchema::integer());

        ResponseSchema::object()
            .required_property("totalPages", ResponseSchema::integer())
            .required_property("citations", citations)
            .required_property("parts", ResponseSchema::array(segment))
    }

    pub fn segment(&self, id: u32) -> Option<&Segment> {
        self.parts.iter().find(|segment| segment.id == id)
    }

    /// Describes every requested-but-unenforced invariant the analysis breaks.
    pub fn consistency_issues(&self, segment_count: RangeInclusive<usize>) -> Vec<String> {
        let mut issues = Vec::new();

        if !segment_count.contains(&self.parts.len()) {
            issues.push(format!(
                "expected {}..={} segments, got {}",
                segment_count.start(),
                segment_count.end(),
                self.parts.len()
            ));
        }

        let mut seen_ids = BTreeSet::new();
        for segment in &self.parts {
            if !seen_ids.insert(segment.id) {
                issues.push(format!("segment id {} is not unique", segment.id));
            }
            if segment.start_page > segment.end_page {
                issues.push(format!(
                    "segment {} starts after it ends ({} > {})",
                    segment.id, segment.start_page, segment.end_page
                ));
            }
            if segment.start_page < 1 || segment.end_page > self.total_pages {
                issues.push(format!(
                    "segment {} pages {}..={} fall outside 1..={}",
                    segment.id, segment.start_page, segment.end_page, self.total_pages
                ));
            }
        }

        issues
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
}

impl Question {
    pub fn answer_is_an_option(&self) -> bool {
        self.options.iter().any(|option| option == &self.answer)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    pub title: String,
    pub questions: Vec<Question>,
}

impl Quiz {
    pub fn response_schema() -> ResponseSchema {
        let question = ResponseSchema::object()
            .required_property("question", ResponseSchema::string())
            .required_property("options", ResponseSchema::array(ResponseSchema::string()))
            .required_property("answer", ResponseSchema::string());

        ResponseSchema::object()
            .required_property("title", ResponseSchema::string())
            .required_property("questions", ResponseSchema::array(question))
    }

    pub fn consistency_issues(&self, expected_questions: usize) -> Vec<String> {
        let mut issues = Vec::new();

        if self.questions.len() != expected_questions {
            issues.push(format!(
                "expected {expected_questions} questions, got {}",
                self.questions.len()
            ));
        }
        for (index, question) in self.questions.iter().enumerate() {
            if !question.answer_is_an_option() {
                issues.push(format!(
                    "question {} answer '{}' is not one of its options",
                    index + 1,
                    question.answer
                ));
            }
        }

        issues
    }
}

/// Verbatim text of one segment together with the quiz generated from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentStudy {
    pub segment: Segment,
    pub text: String,
    pub quiz: Quiz,
}
