#![allow(dead_code)]

use std::time::Duration;

use serde_json::json;
use studykit::app::{StudyConfig, StudyService};
use studykit::infra::llm::GeminiProvider;

pub(crate) const API_KEY: &str = "test-key";
pub(crate) const GENERATE_PATH: &str = "/v1beta/models/gemini-3-flash-preview:generateContent";

pub(crate) fn service_for(server_url: String) -> StudyService {
    let provider = GeminiProvider::with_config(API_KEY, server_url, Duration::from_secs(5))
        .expect("provider should build");
    StudyService::with_provider(provider, StudyConfig::default()).expect("service should build")
}

pub(crate) fn text_response(text: &str) -> String {
    json!({
        "responseId": "resp-1",
        "modelVersion": "gemini-3-flash-preview",
        "candidates": [
            {
                "finishReason": "STOP",
                "content": {
                    "role": "model",
                    "parts": [{ "text": text }]
                }
            }
        ],
        "usageMetadata": {
            "promptTokenCount": 120,
            "candidatesTokenCount": 40,
            "totalTokenCount": 160
        }
    })
    .to_string()
}

pub(crate) fn no_candidates_response() -> String {
    json!({
        "promptFeedback": { "blockReason": "OTHER" },
        "usageMetadata": { "promptTokenCount": 120 }
    })
    .to_string()
}

pub(crate) fn two_segment_analysis_json() -> String {
    json!({
        "totalPages": 9,
        "citations": {
            "apa7": "Doe, J. (2020). Cell biology. Academic Press.",
            "mla9": "Doe, Jane. Cell Biology. Academic Press, 2020.",
            "chicago": "Doe, Jane. 2020. Cell Biology. New York: Academic Press."
        },
        "parts": [
            {
                "id": 1,
                "title": "Part one",
                "description": "Membranes and transport",
                "startPage": 1,
                "endPage": 4
            },
            {
                "id": 2,
                "title": "Part two",
                "description": "Energy and metabolism",
                "startPage": 5,
                "endPage": 9
            }
        ]
    })
    .to_string()
}

pub(crate) fn quiz_json(title: &str) -> String {
    let questions = (1..=5)
        .map(|index| {
            json!({
                "question": format!("Question {index}?"),
                "options": ["Osmosis", "Diffusion", "Glycolysis", "Mitosis"],
                "answer": "Diffusion"
            })
        })
        .collect::<Vec<_>>();
    json!({ "title": title, "questions": questions }).to_string()
}
