use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::util::clean_title;

pub type ClusterId = i64;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Cluster {
    pub cluster_id: ClusterId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: String,
}

impl Cluster {
    pub fn display_title(&self) -> String {
        let title = clean_title(&self.title);
        if title.is_empty() {
            format!("Cluster {}", self.cluster_id)
        } else {
            title
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Question {
    #[serde(default)]
    pub clusters: Vec<ClusterId>,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub country_code: String,
    #[serde(default)]
    pub case_created_date: String,
    #[serde(default)]
    pub product: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_no: Option<String>,
}

impl Question {
    pub fn primary_cluster(&self) -> Option<ClusterId> {
        self.clusters.first().copied()
    }

    pub fn is_multi_cluster(&self) -> bool {
        self.clusters.len() > 1
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Dataset {
    #[serde(default)]
    pub clusters: Vec<Cluster>,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Dataset {
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    pub fn cluster(&self, cluster_id: ClusterId) -> Option<&Cluster> {
        self.clusters
            .iter()
            .find(|cluster| cluster.cluster_id == cluster_id)
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }
}

/// Node ids for every question, index-aligned with `questions`.
///
/// A question is keyed by its case number when it has one, otherwise by its
/// position in the array. Colliding case numbers get the index appended, then
/// a counter if that id is taken too, so ids stay unique within one render.
pub fn question_node_ids(questions: &[Question]) -> Vec<String> {
    let mut seen = HashSet::with_capacity(questions.len());
    questions
        .iter()
        .enumerate()
        .map(|(index, question)| {
            let base = match question.case_no.as_deref().map(str::trim) {
                Some(case_no) if !case_no.is_empty() => format!("question-{case_no}"),
                _ => format!("question-{index}"),
            };

            if seen.insert(base.clone()) {
                return base;
            }
            let mut unique = format!("{base}-{index}");
            let mut attempt = 1;
            while !seen.insert(unique.clone()) {
                unique = format!("{base}-{index}-{attempt}");
                attempt += 1;
            }
            unique
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(case_no: Option<&str>) -> Question {
        Question {
            clusters: vec![0],
            question: "q".into(),
            country_code: "DE".into(),
            case_created_date: "2024-02-01".into(),
            product: "Prod".into(),
            case_no: case_no.map(str::to_string),
        }
    }

    #[test]
    fn parses_backend_payload_with_missing_optional_fields() {
        let raw = r#"{
            "clusters": [{"cluster_id": 0, "title": "\"Dosing\"", "summary": "How much"}],
            "questions": [{"clusters": [0], "question": "Max dose?", "country_code": "US",
                           "case_created_date": "2024-05-02", "product": "Alpha"}]
        }"#;
        let dataset = Dataset::from_json(raw).expect("valid payload");
        assert_eq!(dataset.clusters[0].display_title(), "Dosing");
        assert_eq!(dataset.questions[0].case_no, None);
        assert_eq!(dataset.questions[0].primary_cluster(), Some(0));
    }

    #[test]
    fn question_ids_prefer_case_numbers_and_stay_unique() {
        let questions = vec![
            question(Some("Q1")),
            question(None),
            question(Some("Q1")),
            question(Some("  ")),
        ];
        let ids = question_node_ids(&questions);
        assert_eq!(ids, vec!["question-Q1", "question-1", "question-Q1-2", "question-3"]);
    }

    #[test]
    fn suffixed_ids_never_reuse_an_existing_case_number() {
        let questions = vec![
            question(Some("Q1-2")),
            question(Some("Q1")),
            question(Some("Q1")),
        ];
        let ids = question_node_ids(&questions);
        assert_eq!(ids, vec!["question-Q1-2", "question-Q1", "question-Q1-2-1"]);

        let unique = ids.iter().collect::<HashSet<_>>();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn untitled_cluster_gets_a_fallback_label() {
        let cluster = Cluster {
            cluster_id: 4,
            title: "\"\"".into(),
            summary: String::new(),
        };
        assert_eq!(cluster.display_title(), "Cluster 4");
    }
}
