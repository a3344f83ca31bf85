use super::model::{Cluster, ClusterId, Dataset, Question};

const CLUSTERS: [(&str, &str); 5] = [
    (
        "\"Dosing and administration\"",
        "Healthcare professionals ask how to dose in renal impairment, how to titrate, \
         and what to do after a missed dose.",
    ),
    (
        "\"Storage and stability\"",
        "Pharmacists and patients ask about temperature excursions, shelf life after \
         opening, and travel with refrigerated pens.",
    ),
    (
        "Drug interactions",
        "Questions on co-administration with anticoagulants, CYP3A4 inhibitors, and \
         over-the-counter supplements.",
    ),
    (
        "Adverse event follow-up",
        "Reporters follow up on injection-site reactions, hepatic findings, and whether \
         a reported event is already labelled.",
    ),
    (
        "Pregnancy and lactation",
        "Requests for data on exposure during pregnancy, breastfeeding, and \
         contraception requirements.",
    ),
];

const QUESTIONS: [(&[ClusterId], &str, &str, &str, &str, &str); 16] = [
    (&[0], "What is the recommended dose for patients with eGFR below 30?", "US", "2024-01-15", "Cardiomab", "CASE-1001"),
    (&[0], "Can the tablet be crushed for administration via feeding tube?", "DE", "2024-02-03", "Neurolex", "CASE-1002"),
    (&[0, 2], "Does the dose need adjusting when combined with clarithromycin?", "FR", "2024-03-22", "Cardiomab", "CASE-1003"),
    (&[0], "How should a missed weekly dose be handled?", "GB", "2024-04-09", "Neurolex", "CASE-1004"),
    (&[1], "Is the pen still usable after 36 hours at room temperature?", "US", "2024-05-11", "Glucovia", "CASE-1005"),
    (&[1], "What is the in-use shelf life after the vial is punctured?", "JP", "2024-06-30", "Glucovia", "CASE-1006"),
    (&[1, 0], "Does a temperature excursion change the dosing interval?", "DE", "2024-07-14", "Glucovia", "CASE-1007"),
    (&[2], "Is there an interaction with St John's wort?", "US", "2024-08-02", "Neurolex", "CASE-1008"),
    (&[2, 3], "Patient on warfarin reports bruising; is this a known interaction?", "IT", "2024-08-19", "Cardiomab", "CASE-1009"),
    (&[2], "Can it be co-administered with strong CYP3A4 inhibitors?", "FR", "2024-09-05", "Cardiomab", "CASE-1010"),
    (&[3], "Is a transient ALT elevation a labelled adverse event?", "US", "2024-10-01", "Neurolex", "CASE-1011"),
    (&[3], "Follow-up on injection-site necrosis reported last month.", "ES", "2024-10-22", "Glucovia", "CASE-1012"),
    (&[3, 4], "Adverse event reported in a pregnant patient during the first trimester.", "BR", "2024-11-08", "Cardiomab", "CASE-1013"),
    (&[4], "Is the drug excreted in breast milk?", "US", "2024-11-27", "Neurolex", "CASE-1014"),
    (&[4], "Are two forms of contraception required during treatment?", "DE", "2024-12-12", "Cardiomab", "CASE-1015"),
    (&[4, 0, 1], "How should dosing and storage be managed for a pregnant traveller?", "CA", "2024-12-20", "Glucovia", "CASE-1016"),
];

/// Fixed dataset shown when no data source is configured or a fetch fails.
pub fn sample_dataset() -> Dataset {
    let clusters = CLUSTERS
        .iter()
        .enumerate()
        .map(|(index, (title, summary))| Cluster {
            cluster_id: index as ClusterId,
            title: (*title).to_string(),
            summary: (*summary).to_string(),
        })
        .collect();

    let questions = QUESTIONS
        .iter()
        .map(|(clusters, text, country, date, product, case_no)| Question {
            clusters: clusters.to_vec(),
            question: (*text).to_string(),
            country_code: (*country).to_string(),
            case_created_date: (*date).to_string(),
            product: (*product).to_string(),
            case_no: Some((*case_no).to_string()),
        })
        .collect();

    Dataset {
        clusters,
        questions,
    }
}
