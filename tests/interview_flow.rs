use rupadi_lib::database::{DocumentStore, MemoryStore};
use rupadi_lib::error::InterviewError;
use rupadi_lib::interview::{Category, InterviewEngine, QUESTION_COUNT};
use rupadi_lib::llm::ScriptedGenerator;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn question_set_value() -> serde_json::Value {
    let questions: Vec<_> = (0..QUESTION_COUNT)
        .map(|i| {
            json!({
                "category": Category::for_position(i).unwrap().as_str(),
                "text": format!("Tell me about topic {}", i + 1),
            })
        })
        .collect();
    json!({"interview": {"greeting_script": "Welcome Meera!", "questions": questions}})
}

fn question_set() -> String {
    format!("Here is the interview:\n```json\n{}\n```", question_set_value())
}

fn evaluation(score: u8, feedback: &str) -> String {
    json!({"evaluation": {"score": score, "feedback": [feedback]}}).to_string()
}

async fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store
        .put_candidate(
            "cand-42",
            json!({
                "_id": "cand-42",
                "personal_information": {"first_name": "Meera", "last_name": "Iyer"},
                "skills": ["Rust", "SQL"],
                "role_target": "Backend Engineer",
            }),
        )
        .await
        .unwrap();
    store
}

#[tokio::test]
async fn test_full_interview_flow() {
    let store = seeded_store().await;
    let scripted = Arc::new(ScriptedGenerator::new(vec![
        question_set(),
        evaluation(8, "Solid answer"),
        evaluation(4, "Too shallow"),
        "Which trade-offs did you weigh when picking the index?".to_string(),
        evaluation(10, "Excellent depth"),
    ]));
    let engine = InterviewEngine::new(store.clone(), scripted.clone(), Duration::from_secs(5));

    let script = engine.prepare_interview("cand-42").await.unwrap();
    assert_eq!(script.greeting, "Welcome Meera!");
    assert_eq!(script.questions.len(), 10);
    assert!(scripted.prompts()[0].contains("Backend Engineer"));

    let fetched = engine.interview_script("cand-42").await.unwrap();
    assert_eq!(fetched.questions, script.questions);

    let first = engine
        .submit_answer("cand-42", &script.questions[0].text, "Ownership moves values")
        .await
        .unwrap();
    assert!(!first.needs_follow_up);

    let weak = engine
        .submit_answer("cand-42", &script.questions[3].text, "I would add an index")
        .await
        .unwrap();
    assert!(weak.needs_follow_up);
    assert_eq!(weak.evaluation.score, 4);

    let follow_up = engine
        .follow_up("cand-42", &script.questions[3].text, "I would add an index")
        .await
        .unwrap();
    assert!(follow_up.starts_with("Which trade-offs"));

    engine
        .submit_answer("cand-42", &script.questions[5].text, "Detailed answer")
        .await
        .unwrap();

    let summary = engine.results("cand-42").await.unwrap();
    assert_eq!(summary.average_score, 7.33);
    assert_eq!(summary.feedback, vec!["Solid answer", "Too shallow", "Excellent depth"]);
    assert_eq!(summary.interactions.len(), 3);
    assert_eq!(
        summary.interactions[1].follow_up_question.as_deref(),
        Some(follow_up.as_str())
    );
    assert!(summary.interactions.windows(2).all(|w| w[0].sequence < w[1].sequence));

    let candidates = engine.list_candidates().await.unwrap();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].name, "Meera");
}

#[tokio::test]
async fn test_stalled_generator_times_out() {
    let store = seeded_store().await;
    let engine = InterviewEngine::new(
        store.clone(),
        Arc::new(ScriptedGenerator::stalled()),
        Duration::from_millis(50),
    );

    let err = engine.prepare_interview("cand-42").await.unwrap_err();
    assert!(matches!(err, InterviewError::GenerationTimeout(_)));
    let err = engine.interview_script("cand-42").await.unwrap_err();
    assert!(matches!(err, InterviewError::NotFound { .. }));
}

#[tokio::test]
async fn test_bad_question_set_is_not_stored() {
    let store = seeded_store().await;
    let mut value = question_set_value();
    value["interview"]["questions"][0]["category"] = json!("advanced");
    let scripted = Arc::new(ScriptedGenerator::new(vec![value.to_string()]));
    let engine = InterviewEngine::new(store, scripted, Duration::from_secs(5));

    let err = engine.prepare_interview("cand-42").await.unwrap_err();
    assert!(matches!(err, InterviewError::GenerationShape { .. }));
    assert!(engine.interview_script("cand-42").await.is_err());
}

#[tokio::test]
async fn test_results_and_profile_errors() {
    let engine = InterviewEngine::new(
        Arc::new(MemoryStore::new()),
        Arc::new(ScriptedGenerator::new(vec![])),
        Duration::from_secs(5),
    );

    assert!(matches!(
        engine.results("nobody").await.unwrap_err(),
        InterviewError::NoInteractions(_)
    ));
    assert!(matches!(
        engine.prepare_interview("nobody").await.unwrap_err(),
        InterviewError::NotFound { kind: "Candidate", .. }
    ));
}
