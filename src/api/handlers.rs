use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::database::CandidateSummary;
use crate::error::Result;
use crate::interview::{InterviewEngine, QuestionSpec};

fn not_blank(value: &str) -> std::result::Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

// ==================== Request/Response Types ====================

#[derive(Debug, Deserialize, Validate)]
pub struct PrepareInterviewRequest {
    #[validate(custom = "not_blank")]
    pub candidate_id: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct EvaluateAnswerRequest {
    #[validate(custom = "not_blank")]
    pub candidate_id: String,
    #[validate(custom = "not_blank")]
    pub question: String,
    #[validate(custom = "not_blank")]
    pub answer: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct FollowUpRequest {
    #[validate(custom = "not_blank")]
    pub candidate_id: String,
    #[validate(custom = "not_blank")]
    pub original_question: String,
    #[validate(custom = "not_blank")]
    pub previous_answer: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RunCodeRequest {
    #[validate(custom = "not_blank")]
    pub problem: String,
    #[validate(custom = "not_blank")]
    pub code: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CandidateListResponse {
    pub candidates: Vec<CandidateSummary>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InterviewResponse {
    pub candidate_id: String,
    pub greeting: String,
    pub questions: Vec<QuestionSpec>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub status: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FollowUpResponse {
    pub follow_up_question: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RunCodeResponse {
    pub output: String,
}

// ==================== Handlers ====================

#[get("/")]
pub async fn index() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "message": "Rupadi interviewer is running",
        "status": "ok",
    }))
}

#[get("/candidates")]
pub async fn list_candidates(engine: web::Data<InterviewEngine>) -> Result<HttpResponse> {
    let candidates = engine.list_candidates().await?;
    Ok(HttpResponse::Ok().json(CandidateListResponse { candidates }))
}

#[post("/prepare-interview")]
pub async fn prepare_interview(
    engine: web::Data<InterviewEngine>,
    body: web::Json<PrepareInterviewRequest>,
) -> Result<HttpResponse> {
    body.validate()?;
    let script = engine.prepare_interview(body.candidate_id.trim()).await?;

    Ok(HttpResponse::Ok().json(InterviewResponse {
        candidate_id: script.candidate_id,
        greeting: script.greeting,
        questions: script.questions,
        status: Some("success".to_string()),
    }))
}

#[get("/interview/{candidate_id}")]
pub async fn get_interview(
    engine: web::Data<InterviewEngine>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let script = engine.interview_script(&path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(InterviewResponse {
        candidate_id: script.candidate_id,
        greeting: script.greeting,
        questions: script.questions,
        status: None,
    }))
}

#[post("/evaluate-answer")]
pub async fn evaluate_answer(
    engine: web::Data<InterviewEngine>,
    body: web::Json<EvaluateAnswerRequest>,
) -> Result<HttpResponse> {
    body.validate()?;
    let outcome = engine
        .submit_answer(body.candidate_id.trim(), &body.question, &body.answer)
        .await?;
    Ok(HttpResponse::Ok().json(outcome))
}

#[post("/generate-follow-up")]
pub async fn generate_follow_up(
    engine: web::Data<InterviewEngine>,
    body: web::Json<FollowUpRequest>,
) -> Result<HttpResponse> {
    body.validate()?;
    let follow_up_question = engine
        .follow_up(
            body.candidate_id.trim(),
            &body.original_question,
            &body.previous_answer,
        )
        .await?;
    Ok(HttpResponse::Ok().json(FollowUpResponse { follow_up_question }))
}

#[get("/results/{candidate_id}")]
pub async fn get_results(
    engine: web::Data<InterviewEngine>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let summary = engine.results(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(summary))
}

#[post("/run-code")]
pub async fn run_code(
    engine: web::Data<InterviewEngine>,
    body: web::Json<RunCodeRequest>,
) -> Result<HttpResponse> {
    body.validate()?;
    let output = engine.run_code(&body.problem, &body.code).await?;
    Ok(HttpResponse::Ok().json(RunCodeResponse { output }))
}
