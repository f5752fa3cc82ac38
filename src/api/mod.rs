pub mod handlers;

use actix_web::web;

use crate::error::InterviewError;

pub use handlers::*;

/// Register every interview route plus a JSON extractor that reports
/// malformed bodies in the same error shape as the handlers.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        InterviewError::Validation(err.to_string()).into()
    }))
    .service(index)
    .service(list_candidates)
    .service(prepare_interview)
    .service(get_interview)
    .service(evaluate_answer)
    .service(generate_follow_up)
    .service(get_results)
    .service(run_code);
}
