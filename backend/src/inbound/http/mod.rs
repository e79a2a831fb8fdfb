//! HTTP inbound adapter exposing REST endpoints.

use actix_web::web;

pub mod accounts;
pub mod answers;
pub mod error;
pub mod health;
pub mod moderation;
pub mod questions;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

pub use error::ApiResult;

/// Register every `/api/v1` handler on a scope.
///
/// Session middleware and [`state::HttpState`] are supplied by the caller.
///
/// # Examples
/// ```no_run
/// use actix_web::{App, web};
/// use campus_qa::inbound::http::configure_api;
///
/// let app = App::new().service(web::scope("/api/v1").configure(configure_api));
/// ```
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(accounts::list_departments)
        .service(accounts::register)
        .service(accounts::get_account)
        .service(accounts::update_account)
        .service(accounts::delete_account)
        .service(accounts::login)
        .service(accounts::logout)
        .service(questions::list_questions)
        .service(questions::create_question)
        .service(questions::get_question)
        .service(questions::update_question)
        .service(questions::delete_question)
        .service(answers::list_answers)
        .service(answers::create_answer)
        .service(answers::get_answer)
        .service(answers::update_answer)
        .service(answers::delete_answer)
        .service(moderation::vote_question)
        .service(moderation::vote_answer)
        .service(moderation::flag_question)
        .service(moderation::flag_answer);
}
