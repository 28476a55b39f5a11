pub mod health;
pub mod metrics;
pub mod swagger;
pub mod users;

use actix_web::{
    error::{InternalError, JsonPayloadError},
    web, HttpResponse,
};

use crate::utils::error::ValidationError;

/// Registers every route of the service. Shared by `main` and the handler
/// tests so both see the same routing table.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .route("/health", web::get().to(health::health_check))
        .route("/metrics", web::get().to(metrics::get_metrics))
        .service(
            web::scope("/api")
                .route("/create", web::post().to(users::create_user))
                .route("/users", web::get().to(users::list_users))
                .route("/user/{id}", web::get().to(users::get_user))
                .route("/user/{id}", web::put().to(users::update_user))
                .route("/user/{id}", web::delete().to(users::delete_user)),
        );
}

/// Body parse failures answer 400 with the same `{message}` shape as every
/// other error of the API. A body that is not declared as JSON is read as an
/// empty object, so it fails the required-fields check.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        log::warn!("⚠️ Rejected request body: {}", err);
        let message = match &err {
            JsonPayloadError::ContentType => ValidationError::MissingFields.to_string(),
            _ => "Invalid request body".to_string(),
        };
        let response = HttpResponse::BadRequest().json(users::MessageResponse::new(&message));
        InternalError::from_response(err, response).into()
    })
}
