use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "User Service API",
        version = "1.0.0",
        description = "CRUD API over User records (name, email, age) stored in MongoDB.\n\nEvery response is a JSON object with a `message` field. Ids are MongoDB ObjectIds in hex form."
    ),
    paths(
        // Users
        crate::api::users::create_user,
        crate::api::users::list_users,
        crate::api::users::get_user,
        crate::api::users::update_user,
        crate::api::users::delete_user,

        // Health & Metrics
        crate::api::health::health_check,
        crate::api::metrics::get_metrics,
    ),
    components(
        schemas(
            crate::models::UserPayload,
            crate::models::UserResponse,
            crate::api::users::MessageResponse,
            crate::api::users::UserEnvelope,
            crate::api::users::UsersEnvelope,
            crate::api::health::HealthResponse,
        )
    ),
    tags(
        (name = "Users", description = "Create, list, read, replace and delete users."),
        (name = "Health", description = "Health check and request metrics."),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_user_routes() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        assert!(paths.contains_key("/api/create"));
        assert!(paths.contains_key("/api/users"));
        assert!(paths.contains_key("/api/user/{id}"));
        assert!(paths.contains_key("/health"));
    }
}
