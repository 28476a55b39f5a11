use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;

use crate::database::UserStore;
use crate::models::{UserPayload, UserResponse};
use crate::utils::error::{StoreError, ValidationError};

const USER_NOT_FOUND: &str = "User not found";

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        MessageResponse {
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct UserEnvelope {
    pub message: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct UsersEnvelope {
    pub message: String,
    pub users: Vec<UserResponse>,
}

fn user_body(message: &str, user: crate::models::User) -> UserEnvelope {
    UserEnvelope {
        message: message.to_string(),
        user: UserResponse::from(user),
    }
}

/// Logs the store failure and answers with a generic 500. Duplicate emails
/// land here too; callers cannot tell them apart from other failures.
fn store_failure(context: &str, error: StoreError, message: &str) -> HttpResponse {
    log::error!("❌ Error {}: {}", context, error);
    HttpResponse::InternalServerError().json(MessageResponse::new(message))
}

/// Missing fields answer 400. A failed cast is a server-side failure (500)
/// and uses the same generic message as a store error.
fn invalid_payload(context: &str, error: ValidationError, message: &str) -> HttpResponse {
    match error {
        ValidationError::MissingFields => {
            HttpResponse::BadRequest().json(MessageResponse::new(&error.to_string()))
        }
        ValidationError::Cast { .. } => {
            log::error!("❌ Error {}: {}", context, error);
            HttpResponse::InternalServerError().json(MessageResponse::new(message))
        }
    }
}

/// POST /api/create - Cria um novo usuário
#[utoipa::path(
    post,
    path = "/api/create",
    tag = "Users",
    request_body = UserPayload,
    responses(
        (status = 201, description = "User created", body = UserEnvelope),
        (status = 400, description = "Name, email or age missing", body = MessageResponse),
        (status = 500, description = "Store failure (including duplicate email) or uncastable field", body = MessageResponse)
    )
)]
pub async fn create_user(
    store: web::Data<dyn UserStore>,
    body: web::Json<UserPayload>,
) -> impl Responder {
    let new_user = match body.into_inner().validate() {
        Ok(new_user) => new_user,
        Err(e) => {
            return invalid_payload(
                "creating user",
                e,
                "An error occurred while creating the user",
            )
        }
    };

    log::info!("📝 POST /api/create - {}", new_user.email);

    match store.insert(new_user).await {
        Ok(user) => HttpResponse::Created().json(user_body("User created successfully", user)),
        Err(e) => store_failure(
            "creating user",
            e,
            "An error occurred while creating the user",
        ),
    }
}

/// GET /api/users - Lista todos os usuários
///
/// An empty collection answers 404, not an empty list.
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    responses(
        (status = 200, description = "Users retrieved", body = UsersEnvelope),
        (status = 404, description = "No users stored", body = MessageResponse),
        (status = 500, description = "Store failure", body = MessageResponse)
    )
)]
pub async fn list_users(store: web::Data<dyn UserStore>) -> impl Responder {
    match store.list_all().await {
        Ok(users) if users.is_empty() => {
            HttpResponse::NotFound().json(MessageResponse::new("No users found"))
        }
        Ok(users) => HttpResponse::Ok().json(UsersEnvelope {
            message: "Users retrieved successfully".to_string(),
            users: users.into_iter().map(UserResponse::from).collect(),
        }),
        Err(e) => store_failure(
            "retrieving users",
            e,
            "An error occurred while retrieving users",
        ),
    }
}

/// GET /api/user/{id} - Busca um usuário pelo id
#[utoipa::path(
    get,
    path = "/api/user/{id}",
    tag = "Users",
    params(("id" = String, Path, description = "User id (ObjectId hex)")),
    responses(
        (status = 200, description = "User retrieved", body = UserEnvelope),
        (status = 404, description = "User not found", body = MessageResponse),
        (status = 500, description = "Store failure", body = MessageResponse)
    )
)]
pub async fn get_user(store: web::Data<dyn UserStore>, path: web::Path<String>) -> impl Responder {
    let user_id = path.into_inner();

    match store.get_by_id(&user_id).await {
        Ok(user) => HttpResponse::Ok().json(user_body("User retrieved successfully", user)),
        Err(StoreError::NotFound(_)) => {
            HttpResponse::NotFound().json(MessageResponse::new(USER_NOT_FOUND))
        }
        Err(e) => store_failure(
            "retrieving user",
            e,
            "An error occurred while retrieving the user",
        ),
    }
}

/// PUT /api/user/{id} - Substitui nome, email e idade
#[utoipa::path(
    put,
    path = "/api/user/{id}",
    tag = "Users",
    params(("id" = String, Path, description = "User id (ObjectId hex)")),
    request_body = UserPayload,
    responses(
        (status = 200, description = "User updated", body = UserEnvelope),
        (status = 400, description = "Name, email or age missing", body = MessageResponse),
        (status = 404, description = "User not found", body = MessageResponse),
        (status = 500, description = "Store failure or uncastable field", body = MessageResponse)
    )
)]
pub async fn update_user(
    store: web::Data<dyn UserStore>,
    path: web::Path<String>,
    body: web::Json<UserPayload>,
) -> impl Responder {
    let new_user = match body.into_inner().validate() {
        Ok(new_user) => new_user,
        Err(e) => {
            return invalid_payload(
                "updating user",
                e,
                "An error occurred while updating the user",
            )
        }
    };

    let user_id = path.into_inner();
    log::info!("🔧 PUT /api/user/{}", user_id);

    match store.replace_by_id(&user_id, new_user).await {
        Ok(user) => HttpResponse::Ok().json(user_body("User updated successfully", user)),
        Err(StoreError::NotFound(_)) => {
            HttpResponse::NotFound().json(MessageResponse::new(USER_NOT_FOUND))
        }
        Err(e) => store_failure(
            "updating user",
            e,
            "An error occurred while updating the user",
        ),
    }
}

/// DELETE /api/user/{id} - Remove um usuário e devolve o registro removido
#[utoipa::path(
    delete,
    path = "/api/user/{id}",
    tag = "Users",
    params(("id" = String, Path, description = "User id (ObjectId hex)")),
    responses(
        (status = 200, description = "User deleted", body = UserEnvelope),
        (status = 404, description = "User not found", body = MessageResponse),
        (status = 500, description = "Store failure", body = MessageResponse)
    )
)]
pub async fn delete_user(
    store: web::Data<dyn UserStore>,
    path: web::Path<String>,
) -> impl Responder {
    let user_id = path.into_inner();
    log::info!("🗑️  DELETE /api/user/{}", user_id);

    match store.delete_by_id(&user_id).await {
        Ok(user) => HttpResponse::Ok().json(user_body("User deleted successfully", user)),
        Err(StoreError::NotFound(_)) => {
            HttpResponse::NotFound().json(MessageResponse::new(USER_NOT_FOUND))
        }
        Err(e) => store_failure(
            "deleting user",
            e,
            "An error occurred while deleting the user",
        ),
    }
}
