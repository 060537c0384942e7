//! Users API handlers.
//!
//! ```text
//! GET    /users
//! POST   /users/add/user   {"id":1,"name":"Ada"} | [{"id":1},{"id":2}]
//! GET    /users/{id}
//! PUT    /users/{id}       {"name":"Grace"}
//! DELETE /users/{id}
//! ```
//!
//! Bodies are read as raw bytes and decoded here so malformed JSON yields the
//! standard error envelope instead of Actix's plain-text rejection.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::Serialize;
use serde_json::json;

use crate::domain::{AddUsersOutcome, Error, NewUsers, User, UserId, UserPatch};
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::map_collection_error;
use crate::inbound::http::schemas::{
    AddUsersOutcomeSchema, ErrorSchema, UserPatchSchema, UserSchema,
};
use crate::inbound::http::state::HttpState;

/// Response body for a successful delete.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DeleteUserResponse {
    pub success: bool,
}

/// Register the user routes under `/users`.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use user_cache::inbound::http::users::configure;
///
/// let app = App::new().configure(configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .service(list_users)
            .service(add_users)
            .service(get_user)
            .service(update_user)
            .service(delete_user),
    );
}

fn parse_user_id(raw: &str) -> Result<UserId, Error> {
    raw.trim().parse::<i64>().map(UserId::new).map_err(|_| {
        Error::invalid_request("user id must be an integer")
            .with_details(json!({ "field": "id", "value": raw }))
    })
}

fn parse_body<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, Error> {
    serde_json::from_slice(body).map_err(|err| {
        Error::invalid_request("request body is not valid JSON for this operation")
            .with_details(json!({ "reason": err.to_string() }))
    })
}

/// List every stored user in insertion order.
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "Users", body = [UserSchema]),
        (status = 500, description = "Internal server error", body = ErrorSchema),
        (status = 503, description = "Cache unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("")]
pub async fn list_users(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<User>>> {
    let users = state
        .users
        .list_users()
        .await
        .map_err(map_collection_error)?;
    Ok(web::Json(users))
}

/// Append one user or a batch of users.
///
/// A batch is all-or-nothing: any id that already exists (or repeats within
/// the batch) rejects the whole request with 409.
#[utoipa::path(
    post,
    path = "/users/add/user",
    request_body(content = [UserSchema], description = "A single user object or an array of users"),
    responses(
        (status = 200, description = "Users added", body = AddUsersOutcomeSchema),
        (status = 400, description = "Malformed body", body = ErrorSchema),
        (status = 409, description = "Duplicate user id", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema),
        (status = 503, description = "Cache unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "addUsers"
)]
#[post("/add/user")]
pub async fn add_users(
    state: web::Data<HttpState>,
    body: web::Bytes,
) -> ApiResult<web::Json<AddUsersOutcome>> {
    let input: NewUsers = parse_body(&body)?;
    let outcome = state
        .users
        .add_users(input)
        .await
        .map_err(map_collection_error)?;
    Ok(web::Json(outcome))
}

/// Fetch a single user by id.
#[utoipa::path(
    get,
    path = "/users/{id}",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = UserSchema),
        (status = 400, description = "Id is not an integer", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<User>> {
    let id = parse_user_id(&path)?;
    let user = state
        .users
        .get_user_by_id(id)
        .await
        .map_err(map_collection_error)?
        .ok_or_else(|| Error::not_found("User not found.").with_details(json!({ "id": id })))?;
    Ok(web::Json(user))
}

/// Merge the body's properties into an existing user. `id` is ignored.
#[utoipa::path(
    put,
    path = "/users/{id}",
    params(("id" = i64, Path, description = "User id")),
    request_body(content = UserPatchSchema, description = "Properties to set on the user"),
    responses(
        (status = 200, description = "Updated user", body = UserSchema),
        (status = 400, description = "Malformed id or body", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[put("/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    body: web::Bytes,
) -> ApiResult<web::Json<User>> {
    let id = parse_user_id(&path)?;
    let patch: UserPatch = parse_body(&body)?;
    let user = state
        .users
        .update_user(id, patch)
        .await
        .map_err(map_collection_error)?;
    Ok(web::Json(user))
}

/// Remove a user by id.
#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted", body = DeleteUserResponse),
        (status = 400, description = "Id is not an integer", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_user_id(&path)?;
    state
        .users
        .delete_user(id)
        .await
        .map_err(map_collection_error)?;
    Ok(HttpResponse::Ok().json(DeleteUserResponse { success: true }))
}

#[cfg(test)]
mod tests;
