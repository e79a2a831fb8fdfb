//! Account directory handlers: registration, self-service profile access,
//! login and logout, and the department list.
//!
//! ```text
//! POST /api/v1/users {"email":"1602-18-733-010@vce.ac.in", ...}
//! POST /api/v1/login {"rollNumber":"1602-18-733-010","password":"..."}
//! GET /api/v1/users/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::RegisterAccountRequest;
use crate::domain::{
    Account, Department, Error, LoginCredentials, LoginValidationError, RegistrationInput, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_json_body, parse_uuid};

/// Registration and full-replacement update payload.
///
/// Every field is optional at the transport level so that missing values are
/// reported by field name rather than as a JSON decoding failure.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct AccountRequest {
    #[schema(example = "1602-18-733-010@vce.ac.in")]
    pub email: Option<String>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    #[schema(example = "2000-01-15")]
    pub date_of_birth: Option<String>,
    #[schema(example = 2022)]
    pub grad_year: Option<i32>,
    #[schema(example = "1602-18-733-010")]
    pub roll_number: Option<String>,
    #[schema(example = "9876543210")]
    pub phone: Option<String>,
    #[schema(example = 1)]
    pub department: Option<i32>,
    pub password: Option<String>,
}

impl From<AccountRequest> for RegisterAccountRequest {
    fn from(value: AccountRequest) -> Self {
        let AccountRequest {
            email,
            username,
            first_name,
            middle_name,
            last_name,
            date_of_birth,
            grad_year,
            roll_number,
            phone,
            department,
            password,
        } = value;
        Self {
            input: RegistrationInput {
                email,
                username,
                first_name,
                middle_name,
                last_name,
                date_of_birth,
                grad_year,
                roll_number,
                phone,
                department,
            },
            password,
        }
    }
}

/// Public view of an account. Roll number, date of birth and password hash
/// are never echoed.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub grad_year: i32,
    pub phone: String,
    pub department: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Account> for AccountResponse {
    fn from(value: Account) -> Self {
        let Account {
            id,
            profile,
            flags,
            created_at,
        } = value;
        Self {
            id: *id.as_uuid(),
            email: profile.email.into(),
            username: profile.username.into(),
            first_name: profile.first_name.into(),
            middle_name: profile.middle_name.map(Into::into),
            last_name: profile.last_name.into(),
            grad_year: profile.grad_year.value(),
            phone: profile.phone.into(),
            department: profile.department.value(),
            is_active: flags.is_active,
            created_at,
        }
    }
}

/// Department reference entry.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentResponse {
    pub id: i32,
    #[schema(example = "CSE")]
    pub code: String,
    pub name: String,
}

impl From<Department> for DepartmentResponse {
    fn from(value: Department) -> Self {
        Self {
            id: value.id.value(),
            code: value.code,
            name: value.name,
        }
    }
}

/// Login request body for `POST /api/v1/login`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct LoginRequest {
    #[schema(example = "1602-18-733-010")]
    pub roll_number: String,
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.roll_number, &value.password)
    }
}

fn map_login_validation_error(err: &LoginValidationError) -> Error {
    let (field, code) = match err {
        LoginValidationError::EmptyRollNumber => ("rollNumber", "empty_roll_number"),
        LoginValidationError::EmptyPassword => ("password", "empty_password"),
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field, "code": code }))
}

fn account_id(raw: &str) -> Result<UserId, Error> {
    parse_uuid(raw, FieldName::new("id")).map(UserId::from)
}

/// List every department. Public.
#[utoipa::path(
    get,
    path = "/api/v1/departments",
    responses(
        (status = 200, description = "Departments", body = [DepartmentResponse]),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "listDepartments",
    security([])
)]
#[get("/departments")]
pub async fn list_departments(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<DepartmentResponse>>> {
    let departments = state.accounts_query.departments().await?;
    Ok(web::Json(
        departments.into_iter().map(DepartmentResponse::from).collect(),
    ))
}

/// Register a new, inactive account. Public.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = AccountRequest,
    responses(
        (status = 201, description = "Account created", body = AccountResponse),
        (status = 400, description = "Invalid or duplicate field", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "registerAccount",
    security([])
)]
#[post("/users")]
pub async fn register(
    state: web::Data<HttpState>,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let request = parse_json_body::<AccountRequest>(&body)?;
    let account = state.accounts.register(request.into()).await?;
    Ok(HttpResponse::Created().json(AccountResponse::from(account)))
}

/// Fetch the caller's own account.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = Uuid, Path, description = "Account id")),
    responses(
        (status = 200, description = "Account", body = AccountResponse),
        (status = 400, description = "Malformed id", body = ErrorSchema),
        (status = 403, description = "Not signed in or not the owner", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "getAccount"
)]
#[get("/users/{id}")]
pub async fn get_account(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<AccountResponse>> {
    let actor = session.require_actor(&*state.login).await?;
    let id = account_id(&path)?;
    let account = state.accounts_query.get(&actor, &id).await?;
    Ok(web::Json(account.into()))
}

/// Replace the caller's registration fields and password.
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    params(("id" = Uuid, Path, description = "Account id")),
    request_body = AccountRequest,
    responses(
        (status = 200, description = "Updated account", body = AccountResponse),
        (status = 400, description = "Invalid or duplicate field", body = ErrorSchema),
        (status = 403, description = "Not signed in or not the owner", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "updateAccount"
)]
#[put("/users/{id}")]
pub async fn update_account(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    body: web::Bytes,
) -> ApiResult<web::Json<AccountResponse>> {
    let actor = session.require_actor(&*state.login).await?;
    let id = account_id(&path)?;
    let request = parse_json_body::<AccountRequest>(&body)?;
    let account = state.accounts.update(&actor, &id, request.into()).await?;
    Ok(web::Json(account.into()))
}

/// Delete the caller's account and end the session.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(("id" = Uuid, Path, description = "Account id")),
    responses(
        (status = 204, description = "Account deleted"),
        (status = 400, description = "Account still owns questions or answers", body = ErrorSchema),
        (status = 403, description = "Not signed in or not the owner", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "deleteAccount"
)]
#[delete("/users/{id}")]
pub async fn delete_account(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_actor(&*state.login).await?;
    let id = account_id(&path)?;
    state.accounts.delete(&actor, &id).await?;
    session.purge();
    Ok(HttpResponse::NoContent().finish())
}

/// Authenticate by roll number and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Invalid credentials or inactive account", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let request = parse_json_body::<LoginRequest>(&body)?;
    let credentials = LoginCredentials::try_from(request)
        .map_err(|err| map_login_validation_error(&err))?;
    let user_id = state.login.authenticate(&credentials).await?;
    session.persist_user(&user_id)?;
    Ok(HttpResponse::Ok().json(json!({ "id": user_id })))
}

/// End the current session. Succeeds whether or not one exists.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["accounts"],
    operation_id = "logout",
    security([])
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.purge();
    HttpResponse::NoContent().finish()
}
