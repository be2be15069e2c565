use crate::models::*;
use crate::services::AuthService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registration staged, activation code sent", body = RegisterResponse),
        (status = 400, description = "Invalid or duplicate data"),
        (status = 502, description = "Activation email could not be sent")
    )
)]
pub async fn register(
    auth_service: web::Data<AuthService>,
    request: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    match auth_service.register(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": response,
            "message": "Activation code sent to your email"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/auth/activate",
    tag = "auth",
    request_body = ActivateRequest,
    responses(
        (status = 200, description = "Account activated", body = AuthResponse),
        (status = 400, description = "Activation data expired or code mismatch")
    )
)]
pub async fn activate(
    auth_service: web::Data<AuthService>,
    request: web::Json<ActivateRequest>,
) -> Result<HttpResponse> {
    match auth_service.activate(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response,
            "message": "User successfully activated"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 401, description = "Bad credentials or inactive account")
    )
)]
pub async fn login(
    auth_service: web::Data<AuthService>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    match auth_service.login(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/auth/refresh",
    tag = "auth",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New access token", body = AccessTokenResponse),
        (status = 401, description = "Invalid refresh token")
    )
)]
pub async fn refresh(
    auth_service: web::Data<AuthService>,
    request: web::Json<RefreshRequest>,
) -> Result<HttpResponse> {
    match auth_service.refresh_token(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/auth/password-reset",
    tag = "auth",
    request_body = EmailRequest,
    responses(
        (status = 200, description = "Reset code sent", body = SendCodeResponse),
        (status = 400, description = "Unknown email")
    )
)]
pub async fn request_password_reset(
    auth_service: web::Data<AuthService>,
    request: web::Json<EmailRequest>,
) -> Result<HttpResponse> {
    match auth_service.request_password_reset(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response,
            "message": "Password reset code sent to your email"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/auth/password-reset/confirm",
    tag = "auth",
    request_body = ResetPasswordConfirmRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 400, description = "Unknown email, bad code or password mismatch")
    )
)]
pub async fn confirm_password_reset(
    auth_service: web::Data<AuthService>,
    request: web::Json<ResetPasswordConfirmRequest>,
) -> Result<HttpResponse> {
    match auth_service.confirm_password_reset(request.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message(
            "Password has been reset successfully",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/auth/verification-code",
    tag = "auth",
    request_body = EmailRequest,
    responses(
        (status = 200, description = "Verification code sent", body = SendCodeResponse),
        (status = 400, description = "Unknown email")
    )
)]
pub async fn send_verification_code(
    auth_service: web::Data<AuthService>,
    request: web::Json<EmailRequest>,
) -> Result<HttpResponse> {
    match auth_service.send_verification_code(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response,
            "message": "Verification code sent"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/auth/verification-code/check",
    tag = "auth",
    request_body = CheckVerificationCodeRequest,
    responses(
        (status = 200, description = "Code accepted"),
        (status = 400, description = "Code missing, expired or wrong")
    )
)]
pub async fn check_verification_code(
    auth_service: web::Data<AuthService>,
    request: web::Json<CheckVerificationCodeRequest>,
) -> Result<HttpResponse> {
    match auth_service.check_verification_code(request.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message("Verification code is valid"))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn auth_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/register", web::post().to(register))
            .route("/activate", web::post().to(activate))
            .route("/login", web::post().to(login))
            .route("/refresh", web::post().to(refresh))
            .route("/password-reset", web::post().to(request_password_reset))
            .route(
                "/password-reset/confirm",
                web::post().to(confirm_password_reset),
            )
            .route("/verification-code", web::post().to(send_verification_code))
            .route(
                "/verification-code/check",
                web::post().to(check_verification_code),
            ),
    );
}
