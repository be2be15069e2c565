use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{Decision, PaymentProvider, PaymentStatus};
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::register,
        handlers::auth::activate,
        handlers::auth::login,
        handlers::auth::refresh,
        handlers::auth::request_password_reset,
        handlers::auth::confirm_password_reset,
        handlers::auth::send_verification_code,
        handlers::auth::check_verification_code,
        handlers::user::get_profile,
        handlers::user::update_profile,
        handlers::booking::list_dates,
        handlers::booking::list_bookings,
        handlers::booking::create_booking,
        handlers::admin::list_test_dates,
        handlers::admin::create_test_date,
        handlers::admin::update_test_date,
        handlers::admin::delete_test_date,
        handlers::admin::list_bookings,
        handlers::admin::list_users,
        handlers::admin::update_user,
        handlers::admin::assign_proctor,
    ),
    components(
        schemas(
            RegisterRequest,
            RegisterResponse,
            ActivateRequest,
            LoginRequest,
            RefreshRequest,
            EmailRequest,
            ResetPasswordConfirmRequest,
            CheckVerificationCodeRequest,
            SendCodeResponse,
            UpdateUserRequest,
            UserResponse,
            AuthResponse,
            AccessTokenResponse,
            TestDateResponse,
            BookingListItem,
            CreateBookingRequest,
            BookingResponse,
            AdminTestDateResponse,
            CreateTestDateRequest,
            UpdateTestDateRequest,
            AdminBookingResponse,
            AdminUserResponse,
            AdminUpdateUserRequest,
            AssignProctorRequest,
            AssignProctorResponse,
            PaginatedTestDates,
            PaginatedBookings,
            PaginatedUsers,
            Decision,
            PaymentProvider,
            PaymentStatus,
            ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration, activation and tokens"),
        (name = "user", description = "Own profile"),
        (name = "booking", description = "Test dates and seat booking"),
        (name = "admin", description = "Staff-only management API"),
    ),
    info(
        title = "Aura Booking API",
        version = "1.0.0",
        description = "Exam date booking REST API documentation"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_booking_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/bookings"));
        assert!(doc.paths.paths.contains_key("/admin/test-dates/{id}"));
        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
