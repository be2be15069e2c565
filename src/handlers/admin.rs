use crate::error::AppResult;
use crate::middlewares::current_user_id;
use crate::models::*;
use crate::services::{BookingService, UserService};
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

async fn require_staff(user_service: &UserService, req: &HttpRequest) -> AppResult<()> {
    let user_id = current_user_id(req)?;
    user_service.require_staff(user_id).await.map(|_| ())
}

#[utoipa::path(
    get,
    path = "/admin/test-dates",
    tag = "admin",
    params(AdminTestDateQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Test dates with booking counts", body = PaginatedTestDates),
        (status = 400, description = "Bad filter or ordering"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn list_test_dates(
    user_service: web::Data<UserService>,
    booking_service: web::Data<BookingService>,
    req: HttpRequest,
    query: web::Query<AdminTestDateQuery>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&user_service, &req).await {
        return Ok(e.error_response());
    }

    match booking_service.admin_list_test_dates(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": page
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/test-dates",
    tag = "admin",
    request_body = CreateTestDateRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Test date created", body = TestDateResponse),
        (status = 400, description = "Invalid data or date already exists"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn create_test_date(
    user_service: web::Data<UserService>,
    booking_service: web::Data<BookingService>,
    req: HttpRequest,
    request: web::Json<CreateTestDateRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&user_service, &req).await {
        return Ok(e.error_response());
    }

    match booking_service.create_test_date(request.into_inner()).await {
        Ok(test_date) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": test_date
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/admin/test-dates/{id}",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "Test date id")
    ),
    request_body = UpdateTestDateRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Test date updated", body = TestDateResponse),
        (status = 400, description = "Invalid data"),
        (status = 403, description = "Staff only"),
        (status = 404, description = "Test date not found")
    )
)]
pub async fn update_test_date(
    user_service: web::Data<UserService>,
    booking_service: web::Data<BookingService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateTestDateRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&user_service, &req).await {
        return Ok(e.error_response());
    }

    match booking_service
        .update_test_date(path.into_inner(), request.into_inner())
        .await
    {
        Ok(test_date) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": test_date
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/admin/test-dates/{id}",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "Test date id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Test date and its bookings deleted"),
        (status = 403, description = "Staff only"),
        (status = 404, description = "Test date not found")
    )
)]
pub async fn delete_test_date(
    user_service: web::Data<UserService>,
    booking_service: web::Data<BookingService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&user_service, &req).await {
        return Ok(e.error_response());
    }

    match booking_service.delete_test_date(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message("Test date deleted"))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/bookings",
    tag = "admin",
    params(AdminBookingQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "All bookings, newest first", body = PaginatedBookings),
        (status = 403, description = "Staff only")
    )
)]
pub async fn list_bookings(
    user_service: web::Data<UserService>,
    booking_service: web::Data<BookingService>,
    req: HttpRequest,
    query: web::Query<AdminBookingQuery>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&user_service, &req).await {
        return Ok(e.error_response());
    }

    match booking_service.admin_list_bookings(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": page
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/users",
    tag = "admin",
    params(AdminUserQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Users, newest first", body = PaginatedUsers),
        (status = 403, description = "Staff only")
    )
)]
pub async fn list_users(
    user_service: web::Data<UserService>,
    req: HttpRequest,
    query: web::Query<AdminUserQuery>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&user_service, &req).await {
        return Ok(e.error_response());
    }

    match user_service.admin_list_users(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": page
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/admin/users/{id}",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "User id")
    ),
    request_body = AdminUpdateUserRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "User updated", body = AdminUserResponse),
        (status = 400, description = "Invalid data"),
        (status = 403, description = "Staff only"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user(
    user_service: web::Data<UserService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<AdminUpdateUserRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&user_service, &req).await {
        return Ok(e.error_response());
    }

    match user_service
        .admin_update_user(path.into_inner(), request.into_inner())
        .await
    {
        Ok(user) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": user
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/users/assign-proctor",
    tag = "admin",
    request_body = AssignProctorRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Proctor assigned", body = AssignProctorResponse),
        (status = 400, description = "No users selected or invalid name"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn assign_proctor(
    user_service: web::Data<UserService>,
    req: HttpRequest,
    request: web::Json<AssignProctorRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_staff(&user_service, &req).await {
        return Ok(e.error_response());
    }

    match user_service.assign_proctor(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response,
            "message": format!("Assigned {} to {} user(s)", response.proctor_name, response.updated)
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/test-dates", web::get().to(list_test_dates))
            .route("/test-dates", web::post().to(create_test_date))
            .route("/test-dates/{id}", web::put().to(update_test_date))
            .route("/test-dates/{id}", web::delete().to(delete_test_date))
            .route("/bookings", web::get().to(list_bookings))
            .route("/users", web::get().to(list_users))
            .route("/users/assign-proctor", web::post().to(assign_proctor))
            .route("/users/{id}", web::put().to(update_user)),
    );
}
