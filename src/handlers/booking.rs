use crate::middlewares::current_user_id;
use crate::models::*;
use crate::services::BookingService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/dates",
    tag = "booking",
    responses(
        (status = 200, description = "All test dates with availability", body = [TestDateResponse])
    )
)]
pub async fn list_dates(booking_service: web::Data<BookingService>) -> Result<HttpResponse> {
    match booking_service.list_test_dates().await {
        Ok(dates) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": dates
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/bookings",
    tag = "booking",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Caller's bookings, newest first", body = [BookingListItem]),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_bookings(
    booking_service: web::Data<BookingService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;

    match booking_service.list_my_bookings(user_id).await {
        Ok(bookings) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": bookings
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/bookings",
    tag = "booking",
    request_body = CreateBookingRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Seat reserved", body = BookingResponse),
        (status = 400, description = "Unknown date, no spots left, or already booked"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn create_booking(
    booking_service: web::Data<BookingService>,
    req: HttpRequest,
    request: web::Json<CreateBookingRequest>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;

    match booking_service
        .create_booking(user_id, request.into_inner())
        .await
    {
        Ok(booking) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": booking
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn dates_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/dates", web::get().to(list_dates));
}

pub fn bookings_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/bookings")
            .route("", web::get().to(list_bookings))
            .route("", web::post().to(create_booking)),
    );
}
