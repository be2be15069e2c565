use crate::models::{AdminBookingResponse, AdminTestDateResponse, AdminUserResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

const DEFAULT_PAGE_SIZE: u64 = 20;
const MAX_PAGE_SIZE: u64 = 100;

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct PaginationParams {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

impl PaginationParams {
    pub fn new(page: Option<u64>, page_size: Option<u64>) -> Self {
        Self { page, page_size }
    }

    pub fn get_page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn get_page_size(&self) -> u64 {
        self.page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    pub fn get_offset(&self) -> u64 {
        (self.get_page() - 1) * self.get_page_size()
    }

    pub fn get_limit(&self) -> u64 {
        self.get_page_size()
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[aliases(
    PaginatedTestDates = PaginatedResponse<AdminTestDateResponse>,
    PaginatedBookings = PaginatedResponse<AdminBookingResponse>,
    PaginatedUsers = PaginatedResponse<AdminUserResponse>
)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub page: u64,
    pub page_size: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, params: &PaginationParams, total: u64) -> Self {
        let page_size = params.get_page_size();
        Self {
            data,
            page: params.get_page(),
            page_size,
            total,
            total_pages: total.div_ceil(page_size),
        }
    }
}
