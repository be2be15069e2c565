pub mod bookings;
pub mod test_dates;
pub mod users;

pub use bookings as booking_entity;
pub use test_dates as test_date_entity;
pub use users as user_entity;
pub use users::{Decision, PaymentProvider, PaymentStatus};
