pub mod code_generator;
pub mod email;
pub mod jwt;
pub mod password;
pub mod search;

pub use code_generator::generate_six_digit_code;
pub use email::*;
pub use jwt::*;
pub use password::*;
pub use search::contains_pattern;
