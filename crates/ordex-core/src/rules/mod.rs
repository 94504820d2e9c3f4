//! Rule-based field parsing shared by the vendor strategies.

pub mod dates;
pub mod discounts;
pub mod money;
pub mod patterns;

pub use dates::parse_header_date;
pub use discounts::aggregate_discount;
pub use money::{parse_price, parse_quantity};
