pub mod any_date;
pub mod date_period;
pub mod types;
pub mod utils;
