pub mod daily_frame;
pub mod element;
pub mod observation;
pub mod station;
pub mod traits;
