pub mod analysis;
pub mod calendar;
pub mod category;
pub mod date_key;
pub mod memo;
pub mod post;
pub mod rate;
pub mod settings;
pub mod summary;
pub mod transaction;
