pub mod calendar_service;
pub mod converter_service;
pub mod ledger_service;
pub mod post_service;
pub mod remote_service;
pub mod summary_service;
