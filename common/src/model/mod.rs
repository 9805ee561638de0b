pub mod import;
pub mod response;
pub mod user;
pub mod voter;
