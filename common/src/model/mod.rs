pub mod dashboard;
pub mod question;
pub mod response;
pub mod survey;
pub mod user;
