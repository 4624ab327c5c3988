pub mod auth;
pub mod dashboard;
pub mod results;
pub mod surveys;
pub mod users;
