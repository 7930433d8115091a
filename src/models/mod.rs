pub mod finance;
pub mod members;
pub mod news;
pub mod protocols;
pub mod reports;
pub mod voting;
