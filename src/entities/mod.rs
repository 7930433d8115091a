pub mod child;
pub mod department;
pub mod document_signature;
pub mod employee;
pub mod employment_history;
pub mod enums;
pub mod financial_record;
pub mod financial_report;
pub mod meeting;
pub mod meeting_attendee;
pub mod membership_fee;
pub mod membership_report;
pub mod motivated_opinion;
pub mod movement_report;
pub mod movement_report_entry;
pub mod news_category;
pub mod news_comment;
pub mod news_post;
pub mod organization;
pub mod position;
pub mod quorum_voting_result;
pub mod support_request;
pub mod vote;
pub mod vote_option;
pub mod vote_selection;
pub mod voting;
pub mod voting_audience;
