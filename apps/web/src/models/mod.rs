pub mod document;
pub mod jobs;
pub mod profile;
pub mod search;
pub mod session;
