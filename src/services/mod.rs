pub mod feed;
pub mod notes;
