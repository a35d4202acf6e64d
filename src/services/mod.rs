pub mod attributes;
pub mod cache;
pub mod catalog;
pub mod episode;
pub mod fetch;
pub mod m3u_parser;
