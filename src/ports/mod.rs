pub mod catalog;
pub mod link_resolver;
pub mod page_fetcher;
pub mod setlist;
