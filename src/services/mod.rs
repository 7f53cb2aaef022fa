pub mod album;
pub mod fanout;
pub mod itunes;
pub mod keyboard;
pub mod odesli;
pub mod page_fetcher;
pub mod relay;
pub mod session_store;
pub mod setlistfm;
