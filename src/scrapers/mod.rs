pub mod browser;
pub mod http;
pub mod traits;
pub mod types;

pub use browser::BrowserFetcher;
pub use http::HttpFetcher;
pub use traits::PageFetcher;
pub use types::{FetchOptions, Page, PageKind};
