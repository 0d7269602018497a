pub mod block;
pub mod fields;
pub mod links;
pub mod normalize;

pub use block::is_blocked;
pub use fields::extract_page_fields;
pub use links::{extract_links, LinkClassifier};
pub use normalize::normalize_text;
