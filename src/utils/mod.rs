pub mod constants;
pub mod url_utils;

pub use constants::*;
pub use url_utils::{is_valid_url, normalize_image_src, topic_title};
