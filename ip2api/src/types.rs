/// Primitive IP2 data types and NewType-patterns.
mod ids;
mod ip2_url;
mod strings;

pub use ids::*;
pub use ip2_url::*;
pub use strings::*;
