pub mod http;
pub mod traits;
pub mod types;

pub use http::HttpPropertyStore;
pub use traits::PropertyStore;
pub use types::ClientSettings;
