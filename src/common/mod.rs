pub mod client;
pub mod config;
pub mod errors;

// Re-export
pub use client::{
    DEFAULT_TIMEOUT, HttpResponse, HttpTransport, ReqwestTransport, create_http_client,
};
pub use config::{API_KEY_ENV, Settings, load_dotenv};
pub use errors::{ApiErrorDetails, CryptowatchError};
