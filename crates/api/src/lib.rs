#![forbid(unsafe_code)]

pub mod config;
pub mod contract;
pub mod credentials;
pub mod error;
pub mod http;
pub mod memory;
mod wire;

pub use config::ApiConfig;
pub use contract::{AuthApi, Backend, CatalogApi, ModuleApi, QuizApi};
pub use credentials::{
    AccessToken, CredentialStore, Credentials, FileCredentialStore, InMemoryCredentialStore,
};
pub use error::ApiError;
pub use http::HttpApi;
pub use memory::InMemoryBackend;
