//! Phone wallpapers from a text prompt.
//!
//! [`gemini::WallpaperClient`] makes one Imagen call per generation and maps
//! the result to embeddable images; [`session::SessionController`] drives the
//! idle / generating / succeeded / failed session a shell renders from.

pub mod config;
pub mod error;
pub mod gemini;
pub mod logger;
pub mod models;
pub mod session;

pub use config::WallpaperConfig;
pub use error::{Result, WallpaperError};
pub use gemini::{
    GeminiClient, ImageProvider, ImagenClient, WallpaperClient, WallpaperGenerator,
};
pub use models::{AspectRatio, GeneratedImage, GenerationRequest, ProviderImage};
pub use session::{
    download_file_name, transition, Event, GenerationTicket, Session, SessionController, Status,
};
