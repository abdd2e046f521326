// Public modules
pub mod analyzer;
pub mod arxiv;
pub mod collector;
pub mod config;
pub mod error;
pub mod feeds;
pub mod fonts;
pub mod generator;
pub mod html;
pub mod io;
pub mod layout;
pub mod logging;
pub mod markdown;
pub mod model;
pub mod models;
pub mod pdf;
pub mod pipeline;
pub mod prompts;
pub mod slides;
pub mod sources;
pub mod theme;

// Re-export commonly used types
pub use config::{Config, DateWindow, Pacing};
pub use error::{ConfigError, DecodeError};
pub use logging::LogSettings;
pub use model::{GeminiClient, GenerationOptions, TextModel};
pub use models::{Category, NewsItem, ReportSlide, VisualKind, Visualization};
pub use pdf::{DocumentRenderer, PdfRenderer};
pub use sources::{ArxivSettings, FeedSource};
