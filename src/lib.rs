//! M3U playlist parsing and catalog engine for media-browsing host
//! applications.
//!
//! The core is a single-pass, line-oriented parser that turns loosely
//! structured playlist text into typed [`models::PlaylistEntry`] records,
//! plus a normalization layer that reconstructs show/episode structure
//! out of free-text titles and builds browsable catalogs on top.
//!
//! ```
//! use m3u_catalog::config::ParseOptions;
//! use m3u_catalog::services::m3u_parser::parse;
//!
//! let text = "#EXTM3U\n#EXTINF:-1 group-title=\"Dizi\",Show S01E01\nhttp://u\n";
//! let playlist = parse(text, &ParseOptions::default()).unwrap();
//! assert_eq!(playlist.items.len(), 1);
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use config::{
    CatalogOptions, EpisodeFallback, GroupingStrategy, HeaderPolicy, ParseOptions, SearchDedup,
    SearchOptions, ServiceOptions, UrlParamPriority,
};
pub use error::CatalogError;
pub use models::{
    AttributeMap, CatalogGroup, CatalogItem, EpisodeInfo, LoadData, Playlist, PlaylistEntry,
    PlaylistStats,
};
pub use services::catalog::{CatalogBuilder, ShowEpisode};
pub use services::episode::EpisodeInfoExtractor;
pub use services::fetch::{Fetcher, HttpFetcher};
pub use services::m3u_parser::{parse, M3uService};
