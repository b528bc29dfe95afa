// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. source::SourceError)
    clippy::module_name_repetitions
)]

//! # Photogrid
//!
//! A terminal client for searching and browsing photos.
//!
//! Photogrid shows a scrolling grid of photo thumbnails with:
//! - Free-text search with infinite scrolling over result pages
//! - A short list of recent searches, persisted between runs
//! - Inline images (Kitty, Sixel, half-block fallback)
//! - A full-size overlay for the selected photo
//!
//! ## Architecture
//!
//! The core is I/O free. [`pagination`], [`debounce`], [`history`] and
//! [`loaded`] are plain state machines composed by [`gallery`]; fetches are
//! described as requests and executed elsewhere.
//!
//! The terminal front-end uses The Elm Architecture (TEA) pattern:
//! - **Model**: Application state
//! - **Message**: Events and actions
//! - **Update**: Pure state transitions
//! - **View**: Render to terminal
//!
//! ## Modules
//!
//! - [`photo`]: Photo records, image URLs and queries
//! - [`source`]: Remote photo source (Flickr REST)
//! - [`pagination`]: Page accumulation and stale-result guarding
//! - [`debounce`]: Delayed commit of searches to history
//! - [`history`]: Persisted recent searches
//! - [`loaded`]: Which thumbnails have finished loading
//! - [`gallery`]: View model combining the above
//! - [`app`]: Main application loop and state
//! - [`ui`]: Terminal UI components
//! - [`image`]: Image decoding and terminal protocols
//! - [`config`]: Saved command-line defaults

pub mod app;
pub mod config;
pub mod debounce;
pub mod gallery;
pub mod history;
pub mod image;
pub mod loaded;
pub mod pagination;
pub mod photo;
pub mod source;
pub mod ui;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, Message, Model};
    pub use crate::gallery::Gallery;
    pub use crate::photo::{Photo, Query};
    pub use crate::source::{FlickrSource, PhotoSource};
    pub use crate::ui::viewport::Viewport;
}
