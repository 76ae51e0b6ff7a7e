//! Search strategies
//!
//! - [`content`]: streaming full-text search through ripgrep
//! - [`plain`]: file name/path enumeration through `find` or `rg --files`
//! - [`tracked`]: fuzzy search over version-controlled files with a plain fallback

pub mod cache;
pub mod content;
pub mod fuzzy;
pub mod plain;
pub mod stream;
pub mod tracked;
pub mod types;


pub use cache::{FuzzyIndex, FuzzyIndexCache, GitTrackedFiles, TrackedFiles};
pub use content::ContentSearcher;
pub use fuzzy::{FuzzyEngine, FuzzyHit};
pub use plain::PlainScanner;
pub use stream::MatchLineBuffer;
pub use tracked::TrackedSearch;
pub use types::{ContentQuery, FileFlavor, FileQuery, MatchRecord, Submatch};
