//! Client side of brandsight: view state, terminal rendering, document
//! export, and the HTTP client the `brandsight` binary drives.

pub mod api;
pub mod browse;
pub mod export;
pub mod render;
pub mod view;

pub use api::{AnalyzeResult, BrandsightClient, ClientError};
pub use browse::{open_entry, parse_command, screen, BrowseCommand};
pub use export::{build_document, save_document, ExportDocument, ExportError, ExportPage};
pub use render::{history_lines, parse_suggestion, render_report, Suggestion};
pub use view::{ClientSession, CurrentView, ExpandFilter};
