//! Word-compatible list numbering and list paragraph geometry.
//!
//! A converter walks the document in order, asks [`NumberingManager`] for
//! each list paragraph's counter path, then hands the resolved
//! [`NumberingProperties`] to [`compute_layout`] together with the document
//! defaults and, optionally, a [`MeasureText`] for the marker glyph.

mod error;
pub mod fonts;
pub mod layout;
pub mod marker;
pub mod model;
pub mod numbering;
pub mod units;

pub use error::{Error, Result};
pub use fonts::{FontBook, FontSpec, MeasureCache, MeasureText};
pub use layout::compute_layout;
pub use marker::{apply_format, build_font_css, format_decimal, format_marker_text, to_alpha, to_roman};
pub use model::{
    DocDefaults, MarkerJustification, MarkerLayout, MarkerSuffix, NumberFormat,
    NumberingProperties, ParagraphIndent, ParagraphProperties, RunProperties, TabAlignment,
    TabStop, Underline, WordParagraphLayoutOutput,
};
pub use numbering::{CountersSnapshot, ListId, NumberingManager, Restart, StartSettings};
