//! Indent, tab and list-marker geometry for one paragraph.
//!
//! Indents arrive already converted to CSS pixels (see [`crate::units`]).
//! Word positions list markers in one of two ways:
//!
//! - hanging: the marker hangs back from the left indent by the hanging
//!   amount and the text starts at the left indent;
//! - first line: the marker sits at `left + firstLine` and the text follows
//!   the marker box on the same line.
//!
//! Nothing here fails; unusable numbers fall back to the defaults below.

use crate::fonts::MeasureText;
use crate::marker::{DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE, build_font_css, format_marker_text};
use crate::model::{
    DocDefaults, MarkerJustification, MarkerLayout, MarkerSuffix, NumberingProperties,
    ParagraphIndent, ParagraphProperties, RunProperties, TabAlignment, TabStop,
    WordParagraphLayoutOutput,
};

/// Marker box width when nothing better is known.
pub const DEFAULT_MARKER_BOX_WIDTH_PX: f64 = 18.0;
/// Space kept between the marker glyph and the text.
pub const LIST_MARKER_GAP_PX: f64 = 8.0;

fn finite(v: Option<f64>) -> Option<f64> {
    v.filter(|v| v.is_finite())
}

fn default_marker_run() -> RunProperties {
    RunProperties {
        font_family: Some(DEFAULT_FONT_FAMILY.to_string()),
        font_size: Some(DEFAULT_FONT_SIZE),
        color: Some("#000000".to_string()),
        ..RunProperties::default()
    }
}

/// Marker run properties, lowest precedence first: built-in default,
/// document defaults, the level's run, the inline override.
pub fn resolve_marker_run(
    doc_defaults: &DocDefaults,
    numbering: &NumberingProperties,
    marker_run: Option<&RunProperties>,
) -> RunProperties {
    let mut run = default_marker_run();
    run.overlay(&doc_defaults.run);
    if let Some(level_run) = &numbering.resolved_marker_rpr {
        run.overlay(level_run);
    }
    if let Some(over) = marker_run {
        run.overlay(over);
    }
    run
}

/// Inherited stops overlaid by the paragraph's own. A `clear` stop removes
/// the inherited stop at its position and is never emitted.
pub fn merge_tab_stops(inherited: &[TabStop], own: &[TabStop]) -> Vec<TabStop> {
    let mut stops: Vec<TabStop> = inherited
        .iter()
        .filter(|s| s.position.is_finite())
        .filter(|s| !own.iter().any(|o| same_position(o, s)))
        .cloned()
        .collect();
    stops.extend(own.iter().filter(|s| s.position.is_finite()).cloned());
    stops.retain(|s| s.alignment != TabAlignment::Clear);
    stops.sort_by(|a, b| a.position.total_cmp(&b.position));
    stops
}

// Converted positions can drift by a fraction of a pixel.
fn same_position(a: &TabStop, b: &TabStop) -> bool {
    (a.position - b.position).abs() < 0.5
}

/// True when `firstLine` is a finite positive number and `hanging` is absent.
pub fn is_first_line_pattern(indent: &ParagraphIndent) -> bool {
    indent.hanging.is_none() && finite(indent.first_line).is_some_and(|v| v > 0.0)
}

fn resolve_hanging(indent: &ParagraphIndent) -> f64 {
    let hanging = match (finite(indent.hanging), finite(indent.first_line)) {
        (Some(h), _) => h,
        (None, Some(fl)) if fl < 0.0 => -fl,
        _ => 0.0,
    };
    hanging.max(0.0)
}

fn measure_marker(
    measurer: Option<&dyn MeasureText>,
    text: &str,
    run: &RunProperties,
) -> Option<f64> {
    let measurer = measurer?;
    if text.is_empty() {
        return None;
    }
    let font_css = build_font_css(run);
    let width = measurer.measure(text, &font_css, finite(run.letter_spacing));
    (width.is_finite() && width >= 0.0).then_some(width)
}

pub fn compute_layout(
    paragraph: &ParagraphProperties,
    doc_defaults: &DocDefaults,
    numbering: Option<&NumberingProperties>,
    marker_run: Option<&RunProperties>,
    measurer: Option<&dyn MeasureText>,
) -> WordParagraphLayoutOutput {
    let default_indent = doc_defaults.paragraph.indent.unwrap_or_default();
    let indent = default_indent.merged(&paragraph.indent.unwrap_or_default());

    let left = finite(indent.left).unwrap_or(0.0);
    let right = finite(indent.right).unwrap_or(0.0);
    let first_line = finite(indent.first_line);
    let mut hanging = resolve_hanging(&indent);

    let tabs = merge_tab_stops(&doc_defaults.paragraph.tabs, &paragraph.tabs);
    let tab_interval = finite(paragraph.tab_interval)
        .or(finite(doc_defaults.paragraph.tab_interval))
        .filter(|v| *v > 0.0);

    let first_line_mode = is_first_line_pattern(&indent);

    let Some(numbering) = numbering else {
        let text_start = if first_line_mode {
            left + first_line.unwrap_or(0.0)
        } else {
            left - hanging
        };
        return WordParagraphLayoutOutput {
            indent_left_px: left,
            indent_right_px: right,
            hanging_px: hanging,
            first_line_px: first_line,
            tabs_px: tabs,
            default_tab_interval_px: tab_interval,
            text_start_px: text_start,
            marker: None,
            first_line_indent_mode: first_line_mode,
        };
    };

    let run = resolve_marker_run(doc_defaults, numbering, marker_run);
    let marker_text = format_marker_text(numbering);
    let glyph_width = measure_marker(measurer, &marker_text, &run);

    let (box_width, marker_x, text_start) = if first_line_mode {
        let box_width = glyph_width.map_or(DEFAULT_MARKER_BOX_WIDTH_PX, |w| w + LIST_MARKER_GAP_PX);
        let marker_x = left + first_line.unwrap_or(0.0);
        hanging = 0.0;
        (box_width, marker_x, marker_x + box_width)
    } else {
        let needed = glyph_width.map_or(0.0, |w| w + LIST_MARKER_GAP_PX);
        let box_width = hanging.max(needed).max(DEFAULT_MARKER_BOX_WIDTH_PX);
        hanging = box_width;
        (box_width, left - box_width, left)
    };

    log::trace!(
        "marker {marker_text:?} list {} level {}: box={box_width:.1} x={marker_x:.1} text={text_start:.1} first_line={first_line_mode}",
        numbering.num_id,
        numbering.ilvl,
    );

    let marker = MarkerLayout {
        marker_text,
        glyph_width_px: glyph_width,
        marker_box_width_px: box_width,
        marker_x,
        text_start_x: text_start,
        baseline_offset_px: finite(run.baseline_shift).unwrap_or(0.0),
        gutter_width_px: LIST_MARKER_GAP_PX,
        justification: numbering.lvl_jc.unwrap_or(MarkerJustification::Left),
        suffix: numbering.suffix.as_deref().and_then(MarkerSuffix::parse),
        path: numbering.path.clone().unwrap_or_default(),
        run,
    };

    WordParagraphLayoutOutput {
        indent_left_px: left,
        indent_right_px: right,
        hanging_px: hanging,
        first_line_px: first_line,
        tabs_px: tabs,
        default_tab_interval_px: tab_interval,
        text_start_px: text_start,
        marker: Some(marker),
        first_line_indent_mode: first_line_mode,
    }
}
