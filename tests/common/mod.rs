#![allow(dead_code)]

use docxide_numbering::{
    NumberFormat, NumberingProperties, ParagraphIndent, ParagraphProperties,
};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn list_item(format: NumberFormat, lvl_text: &str, path: &[i64]) -> NumberingProperties {
    NumberingProperties {
        num_id: "1".to_string(),
        ilvl: path.len().saturating_sub(1) as u32,
        format,
        lvl_text: lvl_text.to_string(),
        path: Some(path.to_vec()),
        ..NumberingProperties::default()
    }
}

pub fn indented(
    left: Option<f64>,
    first_line: Option<f64>,
    hanging: Option<f64>,
) -> ParagraphProperties {
    ParagraphProperties {
        indent: Some(ParagraphIndent {
            left,
            right: None,
            first_line,
            hanging,
        }),
        ..ParagraphProperties::default()
    }
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
