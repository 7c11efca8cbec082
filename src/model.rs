use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TabAlignment {
    #[default]
    #[serde(alias = "start")]
    Left,
    Center,
    #[serde(alias = "end")]
    Right,
    Decimal,
    Bar,
    /// Removes an inherited stop at the same position.
    Clear,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabStop {
    pub position: f64,
    #[serde(default)]
    pub alignment: TabAlignment,
    #[serde(default)]
    pub leader: Option<char>,
}

/// Paragraph indentation as resolved by the converter, already in layout
/// units. `first_line` and `hanging` are exclusive in well-formed documents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParagraphIndent {
    pub left: Option<f64>,
    pub right: Option<f64>,
    pub first_line: Option<f64>,
    pub hanging: Option<f64>,
}

impl ParagraphIndent {
    /// Field-by-field merge where values set on `over` win.
    pub fn merged(&self, over: &ParagraphIndent) -> ParagraphIndent {
        ParagraphIndent {
            left: over.left.or(self.left),
            right: over.right.or(self.right),
            first_line: over.first_line.or(self.first_line),
            hanging: over.hanging.or(self.hanging),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParagraphProperties {
    pub indent: Option<ParagraphIndent>,
    pub tabs: Vec<TabStop>,
    pub tab_interval: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Underline {
    pub style: Option<String>,
    pub color: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RunProperties {
    pub font_family: Option<String>,
    pub font_size: Option<f64>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub color: Option<String>,
    pub letter_spacing: Option<f64>,
    pub baseline_shift: Option<f64>,
    pub underline: Option<Underline>,
    pub strike: Option<bool>,
    pub vanish: Option<bool>,
}

impl RunProperties {
    /// Layer `over` on top of `self`. Scalars that are set on `over` replace
    /// ours; the underline record is merged field by field.
    pub fn overlay(&mut self, over: &RunProperties) {
        fn take<T: Clone>(slot: &mut Option<T>, value: &Option<T>) {
            if value.is_some() {
                slot.clone_from(value);
            }
        }
        take(&mut self.font_family, &over.font_family);
        take(&mut self.font_size, &over.font_size);
        take(&mut self.bold, &over.bold);
        take(&mut self.italic, &over.italic);
        take(&mut self.color, &over.color);
        take(&mut self.letter_spacing, &over.letter_spacing);
        take(&mut self.baseline_shift, &over.baseline_shift);
        take(&mut self.strike, &over.strike);
        take(&mut self.vanish, &over.vanish);
        if let Some(u) = &over.underline {
            let base = self.underline.get_or_insert_with(Underline::default);
            take(&mut base.style, &u.style);
            take(&mut base.color, &u.color);
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocDefaults {
    pub paragraph: ParagraphProperties,
    pub run: RunProperties,
}

/// `w:numFmt` values the formatter understands. Anything else is treated as
/// decimal, which is what Word falls back to as well.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NumberFormat {
    #[default]
    Decimal,
    DecimalZero,
    LowerLetter,
    UpperLetter,
    LowerRoman,
    UpperRoman,
    Bullet,
    None,
}

impl NumberFormat {
    pub fn from_ooxml(val: &str) -> NumberFormat {
        match val {
            "decimalZero" => NumberFormat::DecimalZero,
            "lowerLetter" => NumberFormat::LowerLetter,
            "upperLetter" => NumberFormat::UpperLetter,
            "lowerRoman" => NumberFormat::LowerRoman,
            "upperRoman" => NumberFormat::UpperRoman,
            "bullet" => NumberFormat::Bullet,
            "none" => NumberFormat::None,
            _ => NumberFormat::Decimal,
        }
    }

    pub fn as_ooxml(self) -> &'static str {
        match self {
            NumberFormat::Decimal => "decimal",
            NumberFormat::DecimalZero => "decimalZero",
            NumberFormat::LowerLetter => "lowerLetter",
            NumberFormat::UpperLetter => "upperLetter",
            NumberFormat::LowerRoman => "lowerRoman",
            NumberFormat::UpperRoman => "upperRoman",
            NumberFormat::Bullet => "bullet",
            NumberFormat::None => "none",
        }
    }
}

impl From<String> for NumberFormat {
    fn from(val: String) -> Self {
        NumberFormat::from_ooxml(&val)
    }
}

impl From<NumberFormat> for String {
    fn from(fmt: NumberFormat) -> Self {
        fmt.as_ooxml().to_string()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkerJustification {
    #[default]
    #[serde(alias = "start")]
    Left,
    Center,
    #[serde(alias = "end")]
    Right,
}

/// What separates the marker from the paragraph text (`w:suff`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkerSuffix {
    Tab,
    Space,
    Nothing,
}

impl MarkerSuffix {
    /// Unrecognized values yield `None`: no explicit suffix.
    pub fn parse(val: &str) -> Option<MarkerSuffix> {
        match val.trim().to_ascii_lowercase().as_str() {
            "tab" => Some(MarkerSuffix::Tab),
            "space" => Some(MarkerSuffix::Space),
            "nothing" => Some(MarkerSuffix::Nothing),
            _ => None,
        }
    }
}

/// Numbering of one list paragraph as resolved by the converter. `path` is
/// the ancestor-and-own counter sequence from the numbering manager.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NumberingProperties {
    pub num_id: String,
    pub ilvl: u32,
    pub format: NumberFormat,
    pub lvl_text: String,
    pub path: Option<Vec<i64>>,
    pub start: Option<i64>,
    pub lvl_jc: Option<MarkerJustification>,
    pub suffix: Option<String>,
    pub resolved_marker_rpr: Option<RunProperties>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerLayout {
    pub marker_text: String,
    pub glyph_width_px: Option<f64>,
    pub marker_box_width_px: f64,
    pub marker_x: f64,
    pub text_start_x: f64,
    pub baseline_offset_px: f64,
    pub gutter_width_px: f64,
    pub justification: MarkerJustification,
    pub suffix: Option<MarkerSuffix>,
    pub run: RunProperties,
    pub path: Vec<i64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordParagraphLayoutOutput {
    pub indent_left_px: f64,
    pub indent_right_px: f64,
    pub hanging_px: f64,
    pub first_line_px: Option<f64>,
    pub tabs_px: Vec<TabStop>,
    pub default_tab_interval_px: Option<f64>,
    pub text_start_px: f64,
    pub marker: Option<MarkerLayout>,
    pub first_line_indent_mode: bool,
}
