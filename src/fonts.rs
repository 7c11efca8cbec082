//! Text measurement for list markers.
//!
//! Layout only needs a width for a short marker string. Callers either pass a
//! closure backed by their own renderer or use [`FontBook`], which reads
//! advances straight from font files. [`MeasureCache`] memoizes any measurer
//! for the lifetime of one session.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use memmap2::Mmap;
use ttf_parser::Face;

use crate::marker::{DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE};

/// Average advance, in em, used when no face is available.
pub const FALLBACK_ADVANCE_EM: f64 = 0.5;

pub trait MeasureText {
    /// Width of `text` in CSS pixels when set in `font_css`
    /// (`"[italic ][bold ]<size>px <family>"`).
    fn measure(&self, text: &str, font_css: &str, letter_spacing: Option<f64>) -> f64;
}

impl<F> MeasureText for F
where
    F: Fn(&str, &str, Option<f64>) -> f64,
{
    fn measure(&self, text: &str, font_css: &str, letter_spacing: Option<f64>) -> f64 {
        self(text, font_css, letter_spacing)
    }
}

/// A parsed font shorthand as produced by [`crate::marker::build_font_css`].
#[derive(Clone, Debug, PartialEq)]
pub struct FontSpec {
    pub family: String,
    pub size_px: f64,
    pub bold: bool,
    pub italic: bool,
}

impl FontSpec {
    pub fn parse(css: &str) -> FontSpec {
        let mut spec = FontSpec {
            family: DEFAULT_FONT_FAMILY.to_string(),
            size_px: DEFAULT_FONT_SIZE,
            bold: false,
            italic: false,
        };
        let mut tokens = css.split_whitespace().peekable();
        while let Some(&token) = tokens.peek() {
            match token {
                "italic" | "oblique" => spec.italic = true,
                "bold" | "bolder" => spec.bold = true,
                "normal" => {}
                _ => {
                    if let Some(size) = token
                        .strip_suffix("px")
                        .and_then(|v| v.parse::<f64>().ok())
                        .filter(|v| v.is_finite() && *v > 0.0)
                    {
                        spec.size_px = size;
                        tokens.next();
                    }
                    break;
                }
            }
            tokens.next();
        }
        let rest: Vec<&str> = tokens.collect();
        let family = rest.join(" ");
        let family = family
            .split(',')
            .next()
            .unwrap_or("")
            .trim()
            .trim_matches(|c| c == '"' || c == '\'');
        if !family.is_empty() {
            spec.family = family.to_string();
        }
        spec
    }
}

type CacheKey = (String, String, Option<u64>);

/// Memoizes widths by (text, font, letter spacing). One per session; drop it
/// or call [`MeasureCache::clear`] when fonts change.
pub struct MeasureCache<M> {
    inner: M,
    entries: RefCell<HashMap<CacheKey, f64>>,
    hits: Cell<u64>,
    misses: Cell<u64>,
}

impl<M: MeasureText> MeasureCache<M> {
    pub fn new(inner: M) -> Self {
        Self {
            inner,
            entries: RefCell::new(HashMap::new()),
            hits: Cell::new(0),
            misses: Cell::new(0),
        }
    }

    pub fn hits(&self) -> u64 {
        self.hits.get()
    }

    pub fn misses(&self) -> u64 {
        self.misses.get()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
        self.hits.set(0);
        self.misses.set(0);
    }

    pub fn into_inner(self) -> M {
        self.inner
    }
}

impl<M: MeasureText> MeasureText for MeasureCache<M> {
    fn measure(&self, text: &str, font_css: &str, letter_spacing: Option<f64>) -> f64 {
        let key = (
            text.to_string(),
            font_css.to_string(),
            letter_spacing.map(f64::to_bits),
        );
        if let Some(&w) = self.entries.borrow().get(&key) {
            self.hits.set(self.hits.get() + 1);
            return w;
        }
        let w = self.inner.measure(text, font_css, letter_spacing);
        self.misses.set(self.misses.get() + 1);
        self.entries.borrow_mut().insert(key, w);
        w
    }
}

enum FontData {
    Owned(Vec<u8>),
    Mapped(Mmap),
}

impl FontData {
    fn bytes(&self) -> &[u8] {
        match self {
            FontData::Owned(v) => v.as_slice(),
            FontData::Mapped(m) => &m[..],
        }
    }
}

/// (lowercase family name, bold, italic)
type FaceKey = (String, bool, bool);

/// Font faces indexed by family and style, measured with their real advances.
#[derive(Default)]
pub struct FontBook {
    sources: Vec<FontData>,
    index: HashMap<FaceKey, (usize, u32)>,
    warned: Mutex<HashSet<String>>,
}

fn font_family_name(face: &Face) -> Option<String> {
    // Name ID 1 keeps "Aptos Display" apart from "Aptos"; the typographic
    // family (ID 16) would merge them.
    for name in face.names() {
        if name.name_id == ttf_parser::name_id::FAMILY
            && name.is_unicode()
            && let Some(s) = name.to_string()
        {
            return Some(s);
        }
    }
    None
}

fn read_font_style(data: &[u8], face_index: u32) -> Option<(String, bool, bool)> {
    let face = Face::parse(data, face_index).ok()?;
    let family = font_family_name(&face)?;
    Some((family, face.is_bold(), face.is_italic()))
}

fn is_font_file(path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref(),
        Some("ttf" | "otf" | "ttc")
    )
}

/// Platform font folders, most specific first.
pub fn system_font_dirs() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = Vec::new();

    #[cfg(target_os = "macos")]
    {
        dirs.extend([
            "/Library/Fonts".into(),
            "/System/Library/Fonts".into(),
            "/System/Library/Fonts/Supplemental".into(),
        ]);
        if let Ok(home) = std::env::var("HOME") {
            dirs.push(PathBuf::from(home).join("Library/Fonts"));
        }
    }

    #[cfg(target_os = "linux")]
    {
        dirs.extend(["/usr/share/fonts".into(), "/usr/local/share/fonts".into()]);
        if let Ok(home) = std::env::var("HOME") {
            dirs.push(PathBuf::from(home).join(".local/share/fonts"));
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Ok(windir) = std::env::var("WINDIR") {
            dirs.push(PathBuf::from(windir).join("Fonts"));
        } else {
            dirs.push("C:\\Windows\\Fonts".into());
        }
    }

    dirs
}

impl FontBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn system() -> Self {
        Self::from_dirs(&system_font_dirs())
    }

    /// Index every TTF/OTF/TTC below `dirs`. Unreadable files are skipped.
    pub fn from_dirs(dirs: &[PathBuf]) -> Self {
        let t0 = std::time::Instant::now();
        let mut book = Self::new();
        let mut files_scanned = 0u32;
        let mut visited: HashSet<PathBuf> = HashSet::new();
        let mut stack: Vec<PathBuf> = dirs.to_vec();

        while let Some(dir) = stack.pop() {
            if !visited.insert(dir.clone()) {
                continue;
            }
            let Ok(entries) = std::fs::read_dir(&dir) else {
                continue;
            };
            for entry in entries.flatten() {
                let path = entry.path();
                // Symlinked directories are not followed; they can loop.
                let Ok(file_type) = entry.file_type() else {
                    continue;
                };
                if file_type.is_dir() {
                    stack.push(path);
                } else if is_font_file(&path) {
                    files_scanned += 1;
                    book.add_font_file(&path);
                }
            }
        }

        log::info!(
            "Font scan: {:.1}ms, {} dirs, {} files parsed → {} faces",
            t0.elapsed().as_secs_f64() * 1000.0,
            visited.len(),
            files_scanned,
            book.len(),
        );
        book
    }

    /// Number of indexed (family, bold, italic) faces.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Index the faces in an in-memory font or collection. Returns how many
    /// faces were added.
    pub fn add_font_data(&mut self, data: Vec<u8>) -> usize {
        self.add_source(FontData::Owned(data))
    }

    pub fn add_font_file(&mut self, path: &Path) -> usize {
        let Ok(file) = std::fs::File::open(path) else {
            return 0;
        };
        // The mapping outlives the file handle; font files are not expected
        // to change while the book is alive.
        let Ok(data) = (unsafe { Mmap::map(&file) }) else {
            return 0;
        };
        self.add_source(FontData::Mapped(data))
    }

    fn add_source(&mut self, data: FontData) -> usize {
        let source = self.sources.len();
        let bytes = data.bytes();
        let face_count = ttf_parser::fonts_in_collection(bytes).unwrap_or(1);
        let mut added = 0;
        for face_index in 0..face_count {
            if let Some((family, bold, italic)) = read_font_style(bytes, face_index) {
                let key = (family.to_lowercase(), bold, italic);
                if !self.index.contains_key(&key) {
                    self.index.insert(key, (source, face_index));
                    added += 1;
                }
            }
        }
        if added > 0 {
            self.sources.push(data);
        }
        added
    }

    pub fn has_family(&self, family: &str) -> bool {
        let family = family.to_lowercase();
        self.index.keys().any(|(f, _, _)| *f == family)
    }

    /// Indexed family names, lowercased and sorted.
    pub fn families(&self) -> Vec<String> {
        let mut families: Vec<String> = self.index.keys().map(|(f, _, _)| f.clone()).collect();
        families.sort();
        families.dedup();
        families
    }

    fn lookup(&self, spec: &FontSpec) -> Option<(usize, u32)> {
        let family = spec.family.to_lowercase();
        self.index
            .get(&(family.clone(), spec.bold, spec.italic))
            .or_else(|| self.index.get(&(family.clone(), spec.bold, false)))
            .or_else(|| self.index.get(&(family, false, false)))
            .copied()
    }

    /// Sum of advances in px, `None` when the family is not indexed.
    fn face_width(&self, spec: &FontSpec, text: &str) -> Option<f64> {
        let (source, face_index) = self.lookup(spec)?;
        let face = Face::parse(self.sources[source].bytes(), face_index).ok()?;
        let units = face.units_per_em() as f64;
        let em: f64 = text
            .chars()
            .map(|ch| {
                face.glyph_index(ch)
                    .and_then(|gid| face.glyph_hor_advance(gid))
                    .map(|adv| adv as f64 / units)
                    .unwrap_or(FALLBACK_ADVANCE_EM)
            })
            .sum();
        Some(em * spec.size_px)
    }

    fn warn_missing(&self, family: &str) {
        let Ok(mut warned) = self.warned.lock() else {
            return;
        };
        if warned.insert(family.to_lowercase()) {
            log::warn!("Font not found: {family}, estimating marker width");
        }
    }
}

impl MeasureText for FontBook {
    fn measure(&self, text: &str, font_css: &str, letter_spacing: Option<f64>) -> f64 {
        let spec = FontSpec::parse(font_css);
        let chars = text.chars().count() as f64;
        let spacing = letter_spacing.filter(|v| v.is_finite()).unwrap_or(0.0) * chars;
        let width = self.face_width(&spec, text).unwrap_or_else(|| {
            self.warn_missing(&spec.family);
            chars * FALLBACK_ADVANCE_EM * spec.size_px
        });
        width + spacing
    }
}
