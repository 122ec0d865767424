//! Question body text with images and input fields anchored at character offsets.
//!
//! Offsets count `char`s, not bytes. Every mark sits on exactly one
//! [`PLACEHOLDER`] character, so the text length already accounts for it.

use crate::libjqs::error::CorruptFileError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Range;

/// Character standing in for a mark inside the text.
pub const PLACEHOLDER: char = '\u{FFFC}';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageMark {
    pub width: u32,
    pub height: u32,
    /// Row-major ARGB words, `width * height` of them.
    pub pixels: Vec<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMark {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mark {
    Image(ImageMark),
    Field(FieldMark),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkKind {
    Image,
    Field,
}

impl Mark {
    pub fn kind(&self) -> MarkKind {
        match self {
            Mark::Image(_) => MarkKind::Image,
            Mark::Field(_) => MarkKind::Field,
        }
    }
}

impl ImageMark {
    pub fn new(width: u32, height: u32, pixels: Vec<i32>) -> Self {
        assert_eq!(
            pixels.len(),
            width as usize * height as usize,
            "pixel buffer does not match {width}x{height}"
        );
        ImageMark {
            width,
            height,
            pixels,
        }
    }

    #[cfg(feature = "images")]
    pub fn from_rgba(img: &image::RgbaImage) -> Self {
        let pixels = img
            .pixels()
            .map(|p| {
                let [r, g, b, a] = p.0;
                i32::from_be_bytes([a, r, g, b])
            })
            .collect();
        ImageMark {
            width: img.width(),
            height: img.height(),
            pixels,
        }
    }

    #[cfg(feature = "images")]
    pub fn to_rgba(&self) -> image::RgbaImage {
        let raw = self
            .pixels
            .iter()
            .flat_map(|px| {
                let [a, r, g, b] = px.to_be_bytes();
                [r, g, b, a]
            })
            .collect();
        // Length is guaranteed by the constructor and the codec checks.
        image::RgbaImage::from_raw(self.width, self.height, raw)
            .unwrap_or_else(|| image::RgbaImage::new(self.width, self.height))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "ContentRepr", try_from = "ContentRepr")]
pub struct RichContent {
    chars: Vec<char>,
    marks: BTreeMap<usize, Mark>,
}

impl RichContent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_text(text: &str) -> Self {
        RichContent {
            chars: text.chars().collect(),
            marks: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// The whole text, placeholders included.
    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn text_at(&self, range: Range<usize>) -> String {
        assert!(
            range.start <= range.end && range.end <= self.len(),
            "range {range:?} outside content of length {}",
            self.len()
        );
        self.chars[range].iter().collect()
    }

    /// Inserts plain text at `pos`; marks at or after `pos` move right.
    pub fn insert_text(&mut self, pos: usize, text: &str) {
        assert!(pos <= self.len(), "insert at {pos} past end {}", self.len());
        let inserted: Vec<char> = text.chars().collect();
        let count = inserted.len();
        self.chars.splice(pos..pos, inserted);
        self.shift_marks_from(pos, count);
    }

    pub fn insert_placeholder(&mut self, pos: usize) {
        let mut buf = [0u8; 4];
        self.insert_text(pos, PLACEHOLDER.encode_utf8(&mut buf));
    }

    /// Removes the characters in `range`, dropping any marks inside it.
    pub fn remove(&mut self, range: Range<usize>) {
        assert!(
            range.start <= range.end && range.end <= self.len(),
            "range {range:?} outside content of length {}",
            self.len()
        );
        let removed = range.end - range.start;
        self.chars.drain(range.clone());
        let mut from_start = self.marks.split_off(&range.start);
        let after = from_start.split_off(&range.end);
        self.marks
            .extend(after.into_iter().map(|(pos, mark)| (pos - removed, mark)));
    }

    pub fn attach_image(&mut self, pos: usize, width: u32, height: u32, pixels: Vec<i32>) {
        self.bind(pos, Mark::Image(ImageMark::new(width, height, pixels)));
    }

    pub fn attach_field(&mut self, pos: usize, text: impl Into<String>) {
        self.bind(pos, Mark::Field(FieldMark { text: text.into() }));
    }

    /// Replaces the character at `pos` with a placeholder bound to `mark`.
    fn bind(&mut self, pos: usize, mark: Mark) {
        assert!(pos < self.len(), "mark at {pos} outside content of length {}", self.len());
        assert!(!self.marks.contains_key(&pos), "position {pos} already holds a mark");
        self.chars[pos] = PLACEHOLDER;
        self.marks.insert(pos, mark);
    }

    fn shift_marks_from(&mut self, pos: usize, by: usize) {
        if by == 0 {
            return;
        }
        let tail = self.marks.split_off(&pos);
        self.marks
            .extend(tail.into_iter().map(|(p, mark)| (p + by, mark)));
    }

    pub fn mark_at(&self, pos: usize) -> Option<&Mark> {
        self.marks.get(&pos)
    }

    /// All marks, ascending by position.
    pub fn marks_in_order(&self) -> impl Iterator<Item = (usize, &Mark)> {
        self.marks.iter().map(|(pos, mark)| (*pos, mark))
    }

    pub fn images(&self) -> impl Iterator<Item = (usize, &ImageMark)> {
        self.marks_in_order().filter_map(|(pos, mark)| match mark {
            Mark::Image(image) => Some((pos, image)),
            Mark::Field(_) => None,
        })
    }

    pub fn fields(&self) -> impl Iterator<Item = (usize, &FieldMark)> {
        self.marks_in_order().filter_map(|(pos, mark)| match mark {
            Mark::Field(field) => Some((pos, field)),
            Mark::Image(_) => None,
        })
    }

    pub fn field_count(&self) -> usize {
        self.fields().count()
    }
}

#[derive(Serialize, Deserialize)]
struct ContentRepr {
    text: String,
    #[serde(default)]
    marks: Vec<MarkRepr>,
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum MarkRepr {
    Image {
        pos: usize,
        width: u32,
        height: u32,
        pixels: Vec<i32>,
    },
    Field {
        pos: usize,
        text: String,
    },
}

impl From<RichContent> for ContentRepr {
    fn from(content: RichContent) -> Self {
        let text = content.text();
        let marks = content
            .marks
            .into_iter()
            .map(|(pos, mark)| match mark {
                Mark::Image(ImageMark {
                    width,
                    height,
                    pixels,
                }) => MarkRepr::Image {
                    pos,
                    width,
                    height,
                    pixels,
                },
                Mark::Field(FieldMark { text }) => MarkRepr::Field { pos, text },
            })
            .collect();
        ContentRepr { text, marks }
    }
}

impl TryFrom<ContentRepr> for RichContent {
    type Error = CorruptFileError;

    fn try_from(repr: ContentRepr) -> Result<Self, Self::Error> {
        let mut content = RichContent::from_text(&repr.text);
        for mark in repr.marks {
            let (pos, mark) = match mark {
                MarkRepr::Image {
                    pos,
                    width,
                    height,
                    pixels,
                } => {
                    let expected = width as usize * height as usize;
                    if pixels.len() != expected {
                        return Err(CorruptFileError::PixelCount {
                            pos,
                            expected,
                            found: pixels.len(),
                        });
                    }
                    (
                        pos,
                        Mark::Image(ImageMark {
                            width,
                            height,
                            pixels,
                        }),
                    )
                }
                MarkRepr::Field { pos, text } => (pos, Mark::Field(FieldMark { text })),
            };
            content.try_bind(pos, mark)?;
        }
        Ok(content)
    }
}

impl RichContent {
    /// Checked form of attaching, for data that comes from outside the program.
    pub(crate) fn try_bind(&mut self, pos: usize, mark: Mark) -> Result<(), CorruptFileError> {
        if pos >= self.len() {
            return Err(CorruptFileError::MarkOutOfBounds {
                pos,
                len: self.len(),
            });
        }
        if self.marks.contains_key(&pos) {
            return Err(CorruptFileError::DuplicateMark(pos));
        }
        self.bind(pos, mark);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RichContent {
        // "Put _ in _." with a field at 4 and an image at 9
        let mut content = RichContent::from_text("Put X in Y.");
        content.attach_field(4, "apple");
        content.attach_image(9, 1, 2, vec![-1, 0x00ff00ff]);
        content
    }

    #[test]
    fn attaching_replaces_the_character_with_a_placeholder() {
        let content = sample();
        assert_eq!(content.len(), 11);
        assert_eq!(content.text_at(4..5), PLACEHOLDER.to_string());
        assert_eq!(content.text_at(0..4), "Put ");
        assert_eq!(content.mark_at(4).map(Mark::kind), Some(MarkKind::Field));
        assert_eq!(content.mark_at(9).map(Mark::kind), Some(MarkKind::Image));
        assert!(content.mark_at(5).is_none());
    }

    #[test]
    fn marks_come_back_in_ascending_order() {
        let mut content = RichContent::from_text("abcdef");
        content.attach_field(5, "z");
        content.attach_image(0, 0, 0, vec![]);
        content.attach_field(2, "b");
        let positions: Vec<usize> = content.marks_in_order().map(|(pos, _)| pos).collect();
        assert_eq!(positions, vec![0, 2, 5]);
        assert_eq!(content.field_count(), 2);
        assert_eq!(content.images().count(), 1);
    }

    #[test]
    fn inserting_text_shifts_later_marks() {
        let mut content = sample();
        content.insert_text(4, "an ");
        assert_eq!(content.len(), 14);
        assert!(content.mark_at(4).is_none());
        assert_eq!(content.mark_at(7).map(Mark::kind), Some(MarkKind::Field));
        assert_eq!(content.mark_at(12).map(Mark::kind), Some(MarkKind::Image));

        content.insert_placeholder(0);
        assert_eq!(content.text_at(0..1), PLACEHOLDER.to_string());
        assert!(content.mark_at(0).is_none());
        assert_eq!(content.mark_at(8).map(Mark::kind), Some(MarkKind::Field));
    }

    #[test]
    fn removing_drops_marks_inside_and_shifts_the_rest() {
        let mut content = sample();
        content.remove(3..6);
        assert_eq!(content.len(), 8);
        assert!(content.fields().next().is_none());
        let positions: Vec<usize> = content.marks_in_order().map(|(pos, _)| pos).collect();
        assert_eq!(positions, vec![6]);
    }

    #[test]
    fn multibyte_text_is_addressed_by_character() {
        let mut content = RichContent::from_text("日本語 X");
        content.attach_field(4, "ok");
        assert_eq!(content.text_at(0..3), "日本語");
        assert_eq!(content.fields().next().map(|(pos, _)| pos), Some(4));
    }

    #[test]
    #[should_panic]
    fn attaching_past_the_end_panics() {
        let mut content = RichContent::from_text("ab");
        content.attach_field(2, "x");
    }

    #[test]
    #[should_panic]
    fn attaching_twice_at_one_position_panics() {
        let mut content = RichContent::from_text("ab");
        content.attach_field(1, "x");
        content.attach_image(1, 0, 0, vec![]);
    }

    #[test]
    fn checked_binding_reports_instead_of_panicking() {
        let mut content = RichContent::from_text("ab");
        assert_eq!(
            content.try_bind(2, Mark::Field(FieldMark { text: "x".into() })),
            Err(CorruptFileError::MarkOutOfBounds { pos: 2, len: 2 })
        );
        content.attach_field(0, "x");
        assert_eq!(
            content.try_bind(0, Mark::Field(FieldMark { text: "y".into() })),
            Err(CorruptFileError::DuplicateMark(0))
        );
    }

    #[test]
    fn json_form_keeps_marks_and_rejects_bad_ones() {
        let content = sample();
        let json = serde_json::to_string(&content).unwrap();
        assert!(json.contains("\"kind\":\"field\""));
        let back: RichContent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, content);

        let bad = r#"{"text":"ab","marks":[{"kind":"field","pos":5,"text":"x"}]}"#;
        assert!(serde_json::from_str::<RichContent>(bad).is_err());
        let short = r#"{"text":"ab","marks":[{"kind":"image","pos":0,"width":2,"height":2,"pixels":[1]}]}"#;
        assert!(serde_json::from_str::<RichContent>(short).is_err());
    }

    #[cfg(feature = "images")]
    #[test]
    fn rgba_conversion_keeps_argb_word_order() {
        let mark = ImageMark::new(2, 1, vec![-65536, 0x7f00_ff00]);
        let img = mark.to_rgba();
        assert_eq!(img.get_pixel(0, 0).0, [255, 0, 0, 255]);
        assert_eq!(img.get_pixel(1, 0).0, [0, 255, 0, 0x7f]);
        assert_eq!(ImageMark::from_rgba(&img), mark);
    }
}
