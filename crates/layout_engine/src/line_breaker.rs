//! Line packing for pre-measured words
//!
//! The host already segmented and measured every word, so breaking is a
//! greedy fill: a word goes on the current line unless it would overflow
//! the available width. Alignment only moves words horizontally; justify
//! spreads the leftover width over the inter-word gaps and never touches
//! letter spacing.

use content_tree::{TextAlign, Word};

const WIDTH_EPSILON: f32 = 0.01;

/// A word positioned on its line
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedWord {
    pub text: String,
    /// Offset from the line's left edge in device pixels
    pub x: f32,
    pub width: f32,
}

/// One packed line
#[derive(Debug, Clone, PartialEq)]
pub struct PackedLine {
    pub words: Vec<PlacedWord>,
    /// Natural width of the words plus single spaces
    pub natural_width: f32,
}

impl PackedLine {
    /// Right edge of the last word
    pub fn extent(&self) -> f32 {
        self.words.last().map(|w| w.x + w.width).unwrap_or(0.0)
    }
}

/// Words collected for the line being filled
struct PendingLine<'a> {
    words: Vec<&'a Word>,
    width: f32,
}

impl<'a> PendingLine<'a> {
    fn new() -> Self {
        Self {
            words: Vec::new(),
            width: 0.0,
        }
    }

    fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    fn width_with(&self, word: &Word, space_width: f32) -> f32 {
        if self.is_empty() {
            word.width
        } else {
            self.width + space_width + word.width
        }
    }

    fn push(&mut self, word: &'a Word, space_width: f32) {
        self.width = self.width_with(word, space_width);
        self.words.push(word);
    }
}

/// Pack words into lines no wider than `available_width`.
///
/// A single word wider than the line is placed alone and overflows.
pub fn pack_words(
    words: &[Word],
    space_width: f32,
    available_width: f32,
    align: TextAlign,
) -> Vec<PackedLine> {
    let mut pending_lines = Vec::new();
    let mut current = PendingLine::new();

    for word in words {
        let would_overflow = !current.is_empty()
            && current.width_with(word, space_width) > available_width + WIDTH_EPSILON;
        if would_overflow {
            pending_lines.push(std::mem::replace(&mut current, PendingLine::new()));
        }
        current.push(word, space_width);
    }
    if !current.is_empty() {
        pending_lines.push(current);
    }

    let last = pending_lines.len().saturating_sub(1);
    pending_lines
        .iter()
        .enumerate()
        .map(|(i, line)| finalize_line(line, space_width, available_width, align, i == last))
        .collect()
}

fn finalize_line(
    pending: &PendingLine<'_>,
    space_width: f32,
    available_width: f32,
    align: TextAlign,
    is_last_line: bool,
) -> PackedLine {
    let extra_space = (available_width - pending.width).max(0.0);

    let (x_start, gap_extra) = match align {
        TextAlign::Left => (0.0, 0.0),
        TextAlign::Center => (extra_space / 2.0, 0.0),
        TextAlign::Right => (extra_space, 0.0),
        TextAlign::Justify => {
            // Last line stays ragged
            if is_last_line || pending.words.len() <= 1 {
                (0.0, 0.0)
            } else {
                (0.0, extra_space / (pending.words.len() - 1) as f32)
            }
        }
    };

    let mut x = x_start;
    let mut words = Vec::with_capacity(pending.words.len());
    for word in &pending.words {
        words.push(PlacedWord {
            text: word.text.clone(),
            x,
            width: word.width,
        });
        x += word.width + space_width + gap_extra;
    }

    PackedLine {
        words,
        natural_width: pending.width,
    }
}
