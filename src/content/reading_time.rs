//! Reading-time estimation

use super::richtext;
use super::ContentSection;

/// Reading speed the estimate assumes
pub const WORDS_PER_MINUTE: usize = 200;

/// Estimated minutes to read a post
///
/// Each section is rounded up on its own and the results are summed, so a
/// post with two 250-word sections reads as 4 minutes rather than 3.
pub fn estimate_reading_time(sections: &[ContentSection]) -> usize {
    sections.iter().map(section_minutes).sum()
}

fn section_minutes(section: &ContentSection) -> usize {
    count_words(&richtext::as_text(&section.body)).div_ceil(WORDS_PER_MINUTE)
}

/// Whitespace-delimited, non-empty tokens
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}
