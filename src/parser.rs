// 🏗️ Token Stream Parser
// Rebuilds subject blocks from a flat, delimiter-free token stream.
//
// Course codes are the only reliable anchor: everything between two codes belongs
// to the block the first one opened. No look-ahead, only the open block is mutated.

use crate::tokens::{classify, Marker, TokenKind};
use serde::{Deserialize, Serialize};

// ============================================================================
// RAW SUBJECT BLOCK
// ============================================================================

/// RawSubjectBlock - Output of parse_tokens()
/// Everything observed for one subject before finalization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSubjectBlock {
    /// Normalized course code that opened the block
    pub code: String,

    /// Every 0..=100 numeric token seen while the block was open, in stream order
    pub observed_numbers: Vec<u32>,

    /// First explicit P/F marker, None while unset
    pub result_marker: Option<Marker>,
}

impl RawSubjectBlock {
    pub fn new(code: impl Into<String>) -> Self {
        RawSubjectBlock {
            code: code.into(),
            observed_numbers: Vec::new(),
            result_marker: None,
        }
    }

    /// Builder pattern: add observed numbers
    pub fn with_numbers(mut self, numbers: &[u32]) -> Self {
        self.observed_numbers.extend_from_slice(numbers);
        self
    }

    /// Builder pattern: set the result marker
    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.result_marker = Some(marker);
        self
    }

    /// First marker wins
    fn record_marker(&mut self, marker: Marker) {
        if self.result_marker.is_none() {
            self.result_marker = Some(marker);
        }
    }
}

// ============================================================================
// PARSER STATE
// ============================================================================

/// Scanning state threaded through the fold: at most one open block
#[derive(Debug, Default)]
pub struct ParserState {
    open: Option<RawSubjectBlock>,
    closed: Vec<RawSubjectBlock>,
}

impl ParserState {
    /// Transition table
    pub fn step(mut self, kind: TokenKind) -> Self {
        if let TokenKind::CourseCode(code) = kind {
            self.close_open_block();
            self.open = Some(RawSubjectBlock::new(code));
            return self;
        }

        // Numbers and markers outside any subject are noise
        let Some(block) = self.open.as_mut() else {
            return self;
        };

        match kind {
            TokenKind::Number(value) => block.observed_numbers.push(value),
            TokenKind::Marker(marker) => block.record_marker(marker),
            TokenKind::CourseCode(_) | TokenKind::Noise => {}
        }

        self
    }

    /// End of stream: close whatever is still open
    pub fn finish(mut self) -> Vec<RawSubjectBlock> {
        self.close_open_block();
        self.closed
    }

    fn close_open_block(&mut self) {
        if let Some(block) = self.open.take() {
            self.closed.push(block);
        }
    }
}

/// Parse an ordered token sequence into subject blocks, one per course-code token
///
/// Never fails: noise is dropped, and an empty result is a valid outcome.
pub fn parse_tokens<I, S>(tokens: I) -> Vec<RawSubjectBlock>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tokens
        .into_iter()
        .map(|token| classify(token.as_ref()))
        .fold(ParserState::default(), ParserState::step)
        .finish()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_two_subjects() {
        let blocks = parse_tokens(["BCS401", "88", "P", "BCSL404", "45"]);

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0], RawSubjectBlock::new("BCS401").with_numbers(&[88]).with_marker(Marker::Pass));
        assert_eq!(blocks[1], RawSubjectBlock::new("BCSL404").with_numbers(&[45]));
    }

    #[test]
    fn test_parse_empty_stream() {
        let blocks = parse_tokens(Vec::<String>::new());
        assert!(blocks.is_empty());
    }

    #[test]
    fn test_tokens_before_first_code_are_dropped() {
        let blocks = parse_tokens(["Semester", "4", "P", "55", "BCS402", "70"]);

        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].code, "BCS402");
        assert_eq!(blocks[0].observed_numbers, vec![70]);
        assert_eq!(blocks[0].result_marker, None);
    }

    #[test]
    fn test_first_marker_wins() {
        let blocks = parse_tokens(["BCS403", "F", "P", "30"]);
        assert_eq!(blocks[0].result_marker, Some(Marker::Fail));
    }

    #[test]
    fn test_numbers_keep_stream_order_and_duplicates() {
        let blocks = parse_tokens(["BCS401", "40", "45", "85", "45", "250", "P"]);
        assert_eq!(blocks[0].observed_numbers, vec![40, 45, 85, 45]);
    }

    #[test]
    fn test_tokens_are_normalized() {
        let blocks = parse_tokens(["  bcs401 ", " 77\t", "p"]);
        assert_eq!(blocks[0].code, "BCS401");
        assert_eq!(blocks[0].observed_numbers, vec![77]);
        assert_eq!(blocks[0].result_marker, Some(Marker::Pass));
    }

    #[test]
    fn test_repeated_code_opens_new_block() {
        let blocks = parse_tokens(["BCS401", "60", "BCS401", "70"]);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].observed_numbers, vec![70]);
    }

    #[test]
    fn test_noise_only_stream() {
        let blocks = parse_tokens(["VISVESVARAYA", "TECHNOLOGICAL", "UNIVERSITY", "ZZZ999"]);
        assert!(blocks.is_empty());
    }

    #[test]
    fn test_code_with_no_observations() {
        let blocks = parse_tokens(["BCS405A"]);
        assert_eq!(blocks, vec![RawSubjectBlock::new("BCS405A")]);
    }
}
