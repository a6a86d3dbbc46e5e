//! Page selection: pick the first page whose blankness score is under the
//! threshold, or decide that a page must be synthesised.

/// Pages scoring strictly below this fraction of inked pixels are blank.
pub const BLANK_THRESHOLD: f64 = 0.02;

/// Outcome of scanning the scored pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Copy the source page at this 0-based index.
    Extract(usize),
    /// No page qualified; build a blank one.
    Synthesize,
}

impl Selection {
    pub fn from_scores(scores: &[f64], threshold: f64) -> Self {
        match select_first_blank(scores, threshold) {
            Some(index) => Selection::Extract(index),
            None => Selection::Synthesize,
        }
    }
}

/// 0-based index of the first score strictly below `threshold`.
///
/// `None` when no page qualifies, including for an empty slice.
pub fn select_first_blank(scores: &[f64], threshold: f64) -> Option<usize> {
    scores.iter().position(|&score| score < threshold)
}
