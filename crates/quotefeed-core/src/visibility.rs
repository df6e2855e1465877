//! The visibility guard applied to every feed-facing read.
//!
//! Stores must filter with the equivalent of
//! `deleted_at IS NULL AND COALESCE(visibility, 'public') = 'public'`; the
//! engine re-checks every row it hands out with [`admits`].

use crate::quote::{FeedQuote, Visibility};

/// `true` if `quote` may appear in a feed.
///
/// A missing visibility counts as public; rows predating the column have none.
pub fn admits(quote: &FeedQuote) -> bool {
  quote.deleted_at.is_none()
    && matches!(quote.visibility, None | Some(Visibility::Public))
}
