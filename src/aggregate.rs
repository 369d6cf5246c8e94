//! Cross-block statistics over a decoded anti-dictionary.

use serde::Serialize;

use crate::ad_block::AdBlock;
use crate::AdError;

/// Min/max statistics over one scan.
///
/// `min_key` and `max_key` are only set when at least one block carried
/// decoded keys and at least one key was present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AdStats {
    pub min_ad_size: u64,
    pub max_ad_size: u64,
    pub min_key_size_class: u8,
    pub max_key_size_class: u8,
    pub min_key: Option<u32>,
    pub max_key: Option<u32>,
}

/// Reduce `blocks` into [`AdStats`]. An empty slice is [`AdError::NoData`].
pub fn aggregate(blocks: &[AdBlock]) -> Result<AdStats, AdError> {
    let (first, rest) = blocks.split_first().ok_or(AdError::NoData)?;
    let mut stats = AdStats {
        min_ad_size: first.ad_size(),
        max_ad_size: first.ad_size(),
        min_key_size_class: first.key_size_class,
        max_key_size_class: first.key_size_class,
        min_key: None,
        max_key: None,
    };
    for block in rest {
        let size = block.ad_size();
        stats.min_ad_size = stats.min_ad_size.min(size);
        stats.max_ad_size = stats.max_ad_size.max(size);
        stats.min_key_size_class = stats.min_key_size_class.min(block.key_size_class);
        stats.max_key_size_class = stats.max_key_size_class.max(block.key_size_class);
    }

    let mut keys = blocks.iter().filter_map(|b| b.keys.as_deref()).flatten();
    if let Some(&k) = keys.next() {
        let (lo, hi) = keys.fold((k, k), |(lo, hi), &k| (lo.min(k), hi.max(k)));
        stats.min_key = Some(lo);
        stats.max_key = Some(hi);
    }
    Ok(stats)
}
