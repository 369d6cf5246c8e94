use proptest::prelude::*;
use adstats::{aggregate, decode_full, encode_block, scan, AdBlock, ByteReader, Profile};

fn arb_block() -> impl Strategy<Value = AdBlock> {
    (
        any::<u8>(),
        prop::collection::vec(any::<u8>(), 0..8),
        prop::collection::vec(any::<u8>(), 0..8),
        prop::collection::vec(any::<u16>(), 0..8),
        prop::collection::vec(any::<u16>(), 0..8),
        prop::collection::vec(any::<u32>(), 0..8),
        prop::collection::vec(any::<u32>(), 0..8),
    )
        .prop_map(|(class, a, b, c, d, e, f)| {
            let counts = [
                a.len() as u32,
                b.len() as u32,
                c.len() as u32,
                d.len() as u32,
                e.len() as u32,
                f.len() as u32,
            ];
            let mut keys: Vec<u32> = Vec::new();
            keys.extend(a.iter().map(|&k| k as u32));
            keys.extend(b.iter().map(|&k| k as u32));
            keys.extend(c.iter().map(|&k| k as u32));
            keys.extend(d.iter().map(|&k| k as u32));
            keys.extend(e);
            keys.extend(f);
            AdBlock {
                key_size_class: class,
                counts,
                keys: Some(keys),
            }
        })
}

proptest! {
    #[test]
    fn block_roundtrip(block in arb_block()) {
        let bytes = encode_block(&block, None).unwrap();
        let decoded = decode_full(&mut ByteReader::from_slice(&bytes), false).unwrap().unwrap();
        prop_assert_eq!(decoded.ad_size(), block.counts.iter().map(|&c| c as u64).sum::<u64>());
        prop_assert_eq!(decoded, block);
    }

    #[test]
    fn stream_yields_every_block(blocks in prop::collection::vec(arb_block(), 0..6)) {
        let mut bytes = Vec::new();
        for b in &blocks {
            bytes.extend(encode_block(b, Some(42)).unwrap());
        }
        let scanned = scan(&mut ByteReader::from_slice(&bytes), Profile::Stream).unwrap();
        prop_assert_eq!(&scanned, &blocks);
    }

    #[test]
    fn truncation_never_yields_blocks(block in arb_block(), cut in 1usize..64) {
        let bytes = encode_block(&block, Some(0)).unwrap();
        let keep = bytes.len().saturating_sub(cut);
        prop_assume!(keep > 0);
        let result = scan(&mut ByteReader::from_slice(&bytes[..keep]), Profile::Stream);
        prop_assert!(result.is_err());
    }

    #[test]
    fn aggregate_bounds_every_block(blocks in prop::collection::vec(arb_block(), 1..6)) {
        let stats = aggregate(&blocks).unwrap();
        for b in &blocks {
            prop_assert!(stats.min_ad_size <= b.ad_size() && b.ad_size() <= stats.max_ad_size);
            prop_assert!(stats.min_key_size_class <= b.key_size_class);
            prop_assert!(b.key_size_class <= stats.max_key_size_class);
            for &k in b.keys.as_deref().unwrap_or_default() {
                prop_assert!(stats.min_key.unwrap() <= k && k <= stats.max_key.unwrap());
            }
        }
    }
}
