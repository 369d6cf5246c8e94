use adstats::{aggregate, AdBlock, AdError};

fn sized(class: u8, n0_1: u32, keys: Option<Vec<u32>>) -> AdBlock {
    AdBlock {
        key_size_class: class,
        counts: [n0_1, 0, 0, 0, 0, 0],
        keys,
    }
}

#[test]
fn empty_input_is_no_data() {
    assert!(matches!(aggregate(&[]), Err(AdError::NoData)));
}

#[test]
fn min_and_max_ad_size() {
    let stats = aggregate(&[sized(1, 5, None), sized(3, 2, None)]).unwrap();
    assert_eq!(stats.min_ad_size, 2);
    assert_eq!(stats.max_ad_size, 5);
    assert_eq!(stats.min_key_size_class, 1);
    assert_eq!(stats.max_key_size_class, 3);
    assert_eq!((stats.min_key, stats.max_key), (None, None));
}

#[test]
fn keys_span_all_blocks() {
    let blocks = [
        sized(1, 2, Some(vec![40, 12])),
        sized(1, 0, Some(vec![])),
        sized(1, 3, Some(vec![200, 7, 90])),
    ];
    let stats = aggregate(&blocks).unwrap();
    assert_eq!(stats.min_key, Some(7));
    assert_eq!(stats.max_key, Some(200));
    assert_eq!(stats.min_ad_size, 0);
}

#[test]
fn blocks_without_keys_have_no_range() {
    let stats = aggregate(&[sized(2, 0, Some(vec![]))]).unwrap();
    assert_eq!(stats.min_key, None);
    assert_eq!(stats.max_key, None);
}
