use adstats::{aggregate, encode_block, scan, ByteReader, Profile};
use honggfuzz::fuzz;

fn main() {
    loop {
        fuzz!(|data: &[u8]| {
            for profile in [Profile::Summary, Profile::Stream] {
                let Ok(blocks) = scan(&mut ByteReader::from_slice(data), profile) else {
                    continue;
                };
                if profile == Profile::Stream {
                    // A clean stream scan consumed every byte; re-encoding must
                    // reproduce the keys and counts, prefixes aside.
                    for b in &blocks {
                        let bytes = encode_block(b, Some(0)).expect("decoded block re-encodes");
                        let again = scan(&mut ByteReader::from_slice(&bytes), Profile::Stream)
                            .expect("re-encoded block decodes");
                        assert_eq!(again, vec![b.clone()]);
                    }
                }
                let _ = aggregate(&blocks);
            }
        });
    }
}
