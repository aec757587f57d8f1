use crate::TxType;
use alloy_primitives::{Bloom, Log, B256};
use alloy_rlp::{length_of_length, Encodable};
use alloy_trie::root::ordered_trie_root_with_encoder;

/// The receipt of a single executed transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Receipt {
    /// Envelope type of the originating transaction.
    pub tx_type: TxType,
    /// Whether execution completed successfully.
    pub success: bool,
    /// Gas used by the block up to and including this transaction.
    pub cumulative_gas_used: u64,
    /// Bloom filter of the emitted logs.
    pub bloom: Bloom,
    /// Logs emitted during execution.
    pub logs: Vec<Log>,
}

impl Receipt {
    /// Encodes the receipt as an EIP-2718 typed envelope: the type byte for
    /// non-legacy receipts followed by the RLP consensus encoding.
    pub fn encode_2718(&self, out: &mut Vec<u8>) {
        if !matches!(self.tx_type, TxType::Legacy) {
            out.push(self.tx_type as u8);
        }
        let logs_payload = self.logs.iter().map(encoded_log_length).sum::<usize>();
        let payload_length = (self.success as u8).length() +
            self.cumulative_gas_used.length() +
            rlp_str_length(self.bloom.as_slice()) +
            length_of_length(logs_payload) +
            logs_payload;
        alloy_rlp::Header { list: true, payload_length }.encode(out);
        (self.success as u8).encode(out);
        self.cumulative_gas_used.encode(out);
        self.bloom.as_slice().encode(out);
        alloy_rlp::Header { list: true, payload_length: logs_payload }.encode(out);
        for log in &self.logs {
            encode_log(log, out);
        }
    }
}

/// Length of an RLP byte-string encoding of `s`.
fn rlp_str_length(s: &[u8]) -> usize {
    if s.len() == 1 && s[0] < 0x80 {
        1
    } else {
        length_of_length(s.len()) + s.len()
    }
}

/// Encoded length of a log entry: `[address, topics, data]`.
fn encoded_log_length(log: &Log) -> usize {
    let payload = log_payload_length(log);
    length_of_length(payload) + payload
}

fn log_payload_length(log: &Log) -> usize {
    // an address encodes to 21 bytes, a topic to 33
    let topics_payload = 33 * log.topics().len();
    21 + length_of_length(topics_payload) + topics_payload + rlp_str_length(&log.data.data)
}

fn encode_log(log: &Log, out: &mut Vec<u8>) {
    let topics_payload = 33 * log.topics().len();
    alloy_rlp::Header { list: true, payload_length: log_payload_length(log) }.encode(out);
    log.address.as_slice().encode(out);
    alloy_rlp::Header { list: true, payload_length: topics_payload }.encode(out);
    for topic in log.topics() {
        topic.as_slice().encode(out);
    }
    log.data.data.as_ref().encode(out);
}

/// Folds the emitted logs of a transaction into a bloom filter.
pub fn logs_bloom<'a>(logs: impl IntoIterator<Item = &'a Log>) -> Bloom {
    let mut bloom = Bloom::ZERO;
    for log in logs {
        bloom.m3_2048(log.address.as_slice());
        for topic in log.topics() {
            bloom.m3_2048(topic.as_slice());
        }
    }
    bloom
}

/// Root of the ordered trie of EIP-2718 encoded receipts, as committed to by
/// the block header.
pub fn receipts_root(receipts: &[Receipt]) -> B256 {
    ordered_trie_root_with_encoder(receipts, |receipt, out| receipt.encode_2718(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, Bytes};
    use alloy_trie::EMPTY_ROOT_HASH;

    fn sample_log(marker: u8) -> Log {
        Log::new_unchecked(
            Address::with_last_byte(marker),
            vec![B256::with_last_byte(marker)],
            Bytes::from(vec![marker; 3]),
        )
    }

    #[test]
    fn minimal_legacy_receipt_encoding() {
        let receipt =
            Receipt { success: true, cumulative_gas_used: 1, ..Default::default() };
        let mut out = Vec::new();
        receipt.encode_2718(&mut out);

        // list header for a 262 byte payload
        assert_eq!(&out[..3], &[0xf9, 0x01, 0x06]);
        // status, cumulative gas
        assert_eq!(out[3], 0x01);
        assert_eq!(out[4], 0x01);
        // 256 byte bloom string
        assert_eq!(&out[5..8], &[0xb9, 0x01, 0x00]);
        // empty logs list
        assert_eq!(*out.last().unwrap(), 0xc0);
        assert_eq!(out.len(), 3 + 262);
    }

    #[test]
    fn typed_receipts_are_prefixed() {
        let receipt = Receipt { tx_type: TxType::Eip1559, ..Default::default() };
        let mut out = Vec::new();
        receipt.encode_2718(&mut out);
        assert_eq!(out[0], 2);

        let legacy = Receipt::default();
        let mut legacy_out = Vec::new();
        legacy.encode_2718(&mut legacy_out);
        assert_eq!(out[1..], legacy_out[..]);
    }

    #[test]
    fn log_encoding_is_self_consistent() {
        let receipt = Receipt {
            success: true,
            cumulative_gas_used: 21_000,
            logs: vec![sample_log(1), sample_log(2)],
            ..Default::default()
        };
        let mut out = Vec::new();
        receipt.encode_2718(&mut out);
        // declared list payload matches the emitted byte count
        assert_eq!(out[0], 0xf9);
        let declared = u16::from_be_bytes([out[1], out[2]]) as usize;
        assert_eq!(out.len(), 3 + declared);
    }

    #[test]
    fn bloom_is_a_union_over_logs() {
        let a = logs_bloom([sample_log(1)].iter());
        let b = logs_bloom([sample_log(2)].iter());
        let combined = logs_bloom([sample_log(1), sample_log(2)].iter());
        assert_eq!(a | b, combined);
        assert_ne!(a, Bloom::ZERO);
        assert_eq!(logs_bloom([].iter()), Bloom::ZERO);
    }

    #[test]
    fn empty_receipts_root_matches_empty_trie() {
        assert_eq!(receipts_root(&[]), EMPTY_ROOT_HASH);
    }

    #[test]
    fn receipts_root_tracks_contents() {
        let base = Receipt { success: true, cumulative_gas_used: 21_000, ..Default::default() };
        let changed = Receipt { success: false, ..base.clone() };
        let root = receipts_root(&[base.clone()]);
        assert_ne!(root, EMPTY_ROOT_HASH);
        assert_ne!(root, receipts_root(&[changed]));
        assert_eq!(root, receipts_root(&[base]));
    }
}
