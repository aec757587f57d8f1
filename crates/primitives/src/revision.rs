/// EVM fork revision, ordered by mainnet activation.
///
/// The ordering is load-bearing: gas accounting and post-block validation
/// compare revisions with `>=` to decide which rules are live.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Revision {
    /// Original launch rules.
    Frontier,
    /// Homestead (EIP-2, EIP-7).
    Homestead,
    /// Tangerine Whistle (EIP-150) gas repricing.
    TangerineWhistle,
    /// Spurious Dragon (EIP-158) state clearing.
    SpuriousDragon,
    /// Byzantium; receipts commit to status instead of state root.
    Byzantium,
    /// Constantinople.
    Constantinople,
    /// Petersburg (Constantinople with EIP-1283 removed).
    Petersburg,
    /// Istanbul calldata repricing (EIP-2028).
    Istanbul,
    /// Berlin access lists (EIP-2929, EIP-2930).
    Berlin,
    /// London fee market (EIP-1559) and refund reduction (EIP-3529).
    London,
    /// Paris, the proof-of-stake transition.
    Paris,
    /// Shanghai (EIP-3651 warm coinbase, EIP-3860 initcode metering).
    Shanghai,
    /// Cancun blob transactions (EIP-4844).
    Cancun,
}

#[cfg(test)]
mod tests {
    use super::Revision;

    #[test]
    fn revisions_are_ordered_by_activation() {
        assert!(Revision::Frontier < Revision::Homestead);
        assert!(Revision::SpuriousDragon < Revision::Byzantium);
        assert!(Revision::London >= Revision::London);
        assert!(Revision::Shanghai > Revision::London);
        assert!(Revision::Cancun > Revision::Shanghai);
    }
}
