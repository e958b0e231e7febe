use crate::ToHash;

use super::{Header, TransactionBody, DatumOption};
use cardax_codec::utils::KeepRaw;
use cardax_crypto::hash::{Hash, Hasher};

impl ToHash<32> for Header {
    fn to_hash(&self) -> cardax_crypto::hash::Hash<32> {
        Hasher::<256>::hash_cbor(self)
    }
}

impl ToHash<32> for TransactionBody {
    fn to_hash(&self) -> Hash<32> {
        Hasher::<256>::hash_cbor(self)
    }
}

impl ToHash<32> for KeepRaw<'_, TransactionBody> {
    fn to_hash(&self) -> cardax_crypto::hash::Hash<32> {
        Hasher::<256>::hash(self.raw_cbor().expect("freshly decoded value always carries its cbor cache"))
    }
}

impl ToHash<32> for DatumOption {
    fn to_hash(&self) -> Hash<32> {
        match self {
            DatumOption::Hash(hash) => *hash,
            DatumOption::Data(data) => data.to_hash()
        }
    }
}

#[cfg(test)]
mod tests {
    use cardax_codec::utils::MaybeIndefArray;

    use crate::babbage::TransactionBody;
    use crate::ToHash;

    #[test]
    fn transaction_body_hash_changes_with_fee() {
        let body = |fee: u64| TransactionBody {
            inputs: MaybeIndefArray::Def(vec![]),
            outputs: MaybeIndefArray::Def(vec![]),
            fee,
            ttl: None,
            certificates: None,
            withdrawals: None,
            update: None,
            auxiliary_data_hash: None,
            validity_interval_start: None,
            mint: None,
            script_data_hash: None,
            collateral: None,
            required_signers: None,
            network_id: None,
            collateral_return: None,
            total_collateral: None,
            reference_inputs: None,
        };

        assert_eq!(body(42).to_hash(), body(42).to_hash());
        assert_ne!(body(42).to_hash(), body(43).to_hash());
    }
}
