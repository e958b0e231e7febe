use crate::ToHash;

use super::{AuxiliaryData, Header, NativeScript, PlutusData, TransactionBody};
use cardax_codec::utils::KeepRaw;
use cardax_crypto::hash::{Hash, Hasher};

impl ToHash<32> for Header {
    fn to_hash(&self) -> cardax_crypto::hash::Hash<32> {
        Hasher::<256>::hash_cbor(self)
    }
}

impl ToHash<32> for AuxiliaryData {
    fn to_hash(&self) -> cardax_crypto::hash::Hash<32> {
        Hasher::<256>::hash_cbor(self)
    }
}

impl ToHash<28> for NativeScript {
    fn to_hash(&self) -> Hash<28> {
        Hasher::<224>::hash_tagged_cbor(self, 0)
    }
}

impl ToHash<32> for PlutusData {
    fn to_hash(&self) -> Hash<32> {
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

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use cardax_codec::minicbor::data::Int;
    use cardax_codec::utils::MaybeIndefArray;
    use cardax_crypto::hash::Hash;

    use crate::alonzo::{BigInt, Constr, NativeScript, PlutusData, PlutusScript};
    use crate::ToHash;

    #[test]
    fn transaction_body_hash_is_stable_across_field_order() {
        use crate::alonzo::TransactionBody;

        let body = TransactionBody {
            inputs: MaybeIndefArray::Def(vec![]),
            outputs: MaybeIndefArray::Def(vec![]),
            fee: 42,
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
        };

        let a = body.to_hash();
        let b = body.to_hash();
        assert_eq!(a, b);
    }

    #[test]
    fn native_script_hashes_as_cardano_cli() {
        // construct an arbitrary script to use as example
        let ns = NativeScript::ScriptAll(MaybeIndefArray::Def(vec![
            NativeScript::ScriptPubkey(
                Hash::<28>::from_str("4d04380dcb9fbad5aff8e2f4e19394ef4e5e11b37932838f01984a12")
                    .unwrap(),
            ),
            NativeScript::InvalidBefore(112500819),
        ]));

        // hash that we assume correct since it was generated through the cardano-cli
        let cardano_cli_output = "d6a8ced01ecdfbb26c90850010a06fbc20a7c23632fc92f531667f36";

        assert_eq!(
            ns.to_hash(),
            Hash::<28>::from_str(cardano_cli_output).unwrap()
        )
    }

    #[test]
    fn plutus_data_hashes_as_cardano_cli() {
        // construct an arbitrary complex datum to use as example
        let pd = PlutusData::Constr(Constr::<PlutusData> {
            tag: 1280,
            any_constructor: None,
            fields: MaybeIndefArray::Indef(vec![
                PlutusData::BigInt(BigInt::Int(Int::from(4))),
                PlutusData::Constr(Constr::<PlutusData> {
                    tag: 124,
                    any_constructor: None,
                    fields: MaybeIndefArray::Indef(vec![
                        PlutusData::BigInt(BigInt::Int(Int::from(-4))),
                        PlutusData::Constr(Constr::<PlutusData> {
                            tag: 102,
                            any_constructor: Some(453),
                            fields: MaybeIndefArray::Indef(vec![
                                PlutusData::BigInt(BigInt::Int(Int::from(2))),
                                PlutusData::BigInt(BigInt::Int(Int::from(3434))),
                            ]),
                        }),
                        PlutusData::BigInt(BigInt::Int(Int::from(-11828293))),
                    ]),
                }),
                PlutusData::BigInt(BigInt::Int(Int::from(11828293))),
            ]),
        });

        // if you need to try this out in the cardano-cli, uncomment this line to see
        // the json representation of the above struct:
        // println!("{}", crate::ToCanonicalJson::to_json(&pd));

        // hash that we assume correct since it was generated through the cardano-cli
        let cardano_cli_output = "d9bc0eb6ac664286155f70d720cafd2af16277fbd9014a930997431a2ffbe554";

        assert_eq!(
            pd.to_hash(),
            Hash::<32>::from_str(cardano_cli_output).unwrap()
        )
    }

    #[test]
    fn plutus_script_hash_is_tagged_with_language_byte() {
        let v1 = PlutusScript(vec![0x01, 0x02, 0x03].into());
        let v1_again = PlutusScript(vec![0x01, 0x02, 0x03].into());
        assert_eq!(v1.to_hash(), v1_again.to_hash());

        // changing the script bytes must change the hash
        let other = PlutusScript(vec![0x01, 0x02, 0x04].into());
        assert_ne!(v1.to_hash(), other.to_hash());
    }
}
