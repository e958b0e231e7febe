use cardax_codec::{
    minicbor::{self, bytes::ByteVec, Decode, Encode},
    utils::OrderPreservingProperties,
};

use cardax_crypto::hash::Hash;

use crate::Error;

pub type Blake2b224 = Hash<28>;

pub type AddressId = Blake2b224;
pub type StakeholderId = Blake2b224;

#[derive(Debug, Clone, PartialEq, PartialOrd)]
pub enum AddrDistr {
    Variant0(StakeholderId),
    Variant1,
}

impl<'b, C> minicbor::Decode<'b, C> for AddrDistr {
    fn decode(d: &mut minicbor::Decoder<'b>, ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        d.array()?;
        let variant = d.u32()?;

        match variant {
            0 => Ok(AddrDistr::Variant0(d.decode_with(ctx)?)),
            1 => Ok(AddrDistr::Variant1),
            _ => Err(minicbor::decode::Error::message(
                "invalid variant for addrdstr",
            )),
        }
    }
}

impl minicbor::Encode<()> for AddrDistr {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _ctx: &mut (),
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        match self {
            AddrDistr::Variant0(x) => {
                e.array(2)?;
                e.u32(0)?;
                e.encode(x)?;

                Ok(())
            }
            AddrDistr::Variant1 => {
                e.array(1)?;
                e.u32(1)?;

                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, PartialOrd)]
pub enum AddrType {
    PubKey,
    Script,
    Redeem,
    Other(u64),
}

impl<'b, C> minicbor::Decode<'b, C> for AddrType {
    fn decode(
        d: &mut minicbor::Decoder<'b>,
        _ctx: &mut C,
    ) -> Result<Self, minicbor::decode::Error> {
        let variant = d.u64()?;

        match variant {
            0 => Ok(AddrType::PubKey),
            1 => Ok(AddrType::Script),
            2 => Ok(AddrType::Redeem),
            x => Ok(AddrType::Other(x)),
        }
    }
}

impl<C> minicbor::Encode<C> for AddrType {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        match self {
            AddrType::PubKey => e.u64(0)?,
            AddrType::Script => e.u64(1)?,
            AddrType::Redeem => e.u64(2)?,
            AddrType::Other(x) => e.u64(*x)?,
        };

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, PartialOrd)]
pub enum AddrAttrProperty {
    AddrDistr(AddrDistr),
    Bytes(ByteVec),
    Unparsed(u8, ByteVec),
}

impl<'b, C> minicbor::Decode<'b, C> for AddrAttrProperty {
    fn decode(d: &mut minicbor::Decoder<'b>, ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        let key = d.u8()?;

        match key {
            0 => Ok(AddrAttrProperty::AddrDistr(d.decode_with(ctx)?)),
            1 => Ok(AddrAttrProperty::Bytes(d.decode_with(ctx)?)),
            x => Ok(AddrAttrProperty::Unparsed(x, d.decode_with(ctx)?)),
        }
    }
}

impl<C> minicbor::Encode<C> for AddrAttrProperty {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        match self {
            AddrAttrProperty::AddrDistr(x) => {
                e.u32(0)?;
                e.encode(x)?;

                Ok(())
            }
            AddrAttrProperty::Bytes(x) => {
                e.u32(1)?;
                e.encode(x)?;

                Ok(())
            }
            AddrAttrProperty::Unparsed(a, b) => {
                e.encode(a)?;
                e.encode(b)?;

                Ok(())
            }
        }
    }
}

pub type AddrAttr = OrderPreservingProperties<AddrAttrProperty>;

#[derive(Debug, Encode, Decode, Clone, PartialEq, PartialOrd)]
pub struct AddressPayload {
    #[n(0)]
    pub root: AddressId,

    #[n(1)]
    pub attributes: AddrAttr,

    #[n(2)]
    pub addrtype: AddrType,
}

/// A Byron-era (CIP-19 type 8) legacy address.
///
/// On the wire this is `[ tag(24, bytes(payload_cbor)), crc32 ]`, where
/// `payload_cbor` is the CBOR encoding of [`AddressPayload`] and the CRC-32 is
/// computed over those same bytes. The whole thing is itself valid CBOR, so
/// it can sit unmarked among Shelley-era addresses: its first byte happens to
/// fall in the `1000` nibble range reserved for type 8.
///
/// The exact bytes of the outer structure are kept alongside the decoded
/// payload, so re-encoding and base58 round-trip the original address byte
/// for byte, independent of how [`AddressPayload`] chooses to lay out map
/// keys.
#[derive(Debug, Clone)]
pub struct ByronAddress {
    payload: AddressPayload,
    crc: u32,
    bytes: Vec<u8>,
}

impl ByronAddress {
    /// The CIP-19 type id for Byron addresses.
    pub fn typeid(&self) -> u8 {
        8
    }

    pub fn payload(&self) -> &AddressPayload {
        &self.payload
    }

    pub fn crc(&self) -> u32 {
        self.crc
    }

    /// The Blake2b-224 hash committed to by this address.
    pub fn root(&self) -> &AddressId {
        &self.payload.root
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    pub fn to_base58(&self) -> String {
        use base58::ToBase58;
        self.bytes.to_base58()
    }

    pub fn from_base58(s: &str) -> Result<Self, Error> {
        use base58::FromBase58;

        let bytes = s.from_base58().map_err(Error::BadBase58)?;
        minicbor::decode(&bytes).map_err(Error::InvalidByronCbor)
    }
}

impl PartialEq for ByronAddress {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for ByronAddress {}

impl PartialOrd for ByronAddress {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.bytes.partial_cmp(&other.bytes)
    }
}

impl std::hash::Hash for ByronAddress {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.bytes.hash(state)
    }
}

impl<'b, C> minicbor::Decode<'b, C> for ByronAddress {
    fn decode(d: &mut minicbor::Decoder<'b>, _ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        let all = d.input();
        let start = d.position();

        d.array()?;
        d.tag()?;
        let payload_cbor = d.bytes()?;
        let payload: AddressPayload = minicbor::decode(payload_cbor)
            .map_err(|_| minicbor::decode::Error::message("invalid byron address payload"))?;
        let crc = d.u32()?;

        let end = d.position();

        if crc32fast::hash(payload_cbor) != crc {
            return Err(minicbor::decode::Error::message(
                "byron address crc32 does not match its payload",
            ));
        }

        Ok(ByronAddress {
            payload,
            crc,
            bytes: all[start..end].to_vec(),
        })
    }
}

impl<C> minicbor::Encode<C> for ByronAddress {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        e.writer_mut()
            .write_all(&self.bytes)
            .map_err(minicbor::encode::Error::write)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // A mainnet Byron address, also used as one of the round-trip vectors in
    // `crate::tests`.
    const VECTOR: &str =
        "37btjrVyb4KDXBNC4haBVPCrro8AQPHwvCMp3RFhhSVWwfFmZ6wwzSK6JK1hY6wHNmtrpTf1kdbva8TCneM2YsiXT7mrzT21EacHnPpz5YyUdj64na";

    const LEGACY_VECTORS: [&str; 3] = [
        "37btjrVyb4KDXBNC4haBVPCrro8AQPHwvCMp3RFhhSVWwfFmZ6wwzSK6JK1hY6wHNmtrpTf1kdbva8TCneM2YsiXT7mrzT21EacHnPpz5YyUdj64na",
        "Ae2tdPwUPEZLs4HtbuNey7tK4hTKrwNwYtGqp7bDfCy2WdR3P6735W5Yfpe",
        "DdzFFzCqrht7PQiAhzrn6rNNoADJieTWBt8KeK9BZdUsGyX9ooYD9NpMCTGjQoUKcHN47g8JMXhvKogsGpQHtiQ65fZwiypjrC6d3a4Q",
    ];

    #[test]
    fn roundtrips_through_base58() {
        let addr = ByronAddress::from_base58(VECTOR).unwrap();
        assert_eq!(addr.to_base58(), VECTOR);
        assert_eq!(addr.typeid(), 8);
    }

    #[test]
    fn roundtrips_legacy_vectors() {
        for vector in LEGACY_VECTORS {
            let addr = ByronAddress::from_base58(vector).unwrap();
            assert_eq!(addr.to_base58(), vector);
        }
    }

    #[test]
    fn roundtrips_through_bytes() {
        let addr = ByronAddress::from_base58(VECTOR).unwrap();
        let bytes = addr.to_vec();
        let again: ByronAddress = minicbor::decode(&bytes).unwrap();
        assert_eq!(addr, again);
    }

    #[test]
    fn rejects_corrupted_crc() {
        let addr = ByronAddress::from_base58(VECTOR).unwrap();
        let mut bytes = addr.to_vec();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;

        let result: Result<ByronAddress, _> = minicbor::decode(&bytes);
        assert!(result.is_err());
    }
}
