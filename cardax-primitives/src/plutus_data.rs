use crate::KeyValuePairs;
use cardax_codec::minicbor::{
    self,
    data::{IanaTag, Tag},
    Encode,
};
use cardax_codec::utils::{CborListMode, Int, KeepRaw};
use serde::{Deserialize, Serialize};
use std::{fmt, ops::Deref};

/// A node of Plutus Data, recursive and cache-preserving: every child
/// position (`Constr` fields, `Map` keys/values, `Array` elements) is wrapped
/// in [`KeepRaw`] so that decoding and re-encoding a tree reproduces the
/// original bytes node for node, not just at the root.
///
/// Equality, ordering and hashing are defined over the logical value only —
/// two trees that decode to the same data compare equal regardless of
/// whether either carries a byte cache. See [`PlutusData::clear_cbor_cache`].
#[derive(Serialize, Deserialize, Debug, Clone)]
pub enum PlutusData<'b> {
    Constr(Constr<KeepRaw<'b, PlutusData<'b>>>),
    Map(KeyValuePairs<KeepRaw<'b, PlutusData<'b>>, KeepRaw<'b, PlutusData<'b>>>),
    BigInt(BigInt),
    BoundedBytes(BoundedBytes),
    Array(Vec<KeepRaw<'b, PlutusData<'b>>>),
}

impl<'b> PlutusData<'b> {
    /// Recursively drops every node's original-byte cache, so a subsequent
    /// encode derives the canonical form (per the configured
    /// [`CborListMode`]) instead of replaying whatever bytes it was decoded
    /// from.
    pub fn clear_cbor_cache(&mut self) {
        match self {
            PlutusData::Constr(c) => {
                for field in c.fields.iter_mut() {
                    field.inner_mut().clear_cbor_cache();
                }
            }
            PlutusData::Map(m) => {
                let cleared: Vec<_> = m
                    .deref()
                    .iter()
                    .cloned()
                    .map(|(mut k, mut v)| {
                        k.inner_mut().clear_cbor_cache();
                        v.inner_mut().clear_cbor_cache();
                        (k, v)
                    })
                    .collect();
                *m = cleared.into();
            }
            PlutusData::BigInt(_) | PlutusData::BoundedBytes(_) => {}
            PlutusData::Array(xs) => {
                for x in xs.iter_mut() {
                    x.inner_mut().clear_cbor_cache();
                }
            }
        }
    }
}

impl<'b> PartialEq for PlutusData<'b> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Constr(a), Self::Constr(b)) => {
                a.tag == b.tag
                    && a.any_constructor == b.any_constructor
                    && a.fields.len() == b.fields.len()
                    && a.fields.iter().zip(b.fields.iter()).all(|(x, y)| **x == **y)
            }
            (Self::Map(a), Self::Map(b)) => {
                a.len() == b.len()
                    && a.deref()
                        .iter()
                        .zip(b.deref().iter())
                        .all(|((ak, av), (bk, bv))| **ak == **bk && **av == **bv)
            }
            (Self::BigInt(a), Self::BigInt(b)) => a == b,
            (Self::BoundedBytes(a), Self::BoundedBytes(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| **x == **y)
            }
            _ => false,
        }
    }
}

impl<'b> Eq for PlutusData<'b> {}

impl<'b, C> minicbor::decode::Decode<'b, C> for PlutusData<'b> {
    fn decode(d: &mut minicbor::Decoder<'b>, ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        let type_ = d.datatype()?;

        match type_ {
            minicbor::data::Type::Tag => {
                let mut probe = d.probe();
                let tag = probe.tag()?;

                if tag == IanaTag::PosBignum.tag() || tag == IanaTag::NegBignum.tag() {
                    Ok(Self::BigInt(d.decode_with(ctx)?))
                } else {
                    match tag.as_u64() {
                        (121..=127) | (1280..=1400) | 102 => Ok(Self::Constr(d.decode_with(ctx)?)),
                        _ => Err(minicbor::decode::Error::message(
                            "unknown tag for plutus data tag",
                        )),
                    }
                }
            }
            minicbor::data::Type::U8
            | minicbor::data::Type::U16
            | minicbor::data::Type::U32
            | minicbor::data::Type::U64
            | minicbor::data::Type::I8
            | minicbor::data::Type::I16
            | minicbor::data::Type::I32
            | minicbor::data::Type::I64
            | minicbor::data::Type::Int => Ok(Self::BigInt(d.decode_with(ctx)?)),
            minicbor::data::Type::Map | minicbor::data::Type::MapIndef => {
                Ok(Self::Map(d.decode_with(ctx)?))
            }
            minicbor::data::Type::Bytes => Ok(Self::BoundedBytes(d.decode_with(ctx)?)),
            minicbor::data::Type::BytesIndef => {
                let mut full = Vec::new();

                for slice in d.bytes_iter()? {
                    full.extend(slice?);
                }

                Ok(Self::BoundedBytes(BoundedBytes::from(full)))
            }
            minicbor::data::Type::Array | minicbor::data::Type::ArrayIndef => {
                Ok(Self::Array(d.decode_with(ctx)?))
            }

            any => Err(minicbor::decode::Error::message(format!(
                "bad cbor data type ({any:?}) for plutus data"
            ))),
        }
    }
}

impl<C> minicbor::encode::Encode<C> for PlutusData<'_> {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        match self {
            Self::Constr(a) => {
                e.encode_with(a, ctx)?;
            }
            Self::Map(a) => {
                // we use definite array to match the approach used by haskell's plutus
                // implementation https://github.com/input-output-hk/plutus/blob/9538fc9829426b2ecb0628d352e2d7af96ec8204/plutus-core/plutus-core/src/PlutusCore/Data.hs#L152
                e.map(a.len().try_into().unwrap())?;
                for (k, v) in a.iter() {
                    k.encode(e, ctx)?;
                    v.encode(e, ctx)?;
                }
            }
            Self::BigInt(a) => {
                e.encode_with(a, ctx)?;
            }
            Self::BoundedBytes(a) => {
                e.encode_with(a, ctx)?;
            }
            Self::Array(a) => {
                // we use definite array for empty array or indef array otherwise to match
                // haskell implementation https://github.com/input-output-hk/plutus/blob/9538fc9829426b2ecb0628d352e2d7af96ec8204/plutus-core/plutus-core/src/PlutusCore/Data.hs#L153
                // default encoder for a list:
                // https://github.com/well-typed/cborg/blob/4bdc818a1f0b35f38bc118a87944630043b58384/serialise/src/Codec/Serialise/Class.hs#L181
                encode_list(a, e, ctx)?;
            }
        };

        Ok(())
    }
}

/*
big_int = int / big_uint / big_nint ; New
big_uint = #6.2(bounded_bytes) ; New
big_nint = #6.3(bounded_bytes) ; New
 */

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, PartialOrd, Ord, Clone)]
pub enum BigInt {
    Int(Int),
    BigUInt(BoundedBytes),
    BigNInt(BoundedBytes),
}

impl<'b, C> minicbor::decode::Decode<'b, C> for BigInt {
    fn decode(d: &mut minicbor::Decoder<'b>, ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        let datatype = d.datatype()?;

        match datatype {
            minicbor::data::Type::U8
            | minicbor::data::Type::U16
            | minicbor::data::Type::U32
            | minicbor::data::Type::U64
            | minicbor::data::Type::I8
            | minicbor::data::Type::I16
            | minicbor::data::Type::I32
            | minicbor::data::Type::I64
            | minicbor::data::Type::Int => Ok(Self::Int(d.decode_with(ctx)?)),
            minicbor::data::Type::Tag => {
                let tag = d.tag()?;
                if tag == IanaTag::PosBignum.tag() {
                    Ok(Self::BigUInt(d.decode_with(ctx)?))
                } else if tag == IanaTag::NegBignum.tag() {
                    Ok(Self::BigNInt(d.decode_with(ctx)?))
                } else {
                    Err(minicbor::decode::Error::message(
                        "invalid cbor tag for big int",
                    ))
                }
            }
            _ => Err(minicbor::decode::Error::message(
                "invalid cbor data type for big int",
            )),
        }
    }
}

impl<C> minicbor::encode::Encode<C> for BigInt {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        match self {
            BigInt::Int(x) => {
                e.encode_with(x, ctx)?;
            }
            BigInt::BigUInt(x) => {
                e.tag(IanaTag::PosBignum)?;
                e.encode_with(x, ctx)?;
            }
            BigInt::BigNInt(x) => {
                e.tag(IanaTag::NegBignum)?;
                e.encode_with(x, ctx)?;
            }
        };

        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, PartialOrd, Ord, Clone)]
pub struct Constr<A> {
    pub tag: u64,
    pub any_constructor: Option<u64>,
    pub fields: Vec<A>,
}

impl<'b, C, A> minicbor::decode::Decode<'b, C> for Constr<A>
where
    A: minicbor::decode::Decode<'b, C>,
{
    fn decode(d: &mut minicbor::Decoder<'b>, ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        let tag = d.tag()?;
        let x = tag.as_u64();
        match x {
            121..=127 | 1280..=1400 => Ok(Constr {
                tag: x,
                fields: d.decode_with(ctx)?,
                any_constructor: None,
            }),
            102 => {
                d.array()?;

                Ok(Constr {
                    tag: x,
                    any_constructor: Some(d.decode_with(ctx)?),
                    fields: d.decode_with(ctx)?,
                })
            }
            _ => Err(minicbor::decode::Error::message(
                "bad tag code for plutus data",
            )),
        }
    }
}

impl<C, A> minicbor::encode::Encode<C> for Constr<A>
where
    A: minicbor::encode::Encode<C>,
{
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        e.tag(Tag::new(self.tag))?;

        match self.tag {
            102 => {
                // definite length array here
                // https://github.com/input-output-hk/plutus/blob/9538fc9829426b2ecb0628d352e2d7af96ec8204/plutus-core/plutus-core/src/PlutusCore/Data.hs#L152
                e.array(2)?;
                e.encode_with(self.any_constructor.unwrap_or_default(), ctx)?;

                // we use definite array for empty array or indef array otherwise to match
                // haskell implementation https://github.com/input-output-hk/plutus/blob/9538fc9829426b2ecb0628d352e2d7af96ec8204/plutus-core/plutus-core/src/PlutusCore/Data.hs#L144
                // default encoder for a list:
                // https://github.com/well-typed/cborg/blob/4bdc818a1f0b35f38bc118a87944630043b58384/serialise/src/Codec/Serialise/Class.hs#L181
                encode_list(&self.fields, e, ctx)?;
                Ok(())
            }
            _ => {
                // we use definite array for empty array or indef array otherwise to match
                // haskell implementation. See above reference.
                encode_list(&self.fields, e, ctx)?;
                Ok(())
            }
        }
    }
}

/// Defined to encode PlutusData bytestring as it is done in the canonical
/// plutus implementation
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[serde(into = "String")]
#[serde(try_from = "String")]
pub struct BoundedBytes(Vec<u8>);

impl From<Vec<u8>> for BoundedBytes {
    fn from(xs: Vec<u8>) -> Self {
        BoundedBytes(xs)
    }
}

impl From<BoundedBytes> for Vec<u8> {
    fn from(b: BoundedBytes) -> Self {
        b.0
    }
}

impl Deref for BoundedBytes {
    type Target = Vec<u8>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl TryFrom<String> for BoundedBytes {
    type Error = hex::FromHexError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let v = hex::decode(value)?;
        Ok(BoundedBytes(v))
    }
}

impl From<BoundedBytes> for String {
    fn from(b: BoundedBytes) -> Self {
        hex::encode(b.deref())
    }
}

impl fmt::Display for BoundedBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes: Vec<u8> = self.clone().into();

        f.write_str(&hex::encode(bytes))
    }
}

impl<C> Encode<C> for BoundedBytes {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        // we match the haskell implementation by encoding bytestrings longer than 64
        // bytes as indefinite lists of bytes
        const CHUNK_SIZE: usize = 64;
        let bs: &Vec<u8> = self.deref();
        if bs.len() <= 64 {
            e.bytes(bs)?;
        } else {
            e.begin_bytes()?;
            for b in bs.chunks(CHUNK_SIZE) {
                e.bytes(b)?;
            }
            e.end()?;
        }
        Ok(())
    }
}

impl<'b, C> minicbor::decode::Decode<'b, C> for BoundedBytes {
    fn decode(d: &mut minicbor::Decoder<'b>, _: &mut C) -> Result<Self, minicbor::decode::Error> {
        let mut res = Vec::new();
        for chunk in d.bytes_iter()? {
            let bs = chunk?;
            res.extend_from_slice(bs);
        }
        Ok(BoundedBytes::from(res))
    }
}

/// Mimics default haskell list encoding from cborg: empty arrays are always
/// definite-length; non-empty arrays are written indefinite-length, matching
/// current mainnet node convention (see [`CborListMode`] for callers that
/// need the definite-length form instead).
fn encode_list<C, W, A>(
    a: &[A],
    e: &mut minicbor::Encoder<W>,
    ctx: &mut C,
) -> Result<(), minicbor::encode::Error<W::Error>>
where
    W: minicbor::encode::Write,
    A: minicbor::encode::Encode<C>,
{
    encode_list_with_mode(a, e, ctx, CborListMode::Indefinite)
}

/// Like [`encode_list`], but lets the caller pick the wire form for
/// non-empty lists explicitly instead of taking the default.
pub fn encode_list_with_mode<C, W, A>(
    a: &[A],
    e: &mut minicbor::Encoder<W>,
    ctx: &mut C,
    mode: CborListMode,
) -> Result<(), minicbor::encode::Error<W::Error>>
where
    W: minicbor::encode::Write,
    A: minicbor::encode::Encode<C>,
{
    if a.is_empty() {
        e.array(0)?;
        return Ok(());
    }

    match mode {
        CborListMode::Indefinite => {
            e.begin_array()?;
            for v in a {
                e.encode_with(v, ctx)?;
            }
            e.end()?;
        }
        CborListMode::Definite => {
            e.array(a.len() as u64)?;
            for v in a {
                e.encode_with(v, ctx)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardax_codec::minicbor;

    fn pd_int(n: i64) -> PlutusData<'static> {
        PlutusData::BigInt(BigInt::Int(Int::from(n)))
    }

    #[test]
    fn constr_empty_encodes_as_tag_124_empty_array() {
        let data = PlutusData::Constr(Constr {
            tag: 124,
            any_constructor: None,
            fields: Vec::<KeepRaw<PlutusData>>::new(),
        });

        let bytes = minicbor::to_vec(&data).unwrap();
        assert_eq!(hex::encode(&bytes), "d87c80");
    }

    #[test]
    fn equality_ignores_cbor_cache() {
        let fresh = pd_int(42);
        let bytes = minicbor::to_vec(&fresh).unwrap();
        let decoded: PlutusData = minicbor::decode(&bytes).unwrap();

        assert_eq!(fresh, decoded);
    }

    #[test]
    fn bounded_bytes_long_string_chunks_at_64() {
        let long = BoundedBytes::from(vec![0xABu8; 200]);
        let data = PlutusData::BoundedBytes(long.clone());

        let bytes = minicbor::to_vec(&data).unwrap();
        let decoded: PlutusData = minicbor::decode(&bytes).unwrap();

        match decoded {
            PlutusData::BoundedBytes(b) => assert_eq!(b, long),
            _ => panic!("expected bounded bytes"),
        }
    }

    #[test]
    fn constr_fields_round_trip_through_keep_raw() {
        let data = PlutusData::Constr(Constr {
            tag: 121,
            any_constructor: None,
            fields: vec![],
        });
        let bytes = minicbor::to_vec(&data).unwrap();

        let decoded: KeepRaw<PlutusData> = minicbor::decode(&bytes).unwrap();
        assert_eq!(*decoded, data);
        assert_eq!(decoded.raw_cbor(), Some(bytes.as_slice()));
    }

    #[test]
    fn clear_cbor_cache_drops_nested_caches() {
        let inner_bytes = minicbor::to_vec(&pd_int(7)).unwrap();
        let inner: KeepRaw<PlutusData> = minicbor::decode(&inner_bytes).unwrap();
        assert!(inner.is_cached());

        let mut data = PlutusData::Array(vec![inner]);
        data.clear_cbor_cache();

        match &data {
            PlutusData::Array(xs) => assert!(!xs[0].is_cached()),
            _ => panic!("expected array"),
        }
    }
}
