//! Arbitrary-precision signed integer with a canonical CBOR mapping.
//!
//! Values that fit a CBOR major-type-0/1 integer are encoded as such; larger
//! magnitudes fall back to the RFC 8949 tag 2 / tag 3 bignum encoding (an
//! unsigned big-endian byte string, tag 3 holding `|n| - 1` per CBOR's
//! one's-complement-offset convention for negative bignums).

use minicbor::data::{IanaTag, Tag};
use num_bigint::{BigInt as Inner, Sign};
use num_traits::{Signed, ToPrimitive, Zero};
use serde::{Deserialize, Serialize};
use std::{fmt, ops::Deref, str::FromStr};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[derive(Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct BigInt(Inner);

impl Deref for BigInt {
    type Target = Inner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for BigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for BigInt {
    type Err = num_bigint::ParseBigIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Inner::from_str(s).map(BigInt)
    }
}

impl TryFrom<String> for BigInt {
    type Error = num_bigint::ParseBigIntError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BigInt> for String {
    fn from(value: BigInt) -> Self {
        value.0.to_string()
    }
}

impl From<i64> for BigInt {
    fn from(value: i64) -> Self {
        BigInt(Inner::from(value))
    }
}

impl From<u64> for BigInt {
    fn from(value: u64) -> Self {
        BigInt(Inner::from(value))
    }
}

impl From<i128> for BigInt {
    fn from(value: i128) -> Self {
        BigInt(Inner::from(value))
    }
}

impl TryFrom<&BigInt> for i64 {
    type Error = TryFromBigIntError;

    fn try_from(value: &BigInt) -> Result<Self, Self::Error> {
        value.0.to_i64().ok_or(TryFromBigIntError(()))
    }
}

impl TryFrom<&BigInt> for u64 {
    type Error = TryFromBigIntError;

    fn try_from(value: &BigInt) -> Result<Self, Self::Error> {
        value.0.to_u64().ok_or(TryFromBigIntError(()))
    }
}

#[derive(Debug, thiserror::Error)]
#[error("value does not fit the requested integer width")]
pub struct TryFromBigIntError(());

impl BigInt {
    /// Parse a string in the given radix (2..=36), following the same
    /// convention as `num_bigint::BigInt::parse_bytes`.
    pub fn from_str_radix(s: &str, radix: u32) -> Option<Self> {
        Inner::parse_bytes(s.as_bytes(), radix).map(BigInt)
    }

    /// Render in the given radix (2..=36).
    pub fn to_str_radix(&self, radix: u32) -> String {
        self.0.to_str_radix(radix)
    }

    /// Big-endian magnitude bytes, without a sign byte.
    pub fn to_magnitude_bytes(&self) -> Vec<u8> {
        self.0.to_bytes_be().1
    }

    /// Construct from an explicit sign and big-endian magnitude bytes.
    pub fn from_magnitude_bytes(negative: bool, bytes: &[u8]) -> Self {
        let sign = if negative { Sign::Minus } else { Sign::Plus };
        BigInt(Inner::from_bytes_be(sign, bytes))
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }
}

impl std::ops::Add for BigInt {
    type Output = BigInt;

    fn add(self, rhs: Self) -> Self::Output {
        BigInt(self.0 + rhs.0)
    }
}

impl std::ops::Sub for BigInt {
    type Output = BigInt;

    fn sub(self, rhs: Self) -> Self::Output {
        BigInt(self.0 - rhs.0)
    }
}

impl std::ops::Mul for BigInt {
    type Output = BigInt;

    fn mul(self, rhs: Self) -> Self::Output {
        BigInt(self.0 * rhs.0)
    }
}

impl std::ops::Div for BigInt {
    type Output = BigInt;

    fn div(self, rhs: Self) -> Self::Output {
        BigInt(self.0 / rhs.0)
    }
}

impl std::ops::Rem for BigInt {
    type Output = BigInt;

    fn rem(self, rhs: Self) -> Self::Output {
        BigInt(self.0 % rhs.0)
    }
}

const U64_MAX: u64 = u64::MAX;

impl<C> minicbor::Encode<C> for BigInt {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        if let Some(small) = self.0.to_i64() {
            e.i64(small)?;
            return Ok(());
        }

        if let Some(small) = self.0.to_u64() {
            if small <= U64_MAX {
                e.u64(small)?;
                return Ok(());
            }
        }

        if self.0.is_negative() {
            // CBOR tag 3 holds `|n| - 1` as an unsigned big-endian byte string.
            let magnitude = (-self.0.clone()) - Inner::from(1);
            e.tag(IanaTag::NegBignum)?;
            e.bytes(&magnitude.to_bytes_be().1)?;
        } else {
            e.tag(IanaTag::PosBignum)?;
            e.bytes(&self.0.to_bytes_be().1)?;
        }

        Ok(())
    }
}

impl<'b, C> minicbor::Decode<'b, C> for BigInt {
    fn decode(d: &mut minicbor::Decoder<'b>, _ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        match d.datatype()? {
            minicbor::data::Type::U8
            | minicbor::data::Type::U16
            | minicbor::data::Type::U32
            | minicbor::data::Type::U64 => Ok(BigInt(Inner::from(d.u64()?))),
            minicbor::data::Type::I8
            | minicbor::data::Type::I16
            | minicbor::data::Type::I32
            | minicbor::data::Type::I64
            | minicbor::data::Type::Int => {
                let as_i128: i128 = d.int()?.into();
                Ok(BigInt(Inner::from(as_i128)))
            }
            minicbor::data::Type::Tag => {
                let tag = d.tag()?;
                let bytes = d.bytes()?;

                if tag == IanaTag::PosBignum.tag() {
                    Ok(BigInt(Inner::from_bytes_be(Sign::Plus, bytes)))
                } else if tag == IanaTag::NegBignum.tag() {
                    let magnitude = Inner::from_bytes_be(Sign::Plus, bytes);
                    Ok(BigInt(-(magnitude + Inner::from(1))))
                } else {
                    Err(minicbor::decode::Error::message(
                        "unexpected cbor tag for big integer",
                    ))
                }
            }
            _ => Err(minicbor::decode::Error::message(
                "unexpected cbor data type for big integer",
            )),
        }
    }
}

/// Convenience re-export so callers that only need the raw CBOR tag values
/// (e.g. to distinguish bignum tags while streaming) don't need `minicbor`
/// in scope themselves.
pub fn bignum_tags() -> (Tag, Tag) {
    (IanaTag::PosBignum.tag(), IanaTag::NegBignum.tag())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(n: BigInt) {
        let bytes = minicbor::to_vec(&n).unwrap();
        let back: BigInt = minicbor::decode(&bytes).unwrap();
        assert_eq!(n, back);
    }

    #[test]
    fn small_values_round_trip() {
        roundtrip(BigInt::from(0i64));
        roundtrip(BigInt::from(-1i64));
        roundtrip(BigInt::from(i64::MAX));
        roundtrip(BigInt::from(i64::MIN));
    }

    #[test]
    fn bignum_round_trips() {
        let big = BigInt::from_str_radix("18446744073709551616", 10).unwrap(); // u64::MAX + 1
        let bytes = minicbor::to_vec(&big).unwrap();
        assert_eq!(bytes, hex::decode("c249010000000000000000").unwrap());
        let back: BigInt = minicbor::decode(&bytes).unwrap();
        assert_eq!(big, back);
    }

    #[test]
    fn negative_bignum_round_trips() {
        let big = BigInt::from_str_radix("-18446744073709551617", 10).unwrap(); // -(u64::MAX + 2)
        roundtrip(big);
    }

    #[test]
    fn radix_conversions() {
        let n = BigInt::from_str_radix("ff", 16).unwrap();
        assert_eq!(n.to_str_radix(10), "255");
    }

    #[quickcheck_macros::quickcheck]
    fn quickcheck_i64_round_trip(x: i64) -> bool {
        let n = BigInt::from(x);
        let bytes = minicbor::to_vec(&n).unwrap();
        let back: BigInt = minicbor::decode(&bytes).unwrap();
        n == back
    }
}
