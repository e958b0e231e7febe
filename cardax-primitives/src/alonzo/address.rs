use crate::Error;

use super::TransactionOutput;
use bech32::{self, ToBase32};

pub fn encode_bech32_address(data: &[u8], hrp: &str) -> Result<String, Error> {
    bech32::encode(hrp, data.to_base32(), bech32::Variant::Bech32).map_err(|e| e.into())
}

impl TransactionOutput {
    pub fn to_bech32_address(&self, hrp: &str) -> Result<String, Error> {
        encode_bech32_address(self.address.as_slice(), hrp)
    }
}

#[cfg(test)]
mod tests {
    use bech32::FromBase32;

    use super::encode_bech32_address;

    #[test]
    fn round_trips_through_bech32() {
        let payload: Vec<u8> = (0u8..29).collect();

        let addr = encode_bech32_address(&payload, "addr_test").unwrap();
        assert!(addr.starts_with("addr_test1"));

        let (hrp, data, variant) = bech32::decode(&addr).unwrap();
        assert_eq!(hrp, "addr_test");
        assert_eq!(variant, bech32::Variant::Bech32);
        assert_eq!(Vec::<u8>::from_base32(&data).unwrap(), payload);
    }
}
