use std::collections::BTreeMap;

use super::{CostModel, PlutusData, Redeemers, WitnessSet};
use cardax_codec::minicbor::{self, Encode};
use cardax_codec::utils::{KeepRaw, NonEmptySet};
use serde::{Deserialize, Serialize};

pub type PlutusVersion = u8;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LanguageViews(pub BTreeMap<PlutusVersion, CostModel>);

impl FromIterator<(PlutusVersion, CostModel)> for LanguageViews {
    fn from_iter<I: IntoIterator<Item = (PlutusVersion, CostModel)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<C> Encode<C> for LanguageViews {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        let order: Vec<u8> = self.0.keys().copied().collect();
        let mut canonical_order: Vec<u8> = order.into_iter().filter(|&k| k != 0).collect();
        canonical_order.sort();
        // PlutusV1 is CBOR encoded as 0x4100 so it goes last
        if self.0.contains_key(&0) {
            canonical_order.push(0);
        }

        e.map(self.0.len() as u64)?;
        for lang in canonical_order {
            let cost_model = self.0.get(&lang).unwrap();
            match lang {
                0 => {
                    let mut inner = vec![];
                    let mut sub = minicbor::Encoder::new(&mut inner);
                    sub.begin_array().unwrap();
                    for v in cost_model.iter() {
                        sub.encode_with(v, ctx).unwrap();
                    }
                    sub.end().unwrap();
                    e.bytes(&minicbor::to_vec(0).unwrap())?;
                    e.bytes(&inner)?;
                }
                _ => {
                    e.encode(lang)?;
                    e.encode(cost_model)?;
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ScriptData<'b> {
    pub redeemers: Option<Redeemers<'b>>,
    pub datums: Option<KeepRaw<'b, NonEmptySet<KeepRaw<'b, PlutusData<'b>>>>>,
    pub language_views: Option<LanguageViews>,
}

impl ScriptData<'_> {
    pub fn hash(&self) -> cardax_crypto::hash::Hash<32> {
        let mut buf = vec![];

        if let Some(redeemers) = &self.redeemers {
            minicbor::encode(redeemers, &mut buf).unwrap(); // infallible
        } else {
            buf.push(0xa0);
        }

        if let Some(datums) = &self.datums {
            minicbor::encode(datums, &mut buf).unwrap(); // infallible
        }

        if let Some(language_views) = &self.language_views {
            minicbor::encode(language_views, &mut buf).unwrap(); // infallible
        } else {
            buf.push(0xa0);
        }

        cardax_crypto::hash::Hasher::<256>::hash(&buf)
    }
}

impl<'b> ScriptData<'b> {
    pub fn build_for(
        witness: &WitnessSet<'b>,
        language_views_opt: &Option<LanguageViews>,
    ) -> Option<Self> {
        let redeemers = witness.redeemer.as_ref().map(|x| x.to_owned().unwrap());
        let datums = witness.plutus_data.clone();

        if redeemers.is_none() && datums.is_none() {
            return None;
        }

        let language_views = if redeemers.is_some() && language_views_opt.is_some() {
            language_views_opt.clone()
        } else {
            None
        };

        Some(ScriptData {
            redeemers,
            datums,
            language_views,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cost_model(seed: i64) -> CostModel {
        (0..166).map(|i| seed + i).collect()
    }

    #[test]
    fn language_views_orders_plutus_v1_last() {
        let views: LanguageViews = [(1, cost_model(10)), (0, cost_model(1)), (2, cost_model(20))]
            .into_iter()
            .collect();

        let bytes = minicbor::to_vec(&views).unwrap();

        // V1 (key 0) is wrapped in a bytestring and must be encoded last,
        // regardless of insertion order, so its length-prefixed bytes tag
        // (0x41 0x00) sits right before the trailing payload.
        let tag_pos = bytes.windows(2).position(|w| w == [0x41, 0x00]).unwrap();
        assert!(tag_pos > bytes.len() / 2);
    }

    #[test]
    fn hash_changes_with_language_views() {
        let empty = ScriptData {
            redeemers: None,
            datums: None,
            language_views: None,
        };

        let with_views = ScriptData {
            redeemers: None,
            datums: None,
            language_views: Some([(1, cost_model(10))].into_iter().collect()),
        };

        assert_ne!(empty.hash(), with_views.hash());
    }

    #[test]
    fn build_for_returns_none_without_redeemers_or_data() {
        let witness = WitnessSet {
            vkeywitness: None,
            native_script: None,
            bootstrap_witness: None,
            plutus_v1_script: None,
            plutus_data: None,
            redeemer: None,
            plutus_v2_script: None,
            plutus_v3_script: None,
        };

        assert!(ScriptData::build_for(&witness, &None).is_none());
    }
}
