use crate::{AssetName, KeyValuePairs, PolicyId};

/// A multi-asset quantity map: policy id -> asset name -> signed quantity,
/// kept in insertion order rather than sorted, mirroring the ordered-map
/// collections the rest of this crate uses for CBOR round-tripping.
///
/// Unlike [`crate::conway::Multiasset`] (a `BTreeMap`-backed CDDL-shaped
/// value bucket), this type is for value arithmetic: combining the multi-
/// asset deltas of a transaction's inputs and outputs. An entry whose
/// quantity nets to zero is pruned rather than kept at zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetMap(KeyValuePairs<PolicyId, KeyValuePairs<AssetName, i64>>);

impl Default for AssetMap {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetMap {
    pub fn new() -> Self {
        Self(KeyValuePairs::from(Vec::new()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, policy: &PolicyId, asset: &AssetName) -> Option<i64> {
        self.0.get(policy).and_then(|assets| assets.get(asset)).copied()
    }

    /// Sets `policy`/`asset`'s quantity, replacing any existing entry.
    /// Setting a quantity of zero removes the entry (and its policy bucket,
    /// if it becomes empty) rather than storing a zero.
    pub fn set(&mut self, policy: PolicyId, asset: AssetName, quantity: i64) {
        if quantity == 0 {
            self.remove(&policy, &asset);
            return;
        }

        match self.0.get(&policy) {
            Some(assets) => {
                let mut assets = assets.clone();
                assets.insert(asset, quantity);
                self.0.insert(policy, assets);
            }
            None => {
                let mut assets = KeyValuePairs::from(Vec::new());
                assets.insert(asset, quantity);
                self.0.insert(policy, assets);
            }
        }
    }

    fn remove(&mut self, policy: &PolicyId, asset: &AssetName) {
        let Some(assets) = self.0.get(policy) else {
            return;
        };

        let remaining: Vec<_> = assets
            .get_keys()
            .into_iter()
            .zip(assets.get_values())
            .filter(|(k, _)| *k != asset)
            .map(|(k, v)| (k.clone(), *v))
            .collect();

        let policies: Vec<_> = self
            .0
            .get_keys()
            .into_iter()
            .zip(self.0.get_values())
            .filter_map(|(p, a)| {
                if p == policy {
                    if remaining.is_empty() {
                        None
                    } else {
                        Some((p.clone(), KeyValuePairs::from(remaining.clone())))
                    }
                } else {
                    Some((p.clone(), a.clone()))
                }
            })
            .collect();

        self.0 = KeyValuePairs::from(policies);
    }

    fn combine(&self, other: &Self, op: impl Fn(i64, i64) -> i64) -> Self {
        let mut result = self.clone();

        for policy in other.0.get_keys() {
            let assets = other.0.get(policy).expect("key from get_keys always present");

            for asset in assets.get_keys() {
                let rhs = *assets.get(asset).expect("key from get_keys always present");
                let lhs = result.get(policy, asset).unwrap_or(0);
                result.set(policy.clone(), asset.clone(), op(lhs, rhs));
            }
        }

        result
    }

    pub fn add(&self, other: &Self) -> Self {
        self.combine(other, |a, b| a + b)
    }

    pub fn subtract(&self, other: &Self) -> Self {
        self.combine(other, |a, b| a - b)
    }

    /// Negates every quantity in the map. Since zero quantities are never
    /// stored, negation never produces or removes entries.
    pub fn negate(&self) -> Self {
        let policies: Vec<_> = self
            .0
            .get_keys()
            .into_iter()
            .map(|policy| {
                let assets = self.0.get(policy).expect("key from get_keys always present");
                let negated: Vec<_> = assets
                    .get_keys()
                    .into_iter()
                    .zip(assets.get_values())
                    .map(|(k, v)| (k.clone(), -*v))
                    .collect();
                (policy.clone(), KeyValuePairs::from(negated))
            })
            .collect();

        Self(KeyValuePairs::from(policies))
    }
}

impl FromIterator<(PolicyId, AssetName, i64)> for AssetMap {
    fn from_iter<I: IntoIterator<Item = (PolicyId, AssetName, i64)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (policy, asset, quantity) in iter {
            map.set(policy, asset, quantity);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(byte: u8) -> PolicyId {
        PolicyId::from([byte; 28])
    }

    fn asset(name: &[u8]) -> AssetName {
        AssetName::from(name.to_vec())
    }

    #[test]
    fn add_combines_disjoint_entries() {
        let lhs: AssetMap = [(policy(1), asset(b"walkerA"), 1)].into_iter().collect();
        let rhs: AssetMap = [(policy(1), asset(b"walkerB"), 1)].into_iter().collect();

        let sum = lhs.add(&rhs);

        assert_eq!(sum.len(), 1);
        assert_eq!(sum.get(&policy(1), &asset(b"walkerA")), Some(1));
        assert_eq!(sum.get(&policy(1), &asset(b"walkerB")), Some(1));
    }

    #[test]
    fn add_sums_shared_entries() {
        let lhs: AssetMap = [(policy(1), asset(b"walkerA"), 1)].into_iter().collect();
        let rhs: AssetMap = [
            (policy(1), asset(b"walkerA"), 1),
            (policy(1), asset(b"walkerB"), 1),
        ]
        .into_iter()
        .collect();

        let sum = lhs.add(&rhs);

        assert_eq!(sum.get(&policy(1), &asset(b"walkerA")), Some(2));
        assert_eq!(sum.get(&policy(1), &asset(b"walkerB")), Some(1));
    }

    #[test]
    fn subtract_prunes_zero_entries() {
        let lhs: AssetMap = [
            (policy(1), asset(b"walkerA"), 1),
            (policy(1), asset(b"walkerB"), 1),
        ]
        .into_iter()
        .collect();
        let rhs: AssetMap = [
            (policy(1), asset(b"walkerA"), 1),
            (policy(1), asset(b"walkerB"), 2),
        ]
        .into_iter()
        .collect();

        let diff = lhs.subtract(&rhs);

        assert_eq!(diff.get(&policy(1), &asset(b"walkerA")), None);
        assert_eq!(diff.get(&policy(1), &asset(b"walkerB")), Some(-1));
        assert_eq!(diff.len(), 1);
    }

    #[test]
    fn negate_flips_every_quantity() {
        let map: AssetMap = [
            (policy(1), asset(b"walkerA"), 3),
            (policy(2), asset(b"walkerB"), -5),
        ]
        .into_iter()
        .collect();

        let negated = map.negate();

        assert_eq!(negated.get(&policy(1), &asset(b"walkerA")), Some(-3));
        assert_eq!(negated.get(&policy(2), &asset(b"walkerB")), Some(5));
    }
}
