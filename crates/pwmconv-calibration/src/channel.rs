//! Receiver channel identifiers and per-channel storage

use core::fmt;

use serde::{Deserialize, Serialize};

/// One of the four receiver channels the converter listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelId {
    /// Throttle stick; scales both drive magnitudes
    Throttle,
    /// Yaw/pan stick; lateral axis of the mixer
    Pan,
    /// Pitch/tilt stick; longitudinal axis of the mixer
    Tilt,
    /// Auxiliary channel, tracked and gated but not mixed
    Aux,
}

impl ChannelId {
    /// All channels in acquisition order.
    pub const ALL: [ChannelId; 4] = [
        ChannelId::Throttle,
        ChannelId::Pan,
        ChannelId::Tilt,
        ChannelId::Aux,
    ];

    /// Lowercase channel name used in logs and error messages.
    pub const fn name(self) -> &'static str {
        match self {
            ChannelId::Throttle => "throttle",
            ChannelId::Pan => "pan",
            ChannelId::Tilt => "tilt",
            ChannelId::Aux => "aux",
        }
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fixed-size map holding one value per [`ChannelId`].
///
/// Lookups are a `match`, so there is no indexing and no missing entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChannelMap<T> {
    /// Throttle channel value
    pub throttle: T,
    /// Pan channel value
    pub pan: T,
    /// Tilt channel value
    pub tilt: T,
    /// Aux channel value
    pub aux: T,
}

impl<T> ChannelMap<T> {
    /// Creates a map from the four values in acquisition order.
    pub const fn new(throttle: T, pan: T, tilt: T, aux: T) -> Self {
        Self {
            throttle,
            pan,
            tilt,
            aux,
        }
    }

    /// Builds a map by calling `f` once per channel, in acquisition order.
    pub fn from_fn(mut f: impl FnMut(ChannelId) -> T) -> Self {
        Self {
            throttle: f(ChannelId::Throttle),
            pan: f(ChannelId::Pan),
            tilt: f(ChannelId::Tilt),
            aux: f(ChannelId::Aux),
        }
    }

    /// Returns the value for `channel`.
    pub fn get(&self, channel: ChannelId) -> &T {
        match channel {
            ChannelId::Throttle => &self.throttle,
            ChannelId::Pan => &self.pan,
            ChannelId::Tilt => &self.tilt,
            ChannelId::Aux => &self.aux,
        }
    }

    /// Returns a mutable reference to the value for `channel`.
    pub fn get_mut(&mut self, channel: ChannelId) -> &mut T {
        match channel {
            ChannelId::Throttle => &mut self.throttle,
            ChannelId::Pan => &mut self.pan,
            ChannelId::Tilt => &mut self.tilt,
            ChannelId::Aux => &mut self.aux,
        }
    }

    /// Iterates `(channel, value)` pairs in acquisition order.
    pub fn iter(&self) -> impl Iterator<Item = (ChannelId, &T)> + '_ {
        ChannelId::ALL.into_iter().map(move |channel| (channel, self.get(channel)))
    }

    /// Applies `f` to every value.
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> ChannelMap<U> {
        ChannelMap {
            throttle: f(self.throttle),
            pan: f(self.pan),
            tilt: f(self.tilt),
            aux: f(self.aux),
        }
    }
}

impl<T: Copy> ChannelMap<T> {
    /// Creates a map with the same value on every channel.
    pub const fn splat(value: T) -> Self {
        Self::new(value, value, value, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_fn_visits_in_acquisition_order() {
        let mut seen = Vec::new();
        let map = ChannelMap::from_fn(|ch| {
            seen.push(ch);
            ch.name().len()
        });
        assert_eq!(seen, ChannelId::ALL.to_vec());
        assert_eq!(map.throttle, 8);
        assert_eq!(map.aux, 3);
    }

    #[test]
    fn test_get_mut_targets_single_channel() {
        let mut map = ChannelMap::splat(0u32);
        *map.get_mut(ChannelId::Tilt) = 42;
        assert_eq!(map, ChannelMap::new(0, 0, 42, 0));
    }

    #[test]
    fn test_iter_pairs() {
        let map = ChannelMap::new(1, 2, 3, 4);
        let pairs: Vec<_> = map.iter().map(|(ch, v)| (ch, *v)).collect();
        assert_eq!(
            pairs,
            vec![
                (ChannelId::Throttle, 1),
                (ChannelId::Pan, 2),
                (ChannelId::Tilt, 3),
                (ChannelId::Aux, 4),
            ]
        );
    }

    #[test]
    fn test_channel_serde_name() -> Result<(), serde_json::Error> {
        assert_eq!(serde_json::to_string(&ChannelId::Pan)?, "\"pan\"");
        let ch: ChannelId = serde_json::from_str("\"tilt\"")?;
        assert_eq!(ch, ChannelId::Tilt);
        Ok(())
    }
}
