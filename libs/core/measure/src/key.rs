/// The statistic a measurement value represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statistic {
    Sum,
    Min,
    Max,
    Avg,
    Median,
    StdDev,
}

impl Statistic {
    fn to_bits(self) -> u32 {
        match self {
            Statistic::Sum => 0,
            Statistic::Min => 1,
            Statistic::Max => 2,
            Statistic::Avg => 3,
            Statistic::Median => 4,
            Statistic::StdDev => 5,
        }
    }

    fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            0 => Some(Statistic::Sum),
            1 => Some(Statistic::Min),
            2 => Some(Statistic::Max),
            3 => Some(Statistic::Avg),
            4 => Some(Statistic::Median),
            5 => Some(Statistic::StdDev),
            _ => None,
        }
    }
}

/// The decoded form of a packed 32-bit measurement key (§6.3):
/// `measureChannel` in the low 10 bits, `stats` in the next 3,
/// `crossChannelStack + 1` in the next 10, and `intersectingChannel + 1` in
/// the top 9. Both cross-channel fields use `-1` as the "unused" sentinel,
/// matching `PlaneId.c_stack`'s own "not yet specialized" convention, so
/// a stored field value of `0` and a decoded value of `-1` are the same
/// thing, not two representations of absence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeasurementKey {
    pub measure_channel: u16,
    pub stats: Statistic,
    pub cross_channel_stack: i16,
    pub intersecting_channel: i16,
}

const MEASURE_CHANNEL_BITS: u32 = 10;
const STATS_BITS: u32 = 3;
const CROSS_CHANNEL_BITS: u32 = 10;
const INTERSECTING_BITS: u32 = 9;

const MEASURE_CHANNEL_MASK: u32 = (1 << MEASURE_CHANNEL_BITS) - 1;
const STATS_MASK: u32 = (1 << STATS_BITS) - 1;
const CROSS_CHANNEL_MASK: u32 = (1 << CROSS_CHANNEL_BITS) - 1;
const INTERSECTING_MASK: u32 = (1 << INTERSECTING_BITS) - 1;

const STATS_SHIFT: u32 = MEASURE_CHANNEL_BITS;
const CROSS_CHANNEL_SHIFT: u32 = STATS_SHIFT + STATS_BITS;
const INTERSECTING_SHIFT: u32 = CROSS_CHANNEL_SHIFT + CROSS_CHANNEL_BITS;

impl MeasurementKey {
    pub fn pack(self) -> u32 {
        let cross = ((self.cross_channel_stack + 1) as u32) & CROSS_CHANNEL_MASK;
        let intersecting = ((self.intersecting_channel + 1) as u32) & INTERSECTING_MASK;

        (u32::from(self.measure_channel) & MEASURE_CHANNEL_MASK)
            | ((self.stats.to_bits() & STATS_MASK) << STATS_SHIFT)
            | (cross << CROSS_CHANNEL_SHIFT)
            | (intersecting << INTERSECTING_SHIFT)
    }

    pub fn unpack(packed: u32) -> Option<Self> {
        let measure_channel = (packed & MEASURE_CHANNEL_MASK) as u16;
        let stats = Statistic::from_bits((packed >> STATS_SHIFT) & STATS_MASK)?;
        let cross_raw = (packed >> CROSS_CHANNEL_SHIFT) & CROSS_CHANNEL_MASK;
        let intersecting_raw = (packed >> INTERSECTING_SHIFT) & INTERSECTING_MASK;

        Some(Self {
            measure_channel,
            stats,
            cross_channel_stack: cross_raw as i16 - 1,
            intersecting_channel: intersecting_raw as i16 - 1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_the_spec_example() {
        let key = MeasurementKey {
            measure_channel: 7,
            stats: Statistic::Max,
            cross_channel_stack: -1,
            intersecting_channel: 3,
        };
        let packed = key.pack();
        assert_eq!(MeasurementKey::unpack(packed), Some(key));
    }

    #[test]
    fn round_trips_with_both_cross_fields_unused() {
        let key = MeasurementKey {
            measure_channel: 0,
            stats: Statistic::Sum,
            cross_channel_stack: -1,
            intersecting_channel: -1,
        };
        assert_eq!(MeasurementKey::unpack(key.pack()), Some(key));
    }

    #[test]
    fn round_trips_every_legal_quadrant_without_collision() {
        use std::collections::HashSet;
        let mut seen = HashSet::new();
        let statistics =
            [Statistic::Sum, Statistic::Min, Statistic::Max, Statistic::Avg, Statistic::Median, Statistic::StdDev];
        for measure_channel in [0u16, 1, 511, 1023] {
            for stats in statistics {
                for cross in [-1i16, 0, 1022] {
                    for intersecting in [-1i16, 0, 510] {
                        let key = MeasurementKey {
                            measure_channel,
                            stats,
                            cross_channel_stack: cross,
                            intersecting_channel: intersecting,
                        };
                        let packed = key.pack();
                        assert_eq!(MeasurementKey::unpack(packed), Some(key));
                        assert!(seen.insert(packed), "collision for {key:?}");
                    }
                }
            }
        }
    }
}
