use chrono::{DateTime, Timelike, Utc};

/// counts device sightings per hour of day. the peak hour is the
/// representative activity hour reported in the feature vector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityHistogram {
    bins: [u64; 24],
}

impl ActivityHistogram {
    pub fn new() -> ActivityHistogram {
        ActivityHistogram::default()
    }

    pub fn observe(&mut self, time: &DateTime<Utc>) {
        self.observe_hour(time.hour());
    }

    pub fn observe_hour(&mut self, hour: u32) {
        if let Some(bin) = self.bins.get_mut(hour as usize) {
            *bin += 1;
        }
    }

    pub fn total(&self) -> u64 {
        self.bins.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn counts(&self) -> &[u64; 24] {
        &self.bins
    }

    /// the hour of day with the most sightings, in [0, 23]. when several
    /// hours share the maximum the earliest one wins, so repeated runs over
    /// the same data report the same peak. None for an empty histogram.
    pub fn peak_hour(&self) -> Option<u8> {
        if self.is_empty() {
            return None;
        }
        let (hour, _) = self
            .bins
            .iter()
            .enumerate()
            .max_by(|(ha, ca), (hb, cb)| ca.cmp(cb).then(hb.cmp(ha)))?;
        Some(hour as u8)
    }

    /// fraction of all sightings that fall in the peak hour.
    pub fn peak_share(&self) -> Option<f64> {
        let peak = self.peak_hour()? as usize;
        Some(self.bins[peak] as f64 / self.total() as f64)
    }
}
