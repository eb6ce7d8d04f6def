/// Monotonic request counter for one display slot.
///
/// Every request takes a fresh number from [`RequestSequence::issue`]; a reply is
/// applied only when its number is still the latest one issued for the slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestSequence {
    latest: u64,
}

impl RequestSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    /// Makes every outstanding reply stale without starting a new request.
    pub fn invalidate(&mut self) {
        self.latest += 1;
    }

    pub fn is_current(&self, seq: u64) -> bool {
        seq != 0 && seq == self.latest
    }

    pub fn latest(&self) -> u64 {
        self.latest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_latest_issue_is_current() {
        let mut seq = RequestSequence::new();
        assert!(!seq.is_current(0));
        let first = seq.issue();
        let second = seq.issue();
        assert!(second > first);
        assert!(!seq.is_current(first));
        assert!(seq.is_current(second));
    }

    #[test]
    fn invalidate_drops_in_flight_reply() {
        let mut seq = RequestSequence::new();
        let pending = seq.issue();
        seq.invalidate();
        assert!(!seq.is_current(pending));
        let next = seq.issue();
        assert!(seq.is_current(next));
    }
}
