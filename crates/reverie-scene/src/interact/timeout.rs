/// Explicit wake-up deadline of the current interaction.
///
/// Every request may only pull the deadline earlier, so several handlers
/// asking during one dispatch converge on the soonest one.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Timeout {
    deadline: Option<f64>,
}

impl Timeout {
    /// Requests a timer event `offset` seconds after `event_time`. Negative
    /// offsets are ignored.
    pub fn request(&mut self, event_time: f64, offset: f64) {
        if offset < 0.0 {
            return;
        }

        let at = event_time + offset;
        self.deadline = Some(match self.deadline {
            Some(current) => current.min(at),
            None => at,
        });
    }

    pub fn deadline(&self) -> Option<f64> {
        self.deadline
    }

    pub fn clear(&mut self) {
        self.deadline = None;
    }
}
