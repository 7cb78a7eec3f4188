/// Pending redraw deadlines requested by animated displayables.
///
/// Rendering may ask for a future frame (`request(at)`) instead of returning
/// early; the interaction loop wakes for the earliest deadline and calls
/// [`RedrawQueue::process`] to learn whether one is due.
#[derive(Debug, Default, Clone)]
pub struct RedrawQueue {
    deadlines: Vec<f64>,
}

impl RedrawQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules a redraw at absolute time `at`. Duplicate times collapse.
    pub fn request(&mut self, at: f64) {
        if !self.deadlines.iter().any(|&t| t == at) {
            self.deadlines.push(at);
        }
    }

    /// Removes every deadline at or before `now`. Returns true if any was due.
    pub fn process(&mut self, now: f64) -> bool {
        let before = self.deadlines.len();
        self.deadlines.retain(|&t| t > now);
        self.deadlines.len() != before
    }

    /// Earliest pending deadline.
    pub fn next_time(&self) -> Option<f64> {
        self.deadlines.iter().copied().reduce(f64::min)
    }

    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }

    pub fn clear(&mut self) {
        self.deadlines.clear();
    }
}
