/// Accumulating/decaying health score of a tracked entity.
///
/// The value never leaves `[0, max]` for the `max` passed to the latest
/// [`Liveness::add`] or [`Liveness::subtract`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Liveness(f32);

impl Liveness {
    #[inline]
    pub fn new(initial: f32, max: f32) -> Self {
        Self(initial.min(max).max(0.0))
    }

    #[inline(always)]
    pub fn value(&self) -> f32 {
        self.0
    }

    #[inline]
    pub fn add(&mut self, amount: f32, max: f32) -> f32 {
        self.0 = (self.0 + amount).min(max);
        self.0
    }

    #[inline]
    pub fn subtract(&mut self, amount: f32, max: f32) -> f32 {
        // max may have been lowered since the last add
        self.0 = (self.0 - amount).max(0.0).min(max);
        self.0
    }

    #[inline(always)]
    pub fn is_dead(&self) -> bool {
        self.0 <= 0.0
    }
}
