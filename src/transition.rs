//! Timed transitions for render attributes.
//!
//! A transition interpolates a value from `from` to `to` over a fixed
//! duration with cubic in-out easing. Starting a new transition on the same
//! key replaces the old one; callers pass the currently rendered value as
//! `from` so the motion continues without a jump.

use std::collections::BTreeMap;

/// Values that can be linearly interpolated.
pub trait Interpolate: Copy {
    /// Value at fraction `t` between `from` (t = 0) and `to` (t = 1).
    fn lerp(from: Self, to: Self, t: f64) -> Self;
}

impl Interpolate for f64 {
    #[inline]
    fn lerp(from: Self, to: Self, t: f64) -> Self {
        from + (to - from) * t
    }
}

impl Interpolate for f32 {
    #[inline]
    fn lerp(from: Self, to: Self, t: f64) -> Self {
        from + (to - from) * t as f32
    }
}

impl<const N: usize> Interpolate for [f32; N] {
    #[inline]
    fn lerp(from: Self, to: Self, t: f64) -> Self {
        let mut out = from;
        for (value, target) in out.iter_mut().zip(to) {
            *value = f32::lerp(*value, target, t);
        }
        out
    }
}

/// Cubic in-out easing: slow start, fast middle, slow end.
pub fn ease_cubic_in_out(t: f64) -> f64 {
    let t = t * 2.0;
    if t <= 1.0 {
        t * t * t / 2.0
    } else {
        let t = t - 2.0;
        (t * t * t + 2.0) / 2.0
    }
}

/// A single running transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition<T> {
    from: T,
    to: T,
    start: f64,
    duration: f64,
}

impl<T: Interpolate> Transition<T> {
    /// Start a transition at time `start` (milliseconds).
    pub fn new(from: T, to: T, start: f64, duration: f64) -> Self {
        Self {
            from,
            to,
            start,
            duration: duration.max(0.0),
        }
    }

    /// The value the transition ends on.
    pub fn target(&self) -> T {
        self.to
    }

    /// Linear progress in `[0, 1]`.
    pub fn progress(&self, now: f64) -> f64 {
        if self.duration == 0.0 {
            return 1.0;
        }
        ((now - self.start) / self.duration).clamp(0.0, 1.0)
    }

    pub fn is_finished(&self, now: f64) -> bool {
        self.progress(now) >= 1.0
    }

    /// Eased value at `now`. A finished transition yields exactly `to`.
    pub fn value_at(&self, now: f64) -> T {
        let t = self.progress(now);
        if t >= 1.0 {
            self.to
        } else {
            T::lerp(self.from, self.to, ease_cubic_in_out(t))
        }
    }
}

/// Running transitions keyed by render object.
#[derive(Debug, Clone)]
pub struct Transitions<K, T> {
    running: BTreeMap<K, Transition<T>>,
}

impl<K: Ord + Copy, T: Interpolate> Transitions<K, T> {
    pub fn new() -> Self {
        Self {
            running: BTreeMap::new(),
        }
    }

    /// Start (or replace) the transition for `key`.
    pub fn start(&mut self, key: K, transition: Transition<T>) {
        self.running.insert(key, transition);
    }

    /// Drop every transition, leaving values where they are.
    pub fn clear(&mut self) {
        self.running.clear();
    }

    pub fn contains(&self, key: K) -> bool {
        self.running.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.running.len()
    }

    pub fn is_empty(&self) -> bool {
        self.running.is_empty()
    }

    /// Report every running value at `now`, then drop the finished ones.
    ///
    /// Returns the number of transitions that finished during this call.
    pub fn advance(&mut self, now: f64, mut apply: impl FnMut(K, T)) -> usize {
        let before = self.running.len();
        self.running.retain(|&key, transition| {
            apply(key, transition.value_at(now));
            !transition.is_finished(now)
        });
        before - self.running.len()
    }
}

impl<K: Ord + Copy, T: Interpolate> Default for Transitions<K, T> {
    fn default() -> Self {
        Self::new()
    }
}
