use std::collections::VecDeque;

use vo_core::{Pose, PoseDelta, TrajectoryPoint};

/// Accumulate a delta into an absolute pose.
///
/// Every delta is applied, zero included; the heading is renormalized
/// before the pose is stored.
pub fn integrate(pose: &Pose, delta: &PoseDelta) -> Pose {
    pose.compose(delta)
}

/// Bounded position history, oldest entries evicted first
#[derive(Debug, Clone)]
pub struct Trajectory {
    points: VecDeque<TrajectoryPoint>,
    capacity: usize,
}

impl Default for Trajectory {
    fn default() -> Self {
        Self::new(500)
    }
}

impl Trajectory {
    /// Starts with a single origin entry. A capacity of 0 is treated as 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut points = VecDeque::with_capacity(capacity + 1);
        points.push_back(TrajectoryPoint::default());
        Self { points, capacity }
    }

    pub fn push(&mut self, point: TrajectoryPoint) {
        self.points.push_back(point);
        while self.points.len() > self.capacity {
            self.points.pop_front();
        }
    }

    /// Back to a single origin entry
    pub fn reset(&mut self) {
        self.points.clear();
        self.points.push_back(TrajectoryPoint::default());
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// The history always holds at least one entry
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<&TrajectoryPoint> {
        self.points.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrajectoryPoint> {
        self.points.iter()
    }

    pub fn to_vec(&self) -> Vec<TrajectoryPoint> {
        self.points.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn point(x: f64, y: f64) -> TrajectoryPoint {
        TrajectoryPoint { x, y }
    }

    #[test]
    fn test_starts_at_origin() {
        let t = Trajectory::default();
        assert_eq!(t.len(), 1);
        assert_eq!(t.latest(), Some(&point(0.0, 0.0)));
        assert_eq!(t.capacity(), 500);
    }

    #[test]
    fn test_oldest_entry_is_evicted() {
        let mut t = Trajectory::new(3);
        for i in 1..=5 {
            t.push(point(i as f64, 0.0));
        }
        assert_eq!(t.len(), 3);
        assert_eq!(t.to_vec(), vec![point(3.0, 0.0), point(4.0, 0.0), point(5.0, 0.0)]);
    }

    #[test]
    fn test_long_stream_stays_bounded() {
        let mut t = Trajectory::default();
        for i in 0..2000 {
            t.push(point(i as f64, -(i as f64)));
            assert!(t.len() <= 500);
        }
        assert_eq!(t.len(), 500);
        assert_eq!(t.latest(), Some(&point(1999.0, -1999.0)));
    }

    #[test]
    fn test_reset() {
        let mut t = Trajectory::new(10);
        t.push(point(1.0, 2.0));
        t.reset();
        assert_eq!(t.to_vec(), vec![point(0.0, 0.0)]);
    }

    #[test]
    fn test_zero_capacity_keeps_latest() {
        let mut t = Trajectory::new(0);
        t.push(point(1.0, 1.0));
        assert_eq!(t.to_vec(), vec![point(1.0, 1.0)]);
    }

    #[test]
    fn test_integrate_applies_every_delta() {
        let pose = Pose::new(1.0, 2.0, 0.5);
        let same = integrate(&pose, &PoseDelta::ZERO);
        assert_eq!((same.x, same.y), (pose.x, pose.y));
        assert!((same.heading - pose.heading).abs() < 1e-12);

        let moved = integrate(&pose, &PoseDelta::new(-0.005, 0.25, 0.1));
        assert!((moved.x - 0.995).abs() < 1e-12);
        assert!((moved.y - 2.25).abs() < 1e-12);
        assert!((moved.heading - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_integrate_wraps_heading() {
        let pose = Pose::new(0.0, 0.0, PI - 0.05);
        let turned = integrate(&pose, &PoseDelta::new(0.0, 0.0, 0.1));
        assert!((turned.heading - (-PI + 0.05)).abs() < 1e-12);
        assert!(turned.heading > -PI && turned.heading <= PI);
    }
}
