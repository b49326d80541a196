//! Shortest turning-radius-feasible curves between oriented points
//!
//! Standard six-word Dubins construction (LSL, LSR, RSL, RSR, RLR, LRL) with
//! arc-length sampling. Poses are `[x, y, heading_rad]`; the minimum turning
//! radius normalizes all lengths internally.

use std::f64::consts::TAU;

/// Turn/straight segment kind within a Dubins word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment {
    Left,
    Straight,
    Right,
}

const WORDS: [[Segment; 3]; 6] = [
    [Segment::Left, Segment::Straight, Segment::Left],
    [Segment::Left, Segment::Straight, Segment::Right],
    [Segment::Right, Segment::Straight, Segment::Left],
    [Segment::Right, Segment::Straight, Segment::Right],
    [Segment::Right, Segment::Left, Segment::Right],
    [Segment::Left, Segment::Right, Segment::Left],
];

/// A solved shortest path between two oriented points
#[derive(Debug, Clone)]
pub struct DubinsPath {
    start: [f64; 3],
    radius: f64,
    /// Normalized segment lengths (radians for arcs)
    lengths: [f64; 3],
    word: [Segment; 3],
}

fn mod2pi(angle: f64) -> f64 {
    angle.rem_euclid(TAU)
}

/// Candidate segment lengths for one word, if that word exists for the
/// normalized problem `(alpha, beta, d)`
fn word_lengths(word: [Segment; 3], alpha: f64, beta: f64, d: f64) -> Option<[f64; 3]> {
    let (sa, ca) = alpha.sin_cos();
    let (sb, cb) = beta.sin_cos();
    let c_ab = (alpha - beta).cos();

    use Segment::*;
    match word {
        [Left, Straight, Left] => {
            let p_sq = 2.0 + d * d - 2.0 * c_ab + 2.0 * d * (sa - sb);
            if p_sq < 0.0 {
                return None;
            }
            let tmp = (cb - ca).atan2(d + sa - sb);
            Some([mod2pi(-alpha + tmp), p_sq.sqrt(), mod2pi(beta - tmp)])
        }
        [Right, Straight, Right] => {
            let p_sq = 2.0 + d * d - 2.0 * c_ab + 2.0 * d * (sb - sa);
            if p_sq < 0.0 {
                return None;
            }
            let tmp = (ca - cb).atan2(d - sa + sb);
            Some([mod2pi(alpha - tmp), p_sq.sqrt(), mod2pi(-beta + tmp)])
        }
        [Left, Straight, Right] => {
            let p_sq = -2.0 + d * d + 2.0 * c_ab + 2.0 * d * (sa + sb);
            if p_sq < 0.0 {
                return None;
            }
            let p = p_sq.sqrt();
            let tmp = (-ca - cb).atan2(d + sa + sb) - (-2.0f64).atan2(p);
            Some([mod2pi(-alpha + tmp), p, mod2pi(-mod2pi(beta) + tmp)])
        }
        [Right, Straight, Left] => {
            let p_sq = -2.0 + d * d + 2.0 * c_ab - 2.0 * d * (sa + sb);
            if p_sq < 0.0 {
                return None;
            }
            let p = p_sq.sqrt();
            let tmp = (ca + cb).atan2(d - sa - sb) - 2.0f64.atan2(p);
            Some([mod2pi(alpha - tmp), p, mod2pi(beta - tmp)])
        }
        [Right, Left, Right] => {
            let tmp = (6.0 - d * d + 2.0 * c_ab + 2.0 * d * (sa - sb)) / 8.0;
            if tmp.abs() > 1.0 {
                return None;
            }
            let phi = (ca - cb).atan2(d - sa + sb);
            let p = mod2pi(TAU - tmp.acos());
            let t = mod2pi(alpha - phi + mod2pi(p / 2.0));
            Some([t, p, mod2pi(alpha - beta - t + mod2pi(p))])
        }
        [Left, Right, Left] => {
            let tmp = (6.0 - d * d + 2.0 * c_ab + 2.0 * d * (sb - sa)) / 8.0;
            if tmp.abs() > 1.0 {
                return None;
            }
            let phi = (ca - cb).atan2(d + sa - sb);
            let p = mod2pi(TAU - tmp.acos());
            let t = mod2pi(-alpha - phi + p / 2.0);
            Some([t, p, mod2pi(mod2pi(beta) - alpha - t + mod2pi(p))])
        }
        _ => None,
    }
}

/// Shortest feasible path from `start` to `goal` with minimum turning radius
/// `radius`. Returns None only for a non-positive radius.
pub fn shortest_path(start: [f64; 3], goal: [f64; 3], radius: f64) -> Option<DubinsPath> {
    if radius <= 0.0 {
        return None;
    }
    let dx = goal[0] - start[0];
    let dy = goal[1] - start[1];
    let d = (dx * dx + dy * dy).sqrt() / radius;
    let theta = if d > 1e-12 { mod2pi(dy.atan2(dx)) } else { 0.0 };
    let alpha = mod2pi(start[2] - theta);
    let beta = mod2pi(goal[2] - theta);

    let mut best: Option<DubinsPath> = None;
    for word in WORDS {
        if let Some(lengths) = word_lengths(word, alpha, beta, d) {
            let total = lengths[0] + lengths[1] + lengths[2];
            if best
                .as_ref()
                .map(|b| total < b.normalized_length())
                .unwrap_or(true)
            {
                best = Some(DubinsPath {
                    start,
                    radius,
                    lengths,
                    word,
                });
            }
        }
    }
    best
}

/// Advance a normalized pose along one segment by normalized length `t`
fn propagate(q: [f64; 3], t: f64, segment: Segment) -> [f64; 3] {
    let theta = q[2];
    match segment {
        Segment::Left => [
            q[0] + (theta + t).sin() - theta.sin(),
            q[1] - (theta + t).cos() + theta.cos(),
            theta + t,
        ],
        Segment::Right => [
            q[0] - (theta - t).sin() + theta.sin(),
            q[1] + (theta - t).cos() - theta.cos(),
            theta - t,
        ],
        Segment::Straight => [q[0] + t * theta.cos(), q[1] + t * theta.sin(), theta],
    }
}

impl DubinsPath {
    fn normalized_length(&self) -> f64 {
        self.lengths[0] + self.lengths[1] + self.lengths[2]
    }

    /// Total arc length of the path
    pub fn length(&self) -> f64 {
        self.normalized_length() * self.radius
    }

    /// Pose at arc length `s` from the start, clamped to the endpoint
    pub fn sample(&self, s: f64) -> [f64; 3] {
        let mut t = (s / self.radius).clamp(0.0, self.normalized_length());
        let mut q = [0.0, 0.0, self.start[2]];
        for (length, segment) in self.lengths.iter().zip(self.word) {
            let step = t.min(*length);
            q = propagate(q, step, segment);
            t -= step;
            if t <= 0.0 {
                break;
            }
        }
        [
            q[0] * self.radius + self.start[0],
            q[1] * self.radius + self.start[1],
            q[2],
        ]
    }

    /// Sample the whole path every `step` meters of arc length, start and
    /// endpoint included
    pub fn sample_many(&self, step: f64) -> Vec<[f64; 3]> {
        let length = self.length();
        let step = step.max(1e-6);
        let mut samples = Vec::with_capacity((length / step) as usize + 2);
        let mut s = 0.0;
        while s < length {
            samples.push(self.sample(s));
            s += step;
        }
        samples.push(self.sample(length));
        samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn close(a: [f64; 3], b: [f64; 3]) -> bool {
        (a[0] - b[0]).abs() < 1e-6
            && (a[1] - b[1]).abs() < 1e-6
            && (mod2pi(a[2]) - mod2pi(b[2])).abs() < 1e-6
    }

    #[test]
    fn endpoint_matches_goal() {
        let cases = [
            ([0.0, 0.0, 0.0], [100.0, 0.0, 0.0]),
            ([0.0, 0.0, 0.0], [100.0, 50.0, PI / 2.0]),
            ([10.0, -5.0, 1.2], [-40.0, 80.0, -2.5]),
            ([0.0, 0.0, PI], [30.0, 1.0, 0.3]),
        ];
        for (start, goal) in cases {
            let path = shortest_path(start, goal, 20.0).expect("path exists");
            assert!(
                close(path.sample(path.length()), goal),
                "endpoint {:?} != goal {:?}",
                path.sample(path.length()),
                goal
            );
        }
    }

    #[test]
    fn straight_line_case_has_expected_length() {
        let path = shortest_path([0.0, 0.0, 0.0], [100.0, 0.0, 0.0], 10.0).unwrap();
        assert!((path.length() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn near_coincident_poses_still_yield_positive_length() {
        // The synthesizer's degenerate-waypoint perturbation relies on this:
        // same point, negligibly different heading, non-trivial curve
        let path = shortest_path([50.0, 50.0, 1.0], [50.0, 50.0, 1.0 - 1e-5], 20.0).unwrap();
        assert!(path.length() > 0.0);
        let end = path.sample(path.length());
        assert!((end[0] - 50.0).abs() < 1e-3 && (end[1] - 50.0).abs() < 1e-3);
    }

    #[test]
    fn sample_many_is_ordered_and_terminal() {
        let path = shortest_path([0.0, 0.0, 0.0], [80.0, 40.0, 1.0], 15.0).unwrap();
        let samples = path.sample_many(2.0);
        assert!(samples.len() > 10);
        let last = samples.last().unwrap();
        assert!(close(*last, path.sample(path.length())));
    }
}
