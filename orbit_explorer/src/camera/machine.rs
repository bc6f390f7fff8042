//! Camera state machine: eased transitions between presets, steady-state
//! tracking of moving targets, and mode-dependent zoom limits.

use bevy::prelude::*;

use crate::data::ObjectId;
use crate::error::NotReady;
use crate::interaction::{SelectionState, VisitTarget};
use crate::pipeline::PositionLookup;

/// Elevation limit for user orbit, keeps the offset off the pole axis.
const MAX_ORBIT_PITCH: f32 = 1.5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub look_at: Vec3,
}

impl CameraPose {
    pub fn lerp(&self, to: &CameraPose, t: f32) -> CameraPose {
        CameraPose {
            position: self.position.lerp(to.position, t),
            look_at: self.look_at.lerp(to.look_at, t),
        }
    }
}

/// Allowed camera distance from the origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomLimits {
    pub min: f32,
    pub max: f32,
}

impl ZoomLimits {
    pub fn clamp(&self, position: Vec3) -> Vec3 {
        let distance = position.length();
        if distance < f32::EPSILON {
            return Vec3::Z * self.min;
        }
        position * (distance.clamp(self.min, self.max) / distance)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CameraMode {
    Overview,
    ObservingPrimaryBody,
    ObservingObject(ObjectId),
    ComparingPair(ObjectId, ObjectId),
    Transitioning,
}

/// The configuration a selection asks the camera to show.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CameraIntent {
    Overview,
    PrimaryBody,
    Object(ObjectId),
    Pair(ObjectId, ObjectId),
}

impl CameraIntent {
    /// Compare beats visit-primary-body beats visit-object beats overview.
    pub fn resolve(selection: &SelectionState) -> Self {
        if let Some((a, b)) = selection.compared_pair() {
            return CameraIntent::Pair(a, b);
        }
        match selection.visited {
            Some(VisitTarget::PrimaryBody) => CameraIntent::PrimaryBody,
            Some(VisitTarget::Object(id)) => CameraIntent::Object(id),
            None => CameraIntent::Overview,
        }
    }

    fn steady_mode(self) -> CameraMode {
        match self {
            CameraIntent::Overview => CameraMode::Overview,
            CameraIntent::PrimaryBody => CameraMode::ObservingPrimaryBody,
            CameraIntent::Object(id) => CameraMode::ObservingObject(id),
            CameraIntent::Pair(a, b) => CameraMode::ComparingPair(a, b),
        }
    }
}

/// Tunables. Distances are multiples of the planet radius unless noted.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraSettings {
    /// Planet radius in scene units.
    pub radius: f32,
    /// Progress per second while transitioning.
    pub transition_rate: f32,
    /// Per-tick low-pass factor for look-at tracking.
    pub look_smoothing: f32,
    /// Drift (in radii) tolerated before the position is nudged back.
    pub drift_tolerance: f32,
    /// Per-tick nudge factor once drift exceeds the tolerance.
    pub drift_correction: f32,
    /// Per-tick lerp factor of the follow overlay.
    pub follow_smoothing: f32,
    pub object_offset: f32,
    pub follow_offset: f32,
    pub primary_body_distance: f32,
    pub pair_min_distance: f32,
    /// Pair framing distance per unit of separation.
    pub pair_spread: f32,
    /// Ticks a target may stay unresolvable before the request is dropped.
    pub pending_ticks: u32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            radius: 10.0,
            transition_rate: 1.5,
            look_smoothing: 0.1,
            drift_tolerance: 0.02,
            drift_correction: 0.05,
            follow_smoothing: 0.05,
            object_offset: 0.08,
            follow_offset: 0.3,
            primary_body_distance: 2.5,
            pair_min_distance: 0.1,
            pair_spread: 1.5,
            pending_ticks: 120,
        }
    }
}

impl CameraSettings {
    pub fn with_radius(radius: f32) -> Self {
        Self {
            radius,
            ..Self::default()
        }
    }

    pub fn overview_pose(&self) -> CameraPose {
        CameraPose {
            position: Vec3::new(0.0, self.radius * 1.2, self.radius * 3.5),
            look_at: Vec3::ZERO,
        }
    }

    pub fn limits(&self, intent: CameraIntent) -> ZoomLimits {
        let r = self.radius;
        match intent {
            CameraIntent::Overview => ZoomLimits {
                min: r * 1.2,
                max: r * 12.0,
            },
            CameraIntent::PrimaryBody => ZoomLimits {
                min: r * 1.1,
                max: r * 6.0,
            },
            CameraIntent::Object(_) | CameraIntent::Pair(..) => ZoomLimits {
                min: r * 1.001,
                max: r * 12.0,
            },
        }
    }

    fn pair_distance(&self, separation: f32) -> f32 {
        (separation * self.pair_spread).max(self.radius * self.pair_min_distance)
    }

    /// Target pose for `intent`, seen from `current`.
    pub fn preset(
        &self,
        intent: CameraIntent,
        current: &CameraPose,
        positions: &impl PositionLookup,
    ) -> Result<CameraPose, NotReady> {
        match intent {
            CameraIntent::Overview => Ok(self.overview_pose()),
            CameraIntent::PrimaryBody => {
                let dir = current.position.try_normalize().unwrap_or(Vec3::Z);
                Ok(CameraPose {
                    position: dir * self.radius * self.primary_body_distance,
                    look_at: Vec3::ZERO,
                })
            }
            CameraIntent::Object(id) => {
                let p = positions.position(id).ok_or(NotReady(id))?;
                Ok(CameraPose {
                    position: p + outward(p) * self.radius * self.object_offset,
                    look_at: p,
                })
            }
            CameraIntent::Pair(a, b) => {
                let pa = positions.position(a).ok_or(NotReady(a))?;
                let pb = positions.position(b).ok_or(NotReady(b))?;
                let mid = (pa + pb) * 0.5;
                Ok(CameraPose {
                    position: mid + outward(mid) * self.pair_distance(pa.distance(pb)),
                    look_at: mid,
                })
            }
        }
    }
}

/// Radial unit vector of a scene point.
fn outward(p: Vec3) -> Vec3 {
    p.try_normalize().unwrap_or(Vec3::Y)
}

/// `1 - 2^(-10t)`, exactly 1 at `t >= 1`.
pub fn ease_out_expo(t: f32) -> f32 {
    if t >= 1.0 {
        1.0
    } else {
        1.0 - 2f32.powf(-10.0 * t.max(0.0))
    }
}

#[derive(Clone, Debug, PartialEq)]
struct Transition {
    from: CameraPose,
    to: CameraPose,
    progress: f32,
}

#[derive(Clone, Debug, PartialEq)]
enum Phase {
    Steady(CameraIntent),
    Transitioning(Transition),
    /// Target not resolvable yet; retried every tick until
    /// `CameraSettings::pending_ticks` runs out.
    Pending { intent: CameraIntent, ticks: u32 },
}

#[derive(Resource, Clone, Debug)]
pub struct CameraStateMachine {
    settings: CameraSettings,
    pose: CameraPose,
    limits: ZoomLimits,
    phase: Phase,
    /// Last configuration requested by the selection.
    intended: CameraIntent,
    /// Last steady configuration reached; fallback for unresolvable targets.
    settled: CameraIntent,
    followed: Option<ObjectId>,
    /// Tracked point (object or pair midpoint) seen on the previous tick.
    anchor: Option<Vec3>,
}

impl CameraStateMachine {
    pub fn new(settings: CameraSettings) -> Self {
        let pose = settings.overview_pose();
        let limits = settings.limits(CameraIntent::Overview);
        Self {
            settings,
            pose,
            limits,
            phase: Phase::Steady(CameraIntent::Overview),
            intended: CameraIntent::Overview,
            settled: CameraIntent::Overview,
            followed: None,
            anchor: None,
        }
    }

    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    pub fn limits(&self) -> ZoomLimits {
        self.limits
    }

    pub fn intended(&self) -> CameraIntent {
        self.intended
    }

    pub fn mode(&self) -> CameraMode {
        match &self.phase {
            Phase::Steady(intent) => intent.steady_mode(),
            Phase::Transitioning(_) | Phase::Pending { .. } => CameraMode::Transitioning,
        }
    }

    pub fn is_transitioning(&self) -> bool {
        self.mode() == CameraMode::Transitioning
    }

    /// Interpolation progress in `[0, 1]`, or `None` outside a transition.
    pub fn progress(&self) -> Option<f32> {
        match &self.phase {
            Phase::Transitioning(t) => Some(t.progress),
            Phase::Pending { .. } => Some(0.0),
            Phase::Steady(_) => None,
        }
    }

    /// Target of the running transition.
    pub fn transition_target(&self) -> Option<CameraPose> {
        match &self.phase {
            Phase::Transitioning(t) => Some(t.to),
            _ => None,
        }
    }

    /// React to the current selection. Starts a transition when the
    /// intended configuration changed, or when following ended in overview.
    pub fn apply(&mut self, selection: &SelectionState, positions: &impl PositionLookup) {
        let intent = CameraIntent::resolve(selection);
        let unfollowed = self.followed.is_some() && selection.followed.is_none();
        self.followed = selection.followed;

        if intent != self.intended || (unfollowed && intent == CameraIntent::Overview) {
            self.intended = intent;
            self.begin(intent, positions);
        }
    }

    /// Advance one frame of `dt` seconds.
    pub fn tick(&mut self, dt: f32, selection: &SelectionState, positions: &impl PositionLookup) {
        match self.phase.clone() {
            Phase::Pending { intent, ticks } => {
                if ticks >= self.settings.pending_ticks {
                    self.abandon(intent, positions);
                } else if !self.begin(intent, positions) {
                    self.phase = Phase::Pending {
                        intent,
                        ticks: ticks + 1,
                    };
                }
            }
            Phase::Transitioning(mut transition) => {
                let step = dt.max(0.0) * self.settings.transition_rate;
                transition.progress = (transition.progress + step).min(1.0);
                if transition.progress >= 1.0 {
                    self.pose = transition.to;
                    self.settle(CameraIntent::resolve(selection), positions);
                } else {
                    let eased = ease_out_expo(transition.progress);
                    self.pose = transition.from.lerp(&transition.to, eased);
                    self.phase = Phase::Transitioning(transition);
                }
            }
            Phase::Steady(intent) => self.track(intent, positions),
        }
    }

    /// Rotate the camera around its look-at point. Ignored while
    /// transitioning; returns whether the input was applied.
    pub fn orbit(&mut self, yaw: f32, pitch: f32) -> bool {
        if self.is_transitioning() {
            return false;
        }
        let offset = self.pose.position - self.pose.look_at;
        let distance = offset.length();
        if distance < f32::EPSILON {
            return false;
        }
        let current_pitch = (offset.y / distance).clamp(-1.0, 1.0).asin();
        let new_pitch = (current_pitch + pitch).clamp(-MAX_ORBIT_PITCH, MAX_ORBIT_PITCH);
        let heading = offset.x.atan2(offset.z) + yaw;
        let rotated = Vec3::new(
            new_pitch.cos() * heading.sin(),
            new_pitch.sin(),
            new_pitch.cos() * heading.cos(),
        ) * distance;
        self.pose.position = self.limits.clamp(self.pose.look_at + rotated);
        true
    }

    /// Scale the distance to the look-at point by `factor`, then clamp to
    /// the active limits. Ignored while transitioning.
    pub fn zoom(&mut self, factor: f32) -> bool {
        if self.is_transitioning() || !factor.is_finite() || factor <= 0.0 {
            return false;
        }
        let offset = self.pose.position - self.pose.look_at;
        self.pose.position = self.limits.clamp(self.pose.look_at + offset * factor);
        true
    }

    /// Jump straight to the overview, e.g. after a catalog reload.
    pub fn reset(&mut self) {
        *self = Self::new(self.settings.clone());
    }

    /// Start a transition toward `intent`. Returns `false` and parks the
    /// request as pending when its target has no position yet.
    fn begin(&mut self, intent: CameraIntent, positions: &impl PositionLookup) -> bool {
        match self.settings.preset(intent, &self.pose, positions) {
            Ok(to) => {
                self.limits = self.settings.limits(intent);
                self.anchor = None;
                self.phase = Phase::Transitioning(Transition {
                    from: self.pose,
                    to,
                    progress: 0.0,
                });
                true
            }
            Err(NotReady(_)) => {
                self.phase = Phase::Pending { intent, ticks: 0 };
                false
            }
        }
    }

    /// Drop a request whose target never resolved and hand control back in
    /// the last steady configuration. The selection has to change before
    /// the same target is tried again.
    fn abandon(&mut self, intent: CameraIntent, positions: &impl PositionLookup) {
        warn!("camera: no position for {intent:?}; staying in {:?}", self.settled);
        self.settle(self.settled, positions);
    }

    fn settle(&mut self, intent: CameraIntent, positions: &impl PositionLookup) {
        self.settled = intent;
        self.phase = Phase::Steady(intent);
        self.limits = self.settings.limits(intent);
        self.anchor = self.anchor_of(intent, positions);
    }

    fn anchor_of(&self, intent: CameraIntent, positions: &impl PositionLookup) -> Option<Vec3> {
        match intent {
            CameraIntent::Object(id) => positions.position(id),
            CameraIntent::Pair(a, b) => Some((positions.position(a)? + positions.position(b)?) * 0.5),
            _ => None,
        }
    }

    fn track(&mut self, intent: CameraIntent, positions: &impl PositionLookup) {
        match intent {
            CameraIntent::Object(_) | CameraIntent::Pair(..) => {
                let Ok(ideal) = self.settings.preset(intent, &self.pose, positions) else {
                    return;
                };
                let target = ideal.look_at;
                if let Some(previous) = self.anchor.replace(target) {
                    self.pose.position += target - previous;
                }
                self.pose.look_at = self.pose.look_at.lerp(target, self.settings.look_smoothing);

                let tolerance = self.settings.drift_tolerance * self.settings.radius;
                if self.pose.position.distance(ideal.position) > tolerance {
                    self.pose.position = self
                        .pose
                        .position
                        .lerp(ideal.position, self.settings.drift_correction);
                }
                self.pose.position = self.limits.clamp(self.pose.position);
            }
            CameraIntent::Overview => self.follow_overlay(positions),
            CameraIntent::PrimaryBody => {}
        }
    }

    fn follow_overlay(&mut self, positions: &impl PositionLookup) {
        let Some(target) = self.followed.and_then(|id| positions.position(id)) else {
            return;
        };
        let goal = target + outward(target) * self.settings.radius * self.settings.follow_offset;
        let t = self.settings.follow_smoothing;
        self.pose.position = self.limits.clamp(self.pose.position.lerp(goal, t));
        self.pose.look_at = self.pose.look_at.lerp(target, t);
    }
}

impl Default for CameraStateMachine {
    fn default() -> Self {
        Self::new(CameraSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn positions(entries: &[(u64, Vec3)]) -> HashMap<ObjectId, Vec3> {
        entries.iter().map(|&(i, p)| (ObjectId(i), p)).collect()
    }

    fn visiting(id: u64) -> SelectionState {
        SelectionState {
            selected: Some(ObjectId(id)),
            visited: Some(VisitTarget::Object(ObjectId(id))),
            ..default()
        }
    }

    fn run_until_steady(
        machine: &mut CameraStateMachine,
        dt: f32,
        selection: &SelectionState,
        positions: &HashMap<ObjectId, Vec3>,
    ) -> usize {
        let mut ticks = 0;
        while machine.is_transitioning() {
            machine.tick(dt, selection, positions);
            ticks += 1;
            assert!(ticks < 1_000_000, "transition never finished");
        }
        ticks
    }

    #[test]
    fn ease_out_expo_is_monotonic_and_exact_at_ends() {
        assert_eq!(ease_out_expo(0.0), 0.0);
        assert_eq!(ease_out_expo(1.0), 1.0);
        assert_eq!(ease_out_expo(1.5), 1.0);
        let mut last = 0.0;
        for i in 1..100 {
            let v = ease_out_expo(i as f32 / 100.0);
            assert!(v > last && v < 1.0);
            last = v;
        }
    }

    #[test]
    fn transition_lands_exactly_on_target_for_any_step() {
        let pos = positions(&[(1, Vec3::new(0.0, 0.0, 11.0))]);
        for dt in [1e-4, 1.0 / 240.0, 1.0 / 60.0, 0.37, 5.0] {
            let mut machine = CameraStateMachine::default();
            let selection = visiting(1);
            machine.apply(&selection, &pos);
            let target = machine.transition_target().unwrap();
            let ticks = run_until_steady(&mut machine, dt, &selection, &pos);

            assert!(ticks as f32 <= 1.01 / (dt * 1.5) + 2.0, "{ticks} ticks at dt {dt}");
            assert_eq!(machine.mode(), CameraMode::ObservingObject(ObjectId(1)));
            assert_eq!(machine.pose(), target);
        }
    }

    #[test]
    fn object_preset_sits_just_outside_along_the_normal() {
        let settings = CameraSettings::default();
        let pos = positions(&[(1, Vec3::new(0.0, 11.0, 0.0))]);
        let pose = settings
            .preset(CameraIntent::Object(ObjectId(1)), &settings.overview_pose(), &pos)
            .unwrap();
        assert_eq!(pose.look_at, Vec3::new(0.0, 11.0, 0.0));
        assert!((pose.position - Vec3::new(0.0, 11.8, 0.0)).length() < 1e-5);
    }

    #[test]
    fn pair_preset_frames_midpoint_with_a_floor() {
        let settings = CameraSettings::default();
        let pos = positions(&[(1, Vec3::new(11.0, 0.0, 0.0)), (2, Vec3::new(11.0, 0.0, 0.2))]);
        let pose = settings
            .preset(
                CameraIntent::Pair(ObjectId(1), ObjectId(2)),
                &settings.overview_pose(),
                &pos,
            )
            .unwrap();
        assert_eq!(pose.look_at, Vec3::new(11.0, 0.0, 0.1));
        // 0.2 * 1.5 = 0.3 is below the 1.0 floor.
        assert!((pose.position.distance(pose.look_at) - 1.0).abs() < 1e-4);

        let far = positions(&[(1, Vec3::new(11.0, 0.0, -2.0)), (2, Vec3::new(11.0, 0.0, 2.0))]);
        let pose = settings
            .preset(CameraIntent::Pair(ObjectId(1), ObjectId(2)), &pose, &far)
            .unwrap();
        assert!((pose.position.distance(pose.look_at) - 6.0).abs() < 1e-4);
    }

    #[test]
    fn missing_target_holds_transition_pending() {
        let mut machine = CameraStateMachine::default();
        let selection = visiting(7);
        let start = machine.pose();

        machine.apply(&selection, &positions(&[]));
        assert_eq!(machine.mode(), CameraMode::Transitioning);
        assert_eq!(machine.progress(), Some(0.0));
        machine.tick(0.1, &selection, &positions(&[]));
        assert_eq!(machine.pose(), start);
        assert!(machine.transition_target().is_none());

        let pos = positions(&[(7, Vec3::new(12.0, 0.0, 0.0))]);
        machine.tick(0.1, &selection, &pos);
        assert!(machine.transition_target().is_some());
        run_until_steady(&mut machine, 0.1, &selection, &pos);
        assert_eq!(machine.mode(), CameraMode::ObservingObject(ObjectId(7)));
    }

    #[test]
    fn unresolvable_target_hands_control_back() {
        let mut machine = CameraStateMachine::default();
        let selection = visiting(7);
        let empty = positions(&[]);
        let start = machine.pose();

        machine.apply(&selection, &empty);
        for _ in 0..machine.settings().pending_ticks {
            machine.tick(1.0 / 60.0, &selection, &empty);
            assert!(machine.is_transitioning());
            assert!(!machine.orbit(0.1, 0.0));
        }

        machine.tick(1.0 / 60.0, &selection, &empty);
        assert_eq!(machine.mode(), CameraMode::Overview);
        assert_eq!(machine.limits(), machine.settings().limits(CameraIntent::Overview));
        assert_eq!(machine.pose(), start);
        assert!(machine.orbit(0.1, 0.0));
        assert!(machine.zoom(0.9));

        // Same selection does not restart the request.
        machine.apply(&selection, &empty);
        machine.tick(1.0 / 60.0, &selection, &empty);
        assert_eq!(machine.mode(), CameraMode::Overview);

        // Clearing the visit is a new request.
        machine.apply(&SelectionState::default(), &empty);
        assert!(machine.is_transitioning());
    }

    #[test]
    fn limits_switch_in_the_same_call_as_the_mode() {
        let mut machine = CameraStateMachine::default();
        let selection = SelectionState {
            visited: Some(VisitTarget::PrimaryBody),
            ..default()
        };
        machine.apply(&selection, &positions(&[]));
        assert!(machine.is_transitioning());
        assert_eq!(machine.limits(), machine.settings().limits(CameraIntent::PrimaryBody));
    }

    #[test]
    fn compare_takes_precedence_over_visit() {
        let selection = SelectionState {
            selected: Some(ObjectId(1)),
            visited: Some(VisitTarget::PrimaryBody),
            comparison_mode: true,
            comparison_peer: Some(ObjectId(2)),
            ..default()
        };
        assert_eq!(
            CameraIntent::resolve(&selection),
            CameraIntent::Pair(ObjectId(1), ObjectId(2))
        );

        let unresolved = SelectionState {
            comparison_peer: None,
            ..selection
        };
        assert_eq!(CameraIntent::resolve(&unresolved), CameraIntent::PrimaryBody);
    }

    #[test]
    fn user_input_is_ignored_while_transitioning_and_clamped_after() {
        let mut machine = CameraStateMachine::default();
        let selection = SelectionState {
            visited: Some(VisitTarget::PrimaryBody),
            ..default()
        };
        let pos = positions(&[]);
        machine.apply(&selection, &pos);
        assert!(!machine.zoom(0.5));
        assert!(!machine.orbit(0.3, 0.0));

        run_until_steady(&mut machine, 0.1, &selection, &pos);
        assert!(machine.zoom(0.01));
        let limits = machine.limits();
        assert!((machine.pose().position.length() - limits.min).abs() < 1e-4);
        assert!(machine.zoom(1000.0));
        assert!((machine.pose().position.length() - limits.max).abs() < 1e-3);
    }

    #[test]
    fn orbit_keeps_distance_to_look_at() {
        let mut machine = CameraStateMachine::default();
        let before = machine.pose();
        let radius = before.position.distance(before.look_at);
        assert!(machine.orbit(0.5, 0.2));
        let after = machine.pose();
        assert!((after.position.distance(after.look_at) - radius).abs() < 1e-3);
        assert_ne!(after.position, before.position);
    }

    #[test]
    fn observing_object_carries_camera_with_target() {
        let mut machine = CameraStateMachine::default();
        let selection = visiting(1);
        let start = positions(&[(1, Vec3::new(11.0, 0.0, 0.0))]);
        machine.apply(&selection, &start);
        run_until_steady(&mut machine, 1.0, &selection, &start);
        let settled = machine.pose();

        let moved = positions(&[(1, Vec3::new(11.0, 0.01, 0.0))]);
        machine.tick(0.016, &selection, &moved);
        let pose = machine.pose();
        assert!((pose.position - (settled.position + Vec3::new(0.0, 0.01, 0.0))).length() < 1e-4);
        // Look-at is low-passed, not snapped.
        assert!(pose.look_at.y > 0.0 && pose.look_at.y < 0.01);
    }

    #[test]
    fn drift_beyond_tolerance_is_nudged_back() {
        let mut machine = CameraStateMachine::default();
        let selection = visiting(1);
        let pos = positions(&[(1, Vec3::new(11.0, 0.0, 0.0))]);
        machine.apply(&selection, &pos);
        run_until_steady(&mut machine, 1.0, &selection, &pos);
        let ideal = machine.pose().position;

        // Small drift stays where the user left it.
        machine.orbit(0.1, 0.0);
        let small = machine.pose().position;
        machine.tick(0.016, &selection, &pos);
        assert_eq!(machine.pose().position, small);

        machine.orbit(1.2, 0.0);
        let far = machine.pose().position;
        machine.tick(0.016, &selection, &pos);
        assert!(machine.pose().position.distance(ideal) < far.distance(ideal));
    }

    #[test]
    fn follow_overlay_runs_only_in_overview() {
        let pos = positions(&[(3, Vec3::new(0.0, 0.0, 12.0))]);
        let mut machine = CameraStateMachine::default();
        let following = SelectionState {
            followed: Some(ObjectId(3)),
            ..default()
        };
        let before = machine.pose();
        machine.apply(&following, &pos);
        assert_eq!(machine.mode(), CameraMode::Overview);
        machine.tick(0.016, &following, &pos);
        let target = Vec3::new(0.0, 0.0, 12.0);
        assert!(machine.pose().look_at.distance(target) < before.look_at.distance(target));

        let visiting_body = SelectionState {
            visited: Some(VisitTarget::PrimaryBody),
            ..following.clone()
        };
        machine.apply(&visiting_body, &pos);
        run_until_steady(&mut machine, 1.0, &visiting_body, &pos);
        let settled = machine.pose();
        machine.tick(0.016, &visiting_body, &pos);
        assert_eq!(machine.pose(), settled);
    }

    #[test]
    fn unfollowing_in_overview_returns_to_the_wide_shot() {
        let pos = positions(&[(3, Vec3::new(0.0, 0.0, 12.0))]);
        let mut machine = CameraStateMachine::default();
        let following = SelectionState {
            followed: Some(ObjectId(3)),
            ..default()
        };
        machine.apply(&following, &pos);
        for _ in 0..30 {
            machine.tick(0.016, &following, &pos);
        }

        let idle = SelectionState::default();
        machine.apply(&idle, &pos);
        assert!(machine.is_transitioning());
        run_until_steady(&mut machine, 0.1, &idle, &pos);
        assert_eq!(machine.pose(), machine.settings().overview_pose());
    }
}
