//! The selectable demos and their per-frame processing.

use std::{fmt, str::FromStr, time::Instant};

use anyhow::anyhow;

use crate::{
    body::tracking::PoseTracker,
    face::detection::{draw_face, FaceDetector},
    gesture::{self, GestureController},
    hand::{landmark::LandmarkIdx, tracking::HandTracker},
    image::Image,
    media::KeyBackend,
    models::ModelDir,
    painter::Canvas,
    settings::{Settings, SharedSettings},
    timer::Timer,
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Project {
    #[default]
    HandTracking,
    GestureMediaControl,
    FaceDetection,
    PoseEstimation,
    VirtualPainter,
}

impl Project {
    /// All projects, in the order they are offered in the UI.
    pub const ALL: [Project; 5] = [
        Project::HandTracking,
        Project::GestureMediaControl,
        Project::FaceDetection,
        Project::PoseEstimation,
        Project::VirtualPainter,
    ];

    /// Identifier used on the command line and in the HTTP API.
    pub fn slug(&self) -> &'static str {
        match self {
            Project::HandTracking => "hand-tracking",
            Project::GestureMediaControl => "gesture-media-control",
            Project::FaceDetection => "face-detection",
            Project::PoseEstimation => "pose-estimation",
            Project::VirtualPainter => "virtual-painter",
        }
    }

    /// Human-readable name.
    pub fn label(&self) -> &'static str {
        match self {
            Project::HandTracking => "Hand Tracking",
            Project::GestureMediaControl => "Gesture Media Control",
            Project::FaceDetection => "Face Detection",
            Project::PoseEstimation => "Pose Estimation",
            Project::VirtualPainter => "Virtual Painter",
        }
    }
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Project {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Project::ALL
            .into_iter()
            .find(|p| p.slug() == s)
            .ok_or_else(|| {
                let slugs = Project::ALL.map(|p| p.slug());
                anyhow!("unknown project '{s}' (expected one of {})", slugs.join(", "))
            })
    }
}

/// Follows project changes in the [`SharedSettings`] from the capture loop.
pub struct ProjectSync {
    generation: u64,
}

impl ProjectSync {
    pub fn new(settings: &SharedSettings) -> Self {
        Self {
            generation: settings.generation(),
        }
    }

    /// Returns the settings to process the next frame with.
    ///
    /// If the settings changed since the last call and select a project other than `running`,
    /// `switch` is called with it. If switching fails, the setting is reverted to `running`,
    /// unless it was changed again in the meantime.
    pub fn sync<F>(&mut self, settings: &SharedSettings, running: Project, switch: F) -> Settings
    where
        F: FnOnce(Project) -> anyhow::Result<()>,
    {
        let (generation, mut current) = settings.snapshot();
        if generation == self.generation {
            return current;
        }
        self.generation = generation;

        let wanted = current.project();
        if wanted == running {
            return current;
        }
        if let Err(e) = switch(wanted) {
            log::error!("failed to switch to {wanted}: {e:#}");
            current.set_project(running);
            if let Some(reverted) = settings.update_if(generation, |s| s.set_project(running)) {
                self.generation = reverted;
            }
        }
        current
    }
}

/// The detectors and state of the active project.
///
/// Rebuilding the pipeline resets all state: tracked hands and bodies, the gesture cooldown and
/// the painter canvas.
pub enum Pipeline {
    HandTracking(HandTracker),
    GestureMediaControl {
        tracker: HandTracker,
        controller: GestureController,
    },
    FaceDetection(FaceDetector),
    PoseEstimation(PoseTracker),
    VirtualPainter {
        tracker: HandTracker,
        canvas: Canvas,
    },
}

impl Pipeline {
    /// Loads the networks `project` needs.
    pub fn new(project: Project, models: &ModelDir, keys: KeyBackend) -> anyhow::Result<Self> {
        log::info!("starting {}", project.label());
        Ok(match project {
            Project::HandTracking => Pipeline::HandTracking(HandTracker::load(models)?),
            Project::GestureMediaControl => {
                let mut tracker = HandTracker::load(models)?;
                tracker.set_max_hands(1);
                Pipeline::GestureMediaControl {
                    tracker,
                    controller: GestureController::new(keys.create()),
                }
            }
            Project::FaceDetection => Pipeline::FaceDetection(FaceDetector::load(models)?),
            Project::PoseEstimation => Pipeline::PoseEstimation(PoseTracker::load(models)?),
            Project::VirtualPainter => Pipeline::VirtualPainter {
                tracker: HandTracker::load(models)?,
                canvas: Canvas::new(),
            },
        })
    }

    pub fn project(&self) -> Project {
        match self {
            Pipeline::HandTracking(_) => Project::HandTracking,
            Pipeline::GestureMediaControl { .. } => Project::GestureMediaControl,
            Pipeline::FaceDetection(_) => Project::FaceDetection,
            Pipeline::PoseEstimation(_) => Project::PoseEstimation,
            Pipeline::VirtualPainter { .. } => Project::VirtualPainter,
        }
    }

    /// Erases the painter canvas. Does nothing for other projects.
    pub fn clear_canvas(&mut self) {
        if let Pipeline::VirtualPainter { canvas, .. } = self {
            log::debug!("clearing canvas");
            canvas.clear();
        }
    }

    pub fn timers(&self) -> Vec<&Timer> {
        match self {
            Pipeline::HandTracking(tracker)
            | Pipeline::GestureMediaControl { tracker, .. }
            | Pipeline::VirtualPainter { tracker, .. } => tracker.timers().to_vec(),
            Pipeline::FaceDetection(detector) => detector.timers().to_vec(),
            Pipeline::PoseEstimation(tracker) => tracker.timers().collect(),
        }
    }

    /// Runs the project's detectors on `frame` and draws the results onto it.
    ///
    /// `frame` is expected to be mirrored already.
    pub fn process(&mut self, frame: &mut Image, settings: &Settings) -> anyhow::Result<()> {
        match self {
            Pipeline::HandTracking(tracker) => {
                tracker.track(&*frame)?;
                for hand in tracker.hands() {
                    hand.landmark_result().draw(frame);
                }
            }
            Pipeline::GestureMediaControl {
                tracker,
                controller,
            } => {
                tracker.track(&*frame)?;
                controller.set_cooldown(settings.cooldown());
                if let Some(hand) = tracker.hands().next() {
                    let result = hand.landmark_result();
                    if settings.show_landmarks() {
                        result.draw(frame);
                    }
                    let landmarks = result.normalized_positions(frame.resolution());
                    if let Some(fired) = controller.update(&landmarks, Instant::now()) {
                        gesture::draw_label(frame, fired);
                    }
                }
            }
            Pipeline::FaceDetection(detector) => {
                for face in detector.detect(&*frame)? {
                    draw_face(frame, face);
                }
            }
            Pipeline::PoseEstimation(tracker) => {
                if let Some(pose) = tracker.track(&*frame)? {
                    pose.draw(frame);
                }
            }
            Pipeline::VirtualPainter { tracker, canvas } => {
                tracker.track(&*frame)?;
                canvas.fit(frame.resolution());
                for hand in tracker.hands() {
                    let result = hand.landmark_result();
                    result.draw(frame);
                    let tip = result.position(LandmarkIdx::IndexFingerTip);
                    canvas.paint(tip.x.trunc(), tip.y.trunc());
                }
                canvas.compose(frame);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_roundtrip() {
        for project in Project::ALL {
            assert_eq!(project.slug().parse::<Project>().unwrap(), project);
            assert_eq!(project.to_string(), project.slug());
        }
    }

    #[test]
    fn unknown_slug_lists_choices() {
        let err = "Hand Tracking".parse::<Project>().unwrap_err().to_string();
        assert!(err.contains("'Hand Tracking'"), "{err}");
        assert!(err.contains("virtual-painter"), "{err}");
    }

    #[test]
    fn ui_order_and_labels() {
        let labels = Project::ALL.map(|p| p.label());
        assert_eq!(
            labels,
            [
                "Hand Tracking",
                "Gesture Media Control",
                "Face Detection",
                "Pose Estimation",
                "Virtual Painter",
            ]
        );
        assert_eq!(Project::default(), Project::HandTracking);
    }

    #[test]
    fn sync_switches_once_per_change() {
        let settings = SharedSettings::new(Settings::default());
        let mut sync = ProjectSync::new(&settings);
        let mut switched = Vec::new();

        sync.sync(&settings, Project::HandTracking, |p| {
            switched.push(p);
            Ok(())
        });
        assert!(switched.is_empty());

        settings.apply([("project", "face-detection")]).unwrap();
        let current = sync.sync(&settings, Project::HandTracking, |p| {
            switched.push(p);
            Ok(())
        });
        assert_eq!(current.project(), Project::FaceDetection);
        sync.sync(&settings, Project::FaceDetection, |p| {
            switched.push(p);
            Ok(())
        });
        assert_eq!(switched, [Project::FaceDetection]);

        // Other settings changing doesn't rebuild.
        settings.apply([("cooldown", "1.0")]).unwrap();
        sync.sync(&settings, Project::FaceDetection, |p| {
            switched.push(p);
            Ok(())
        });
        assert_eq!(switched, [Project::FaceDetection]);
    }

    #[test]
    fn failed_switch_reverts_project() {
        let settings = SharedSettings::new(Settings::default());
        let mut sync = ProjectSync::new(&settings);

        settings.apply([("project", "pose-estimation")]).unwrap();
        let current = sync.sync(&settings, Project::HandTracking, |_| {
            Err(anyhow!("model missing"))
        });
        assert_eq!(current.project(), Project::HandTracking);
        assert_eq!(settings.get().project(), Project::HandTracking);

        let mut called = false;
        sync.sync(&settings, Project::HandTracking, |_| {
            called = true;
            Ok(())
        });
        assert!(!called);
    }

    #[test]
    fn change_during_failed_switch_is_not_lost() {
        let settings = SharedSettings::new(Settings::default());
        let mut sync = ProjectSync::new(&settings);

        settings.apply([("project", "pose-estimation")]).unwrap();
        sync.sync(&settings, Project::HandTracking, |_| {
            // Another client picks a different project while the switch is failing.
            settings.apply([("project", "face-detection")]).unwrap();
            Err(anyhow!("model missing"))
        });
        assert_eq!(settings.get().project(), Project::FaceDetection);

        let mut switched = Vec::new();
        sync.sync(&settings, Project::HandTracking, |p| {
            switched.push(p);
            Ok(())
        });
        assert_eq!(switched, [Project::FaceDetection]);
    }

    #[test]
    fn missing_models_fail_to_build() {
        let models = ModelDir::new("/nonexistent/visiondeck-models");
        for project in Project::ALL {
            assert!(Pipeline::new(project, &models, KeyBackend::Log).is_err());
        }
    }
}
