//! Runtime settings, changed from the browser and read by the capture loop.

use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use anyhow::{bail, Context};

use crate::project::Project;

/// The values controlled from the UI sidebar.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    project: Project,
    cooldown_secs: f32,
    show_landmarks: bool,
}

impl Settings {
    pub const MIN_COOLDOWN_SECS: f32 = 0.2;
    pub const MAX_COOLDOWN_SECS: f32 = 2.0;
    pub const DEFAULT_COOLDOWN_SECS: f32 = 0.8;

    pub fn new(project: Project) -> Self {
        Self {
            project,
            cooldown_secs: Self::DEFAULT_COOLDOWN_SECS,
            show_landmarks: true,
        }
    }

    pub fn project(&self) -> Project {
        self.project
    }

    pub fn set_project(&mut self, project: Project) {
        self.project = project;
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs_f32(self.cooldown_secs)
    }

    pub fn cooldown_secs(&self) -> f32 {
        self.cooldown_secs
    }

    /// Sets the gesture cooldown, clamped to the slider range and rounded to its 0.1 s steps.
    pub fn set_cooldown_secs(&mut self, secs: f32) {
        let clamped = secs.clamp(Self::MIN_COOLDOWN_SECS, Self::MAX_COOLDOWN_SECS);
        self.cooldown_secs = (clamped * 10.0).round() / 10.0;
    }

    pub fn show_landmarks(&self) -> bool {
        self.show_landmarks
    }

    pub fn set_show_landmarks(&mut self, show: bool) {
        self.show_landmarks = show;
    }

    /// Applies one `key=value` pair.
    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "project" => self.project = value.parse()?,
            "cooldown" => {
                let secs: f32 = value
                    .parse()
                    .with_context(|| format!("invalid cooldown '{value}'"))?;
                if !secs.is_finite() {
                    bail!("invalid cooldown '{value}'");
                }
                self.set_cooldown_secs(secs);
            }
            "show_landmarks" => self.show_landmarks = parse_bool(value)?,
            _ => bail!("unknown setting '{key}'"),
        }
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new(Project::default())
    }
}

/// One `key=value` line per setting.
impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "project={}", self.project)?;
        writeln!(f, "cooldown={:.1}", self.cooldown_secs)?;
        writeln!(f, "show_landmarks={}", self.show_landmarks)
    }
}

fn parse_bool(value: &str) -> anyhow::Result<bool> {
    match value {
        "true" | "on" | "1" => Ok(true),
        "false" | "off" | "0" => Ok(false),
        _ => bail!("invalid boolean '{value}'"),
    }
}

struct State {
    settings: Settings,
    generation: u64,
    clear_requested: bool,
}

/// [`Settings`] shared between the HTTP server and the capture loop.
///
/// Every change bumps a generation counter, so the loop can cheaply notice changes.
#[derive(Clone)]
pub struct SharedSettings {
    state: Arc<Mutex<State>>,
}

impl SharedSettings {
    pub fn new(settings: Settings) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                settings,
                generation: 0,
                clear_requested: false,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // The state is always valid, even if a holder panicked.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self) -> Settings {
        self.lock().settings.clone()
    }

    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// Returns the settings together with their generation.
    pub fn snapshot(&self) -> (u64, Settings) {
        let state = self.lock();
        (state.generation, state.settings.clone())
    }

    /// Modifies the settings with `f`, but only if they are still at `generation`.
    ///
    /// Returns the generation after the update, or `None` if the settings changed since
    /// `generation` and `f` was not run.
    pub fn update_if(&self, generation: u64, f: impl FnOnce(&mut Settings)) -> Option<u64> {
        let mut state = self.lock();
        if state.generation != generation {
            return None;
        }
        let mut settings = state.settings.clone();
        f(&mut settings);
        if settings != state.settings {
            state.settings = settings;
            state.generation += 1;
        }
        Some(state.generation)
    }

    /// Applies form fields (`project`, `cooldown`, `show_landmarks` and `clear`).
    ///
    /// Either all fields are applied, or none of them are and an error is returned.
    pub fn apply<'a, I>(&self, fields: I) -> anyhow::Result<()>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut state = self.lock();
        let mut settings = state.settings.clone();
        let mut clear = false;
        for (key, value) in fields {
            match key {
                "clear" => clear = true,
                _ => settings.set(key, value)?,
            }
        }

        if settings != state.settings {
            log::debug!("settings changed: {settings:?}");
            state.settings = settings;
            state.generation += 1;
        }
        state.clear_requested |= clear;
        Ok(())
    }

    /// Returns whether a canvas clear was requested since the last call.
    pub fn take_clear_request(&self) -> bool {
        std::mem::take(&mut self.lock().clear_requested)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn cooldown_is_clamped_and_stepped() {
        let mut settings = Settings::default();
        assert_relative_eq!(settings.cooldown_secs(), 0.8);
        settings.set_cooldown_secs(5.0);
        assert_relative_eq!(settings.cooldown_secs(), 2.0);
        settings.set_cooldown_secs(0.0);
        assert_relative_eq!(settings.cooldown_secs(), 0.2);
        settings.set_cooldown_secs(1.234);
        assert_relative_eq!(settings.cooldown_secs(), 1.2);
        assert_eq!(settings.cooldown(), Duration::from_secs_f32(1.2));
    }

    #[test]
    fn display_as_lines() {
        let settings = Settings::new(Project::VirtualPainter);
        assert_eq!(
            settings.to_string(),
            "project=virtual-painter\ncooldown=0.8\nshow_landmarks=true\n"
        );
    }

    #[test]
    fn apply_bumps_generation_on_change() {
        let shared = SharedSettings::new(Settings::default());
        assert_eq!(shared.generation(), 0);

        shared
            .apply([("project", "face-detection"), ("cooldown", "1.5")])
            .unwrap();
        let (generation, settings) = shared.snapshot();
        assert_eq!(generation, 1);
        assert_eq!(settings.project(), Project::FaceDetection);
        assert_relative_eq!(settings.cooldown_secs(), 1.5);

        // Same values again: no change.
        shared.apply([("project", "face-detection")]).unwrap();
        assert_eq!(shared.generation(), 1);

        assert_eq!(shared.update_if(1, |s| s.set_show_landmarks(false)), Some(2));
        assert!(!shared.get().show_landmarks());
    }

    #[test]
    fn update_if_rejects_stale_generation() {
        let shared = SharedSettings::new(Settings::default());
        shared.apply([("project", "pose-estimation")]).unwrap();

        let mut ran = false;
        assert_eq!(shared.update_if(0, |_| ran = true), None);
        assert!(!ran);
        assert_eq!(shared.get().project(), Project::PoseEstimation);

        // Unchanged settings keep the generation.
        assert_eq!(shared.update_if(1, |_| {}), Some(1));
        assert_eq!(
            shared.update_if(1, |s| s.set_project(Project::HandTracking)),
            Some(2)
        );
        assert_eq!(shared.get().project(), Project::HandTracking);
    }

    #[test]
    fn apply_is_all_or_nothing() {
        let shared = SharedSettings::new(Settings::default());
        let err = shared
            .apply([("show_landmarks", "false"), ("volume", "11")])
            .unwrap_err();
        assert!(err.to_string().contains("volume"), "{err}");
        assert!(shared.get().show_landmarks());
        assert_eq!(shared.generation(), 0);

        assert!(shared.apply([("cooldown", "fast")]).is_err());
        assert!(shared.apply([("cooldown", "NaN")]).is_err());
        assert!(shared.apply([("show_landmarks", "maybe")]).is_err());
        assert!(shared.apply([("project", "nope")]).is_err());
    }

    #[test]
    fn clear_request_is_taken_once() {
        let shared = SharedSettings::new(Settings::default());
        assert!(!shared.take_clear_request());
        shared.apply([("clear", "")]).unwrap();
        assert_eq!(shared.generation(), 0);
        assert!(shared.take_clear_request());
        assert!(!shared.take_clear_request());

        shared.apply([("clear", "1")]).unwrap();
        assert!(shared.clone().take_clear_request());
    }
}
