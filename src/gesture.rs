//! Mapping static hand poses to media keys.
//!
//! Every frame, the fingers of the first tracked hand are classified as up or down. A few finger
//! patterns map to a [`Gesture`], and a [`Cooldown`] keeps a held gesture from firing its key on
//! every frame.

use std::{
    fmt,
    time::{Duration, Instant},
};

use crate::{
    hand::landmark::NUM_LANDMARKS,
    image::{draw, AsImageViewMut, Color, Vec2f},
    media::{press_media_key, MediaKey, MediaKeys},
};

/// Landmark indices of the five finger tips, thumb first.
pub const TIP_IDS: [usize; 5] = [4, 8, 12, 16, 20];

const INDEX_TIP: usize = 8;
const INDEX_PIP: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finger {
    Thumb = 0,
    Index = 1,
    Middle = 2,
    Ring = 3,
    Pinky = 4,
}

/// Whether each finger is raised, thumb first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FingerStates([bool; 5]);

impl FingerStates {
    pub const ALL_DOWN: Self = Self([false; 5]);
    pub const ALL_UP: Self = Self([true; 5]);
    pub const INDEX_ONLY: Self = Self([false, true, false, false, false]);

    pub const fn new(up: [bool; 5]) -> Self {
        Self(up)
    }

    /// A finger is up when its tip is above (has a smaller `y` than) the joint two landmarks
    /// further down the finger.
    ///
    /// For the thumb, that joint is the MCP; for the other fingers it is the PIP.
    pub fn from_landmarks(landmarks: &[Vec2f; NUM_LANDMARKS]) -> Self {
        Self(TIP_IDS.map(|tip| landmarks[tip].y < landmarks[tip - 2].y))
    }

    pub fn is_up(&self, finger: Finger) -> bool {
        self.0[finger as usize]
    }
}

impl fmt::Display for FingerStates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for up in self.0 {
            f.write_str(if up { "1" } else { "0" })?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    NextTrack,
    PlayPause,
    VolumeUp,
    VolumeDown,
}

impl Gesture {
    /// The text shown on the frame when the gesture fires.
    pub fn label(&self) -> &'static str {
        match self {
            Gesture::NextTrack => "Next Track",
            Gesture::PlayPause => "Play / Pause",
            Gesture::VolumeUp => "Volume Up",
            Gesture::VolumeDown => "Volume Down",
        }
    }

    pub fn media_key(&self) -> MediaKey {
        match self {
            Gesture::NextTrack => MediaKey::NextTrack,
            Gesture::PlayPause => MediaKey::PlayPause,
            Gesture::VolumeUp => MediaKey::VolumeUp,
            Gesture::VolumeDown => MediaKey::VolumeDown,
        }
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Matches the finger pattern against the gesture table, first match wins.
///
/// - fist: next track
/// - open palm: play/pause
/// - only the index finger raised: volume up if its tip is above its PIP joint, volume down if
///   it is below
///
/// Since a raised index finger already means its tip is above the PIP joint, the volume down
/// branch only fires if the two rules disagree, which they currently never do.
pub fn classify(fingers: FingerStates, landmarks: &[Vec2f; NUM_LANDMARKS]) -> Option<Gesture> {
    if fingers == FingerStates::ALL_DOWN {
        Some(Gesture::NextTrack)
    } else if fingers == FingerStates::ALL_UP {
        Some(Gesture::PlayPause)
    } else if fingers == FingerStates::INDEX_ONLY {
        let (tip, pip) = (landmarks[INDEX_TIP].y, landmarks[INDEX_PIP].y);
        if tip < pip {
            Some(Gesture::VolumeUp)
        } else if tip > pip {
            Some(Gesture::VolumeDown)
        } else {
            None
        }
    } else {
        None
    }
}

/// Enforces a minimum interval between two actions.
#[derive(Debug, Clone)]
pub struct Cooldown {
    duration: Duration,
    last: Option<Instant>,
}

impl Cooldown {
    /// Creates a cooldown that is ready immediately.
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            last: None,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn set_duration(&mut self, duration: Duration) {
        self.duration = duration;
    }

    /// Whether strictly more than the cooldown duration has passed since the last action.
    pub fn is_ready(&self, now: Instant) -> bool {
        match self.last {
            Some(last) => now.saturating_duration_since(last) > self.duration,
            None => true,
        }
    }

    /// Records an action at `now` if the cooldown is ready, and returns whether it was.
    pub fn try_fire(&mut self, now: Instant) -> bool {
        if self.is_ready(now) {
            self.last = Some(now);
            true
        } else {
            false
        }
    }
}

/// Turns hand landmarks into media key presses.
pub struct GestureController {
    keys: Box<dyn MediaKeys>,
    cooldown: Cooldown,
}

impl GestureController {
    pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(800);

    pub fn new(keys: Box<dyn MediaKeys>) -> Self {
        Self {
            keys,
            cooldown: Cooldown::new(Self::DEFAULT_COOLDOWN),
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown.duration()
    }

    pub fn set_cooldown(&mut self, cooldown: Duration) {
        self.cooldown.set_duration(cooldown);
    }

    /// Classifies the hand and presses the gesture's key if the cooldown allows it.
    ///
    /// `landmarks` are normalized to the frame size. Returns the gesture that fired, if any. The
    /// gesture counts as fired even if pressing the key failed.
    pub fn update(
        &mut self,
        landmarks: &[Vec2f; NUM_LANDMARKS],
        now: Instant,
    ) -> Option<Gesture> {
        let fingers = FingerStates::from_landmarks(landmarks);
        let gesture = classify(fingers, landmarks)?;
        if !self.cooldown.try_fire(now) {
            return None;
        }

        log::debug!("fingers {fingers}: {gesture}");
        press_media_key(&mut *self.keys, gesture.media_key());
        Some(gesture)
    }
}

/// Draws the label of a fired gesture in the top left corner.
pub fn draw_label<I: AsImageViewMut>(image: &mut I, gesture: Gesture) {
    draw::text(image, 20.0, 50.0, gesture.label())
        .align_left()
        .align_baseline()
        .color(Color::GREEN);
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use crate::image::Image;

    use super::*;

    /// Landmarks of a hand with the given fingers raised.
    fn hand(up: [bool; 5]) -> [Vec2f; NUM_LANDMARKS] {
        let mut lm = [Vec2f::new(0.5, 0.8); NUM_LANDMARKS];
        for (finger, &tip) in TIP_IDS.iter().enumerate() {
            let x = 0.3 + finger as f32 * 0.1;
            // Joints from the base of the finger to the tip.
            for j in 0..4 {
                let y = if up[finger] {
                    0.7 - j as f32 * 0.1
                } else {
                    0.5 + j as f32 * 0.05
                };
                lm[tip - 3 + j] = Vec2f::new(x, y);
            }
        }
        lm
    }

    #[derive(Default, Clone)]
    struct Recorder(Rc<RefCell<Vec<MediaKey>>>);

    impl MediaKeys for Recorder {
        fn press(&mut self, key: MediaKey) -> anyhow::Result<()> {
            self.0.borrow_mut().push(key);
            Ok(())
        }
    }

    #[test]
    fn finger_states() {
        let up = [true, false, true, false, true];
        assert_eq!(FingerStates::from_landmarks(&hand(up)), FingerStates::new(up));
        let states = FingerStates::from_landmarks(&hand([false, true, false, false, false]));
        assert_eq!(states, FingerStates::INDEX_ONLY);
        assert!(states.is_up(Finger::Index));
        assert!(!states.is_up(Finger::Thumb));
        assert_eq!(states.to_string(), "01000");
    }

    #[test]
    fn rule_table() {
        let cases = [
            ([false; 5], Some(Gesture::NextTrack)),
            ([true; 5], Some(Gesture::PlayPause)),
            ([false, true, false, false, false], Some(Gesture::VolumeUp)),
            ([false, true, true, false, false], None),
            ([true, false, false, false, false], None),
        ];
        for (up, expected) in cases {
            let lm = hand(up);
            assert_eq!(
                classify(FingerStates::from_landmarks(&lm), &lm),
                expected,
                "{up:?}"
            );
        }
    }

    #[test]
    fn random_hands_match_finger_states() {
        let mut rng = fastrand::Rng::with_seed(0x5eed);
        for _ in 0..1000 {
            let lm: [Vec2f; NUM_LANDMARKS] =
                std::array::from_fn(|_| Vec2f::new(rng.f32(), rng.f32()));
            let fingers = FingerStates::from_landmarks(&lm);
            match classify(fingers, &lm) {
                Some(Gesture::NextTrack) => assert_eq!(fingers, FingerStates::ALL_DOWN),
                Some(Gesture::PlayPause) => assert_eq!(fingers, FingerStates::ALL_UP),
                Some(Gesture::VolumeUp | Gesture::VolumeDown) => {
                    assert_eq!(fingers, FingerStates::INDEX_ONLY)
                }
                None => assert!(
                    ![
                        FingerStates::ALL_DOWN,
                        FingerStates::ALL_UP,
                        FingerStates::INDEX_ONLY
                    ]
                    .contains(&fingers),
                    "{fingers}"
                ),
            }
        }
    }

    #[test]
    fn volume_down_needs_tip_below_pip() {
        let mut lm = hand([false; 5]);
        lm[INDEX_TIP].y = 0.9;
        assert_eq!(
            classify(FingerStates::INDEX_ONLY, &lm),
            Some(Gesture::VolumeDown)
        );
        lm[INDEX_TIP].y = lm[INDEX_PIP].y;
        assert_eq!(classify(FingerStates::INDEX_ONLY, &lm), None);
    }

    #[test]
    fn cooldown_is_strict() {
        let start = Instant::now();
        let mut cooldown = Cooldown::new(Duration::from_millis(500));
        assert!(cooldown.try_fire(start));
        assert!(!cooldown.try_fire(start + Duration::from_millis(200)));
        assert!(!cooldown.try_fire(start + Duration::from_millis(500)));
        assert!(cooldown.try_fire(start + Duration::from_millis(501)));
        assert!(!cooldown.is_ready(start + Duration::from_millis(900)));
    }

    #[test]
    fn controller_presses_keys_with_cooldown() {
        let recorder = Recorder::default();
        let mut controller = GestureController::new(Box::new(recorder.clone()));
        let start = Instant::now();
        let fist = hand([false; 5]);
        let palm = hand([true; 5]);

        assert_eq!(controller.update(&fist, start), Some(Gesture::NextTrack));
        // Held gesture, still cooling down.
        assert_eq!(controller.update(&fist, start + Duration::from_millis(100)), None);
        assert_eq!(controller.update(&palm, start + Duration::from_millis(700)), None);
        assert_eq!(
            controller.update(&palm, start + Duration::from_millis(900)),
            Some(Gesture::PlayPause)
        );

        controller.set_cooldown(Duration::from_millis(200));
        assert_eq!(
            controller.update(&fist, start + Duration::from_millis(1200)),
            Some(Gesture::NextTrack)
        );

        assert_eq!(
            *recorder.0.borrow(),
            [MediaKey::NextTrack, MediaKey::PlayPause, MediaKey::NextTrack]
        );
    }

    #[test]
    fn unknown_pose_does_not_consume_cooldown() {
        let mut controller = GestureController::new(Box::new(Recorder::default()));
        let start = Instant::now();
        assert_eq!(controller.update(&hand([true, true, false, false, false]), start), None);
        assert_eq!(
            controller.update(&hand([true; 5]), start),
            Some(Gesture::PlayPause)
        );
    }

    #[test]
    fn label_is_drawn() {
        let mut image = Image::new(320, 80);
        draw_label(&mut image, Gesture::VolumeUp);
        let green = image
            .as_rgba8()
            .pixels()
            .filter(|p| p.0 == Color::GREEN.0)
            .count();
        assert!(green > 0);
    }
}
