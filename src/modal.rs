use crate::tween::{Easing, Fade};

const FADE_EASING: Easing = Easing::QuadOut;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModalKind {
    Github,
    About,
    Email,
}

impl ModalKind {
    pub fn title(self) -> &'static str {
        match self {
            ModalKind::Github => "Projects",
            ModalKind::About => "About",
            ModalKind::Email => "Contact",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Phase {
    FadingIn(Fade),
    Visible,
    FadingOut(Fade),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ModalError {
    #[error("cannot open {requested:?} modal while {open:?} is open")]
    AlreadyOpen { open: ModalKind, requested: ModalKind },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalEvent {
    /// Fade-out finished; interaction may resume.
    Closed(ModalKind),
}

/// At most one overlay at a time. A modal counts as open from `show` until
/// its fade-out completes, and owns interaction suspension for that whole
/// span.
pub struct ModalController {
    active: Option<(ModalKind, Phase)>,
    fade_duration: f32,
    /// Set by a touch-end on an exit button so the click synthesized from the
    /// same touch is swallowed. Cleared by the next pointer move.
    touch_happened: bool,
}

impl ModalController {
    pub fn new(fade_duration: f32) -> Self {
        Self {
            active: None,
            fade_duration,
            touch_happened: false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.active.is_some()
    }

    pub fn open_modal(&self) -> Option<ModalKind> {
        self.active.as_ref().map(|(kind, _)| *kind)
    }

    /// True while the modal is fading out and no longer accepts input.
    pub fn is_closing(&self) -> bool {
        matches!(self.active, Some((_, Phase::FadingOut(_))))
    }

    pub fn opacity(&self) -> f32 {
        match &self.active {
            None => 0.0,
            Some((_, Phase::FadingIn(fade) | Phase::FadingOut(fade))) => fade.value(),
            Some((_, Phase::Visible)) => 1.0,
        }
    }

    /// Returns `Ok(true)` when the modal was newly shown and `Ok(false)` when
    /// it was already up.
    pub fn show(&mut self, kind: ModalKind) -> Result<bool, ModalError> {
        match &self.active {
            None => {
                self.active = Some((kind, Phase::FadingIn(self.fade(0.0, 1.0))));
                log::debug!("Showing {:?} modal", kind);
                Ok(true)
            }
            Some((open, Phase::FadingOut(fade))) if *open == kind => {
                let from = fade.value();
                self.active = Some((kind, Phase::FadingIn(self.fade(from, 1.0))));
                Ok(false)
            }
            Some((open, _)) if *open == kind => Ok(false),
            Some((open, _)) => Err(ModalError::AlreadyOpen {
                open: *open,
                requested: kind,
            }),
        }
    }

    /// Starts the fade-out. Returns false when `kind` is not the open modal
    /// or is already closing.
    pub fn hide(&mut self, kind: ModalKind) -> bool {
        let from = match &self.active {
            Some((open, Phase::FadingIn(fade))) if *open == kind => fade.value(),
            Some((open, Phase::Visible)) if *open == kind => 1.0,
            _ => return false,
        };

        log::debug!("Hiding {:?} modal", kind);
        self.active = Some((kind, Phase::FadingOut(self.fade(from, 0.0))));
        true
    }

    pub fn advance(&mut self, dt: f32) -> Option<ModalEvent> {
        let (kind, phase) = self.active.as_mut()?;
        let kind = *kind;

        match phase {
            Phase::FadingIn(fade) => {
                fade.advance(dt);
                if fade.is_finished() {
                    *phase = Phase::Visible;
                }
                None
            }
            Phase::Visible => None,
            Phase::FadingOut(fade) => {
                fade.advance(dt);
                if fade.is_finished() {
                    self.active = None;
                    Some(ModalEvent::Closed(kind))
                } else {
                    None
                }
            }
        }
    }

    /// Exit button released by touch.
    pub fn exit_touch_end(&mut self, kind: ModalKind) -> bool {
        self.touch_happened = true;
        self.hide(kind)
    }

    /// Exit button clicked. Ignored once after a touch-end.
    pub fn exit_click(&mut self, kind: ModalKind) -> bool {
        if self.touch_happened {
            self.touch_happened = false;
            return false;
        }
        self.hide(kind)
    }

    pub fn pointer_moved(&mut self) {
        self.touch_happened = false;
    }

    fn fade(&self, from: f32, to: f32) -> Fade {
        Fade::new(from, to, self.fade_duration, FADE_EASING)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn show_fades_in_then_hide_fades_out() {
        let mut modal = ModalController::new(0.3);
        assert_eq!(modal.show(ModalKind::Email), Ok(true));
        assert!(modal.is_open());
        assert_relative_eq!(modal.opacity(), 0.0);

        assert_eq!(modal.advance(0.3), None);
        assert_relative_eq!(modal.opacity(), 1.0);

        assert!(modal.hide(ModalKind::Email));
        assert!(modal.is_closing());
        assert_eq!(modal.advance(0.1), None);
        assert!(modal.is_open());

        assert_eq!(modal.advance(0.3), Some(ModalEvent::Closed(ModalKind::Email)));
        assert!(!modal.is_open());
        assert_eq!(modal.advance(0.1), None);
    }

    #[test]
    fn second_modal_is_refused() {
        let mut modal = ModalController::new(0.3);
        modal.show(ModalKind::About).unwrap();

        assert_eq!(
            modal.show(ModalKind::Email),
            Err(ModalError::AlreadyOpen {
                open: ModalKind::About,
                requested: ModalKind::Email
            })
        );
        assert_eq!(modal.show(ModalKind::About), Ok(false));
        assert_eq!(modal.open_modal(), Some(ModalKind::About));
    }

    #[test]
    fn hide_only_applies_to_the_open_modal() {
        let mut modal = ModalController::new(0.3);
        assert!(!modal.hide(ModalKind::Email));

        modal.show(ModalKind::Github).unwrap();
        assert!(!modal.hide(ModalKind::Email));
        assert!(modal.hide(ModalKind::Github));
        assert!(!modal.hide(ModalKind::Github));
    }

    #[test]
    fn reopening_while_closing_fades_back_in() {
        let mut modal = ModalController::new(0.4);
        modal.show(ModalKind::Email).unwrap();
        modal.advance(0.4);
        modal.hide(ModalKind::Email);
        modal.advance(0.2);

        let dimmed = modal.opacity();
        assert!(dimmed < 1.0 && dimmed > 0.0);

        assert_eq!(modal.show(ModalKind::Email), Ok(false));
        assert!(!modal.is_closing());
        assert_relative_eq!(modal.opacity(), dimmed);
    }

    #[test]
    fn touch_end_swallows_the_following_click() {
        let mut modal = ModalController::new(0.0);
        modal.show(ModalKind::Email).unwrap();

        assert!(modal.exit_touch_end(ModalKind::Email));
        assert!(!modal.exit_click(ModalKind::Email));
        assert_eq!(modal.advance(0.0), Some(ModalEvent::Closed(ModalKind::Email)));

        modal.show(ModalKind::Email).unwrap();
        modal.advance(0.0);
        // The debounce flag was consumed, so a real click works again.
        assert!(modal.exit_click(ModalKind::Email));
    }

    #[test]
    fn pointer_move_resets_touch_debounce() {
        let mut modal = ModalController::new(0.0);
        modal.show(ModalKind::About).unwrap();
        modal.advance(0.0);

        modal.exit_touch_end(ModalKind::Github);
        modal.pointer_moved();
        assert!(modal.exit_click(ModalKind::About));
    }
}
