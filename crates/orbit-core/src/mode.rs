//! Display mode flags
//!
//! The face is either interactive or ambient, and independently visible or
//! hidden, muted or not. The engine owns one [`DisplayMode`] and mutates it only
//! through its transition methods.

/// Rendering fidelity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fidelity {
    /// Full color, anti-aliased, shadowed, ticking every second
    Interactive,
    /// Monochrome, no anti-aliasing, no second satellite
    Ambient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayMode {
    pub fidelity: Fidelity,
    pub visible: bool,
    pub muted: bool,
}

impl Default for DisplayMode {
    /// Interactive and hidden: constructed, surface not shown yet.
    fn default() -> Self {
        Self {
            fidelity: Fidelity::Interactive,
            visible: false,
            muted: false,
        }
    }
}

impl DisplayMode {
    pub const fn is_ambient(&self) -> bool {
        matches!(self.fidelity, Fidelity::Ambient)
    }

    pub const fn is_interactive(&self) -> bool {
        matches!(self.fidelity, Fidelity::Interactive)
    }

    /// Whether the per-second redraw chain should be running.
    pub const fn should_tick(&self) -> bool {
        self.visible && !self.is_ambient()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_mode_is_interactive_hidden() {
        let mode = DisplayMode::default();
        assert!(mode.is_interactive());
        assert!(!mode.visible);
        assert!(!mode.muted);
        assert!(!mode.should_tick());
    }

    #[test]
    fn test_ticks_only_when_visible_and_interactive() {
        for fidelity in [Fidelity::Interactive, Fidelity::Ambient] {
            for visible in [false, true] {
                for muted in [false, true] {
                    let mode = DisplayMode {
                        fidelity,
                        visible,
                        muted,
                    };
                    let expected = visible && fidelity == Fidelity::Interactive;
                    assert_eq!(mode.should_tick(), expected, "{:?}", mode);
                }
            }
        }
    }
}
