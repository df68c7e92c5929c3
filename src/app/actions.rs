use crate::playback::SpeedTier;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Back,
    ShowHelp,

    // Library
    ListUp,
    ListDown,
    GoTop,
    GoBottom,
    Refresh,
    OpenSelected,
    DeleteSelected,

    // Reproducer
    TogglePlay,
    SetSpeed(SpeedTier),
    SpeedUp,
    SpeedDown,
    Rewind,
    ScrollUp,
    ScrollDown,

    Resize,
}
