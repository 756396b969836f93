//! Keyboard commands of the preview window.

/// Operator action bound to a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    /// SPACE: start or stop recording
    ToggleRecording,
    /// `q` / ESC
    Quit,
    /// `r`: reopen the active cameras
    RestartCameras,
    /// `d`: full detection, then initialize what was found
    Redetect,
    /// `f`
    ToggleFullscreen,
    /// `+` / `=`
    Grow,
    /// `-`
    Shrink,
}

const ESC: i32 = 27;

impl KeyCommand {
    /// Maps a HighGUI key code (low byte is the character) to a command.
    pub fn from_key(code: i32) -> Option<Self> {
        if code < 0 {
            return None;
        }
        let key = code & 0xFF;
        if key == ESC {
            return Some(KeyCommand::Quit);
        }

        match u8::try_from(key).ok().map(char::from)? {
            ' ' => Some(KeyCommand::ToggleRecording),
            'q' => Some(KeyCommand::Quit),
            'r' => Some(KeyCommand::RestartCameras),
            'd' => Some(KeyCommand::Redetect),
            'f' => Some(KeyCommand::ToggleFullscreen),
            '+' | '=' => Some(KeyCommand::Grow),
            '-' => Some(KeyCommand::Shrink),
            _ => None,
        }
    }
}

pub const CONTROLS: &str = "\
Controls:
  SPACE  Start/stop recording
  q/ESC  Quit
  r      Restart cameras
  d      Force camera detection
  f      Toggle fullscreen
  +/=    Enlarge window
  -      Shrink window";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_bindings() {
        assert_eq!(KeyCommand::from_key(32), Some(KeyCommand::ToggleRecording));
        assert_eq!(KeyCommand::from_key('q' as i32), Some(KeyCommand::Quit));
        assert_eq!(KeyCommand::from_key(27), Some(KeyCommand::Quit));
        assert_eq!(KeyCommand::from_key('r' as i32), Some(KeyCommand::RestartCameras));
        assert_eq!(KeyCommand::from_key('d' as i32), Some(KeyCommand::Redetect));
        assert_eq!(KeyCommand::from_key('f' as i32), Some(KeyCommand::ToggleFullscreen));
        assert_eq!(KeyCommand::from_key('=' as i32), Some(KeyCommand::Grow));
        assert_eq!(KeyCommand::from_key('+' as i32), Some(KeyCommand::Grow));
        assert_eq!(KeyCommand::from_key('-' as i32), Some(KeyCommand::Shrink));
    }

    #[test]
    fn test_unbound_keys() {
        assert_eq!(KeyCommand::from_key(-1), None);
        assert_eq!(KeyCommand::from_key('x' as i32), None);
        assert_eq!(KeyCommand::from_key('Q' as i32), None);
    }

    #[test]
    fn test_modifier_bits_are_ignored() {
        assert_eq!(KeyCommand::from_key(0x10_0000 | 'q' as i32), Some(KeyCommand::Quit));
    }
}
