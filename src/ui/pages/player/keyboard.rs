/// Keys the player reacts to, normalized from DOM `KeyboardEvent.key` names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerKey {
    Space,
    Char(char),
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Other,
}

impl PlayerKey {
    pub fn from_key_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            " " | "spacebar" => PlayerKey::Space,
            "arrowleft" => PlayerKey::ArrowLeft,
            "arrowright" => PlayerKey::ArrowRight,
            "arrowup" => PlayerKey::ArrowUp,
            "arrowdown" => PlayerKey::ArrowDown,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => PlayerKey::Char(c),
                    _ => PlayerKey::Other,
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    TogglePlay,
    ToggleMute,
    ToggleFullscreen,
    SeekBackward,
    SeekForward,
    VolumeUp,
    VolumeDown,
}

pub fn command_for(key: PlayerKey) -> Option<KeyCommand> {
    match key {
        PlayerKey::Space => Some(KeyCommand::TogglePlay),
        PlayerKey::Char(c) => match c.to_ascii_lowercase() {
            'k' => Some(KeyCommand::TogglePlay),
            'm' => Some(KeyCommand::ToggleMute),
            'f' => Some(KeyCommand::ToggleFullscreen),
            _ => None,
        },
        PlayerKey::ArrowLeft => Some(KeyCommand::SeekBackward),
        PlayerKey::ArrowRight => Some(KeyCommand::SeekForward),
        PlayerKey::ArrowUp => Some(KeyCommand::VolumeUp),
        PlayerKey::ArrowDown => Some(KeyCommand::VolumeDown),
        PlayerKey::Other => None,
    }
}
