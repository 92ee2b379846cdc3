use sdl2::{event::Event, keyboard::Keycode};

/// Builds the match over SDL events: keypad keys report both edges,
/// commands fire on the first key down only.
macro_rules! map_keys {
    (
        $event:expr,
        keypad { $($pad:ident => $key:expr),* $(,)? }
        commands { $($command:ident => $action:expr),* $(,)? }
    ) => {
        match $event {
            $(
                Event::KeyDown { keycode: Some(Keycode::$pad), .. } => Some(Action::Press($key)),
                Event::KeyUp { keycode: Some(Keycode::$pad), .. } => Some(Action::Release($key)),
            )*
            $(
                Event::KeyDown { keycode: Some(Keycode::$command), repeat: false, .. } => Some($action),
            )*
            Event::Quit { .. } => Some(Action::Quit),
            _ => None,
        }
    };
}

/// Different key bindings depending on the keyboard layout
pub enum Keymap {
    Qwerty,
}

/// Actions to be executed by the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Press(u8),
    Release(u8),
    TogglePause,
    Reset,
    Quit,
}

impl Keymap {
    /// Translate an SDL2 event into an action to be executed by the app
    pub fn translate_action(&self, event: &Event) -> Option<Action> {
        match self {
            Keymap::Qwerty => map_keys!(event,
                keypad {
                    Num1 => 0x01,
                    Num2 => 0x02,
                    Num3 => 0x03,
                    Num4 => 0x0C,
                    Q => 0x04,
                    W => 0x05,
                    E => 0x06,
                    R => 0x0D,
                    A => 0x07,
                    S => 0x08,
                    D => 0x09,
                    F => 0x0E,
                    Z => 0x0A,
                    X => 0x00,
                    C => 0x0B,
                    V => 0x0F,
                }
                commands {
                    Space => Action::TogglePause,
                    F5 => Action::Reset,
                    Escape => Action::Quit,
                }
            ),
        }
    }
}
