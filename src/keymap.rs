//! Translation of raw hook keys into the engine's event vocabulary.

use rdev::Key;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifierKey {
    Ctrl,
    Alt,
    Shift,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminatorKey {
    Space,
    Tab,
}

/// What a physical key means to the expansion state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyClass {
    Modifier(ModifierKey),
    Terminator(TerminatorKey),
    /// Keys that move the caret or otherwise invalidate the buffer.
    Navigation,
    Backspace,
    Printable(char),
    /// Keys the engine does not react to.
    Other,
}

/// Classify a physical key. The printable variant is resolved from key
/// identity, never from the event's composed name: with a Korean IME active
/// the OS reports Hangul there, while the trigger buffer must stay in the
/// QWERTY keystroke domain.
pub fn classify(key: Key, shift: bool) -> KeyClass {
    match key {
        Key::ControlLeft | Key::ControlRight => KeyClass::Modifier(ModifierKey::Ctrl),
        Key::Alt | Key::AltGr => KeyClass::Modifier(ModifierKey::Alt),
        Key::ShiftLeft | Key::ShiftRight => KeyClass::Modifier(ModifierKey::Shift),
        Key::Space => KeyClass::Terminator(TerminatorKey::Space),
        Key::Tab => KeyClass::Terminator(TerminatorKey::Tab),
        Key::Backspace => KeyClass::Backspace,
        Key::Return
        | Key::KpReturn
        | Key::Escape
        | Key::LeftArrow
        | Key::RightArrow
        | Key::UpArrow
        | Key::DownArrow
        | Key::Home
        | Key::End
        | Key::PageUp
        | Key::PageDown
        | Key::Delete
        | Key::KpDelete
        | Key::Insert
        | Key::MetaLeft
        | Key::MetaRight => KeyClass::Navigation,
        _ => match printable(key, shift) {
            Some(c) => KeyClass::Printable(c),
            None => KeyClass::Other,
        },
    }
}

/// US-QWERTY character for a key, with its shifted variant. Shift matters to
/// the codec: the doubled consonants and ㅒ/ㅖ live on shifted keys.
fn printable(key: Key, shift: bool) -> Option<char> {
    let (plain, shifted) = match key {
        Key::KeyA => ('a', 'A'),
        Key::KeyB => ('b', 'B'),
        Key::KeyC => ('c', 'C'),
        Key::KeyD => ('d', 'D'),
        Key::KeyE => ('e', 'E'),
        Key::KeyF => ('f', 'F'),
        Key::KeyG => ('g', 'G'),
        Key::KeyH => ('h', 'H'),
        Key::KeyI => ('i', 'I'),
        Key::KeyJ => ('j', 'J'),
        Key::KeyK => ('k', 'K'),
        Key::KeyL => ('l', 'L'),
        Key::KeyM => ('m', 'M'),
        Key::KeyN => ('n', 'N'),
        Key::KeyO => ('o', 'O'),
        Key::KeyP => ('p', 'P'),
        Key::KeyQ => ('q', 'Q'),
        Key::KeyR => ('r', 'R'),
        Key::KeyS => ('s', 'S'),
        Key::KeyT => ('t', 'T'),
        Key::KeyU => ('u', 'U'),
        Key::KeyV => ('v', 'V'),
        Key::KeyW => ('w', 'W'),
        Key::KeyX => ('x', 'X'),
        Key::KeyY => ('y', 'Y'),
        Key::KeyZ => ('z', 'Z'),
        Key::Num1 => ('1', '!'),
        Key::Num2 => ('2', '@'),
        Key::Num3 => ('3', '#'),
        Key::Num4 => ('4', '$'),
        Key::Num5 => ('5', '%'),
        Key::Num6 => ('6', '^'),
        Key::Num7 => ('7', '&'),
        Key::Num8 => ('8', '*'),
        Key::Num9 => ('9', '('),
        Key::Num0 => ('0', ')'),
        Key::Minus => ('-', '_'),
        Key::Equal => ('=', '+'),
        Key::LeftBracket => ('[', '{'),
        Key::RightBracket => (']', '}'),
        Key::SemiColon => (';', ':'),
        Key::Quote => ('\'', '"'),
        Key::BackQuote => ('`', '~'),
        Key::BackSlash | Key::IntlBackslash => ('\\', '|'),
        Key::Comma => (',', '<'),
        Key::Dot => ('.', '>'),
        Key::Slash => ('/', '?'),
        Key::Kp0 => ('0', '0'),
        Key::Kp1 => ('1', '1'),
        Key::Kp2 => ('2', '2'),
        Key::Kp3 => ('3', '3'),
        Key::Kp4 => ('4', '4'),
        Key::Kp5 => ('5', '5'),
        Key::Kp6 => ('6', '6'),
        Key::Kp7 => ('7', '7'),
        Key::Kp8 => ('8', '8'),
        Key::Kp9 => ('9', '9'),
        Key::KpMinus => ('-', '-'),
        Key::KpPlus => ('+', '+'),
        Key::KpMultiply => ('*', '*'),
        Key::KpDivide => ('/', '/'),
        _ => return None,
    };
    Some(if shift { shifted } else { plain })
}
