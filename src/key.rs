use std::{fmt, str::FromStr};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::{NetErr, Result};

macro_rules! key_identifiers {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        /// A keyboard or mouse action an output unit stands for.
        ///
        /// The textual names are stable: they are what checkpoints store as output labels.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum KeyIdentifier {
            $($variant),+
        }

        impl KeyIdentifier {
            /// Every known key, in declaration order.
            pub const ALL: &'static [KeyIdentifier] = &[$(KeyIdentifier::$variant),+];

            /// Returns the stable textual name of this key.
            pub fn name(self) -> &'static str {
                match self {
                    $(KeyIdentifier::$variant => $name),+
                }
            }
        }

        impl FromStr for KeyIdentifier {
            type Err = NetErr;

            fn from_str(s: &str) -> Result<Self> {
                match s.trim() {
                    $($name => Ok(KeyIdentifier::$variant),)+
                    other => Err(NetErr::UnknownLabel(other.to_string())),
                }
            }
        }
    };
}

key_identifiers! {
    A => "VK_A", B => "VK_B", C => "VK_C", D => "VK_D", E => "VK_E", F => "VK_F",
    G => "VK_G", H => "VK_H", I => "VK_I", J => "VK_J", K => "VK_K", L => "VK_L",
    M => "VK_M", N => "VK_N", O => "VK_O", P => "VK_P", Q => "VK_Q", R => "VK_R",
    S => "VK_S", T => "VK_T", U => "VK_U", V => "VK_V", W => "VK_W", X => "VK_X",
    Y => "VK_Y", Z => "VK_Z",
    Digit0 => "VK_0", Digit1 => "VK_1", Digit2 => "VK_2", Digit3 => "VK_3",
    Digit4 => "VK_4", Digit5 => "VK_5", Digit6 => "VK_6", Digit7 => "VK_7",
    Digit8 => "VK_8", Digit9 => "VK_9",
    Up => "VK_UP", Down => "VK_DOWN", Left => "VK_LEFT", Right => "VK_RIGHT",
    Space => "VK_SPACE", Enter => "VK_ENTER", Escape => "VK_ESCAPE", Tab => "VK_TAB",
    Backspace => "VK_BACK_SPACE", Shift => "VK_SHIFT", Control => "VK_CONTROL",
    Alt => "VK_ALT",
    F1 => "VK_F1", F2 => "VK_F2", F3 => "VK_F3", F4 => "VK_F4", F5 => "VK_F5",
    F6 => "VK_F6", F7 => "VK_F7", F8 => "VK_F8", F9 => "VK_F9", F10 => "VK_F10",
    F11 => "VK_F11", F12 => "VK_F12",
}

impl fmt::Display for KeyIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for KeyIdentifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for KeyIdentifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(de::Error::custom)
    }
}
