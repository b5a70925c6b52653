//! Protocol keys and well-known values
//!
//! Keys are matched case-insensitively; projectors answer in upper case.

/// Power state (`on` / `off`)
pub const POWER: &str = "pow";
/// Input source (e.g. `hdmi`, `RGB`)
pub const SOURCE: &str = "sour";
/// Audio volume; only relative steps can be set
pub const VOLUME: &str = "vol";
/// Audio mute (`on` / `off`)
pub const MUTE: &str = "mute";
/// Lamp mode (e.g. `lnor`, `eco`)
pub const LAMP_MODE: &str = "lampm";
/// Picture blank (`on` / `off`)
pub const BLANK: &str = "blank";
/// Picture freeze (`on` / `off`)
pub const FREEZE: &str = "freeze";
/// Lamp hours
pub const LAMP_HOURS: &str = "ltim";
/// Model name
pub const MODEL_NAME: &str = "modelname";
/// On-screen menu
pub const MENU: &str = "menu";

/// Value that turns a flag on
pub const ON: &str = "on";
/// Value that turns a flag off
pub const OFF: &str = "off";
/// Value that queries a key
pub const QUERY: &str = "?";
/// Step a value up
pub const INCREMENT: &str = "+";
/// Step a value down
pub const DECREMENT: &str = "-";

/// Wire value for a boolean flag
pub const fn flag(on: bool) -> &'static str {
    if on {
        ON
    } else {
        OFF
    }
}

/// True if a reported flag value means "on"
pub fn is_on(value: &str) -> bool {
    value.eq_ignore_ascii_case(ON)
}

/// Case-insensitive key comparison
pub fn key_is(key: &str, expected: &str) -> bool {
    key.eq_ignore_ascii_case(expected)
}
