use crate::core::Rgba8;

pub const BACKGROUND: Rgba8 = Rgba8::rgb(10, 10, 15);
pub const GRID_LINE: Rgba8 = Rgba8::rgb(40, 40, 50);
pub const ZONE_SAFE: Rgba8 = Rgba8::rgb(30, 35, 45);
pub const ZONE_DANGER: Rgba8 = Rgba8::rgb(80, 20, 20);
pub const TEXT: Rgba8 = Rgba8::rgb(200, 200, 200);
pub const TITLE: Rgba8 = Rgba8::rgb(0, 245, 255);
pub const DIMMED: Rgba8 = Rgba8::rgb(80, 80, 80);
pub const HP_FILLED: Rgba8 = Rgba8::rgb(0, 255, 0);
pub const HP_EMPTY: Rgba8 = DIMMED;
pub const SHOT: Rgba8 = Rgba8::rgb(255, 255, 0);
pub const WINNER: Rgba8 = Rgba8::rgb(255, 215, 0);
pub const BANNER_BACKDROP: Rgba8 = Rgba8::rgb(0, 0, 0).with_alpha(170);

pub const PLAYER_PALETTE: [Rgba8; 6] = [
    Rgba8::rgb(0, 245, 255), // cyan
    Rgba8::rgb(255, 0, 255), // magenta
    Rgba8::rgb(255, 255, 0), // yellow
    Rgba8::rgb(0, 255, 0),   // green
    Rgba8::rgb(255, 102, 0), // orange
    Rgba8::rgb(255, 0, 102), // pink
];

/// Palette color for the player at `index`, cycling when the roster outgrows the palette.
pub fn player_color(index: usize) -> Rgba8 {
    PLAYER_PALETTE[index % PLAYER_PALETTE.len()]
}

pub fn zone_fill(safe: bool) -> Rgba8 {
    if safe { ZONE_SAFE } else { ZONE_DANGER }
}
