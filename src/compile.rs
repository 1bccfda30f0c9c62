use crate::{
    core::{Canvas, Point, Rect, Rgba8},
    layout::GridLayout,
    model::{Player, Tick, roster_index},
    style,
};

/// Length of a drawn shot, in cells.
pub const SHOT_LENGTH_CELLS: i64 = 5;
pub const SHOT_WIDTH: f64 = 2.0;
pub const HP_PIPS: i64 = 3;

const FOOTER_ENTRY_WIDTH: f64 = 200.0;
const FOOTER_ROW_HEIGHT: f64 = 44.0;
const FOOTER_MAX_ROWS: usize = 2;
const FOOTER_TOKEN_SIZE: f64 = 20.0;
const HEADER_TOP: f64 = 15.0;
const BANNER_HEIGHT: f64 = 80.0;
// Approximate ascent as a fraction of the font size; text ops are positioned by baseline.
const ASCENT: f64 = 0.8;

/// Everything needed to rasterize one frame, in paint order.
#[derive(Clone, Debug, PartialEq)]
pub struct FramePlan {
    pub canvas: Canvas,
    pub background: Rgba8,
    pub ops: Vec<DrawOp>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    Rect {
        rect: Rect,
        fill: Rgba8,
        stroke: Option<Rgba8>,
    },
    Circle {
        center: Point,
        radius: f64,
        fill: Rgba8,
    },
    Line {
        from: Point,
        to: Point,
        color: Rgba8,
        width: f64,
    },
    Text {
        /// Baseline anchor point.
        pos: Point,
        text: String,
        role: TextRole,
        anchor: TextAnchor,
        color: Rgba8,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextRole {
    Header,
    Body,
    Small,
    Banner,
}

impl TextRole {
    pub fn is_bold(self) -> bool {
        !matches!(self, Self::Small)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

/// An alive player drawn on the board.
#[derive(Clone, Debug, PartialEq)]
pub struct BoardToken {
    pub bot_id: String,
    pub center: Point,
    pub color: Rgba8,
    pub hp: i64,
}

/// One roster entry of the footer band.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FooterEntry {
    pub name: String,
    pub color: Rgba8,
    pub alive: bool,
    pub hp: i64,
}

impl FooterEntry {
    pub fn status_label(&self) -> String {
        if self.alive {
            format!("HP: {}", self.hp)
        } else {
            "ELIMINATED".to_string()
        }
    }

    /// Token and name color: the player color, greyed out once eliminated.
    pub fn display_color(&self) -> Rgba8 {
        if self.alive { self.color } else { style::DIMMED }
    }
}

/// A shot resolved to pixel space. Unknown directions give `from == to`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShotSegment {
    pub from: Point,
    pub to: Point,
}

/// Compile one tick into a frame plan.
///
/// Never fails: missing zone, hp, alive or shot fields fall back to their defaults.
pub fn compile_frame(tick: &Tick, roster: &[Player], grid_size: u32) -> FramePlan {
    let layout = GridLayout::new(grid_size);
    let mut ops = Vec::new();

    push_board(&mut ops, &layout, tick);

    for token in board_tokens(tick, roster, &layout) {
        push_token(&mut ops, &layout, &token);
    }

    push_header(&mut ops, &layout, tick);
    push_footer(&mut ops, &layout, &footer_entries(tick, roster));

    for seg in shot_segments(tick, &layout) {
        ops.push(DrawOp::Line {
            from: seg.from,
            to: seg.to,
            color: style::SHOT,
            width: SHOT_WIDTH,
        });
    }

    FramePlan {
        canvas: layout.canvas(),
        background: style::BACKGROUND,
        ops,
    }
}

/// Append a centered victory banner naming `winner`.
pub fn compile_winner_banner(plan: &mut FramePlan, winner: &str, font_px: f32) {
    let w = f64::from(plan.canvas.width);
    let cy = f64::from(plan.canvas.height) / 2.0;
    let size = f64::from(font_px);

    plan.ops.push(DrawOp::Rect {
        rect: Rect::new(0.0, cy - BANNER_HEIGHT / 2.0, w, cy + BANNER_HEIGHT / 2.0),
        fill: style::BANNER_BACKDROP,
        stroke: None,
    });
    plan.ops.push(DrawOp::Text {
        pos: Point::new(w / 2.0, cy + size * 0.35),
        text: format!("{winner} WINS!"),
        role: TextRole::Banner,
        anchor: TextAnchor::Middle,
        color: style::WINNER,
    });
}

/// Alive players in tick order. Dead players are omitted; the footer still lists them.
pub fn board_tokens(tick: &Tick, roster: &[Player], layout: &GridLayout) -> Vec<BoardToken> {
    tick.players
        .iter()
        .enumerate()
        .filter(|(_, p)| p.is_alive())
        .map(|(i, p)| {
            let slot = roster_index(roster, &p.bot_id).unwrap_or(i);
            BoardToken {
                bot_id: p.bot_id.clone(),
                center: layout.cell_center(p.x, p.y),
                color: style::player_color(slot),
                hp: p.hp(),
            }
        })
        .collect()
}

/// Footer entries in roster order. A player absent from the tick counts as eliminated with 0 HP.
pub fn footer_entries(tick: &Tick, roster: &[Player]) -> Vec<FooterEntry> {
    roster
        .iter()
        .enumerate()
        .map(|(i, player)| {
            let state = tick.state_for(&player.id);
            FooterEntry {
                name: player.name.clone(),
                color: style::player_color(i),
                alive: state.is_some_and(|s| s.is_alive()),
                hp: state.map_or(0, |s| s.hp()),
            }
        })
        .collect()
}

pub fn shot_segments(tick: &Tick, layout: &GridLayout) -> Vec<ShotSegment> {
    tick.shots()
        .filter_map(|shot| {
            let (x, y) = shot.from.or_else(|| {
                let state = tick.state_for(shot.bot_id.as_deref()?)?;
                Some((state.x, state.y))
            })?;
            let (dx, dy) = shot.direction.map_or((0, 0), |d| d.unit());
            let (x, y) = (layout.clamp_coord(x), layout.clamp_coord(y));
            Some(ShotSegment {
                from: layout.cell_center(x, y),
                to: layout.cell_center(
                    x.saturating_add(dx * SHOT_LENGTH_CELLS),
                    y.saturating_add(dy * SHOT_LENGTH_CELLS),
                ),
            })
        })
        .collect()
}

fn push_board(ops: &mut Vec<DrawOp>, layout: &GridLayout, tick: &Tick) {
    let zone = tick.zone(layout.grid_size);
    let n = i64::from(layout.grid_size);
    for y in 0..n {
        for x in 0..n {
            ops.push(DrawOp::Rect {
                rect: layout.cell_rect(x, y),
                fill: style::zone_fill(zone.contains(x, y)),
                stroke: Some(style::GRID_LINE),
            });
        }
    }
}

fn push_token(ops: &mut Vec<DrawOp>, layout: &GridLayout, token: &BoardToken) {
    let r = layout.token_radius();
    let c = token.center;
    ops.push(DrawOp::Circle {
        center: c,
        radius: r,
        fill: token.color,
    });

    for h in 0..HP_PIPS {
        let x = c.x - 12.0 + (h * 10) as f64;
        let y = c.y - r - 8.0;
        ops.push(DrawOp::Rect {
            rect: Rect::new(x, y, x + 7.0, y + 5.0),
            fill: if h < token.hp {
                style::HP_FILLED
            } else {
                style::HP_EMPTY
            },
            stroke: None,
        });
    }
}

fn push_header(ops: &mut Vec<DrawOp>, layout: &GridLayout, tick: &Tick) {
    let zone = tick.zone(layout.grid_size);
    let pad = f64::from(layout.padding);
    let right = f64::from(layout.canvas().width) - pad;

    ops.push(DrawOp::Text {
        pos: Point::new(pad, HEADER_TOP + 24.0 * ASCENT),
        text: format!("GRID ROYALE - Tick {}", tick.tick),
        role: TextRole::Header,
        anchor: TextAnchor::Start,
        color: style::TITLE,
    });
    ops.push(DrawOp::Text {
        pos: Point::new(right, HEADER_TOP + 16.0 * ASCENT),
        text: format!("Zone: {}-{}", zone.min, zone.max),
        role: TextRole::Body,
        anchor: TextAnchor::End,
        color: style::TEXT,
    });
}

fn push_footer(ops: &mut Vec<DrawOp>, layout: &GridLayout, entries: &[FooterEntry]) {
    if entries.is_empty() {
        return;
    }

    let pad = f64::from(layout.padding);
    let usable = f64::from(layout.canvas().width) - pad * 2.0;
    let fit = ((usable / FOOTER_ENTRY_WIDTH).floor() as usize).max(1);
    let per_row = fit.max(entries.len().div_ceil(FOOTER_MAX_ROWS));
    let entry_w = if per_row > fit {
        usable / per_row as f64
    } else {
        FOOTER_ENTRY_WIDTH
    };
    let top = layout.footer_top() + 12.0;

    for (i, entry) in entries.iter().enumerate() {
        let x = pad + (i % per_row) as f64 * entry_w;
        let y = top + (i / per_row) as f64 * FOOTER_ROW_HEIGHT;
        let half = FOOTER_TOKEN_SIZE / 2.0;
        let color = entry.display_color();

        ops.push(DrawOp::Circle {
            center: Point::new(x + half, y + half),
            radius: half,
            fill: color,
        });
        ops.push(DrawOp::Text {
            pos: Point::new(x + 30.0, y + 16.0 * ASCENT),
            text: entry.name.clone(),
            role: TextRole::Body,
            anchor: TextAnchor::Start,
            color,
        });
        ops.push(DrawOp::Text {
            pos: Point::new(x + 30.0, y + 20.0 + 12.0 * ASCENT),
            text: entry.status_label(),
            role: TextRole::Small,
            anchor: TextAnchor::Start,
            color: style::TEXT,
        });
    }
}
