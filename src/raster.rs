use std::fmt::Write as _;

use crate::{
    compile::{DrawOp, FramePlan, TextAnchor, TextRole},
    core::Rgba8,
    error::{ReplayError, ReplayResult},
    fonts::{FALLBACK_FAMILY, FontSet, font_resolver},
    render::FrameRGBA,
};

/// Rasterize a frame plan on the CPU.
///
/// The plan is lowered to SVG markup and rendered with `resvg`, which also shapes the text
/// against the font set. Text whose font cannot be resolved is dropped, never fatal.
pub fn rasterize(plan: &FramePlan, fonts: &FontSet) -> ReplayResult<FrameRGBA> {
    let svg = plan_to_svg(plan, fonts);

    let opts = usvg::Options {
        fontdb: fonts.fontdb(),
        font_resolver: font_resolver(),
        ..Default::default()
    };
    let tree = usvg::Tree::from_str(&svg, &opts)
        .map_err(|e| ReplayError::render(format!("build frame tree: {e}")))?;

    let (width, height) = (plan.canvas.width, plan.canvas.height);
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height).ok_or_else(|| {
        ReplayError::render(format!("failed to allocate {width}x{height} frame pixmap"))
    })?;
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::default(),
        &mut pixmap.as_mut(),
    );

    Ok(FrameRGBA {
        width,
        height,
        data: pixmap.data().to_vec(),
        premultiplied: true,
    })
}

/// Lower a frame plan to a standalone SVG document.
pub fn plan_to_svg(plan: &FramePlan, fonts: &FontSet) -> String {
    let (w, h) = (plan.canvas.width, plan.canvas.height);
    let family = font_family_attr(fonts.family());

    // Writing into a String cannot fail.
    let mut out = String::with_capacity(256 + plan.ops.len() * 96);
    let _ = write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
    );
    let _ = write!(
        out,
        r#"<rect x="0" y="0" width="{w}" height="{h}"{}/>"#,
        fill_attrs(plan.background)
    );

    for op in &plan.ops {
        match op {
            DrawOp::Rect { rect, fill, stroke } => {
                let _ = write!(
                    out,
                    r#"<rect x="{}" y="{}" width="{}" height="{}"{}"#,
                    rect.x0,
                    rect.y0,
                    rect.width(),
                    rect.height(),
                    fill_attrs(*fill)
                );
                if let Some(s) = stroke {
                    let _ = write!(out, r#" stroke="{}" stroke-width="1""#, s.hex());
                }
                out.push_str("/>");
            }
            DrawOp::Circle {
                center,
                radius,
                fill,
            } => {
                let _ = write!(
                    out,
                    r#"<circle cx="{}" cy="{}" r="{radius}"{}/>"#,
                    center.x,
                    center.y,
                    fill_attrs(*fill)
                );
            }
            DrawOp::Line {
                from,
                to,
                color,
                width,
            } => {
                let _ = write!(
                    out,
                    r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{width}" stroke-linecap="butt"/>"#,
                    from.x,
                    from.y,
                    to.x,
                    to.y,
                    color.hex()
                );
            }
            DrawOp::Text {
                pos,
                text,
                role,
                anchor,
                color,
            } => {
                let _ = write!(
                    out,
                    r#"<text x="{}" y="{}" font-family="{family}" font-size="{}" font-weight="{}" text-anchor="{}"{}>{}</text>"#,
                    pos.x,
                    pos.y,
                    role_size(fonts, *role),
                    if role.is_bold() { "bold" } else { "normal" },
                    anchor_attr(*anchor),
                    fill_attrs(*color),
                    escape_xml(text)
                );
            }
        }
    }

    out.push_str("</svg>");
    out
}

fn role_size(fonts: &FontSet, role: TextRole) -> f32 {
    match role {
        TextRole::Header => fonts.sizes.header,
        TextRole::Body => fonts.sizes.body,
        TextRole::Small => fonts.sizes.small,
        TextRole::Banner => fonts.sizes.banner,
    }
}

fn anchor_attr(anchor: TextAnchor) -> &'static str {
    match anchor {
        TextAnchor::Start => "start",
        TextAnchor::Middle => "middle",
        TextAnchor::End => "end",
    }
}

fn fill_attrs(c: Rgba8) -> String {
    if c.a == 255 {
        format!(r#" fill="{}""#, c.hex())
    } else {
        format!(r#" fill="{}" fill-opacity="{:.4}""#, c.hex(), c.opacity())
    }
}

fn font_family_attr(family: &str) -> String {
    if family == FALLBACK_FAMILY {
        FALLBACK_FAMILY.to_string()
    } else {
        format!("'{}', {FALLBACK_FAMILY}", escape_xml(&family.replace('\'', "")))
    }
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}
