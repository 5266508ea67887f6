//! Turns the app state into what should be on screen. No drawing here, so
//! every layout decision is testable without a window.

use std::time::Instant;

use crate::app::App;
use crate::color::parse_hex;
use crate::config::UiConfig;
use crate::types::{Color, PermissionState, Rect};

pub const CHECKING_TEXT: &str = "Checking camera permission...";
pub const DENIED_TEXT: &str = "Camera permission denied";
pub const UNAVAILABLE_TEXT: &str = "Camera unavailable";
pub const COPIED_TEXT: &str = "Copied!!";

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Status { message: String },
    Live(LiveView),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiveView {
    pub marker: Rect,
    pub marker_border: u32,
    pub marker_color: Color,
    /// Absent until the first sample.
    pub pill: Option<Pill>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PillLabel {
    Code(String),
    Copied,
}

impl PillLabel {
    pub fn text(&self) -> &str {
        match self {
            PillLabel::Code(code) => code,
            PillLabel::Copied => COPIED_TEXT,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pill {
    pub bounds: Rect,
    pub radius: u32,
    pub background: Color,
    pub foreground: Color,
    pub label: PillLabel,
    pub text_origin: (f32, f32),
}

/// Box of `size` plus `border` on each side, centered on the view.
pub fn marker_rect(view_w: u32, view_h: u32, size: u32, border: u32) -> Rect {
    let outer = (size + 2 * border) as f32;
    Rect::new(
        view_w as f32 / 2.0 - outer / 2.0,
        view_h as f32 / 2.0 - outer / 2.0,
        outer,
        outer,
    )
}

/// Horizontally centered, bottom edge a third of the view width above the
/// bottom of the view, kept inside the view vertically.
pub fn pill_rect(view_w: u32, view_h: u32, text: (usize, usize), padding: u32) -> Rect {
    let pad = padding as f32;
    let width = text.0 as f32 + 2.0 * pad;
    let height = text.1 as f32 + 2.0 * pad;
    let bottom = view_h as f32 - view_w as f32 / 3.0;
    let max_y = (view_h as f32 - height).max(0.0);
    let y = (bottom - height).clamp(0.0, max_y);
    let x = (view_w as f32 - width) / 2.0;
    Rect::new(x, y, width, height)
}

pub fn pill_label(app: &App, now: Instant) -> Option<PillLabel> {
    let code = app.code()?;
    Some(if app.is_copied(now) {
        PillLabel::Copied
    } else {
        PillLabel::Code(code)
    })
}

pub fn present<M>(app: &App, now: Instant, view: (u32, u32), ui: &UiConfig, measure: M) -> View
where
    M: Fn(&str) -> (usize, usize),
{
    match app.permission() {
        PermissionState::Unknown => {
            return View::Status {
                message: CHECKING_TEXT.to_string(),
            }
        }
        PermissionState::Denied => {
            return View::Status {
                message: DENIED_TEXT.to_string(),
            }
        }
        PermissionState::Granted => {}
    }
    if app.stream_error().is_some() {
        return View::Status {
            message: UNAVAILABLE_TEXT.to_string(),
        };
    }

    let (w, h) = view;
    let pill = match (app.sample(), pill_label(app, now)) {
        (Some(color), Some(label)) => {
            let text = measure(label.text());
            let bounds = pill_rect(w, h, text, ui.pill_padding);
            let pad = ui.pill_padding as f32;
            Some(Pill {
                bounds,
                radius: ui.pill_radius,
                background: color,
                foreground: color.inverted(),
                text_origin: (bounds.x + pad, bounds.y + pad),
                label,
            })
        }
        _ => None,
    };

    View::Live(LiveView {
        marker: marker_rect(w, h, ui.marker_size, ui.marker_border),
        marker_border: ui.marker_border,
        marker_color: parse_hex(&ui.marker_color_hex).unwrap_or(Color::BLACK),
        pill,
    })
}
