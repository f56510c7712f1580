use crate::size::fmt_num;

/// Inset, in pixels, between a corner-anchored overlay and the base edges.
/// Fixed by contract; callers needing other margins use `Custom`.
pub const ANCHOR_INSET: u32 = 10;

/// Where an overlay sits on the base video.
///
/// The four corner anchors inset the overlay [`ANCHOR_INSET`] units from
/// the relevant base edges; `Center` splits the leftover space evenly.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Center,
    Custom { x: f64, y: f64 },
}

impl Default for Position {
    fn default() -> Self {
        Position::Custom { x: 0.0, y: 0.0 }
    }
}

impl Position {
    /// Resolve to the backend's `(x, y)` positioning expressions.
    ///
    /// `main_w`/`main_h` are the base extents, `overlay_w`/`overlay_h`
    /// the overlay's own extents after any scaling stage.
    pub fn resolve(self) -> (String, String) {
        let inset = ANCHOR_INSET;
        match self {
            Position::TopLeft => (format!("{inset}"), format!("{inset}")),
            Position::TopRight => (format!("main_w-overlay_w-{inset}"), format!("{inset}")),
            Position::BottomLeft => (format!("{inset}"), format!("main_h-overlay_h-{inset}")),
            Position::BottomRight => (
                format!("main_w-overlay_w-{inset}"),
                format!("main_h-overlay_h-{inset}"),
            ),
            Position::Center => (
                "(main_w-overlay_w)/2".to_string(),
                "(main_h-overlay_h)/2".to_string(),
            ),
            Position::Custom { x, y } => (fmt_num(x), fmt_num(y)),
        }
    }
}
