use eframe::egui::{self, Align2, Color32, FontId, Pos2, Sense, Shape, Stroke, Ui, Vec2};
use egui_plot::{Bar, BarChart, Plot};

use crate::color::{generate_palette, ColorScale};
use crate::data::format::format_currency;
use crate::data::hierarchy::{hit_test, SunburstSegment, HIERARCHY_LEVELS};
use crate::data::view::DashboardView;

/// Radians per polygon step when tessellating arcs.
const ARC_STEP: f64 = 0.04;

// ---------------------------------------------------------------------------
// Sunburst (central panel)
// ---------------------------------------------------------------------------

/// Rings sized to fit a square of side `size`.
struct Geometry {
    center: Pos2,
    hole: f32,
    ring: f32,
}

impl Geometry {
    fn new(center: Pos2, size: f32) -> Self {
        let outer = size / 2.0 - 4.0;
        let hole = outer * 0.12;
        Geometry {
            center,
            hole,
            ring: (outer - hole) / HIERARCHY_LEVELS.len() as f32,
        }
    }

    /// Point at `radius` and `angle`, measured clockwise from twelve o'clock.
    fn point(&self, radius: f32, angle: f64) -> Pos2 {
        let (sin, cos) = angle.sin_cos();
        self.center + Vec2::new(radius * sin as f32, -radius * cos as f32)
    }

    /// Ring index and angle under `pos`, if it lies on the chart.
    fn locate(&self, pos: Pos2) -> Option<(usize, f64)> {
        let d = pos - self.center;
        let r = d.length();
        if r < self.hole {
            return None;
        }
        let depth = ((r - self.hole) / self.ring) as usize;
        if depth >= HIERARCHY_LEVELS.len() {
            return None;
        }
        Some((depth, (d.x as f64).atan2(-d.y as f64)))
    }

    fn radii(&self, depth: usize) -> (f32, f32) {
        let inner = self.hole + self.ring * depth as f32;
        (inner, inner + self.ring)
    }
}

/// Render the grants sunburst. Clicking a project opens its record.
pub fn sunburst(ui: &mut Ui, view: &DashboardView) {
    ui.heading("Grants Distribution Hierarchy");
    if view.chart.is_empty() {
        ui.label("No grants match the current filters.");
        return;
    }

    let size = ui.available_width().clamp(320.0, 800.0);
    let (response, painter) = ui.allocate_painter(Vec2::splat(size), Sense::click());
    let geometry = Geometry::new(response.rect.center(), size);

    // One colour scale per ring so each ring uses the full range.
    let scales: Vec<ColorScale> = (0..HIERARCHY_LEVELS.len())
        .map(|depth| {
            ColorScale::spanning(
                view.segments
                    .iter()
                    .filter(|s| s.depth == depth)
                    .map(|s| s.value),
            )
        })
        .collect();

    let background = ui.visuals().panel_fill;
    for segment in &view.segments {
        let fill = scales[segment.depth].color_for(segment.value);
        paint_segment(&painter, &geometry, segment, fill, background);
    }

    let hovered = response
        .hover_pos()
        .and_then(|pos| geometry.locate(pos))
        .and_then(|(depth, angle)| hit_test(&view.segments, depth, angle));

    let Some(segment) = hovered else {
        return;
    };

    if response.clicked() {
        if let Some(url) = segment.links.first() {
            log::info!("Opening {url}");
            ui.ctx().open_url(egui::OpenUrl::new_tab(url));
        }
    }

    response.on_hover_ui_at_pointer(|ui: &mut Ui| {
        ui.strong(segment.path.join(" / "));
        ui.label(format!("{}: {}", HIERARCHY_LEVELS[segment.depth], segment.label));
        ui.label(format!("Amount: {}", format_currency(segment.value)));
        for link in &segment.links {
            ui.label(egui::RichText::new(link).weak().small());
        }
    });
}

fn paint_segment(
    painter: &egui::Painter,
    geometry: &Geometry,
    segment: &SunburstSegment,
    fill: Color32,
    border: Color32,
) {
    let (inner, outer) = geometry.radii(segment.depth);
    let steps = ((segment.sweep() / ARC_STEP).ceil() as usize).max(1);
    let step = segment.sweep() / steps as f64;

    // Each slice of the arc is a convex quad.
    for i in 0..steps {
        let a0 = segment.start + step * i as f64;
        let a1 = a0 + step;
        painter.add(Shape::convex_polygon(
            vec![
                geometry.point(inner, a0),
                geometry.point(outer, a0),
                geometry.point(outer, a1),
                geometry.point(inner, a1),
            ],
            fill,
            Stroke::NONE,
        ));
    }

    let stroke = Stroke::new(1.0, border);
    painter.line_segment(
        [
            geometry.point(inner, segment.start),
            geometry.point(outer, segment.start),
        ],
        stroke,
    );

    // Label only when the arc is long enough to hold a few characters.
    let mid_radius = (inner + outer) / 2.0;
    let arc_len = segment.sweep() as f32 * mid_radius;
    if arc_len > 36.0 {
        let max_chars = ((arc_len / 7.0) as usize).clamp(3, 18);
        painter.text(
            geometry.point(mid_radius, segment.start + segment.sweep() / 2.0),
            Align2::CENTER_CENTER,
            truncate(&segment.label, max_chars),
            FontId::proportional(11.0),
            Color32::WHITE,
        );
    }
}

fn truncate(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        label.to_string()
    } else {
        let mut short: String = label.chars().take(max_chars.saturating_sub(1)).collect();
        short.push('…');
        short
    }
}

// ---------------------------------------------------------------------------
// Strategy totals
// ---------------------------------------------------------------------------

/// Bar chart of the filtered amount per strategy.
pub fn strategy_bars(ui: &mut Ui, view: &DashboardView) {
    if view.strategy_totals.is_empty() {
        return;
    }
    ui.heading("Amount by Strategy");

    let colors = generate_palette(view.strategy_totals.len());
    let bars: Vec<Bar> = view
        .strategy_totals
        .iter()
        .zip(colors)
        .enumerate()
        .map(|(i, ((strategy, total), color))| {
            Bar::new(i as f64, *total)
                .name(strategy)
                .fill(color)
                .width(0.7)
        })
        .collect();

    Plot::new("strategy_totals")
        .height(260.0)
        .y_axis_label("Amount")
        .show_axes([false, true])
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("Amount"));
        });
}
