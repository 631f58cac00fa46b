//! Plotters-powered time-series chart widget for Ratatui.
//!
//! Used for the consumption line, the stacked production areas and the
//! production-mix pie.
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
// Only `Style` comes from ratatui: its `Color` would shadow the plotters
// `Color` trait that provides `.filled()`.
use ratatui::{buffer::Buffer, layout::Rect, style::Style, widgets::Widget};

/// One drawn series.
pub struct Layer<'a> {
    pub points: &'a [(f64, f64)],
    pub color: RGBColor,
    /// Fill down to zero instead of drawing a line.
    pub filled: bool,
}

/// A lightweight, render-only chart description.
///
/// All series and bounds are computed outside the render call; layers are
/// drawn in slice order, so later layers overlay earlier ones.
pub struct SeriesChart<'a> {
    pub layers: &'a [Layer<'a>],
    /// X bounds (hours since the first reading).
    pub x_bounds: [f64; 2],
    /// Y bounds (MW).
    pub y_bounds: [f64; 2],
    pub fmt_x: &'a dyn Fn(f64) -> String,
    pub fmt_y: fn(f64) -> String,
}

impl<'a> Widget for SeriesChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(ratatui::style::Color::Yellow),
            );
            return;
        }

        let x0 = self.x_bounds[0];
        let x1 = self.x_bounds[1];
        let y0 = self.y_bounds[0];
        let y1 = self.y_bounds[1];

        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            // Mesh lines are too noisy at terminal resolution.
            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_labels(4)
                .y_labels(5)
                .x_label_formatter(&|v| (self.fmt_x)(*v))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            for layer in self.layers {
                if layer.filled {
                    chart.draw_series(AreaSeries::new(
                        layer.points.iter().copied(),
                        0.0,
                        layer.color.filled(),
                    ))?;
                } else {
                    chart.draw_series(LineSeries::new(layer.points.iter().copied(), &layer.color))?;
                }
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}

/// Production mix as a pie, slices clockwise from twelve o'clock in slice order.
///
/// Shares are printed beside the pie, so slices carry no labels.
pub struct MixPie<'a> {
    pub sizes: &'a [f64],
    pub colors: &'a [RGBColor],
}

impl Widget for MixPie<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 6 || area.height < 3 {
            return;
        }
        // Plotters divides by the total.
        let total: f64 = self.sizes.iter().sum();
        if !(total > 0.0) || self.sizes.len() != self.colors.len() {
            return;
        }

        let widget = widget_fn(move |root| {
            let (w, h) = root.dim_in_pixel();
            let center = ((w / 2) as i32, (h / 2) as i32);
            let radius = f64::from(w.min(h)) * 0.45;
            let labels = vec![""; self.sizes.len()];

            let mut pie = Pie::new(&center, &radius, self.sizes, self.colors, &labels);
            pie.start_angle(-90.0);
            root.draw(&pie)?;
            Ok(())
        });

        widget.render(area, buf);
    }
}
