use plotters::prelude::*;

use crate::analytics::{DailyScans, SuccessBreakdown};

/// Raw RGB chart render, embedded into the PDF as an image.
pub struct ChartImage {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

const BAR_COLORS: &[RGBColor] = &[
    RGBColor(0x27, 0xAE, 0x60),
    RGBColor(0x2E, 0xCC, 0x71),
    RGBColor(0x1A, 0xBC, 0x9C),
    RGBColor(0x16, 0xA0, 0x85),
    RGBColor(0x34, 0x98, 0xDB),
    RGBColor(0x9B, 0x59, 0xB6),
    RGBColor(0xE6, 0x7E, 0x22),
];

const SUCCESS_GREEN: RGBColor = RGBColor(0x10, 0xB9, 0x81);
const REJECTED_RED: RGBColor = RGBColor(0xEF, 0x44, 0x44);

fn chart_err<E: std::fmt::Display>(e: E) -> anyhow::Error {
    anyhow::anyhow!("chart render: {e}")
}

/// Bar chart of scans per day over the trailing week. None when there is
/// nothing to plot.
pub fn weekly_scans_chart(daily: &[DailyScans]) -> anyhow::Result<Option<ChartImage>> {
    if daily.is_empty() {
        return Ok(None);
    }

    let (w, h) = (640u32, 240u32);
    let mut buf = vec![0u8; (w * h * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buf, (w, h)).into_drawing_area();
        root.fill(&WHITE).map_err(chart_err)?;

        let max = daily.iter().map(|d| d.scans).max().unwrap_or(0).max(1);
        let margin = 20i32;
        let base = h as i32 - margin;
        let plot_h = h as i32 - margin * 2;
        let slot = (w as i32 - margin * 2) / daily.len() as i32;
        let bar_w = (slot as f64 * 0.7) as i32;

        for (i, d) in daily.iter().enumerate() {
            let x0 = margin + slot * i as i32 + (slot - bar_w) / 2;
            let bar_h = ((d.scans as f64 / max as f64) * plot_h as f64) as i32;
            let color = BAR_COLORS[i % BAR_COLORS.len()];
            root.draw(&Rectangle::new(
                [(x0, base - bar_h), (x0 + bar_w, base)],
                color.filled(),
            ))
            .map_err(chart_err)?;
        }
        root.present().map_err(chart_err)?;
    }

    Ok(Some(ChartImage {
        width: w,
        height: h,
        rgb: buf,
    }))
}

/// Two-bar successful/rejected comparison. None when no scans exist.
pub fn success_breakdown_chart(b: &SuccessBreakdown) -> anyhow::Result<Option<ChartImage>> {
    let total = b.successful + b.rejected;
    if total == 0 {
        return Ok(None);
    }

    let (w, h) = (320u32, 240u32);
    let mut buf = vec![0u8; (w * h * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buf, (w, h)).into_drawing_area();
        root.fill(&WHITE).map_err(chart_err)?;

        let margin = 20i32;
        let base = h as i32 - margin;
        let plot_h = h as i32 - margin * 2;
        let max = b.successful.max(b.rejected).max(1);
        let slot = (w as i32 - margin * 2) / 2;
        let bar_w = (slot as f64 * 0.6) as i32;

        for (i, (value, color)) in [(b.successful, SUCCESS_GREEN), (b.rejected, REJECTED_RED)]
            .into_iter()
            .enumerate()
        {
            let x0 = margin + slot * i as i32 + (slot - bar_w) / 2;
            let bar_h = ((value as f64 / max as f64) * plot_h as f64) as i32;
            root.draw(&Rectangle::new(
                [(x0, base - bar_h), (x0 + bar_w, base)],
                color.filled(),
            ))
            .map_err(chart_err)?;
        }
        root.present().map_err(chart_err)?;
    }

    Ok(Some(ChartImage {
        width: w,
        height: h,
        rgb: buf,
    }))
}
