pub mod charts;

use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    routing::get,
    Router,
};
use printpdf::{
    image_crate::{DynamicImage, RgbImage},
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument, PdfLayerReference,
};
use tracing::{info, instrument};

use crate::{
    analytics::{self, AnalyticsSnapshot},
    auth::extractors::AdminUser,
    error::ApiError,
    state::AppState,
};

use charts::ChartImage;

pub fn router() -> Router<AppState> {
    Router::new().route("/admin/analytics/pdf", get(download_pdf))
}

#[instrument(skip(state, _admin))]
pub async fn download_pdf(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, ApiError> {
    let snapshot = analytics::snapshot(&state.db).await?;

    // Chart + PDF rendering is CPU-bound; keep it off the runtime threads.
    let pdf = tokio::task::spawn_blocking(move || render_report(&snapshot))
        .await
        .map_err(|e| ApiError::Internal(anyhow::anyhow!(e)))??;

    info!(bytes = pdf.len(), "analytics report rendered");
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=gen_admin_analytics.pdf",
            ),
        ],
        pdf,
    ))
}

pub fn render_report(snap: &AnalyticsSnapshot) -> anyhow::Result<Vec<u8>> {
    let (doc, page1, layer1) = PdfDocument::new(
        "Durian App Analytics Report",
        Mm(210.0),
        Mm(297.0),
        "Layer 1",
    );
    let layer = doc.get_page(page1).get_layer(layer1);
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;

    layer.use_text(
        "Durian App Analytics Report",
        18.0,
        Mm(20.0),
        Mm(275.0),
        &bold,
    );

    let fmt = time::macros::format_description!("[month]/[day]/[year], [hour]:[minute] UTC");
    let generated = time::OffsetDateTime::now_utc().format(&fmt)?;
    layer.use_text(
        format!("Generated at: {generated}"),
        10.0,
        Mm(20.0),
        Mm(267.0),
        &regular,
    );

    let lines = [
        format!("Total Users: {}", snap.total_users),
        format!("Total Posts: {}", snap.total_posts),
        format!("Total Scans: {}", snap.total_scans),
        format!("Durians Detected: {}", snap.total_durians_detected),
        format!(
            "Overall Success Rate: {:.0}%",
            snap.overall_success_rate * 100.0
        ),
    ];
    let mut y = 255.0;
    for line in lines {
        layer.use_text(line, 12.0, Mm(20.0), Mm(y), &regular);
        y -= 8.0;
    }

    if let Some(chart) = charts::weekly_scans_chart(&snap.daily_scans)? {
        layer.use_text("Weekly Scan Activity", 13.0, Mm(20.0), Mm(202.0), &bold);
        embed_chart(&layer, chart, Mm(20.0), Mm(146.0))?;
    }

    if let Some(chart) = charts::success_breakdown_chart(&snap.scan_success_breakdown)? {
        layer.use_text("Scan Success Breakdown", 13.0, Mm(20.0), Mm(134.0), &bold);
        embed_chart(&layer, chart, Mm(20.0), Mm(78.0))?;
        legend(&layer, &regular, snap);
    }

    Ok(doc.save_to_bytes()?)
}

fn legend(layer: &PdfLayerReference, font: &IndirectFontRef, snap: &AnalyticsSnapshot) {
    let b = &snap.scan_success_breakdown;
    layer.use_text(
        format!("Successful: {}", b.successful),
        10.0,
        Mm(100.0),
        Mm(112.0),
        font,
    );
    layer.use_text(
        format!("Rejected: {}", b.rejected),
        10.0,
        Mm(100.0),
        Mm(104.0),
        font,
    );
}

fn embed_chart(
    layer: &PdfLayerReference,
    chart: ChartImage,
    x: Mm,
    y: Mm,
) -> anyhow::Result<()> {
    let img = RgbImage::from_raw(chart.width, chart.height, chart.rgb)
        .ok_or_else(|| anyhow::anyhow!("chart buffer size mismatch"))?;
    let image = Image::from_dynamic_image(&DynamicImage::ImageRgb8(img));
    image.add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(x),
            translate_y: Some(y),
            dpi: Some(120.0),
            ..Default::default()
        },
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::{DailyScans, SuccessBreakdown};

    fn sample() -> AnalyticsSnapshot {
        AnalyticsSnapshot {
            total_users: 42,
            total_posts: 13,
            total_scans: 120,
            total_durians_detected: 301,
            overall_success_rate: 0.87,
            daily_scans: vec![
                DailyScans {
                    day: "Mon".into(),
                    scans: 12,
                },
                DailyScans {
                    day: "Tue".into(),
                    scans: 20,
                },
                DailyScans {
                    day: "Wed".into(),
                    scans: 7,
                },
            ],
            scan_success_breakdown: SuccessBreakdown {
                successful: 104,
                rejected: 16,
            },
        }
    }

    #[test]
    fn report_renders_to_pdf_bytes() {
        let bytes = render_report(&sample()).expect("render");
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 1024);
    }

    #[test]
    fn report_renders_without_scan_data() {
        let snap = AnalyticsSnapshot {
            daily_scans: vec![],
            scan_success_breakdown: SuccessBreakdown {
                successful: 0,
                rejected: 0,
            },
            ..sample()
        };
        let bytes = render_report(&snap).expect("render");
        assert!(bytes.starts_with(b"%PDF"));
    }
}
