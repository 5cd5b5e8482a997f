use serde::Serialize;
use sqlx::PgPool;

/// Scan counts per day over the trailing week, oldest first.
#[derive(Debug, Clone, Serialize)]
pub struct DailyScans {
    pub day: String,
    pub scans: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SuccessBreakdown {
    pub successful: i64,
    pub rejected: i64,
}

/// Aggregate view over users, posts and scans. Null-tolerant: missing
/// `durian_count`/`export_ready` values count as zero.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsSnapshot {
    pub total_users: i64,
    pub total_posts: i64,
    pub total_scans: i64,
    pub total_durians_detected: i64,
    pub overall_success_rate: f64,
    pub daily_scans: Vec<DailyScans>,
    pub scan_success_breakdown: SuccessBreakdown,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserStats {
    pub total_users: i64,
    pub active_users: i64,
    pub admin_users: i64,
    pub inactive_users: i64,
}

async fn count(db: &PgPool, sql: &str) -> anyhow::Result<i64> {
    Ok(sqlx::query_scalar::<_, i64>(sql).fetch_one(db).await?)
}

// Day-aligned window: truncating now() keeps the oldest bucket a full
// calendar day instead of a partial one.
const DAILY_SCANS_SQL: &str =
    "SELECT to_char(date_trunc('day', created_at), 'Dy') AS day, COUNT(*)::bigint AS scans \
     FROM scans \
     WHERE created_at >= date_trunc('day', now()) - interval '6 days' \
     GROUP BY date_trunc('day', created_at) \
     ORDER BY date_trunc('day', created_at)";

pub async fn user_stats(db: &PgPool) -> anyhow::Result<UserStats> {
    let total_users = count(db, "SELECT COUNT(*) FROM users").await?;
    let active_users = count(db, "SELECT COUNT(*) FROM users WHERE is_active").await?;
    let admin_users = count(db, "SELECT COUNT(*) FROM users WHERE role = 'admin'").await?;
    Ok(UserStats {
        total_users,
        active_users,
        admin_users,
        inactive_users: total_users - active_users,
    })
}

pub async fn snapshot(db: &PgPool) -> anyhow::Result<AnalyticsSnapshot> {
    let total_users = count(db, "SELECT COUNT(*) FROM users").await?;
    let total_posts = count(db, "SELECT COUNT(*) FROM posts").await?;
    let total_scans = count(db, "SELECT COUNT(*) FROM scans").await?;

    let total_durians_detected = count(
        db,
        "SELECT COALESCE(SUM(durian_count), 0)::bigint FROM scans",
    )
    .await?;

    let overall_success_rate = sqlx::query_scalar::<_, f64>(
        "SELECT COALESCE(AVG(CASE WHEN export_ready THEN 1.0 ELSE 0.0 END), 0)::float8 FROM scans",
    )
    .fetch_one(db)
    .await?;

    let (successful, rejected) = sqlx::query_as::<_, (i64, i64)>(
        "SELECT COUNT(*) FILTER (WHERE export_ready), \
                COUNT(*) FILTER (WHERE export_ready IS NOT TRUE) \
         FROM scans",
    )
    .fetch_one(db)
    .await?;

    let daily_scans = sqlx::query_as::<_, (String, i64)>(DAILY_SCANS_SQL)
    .fetch_all(db)
    .await?
    .into_iter()
    .map(|(day, scans)| DailyScans { day, scans })
    .collect();

    Ok(AnalyticsSnapshot {
        total_users,
        total_posts,
        total_scans,
        total_durians_detected,
        overall_success_rate: round2(overall_success_rate),
        daily_scans,
        scan_success_breakdown: SuccessBreakdown {
            successful,
            rejected,
        },
    })
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn daily_window_starts_on_a_day_boundary() {
        assert!(DAILY_SCANS_SQL.contains("created_at >= date_trunc('day', now()) - interval '6 days'"));
    }

    #[test]
    fn round2_truncates_to_two_decimals() {
        assert_eq!(round2(0.8666666), 0.87);
        assert_eq!(round2(0.0), 0.0);
        assert_eq!(round2(1.0), 1.0);
        assert_eq!(round2(0.125), 0.13);
    }

    #[test]
    fn snapshot_serializes_report_fields() {
        let snap = AnalyticsSnapshot {
            total_users: 10,
            total_posts: 4,
            total_scans: 25,
            total_durians_detected: 87,
            overall_success_rate: 0.72,
            daily_scans: vec![DailyScans {
                day: "Mon".into(),
                scans: 5,
            }],
            scan_success_breakdown: SuccessBreakdown {
                successful: 18,
                rejected: 7,
            },
        };
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["total_durians_detected"], 87);
        assert_eq!(json["daily_scans"][0]["day"], "Mon");
        assert_eq!(json["scan_success_breakdown"]["successful"], 18);
    }
}
