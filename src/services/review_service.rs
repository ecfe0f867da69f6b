use crate::models::productivity::{
    ActivityDetail, ActivityReviewSummary, BucketSummary, ReviewBucket, ReviewBuckets, ReviewItem,
    ReviewTotals, UserDetail,
};

/// Maps a free-form review status onto a bucket. Anything unrecognised,
/// including a missing status, is pending.
pub fn classify_status(status: Option<&str>) -> ReviewBucket {
    let Some(status) = status.map(|value| value.trim().to_lowercase()) else {
        return ReviewBucket::Pendientes;
    };
    if status.starts_with("terminad") || status == "done" || status == "completed" {
        ReviewBucket::Terminadas
    } else if status.starts_with("confirmad") || status == "confirmed" {
        ReviewBucket::Confirmadas
    } else {
        ReviewBucket::Pendientes
    }
}

/// Places each item in exactly one bucket, keeping input order within a
/// bucket.
pub fn bucket_items<I>(items: I) -> ReviewBuckets
where
    I: IntoIterator<Item = ReviewItem>,
{
    let mut buckets = ReviewBuckets::default();
    for item in items {
        match classify_status(item.status.as_deref()) {
            ReviewBucket::Terminadas => buckets.terminadas.push(item),
            ReviewBucket::Confirmadas => buckets.confirmadas.push(item),
            ReviewBucket::Pendientes => buckets.pendientes.push(item),
        }
    }
    buckets
}

pub fn summarize_bucket(items: &[ReviewItem]) -> BucketSummary {
    BucketSummary {
        cantidad: items.len() as u64,
        duracion_total: items
            .iter()
            .fold(0, |total: u64, item| total.saturating_add(item.duracion_min)),
    }
}

pub fn summarize_activity(activity: &ActivityDetail) -> ActivityReviewSummary {
    ActivityReviewSummary {
        id: activity.id.clone(),
        titulo: activity.title().to_string(),
        terminadas: summarize_bucket(&activity.revisiones.terminadas),
        confirmadas: summarize_bucket(&activity.revisiones.confirmadas),
        pendientes: summarize_bucket(&activity.revisiones.pendientes),
    }
}

pub fn summarize_detail(detail: &UserDetail) -> Vec<ActivityReviewSummary> {
    detail.actividades.iter().map(summarize_activity).collect()
}

pub fn totals(summaries: &[ActivityReviewSummary]) -> ReviewTotals {
    let add = |acc: BucketSummary, next: BucketSummary| BucketSummary {
        cantidad: acc.cantidad.saturating_add(next.cantidad),
        duracion_total: acc.duracion_total.saturating_add(next.duracion_total),
    };
    summaries
        .iter()
        .fold(ReviewTotals::default(), |acc, summary| ReviewTotals {
            terminadas: add(acc.terminadas, summary.terminadas),
            confirmadas: add(acc.confirmadas, summary.confirmadas),
            pendientes: add(acc.pendientes, summary.pendientes),
        })
}
