//! Financial indicators.

use super::helpers::{title_or, Company};
use super::{DetailRegistry, DetailView, Tone};
use crate::api::IndicatorDetailResponse;

pub(super) fn register(registry: &mut DetailRegistry) {
    registry.register("F10000", f10000);
}

/// Companies that never filed statements; one entry per row.
fn f10000(resp: &IndicatorDetailResponse) -> DetailView {
    let mut view = DetailView::new(
        title_or(
            resp,
            "เป็นบริษัทที่ดำเนินกิจการตั้งแต่ 2 ปีขึ้นไป แต่ไม่เคยนำส่งงบการเงิน",
        ),
        Tone::Rose,
    );
    view.push_list(
        "ชื่อบริษัท",
        resp.rows().iter().map(|r| Company::from_row(r).label()).collect(),
    );
    view
}
