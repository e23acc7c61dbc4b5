//! Shared-resource indicators: duplicated addresses and auditors.

use serde_json::Value;

use super::helpers::{count_text, first_row, first_text, number, title_or, to_num, Company};
use super::{DetailRegistry, DetailSection, DetailView, Tone};
use crate::api::IndicatorDetailResponse;
use crate::text::format_number;

pub(super) fn register(registry: &mut DetailRegistry) {
    registry.register("AD10000", ad10000);
    registry.register("AD20000", ad20000);
    registry.register("AU10000", au10000);
    registry.register("AU20000", au20000);
}

fn sample_companies(row: &Value) -> Vec<String> {
    row.get("sample_companies")
        .and_then(Value::as_array)
        .map(|list| list.iter().map(|c| Company::from_row(c).label()).collect())
        .unwrap_or_default()
}

fn ad10000(resp: &IndicatorDetailResponse) -> DetailView {
    let row = first_row(resp);
    let mut view = DetailView::new("รายละเอียดที่อยู่ซ้ำกัน:", Tone::Rose);

    if let Some(address) = first_text(row, &["address_th", "address_en"]) {
        view.push(DetailSection::text("ที่อยู่:", address));
    }
    if row.get("dup_companies").is_some() {
        let count = to_num(row.get("dup_companies")).unwrap_or(0.0);
        view.push(DetailSection::text("จำนวนบริษัทที่ใช้ที่อยู่เดียวกัน:", count_text(count, "บริษัท")));
    }
    view.push_list(
        "รายชื่อบริษัทที่มีที่อยู่ซ้ำกัน (ตัวอย่าง 5 บริษัท):",
        sample_companies(row),
    );
    view
}

fn ad20000(resp: &IndicatorDetailResponse) -> DetailView {
    let row = first_row(resp);
    let mut view = DetailView::new("เป็นที่อยู่เดียวกับสำนักงานบัญชีหรือกฎหมาย", Tone::Cyan);

    if let Some(address) = first_text(row, &["address_th", "address_en"]) {
        view.push(DetailSection::text("ที่อยู่บริษัท", address));
    }
    if let Some(count) = number(row, "dup_companies") {
        view.push(DetailSection::text(
            "จำนวนบริษัทที่ใช้ที่อยู่เดียวกัน (เฉพาะบัญชี/กฎหมาย)",
            count_text(count, "บริษัท"),
        ));
    }
    view.push_list(
        "ตัวอย่างบริษัทที่ที่อยู่ซ้ำกัน (ไม่เกิน 5 บริษัท)",
        sample_companies(row),
    );
    view
}

/// Auditor, fiscal year and the number of peer companies in `count_key`.
fn auditor_view(
    resp: &IndicatorDetailResponse,
    title: &str,
    count_key: &str,
    count_label: &str,
) -> DetailView {
    let row = first_row(resp);
    let mut view = DetailView::new(title_or(resp, title), Tone::Rose);

    if let Some(auditor) = first_text(row, &["audit_name_th", "audit_name_en"]) {
        view.push(DetailSection::text("ผู้ตรวจสอบบัญชี", auditor));
    }
    if let Some(year) = number(row, "year_fs") {
        view.push(DetailSection::text(
            "ปีงบการเงินล่าสุดที่ผู้ตรวจสอบบัญชีรับรอง",
            format_number(year),
        ));
    }
    if let Some(count) = number(row, count_key) {
        view.push(DetailSection::text(count_label, count_text(count, "บริษัท")));
    }
    view
}

fn au10000(resp: &IndicatorDetailResponse) -> DetailView {
    auditor_view(
        resp,
        "บริษัทที่มีผู้ตรวจสอบบัญชีเดียวกันกับอีก 50 บริษัทขึ้นไป (สัดส่วนผู้ถือหุ้น 51:49)",
        "audit_nof_com_51_49",
        "จำนวนบริษัทที่มีผู้ถือหุ้นไทย:ต่างชาติ สัดส่วน 51:49 และใช้ผู้ตรวจสอบบัญชี/ปีงบเดียวกัน",
    )
}

fn au20000(resp: &IndicatorDetailResponse) -> DetailView {
    auditor_view(
        resp,
        "บริษัทที่มีผู้ตรวจสอบบัญชีเดียวกันกับบริษัทที่มีรูปแบบการถือหุ้น Circular Ownership",
        "audit_nof_com_circular",
        "จำนวนบริษัทที่มีการถือหุ้นรูปแบบ Circular Ownership และใช้ผู้ตรวจสอบบัญชี/ปีงบเดียวกัน",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::DetailTable;
    use crate::render::SectionBody;
    use serde_json::json;

    fn resp(row: Value) -> IndicatorDetailResponse {
        IndicatorDetailResponse {
            details: DetailTable {
                rows: vec![row],
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_ad10000_address_and_samples() {
        let view = ad10000(&resp(json!({
            "address_th": "99 ถนนสุขุมวิท",
            "dup_companies": 1520,
            "sample_companies": [
                {"company_id": 1, "registration_id": "0105", "name_th": "บริษัท เอ"},
                {"company_id": 2, "registration_id": "0106", "name_en": "B Co"}
            ]
        })));
        assert_eq!(view.sections.len(), 3);
        assert_eq!(
            view.section("จำนวนบริษัทที่ใช้ที่อยู่เดียวกัน:").unwrap().body,
            SectionBody::Text("1,520 บริษัท".into())
        );
        assert_eq!(
            view.sections[2].body,
            SectionBody::List(vec!["บริษัท เอ — 0105".into(), "B Co — 0106".into()])
        );
    }

    #[test]
    fn test_auditor_uses_backend_title() {
        let mut r = resp(json!({"audit_name_en": "J. Smith", "year_fs": 2023, "audit_nof_com_51_49": 64}));
        r.indicator.name_th = Some("ผู้สอบบัญชีร่วม".into());
        let view = au10000(&r);
        assert_eq!(view.title, "ผู้สอบบัญชีร่วม");
        assert_eq!(view.sections.len(), 3);
        assert_eq!(view.sections[1].body, SectionBody::Text("2023".into()));
    }

    #[test]
    fn test_ad20000_empty_row() {
        assert!(ad20000(&resp(json!({}))).is_empty());
    }
}
