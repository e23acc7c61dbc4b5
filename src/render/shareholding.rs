//! Shareholding-pattern indicators: circular ownership and foreign stakes.

use std::collections::HashSet;

use serde_json::Value;

use super::helpers::{
    count_text, dedupe_companies, first_row, first_text, number, sorted_unique, title_or, to_num,
    year_of, ymd,
};
use super::{DetailRegistry, DetailSection, DetailView, SectionBody, Tone};
use crate::api::IndicatorDetailResponse;
use crate::text::{format_number, format_percent};

pub(super) fn register(registry: &mut DetailRegistry) {
    registry.register("C10000", c10000);
    registry.register("H20000", h20000);
    registry.register("H30000", h30000);
    registry.register("H40000", h40000);
    registry.register("H70000", h70000);
    registry.register("S20000", s20000);
    registry.register("U30000", u30000);
}

/// "49%" or "-" when unknown.
fn pct_or_dash(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{}%", format_number(v)),
        None => "-".to_string(),
    }
}

fn shareholder_name(row: &Value) -> Option<String> {
    first_text(row, &["shareholder_name_th", "shareholder_name_en"])
}

/// First non-null value among `keys`.
fn first_present<'a>(row: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().filter_map(|k| row.get(*k)).find(|v| !v.is_null())
}

fn round6(v: f64) -> f64 {
    (v * 1e6).round() / 1e6
}

fn c10000(resp: &IndicatorDetailResponse) -> DetailView {
    let rows = resp.rows();
    let mut view = DetailView::new(
        title_or(resp, "มีรูปแบบการถือหุ้น Circular Ownership"),
        Tone::Amber,
    );

    // Backend total when present, otherwise distinct non-zero path ids.
    let distinct_paths: HashSet<i64> = rows
        .iter()
        .filter_map(|r| number(r, "path_id"))
        .filter(|p| *p != 0.0)
        .map(|p| p as i64)
        .collect();
    let routes = number(first_row(resp), "nof_path")
        .or_else(|| (!distinct_paths.is_empty()).then_some(distinct_paths.len() as f64));
    if let Some(routes) = routes {
        view.push(DetailSection::text(
            "จำนวนเส้นทางที่มีลักษณะ Circular Ownership",
            count_text(routes, "เส้นทาง"),
        ));
    }

    view.push_list(
        "รายชื่อบริษัทที่อยู่ใน Circular Ownership",
        dedupe_companies(rows).iter().map(|c| c.label()).collect(),
    );
    view
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct GroupTotal {
    count: usize,
    percent: f64,
}

/// First-snapshot shareholding summed per nationality group. Rows repeating
/// the same holder with the same percentage are counted once.
fn h20000(resp: &IndicatorDetailResponse) -> DetailView {
    let rows = resp.rows();
    let mut view = DetailView::new(title_or(resp, "ผู้ถือหุ้นต่างชาติถือหุ้นครั้งแรก"), Tone::Cyan);

    if let Some(date) = ymd(first_row(resp), "sh_upd_date") {
        view.push(DetailSection::text("วันที่ใช้คำนวณ (Snapshot แรก)", date));
    }

    let norm = |row: &Value, key: &str| -> String {
        row.get(key)
            .and_then(Value::as_str)
            .map(|s| s.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase())
            .unwrap_or_default()
    };

    let mut seen = HashSet::new();
    let mut thai = GroupTotal::default();
    let mut foreign = GroupTotal::default();
    let mut unknown = GroupTotal::default();
    for row in rows {
        let pct = number(row, "percent_share").unwrap_or(0.0);
        let name = Some(norm(row, "shareholder_name_en"))
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| norm(row, "shareholder_name_th"));
        if !seen.insert(format!("{}|{:.6}", name, pct)) {
            continue;
        }

        let group = match row.get("nationality_group").and_then(Value::as_str) {
            Some("THAI") => &mut thai,
            Some("FOREIGN") => &mut foreign,
            _ => &mut unknown,
        };
        group.count += 1;
        group.percent += pct;
    }
    for group in [&mut thai, &mut foreign, &mut unknown] {
        group.percent = round6(group.percent);
    }

    view.push(DetailSection::text(
        "สัดส่วนผู้ถือหุ้นต่างชาติ (รวมครั้งแรก)",
        pct_or_dash(Some(foreign.percent)),
    ));
    let table_rows = [("THAI", thai), ("FOREIGN", foreign), ("UNKNOWN", unknown)]
        .into_iter()
        .map(|(label, total)| {
            vec![
                label.to_string(),
                format!("{} ราย", total.count),
                pct_or_dash(Some(total.percent)),
            ]
        })
        .collect();
    view.push(DetailSection {
        label: "สรุปตามกลุ่มสัญชาติ".to_string(),
        body: SectionBody::Table {
            headers: vec!["กลุ่ม".into(), "จำนวน".into(), "สัดส่วน".into()],
            rows: table_rows,
        },
    });
    view
}

fn h30000(resp: &IndicatorDetailResponse) -> DetailView {
    let row = first_row(resp);
    let mut view = DetailView::new(title_or(resp, "ผู้ถือหุ้นต่างชาติเคย ≤49% และเพิ่มขึ้น >49%"), Tone::Cyan);

    if let Some(year) = year_of(row, "sh_upd_date").or_else(|| year_of(row, "next_sh_upd_date")) {
        view.push(DetailSection::text("ปีที่ผู้ถือหุ้นต่างชาติเพิ่มจาก ≤49% เป็น >49%", year.to_string()));
    }

    let before = to_num(row.get("bf_pct_fr"));
    let after = to_num(row.get("next_pct_fr"));
    if before.is_some() || after.is_some() {
        view.push(DetailSection::text(
            "สัดส่วนการถือหุ้นต่างชาติรวม (ก่อน / หลัง)",
            format!("{} / {}", pct_or_dash(before), pct_or_dash(after)),
        ));
    }
    view
}

fn h40000(resp: &IndicatorDetailResponse) -> DetailView {
    let row = first_row(resp);
    let mut view = DetailView::new(
        title_or(resp, "ผู้ถือหุ้นแรกตั้งไม่มีต่างชาติ แต่ปัจจุบันมีต่างชาติ"),
        Tone::Cyan,
    );

    let initial_keys = ["first_pct_fr", "initial_percent_share", "init_pct_fr"];
    let mut initial = to_num(first_present(row, &initial_keys));
    // For this indicator a missing first stake means no foreign holder at founding.
    if initial.is_none() && resp.indicator.code.eq_ignore_ascii_case("H40000") {
        initial = Some(0.0);
    }
    let latest = to_num(first_present(row, &["percent_share", "last_pct_fr"]));

    if initial.is_some() || latest.is_some() {
        view.push(DetailSection::text(
            "สัดส่วนการถือหุ้นครั้งแรก / สัดส่วนการถือหุ้นล่าสุด",
            format!("{} / {}", pct_or_dash(initial), pct_or_dash(latest)),
        ));
    }
    view
}

fn h70000(resp: &IndicatorDetailResponse) -> DetailView {
    let mut view = DetailView::new(
        title_or(resp, "มีผู้ถือหุ้นต่างชาติรายใดรายหนึ่งถือหุ้นเพิ่มขึ้น"),
        Tone::Cyan,
    );

    let increased: Vec<&Value> = resp
        .rows()
        .iter()
        .filter(|r| {
            matches!(
                (to_num(r.get("percent_share")), to_num(r.get("next_percent_share"))),
                (Some(before), Some(after)) if after > before
            )
        })
        .collect();

    let mut seen = HashSet::new();
    let holders = increased
        .iter()
        .filter_map(|r| {
            let name = shareholder_name(r)?;
            if !seen.insert(name.clone()) {
                return None;
            }
            Some(match first_text(r, &["nation_en"]) {
                Some(nation) => format!("{} ({})", name, nation),
                None => name,
            })
        })
        .collect();
    view.push_list("ผู้ถือหุ้นต่างชาติที่ถือหุ้นเพิ่มขึ้น", holders);

    let changes = increased
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let name = shareholder_name(r).unwrap_or_else(|| format!("#{}", i + 1));
            format!(
                "{}: {} → {}",
                name,
                pct_or_dash(to_num(r.get("percent_share"))),
                pct_or_dash(to_num(r.get("next_percent_share")))
            )
        })
        .collect();
    view.push_list("สัดส่วนการถือหุ้นก่อนและหลังการเปลี่ยนแปลงหุ้น", changes);

    view.push_list(
        "วันที่มีการเปลี่ยนแปลง",
        sorted_unique(increased.iter().filter_map(|r| ymd(r, "next_sh_upd_date"))),
    );
    view
}

/// Holders with a stake in [48, 50).
fn s20000(resp: &IndicatorDetailResponse) -> DetailView {
    let mut view = DetailView::new(title_or(resp, "ผู้ถือหุ้นต่างชาติ 48% ถึงน้อยกว่า 50%"), Tone::Cyan);

    let in_range: Vec<(&Value, f64)> = resp
        .rows()
        .iter()
        .filter_map(|r| to_num(r.get("percent_share")).map(|p| (r, p)))
        .filter(|(_, p)| (48.0..50.0).contains(p))
        .collect();

    let mut seen = HashSet::new();
    let holders = in_range
        .iter()
        .filter_map(|(r, _)| {
            let name = shareholder_name(r)?;
            if !seen.insert(name.clone()) {
                return None;
            }
            Some(match first_text(r, &["nation_th", "nation_en"]) {
                Some(nation) => format!("{} — {}", name, nation),
                None => name,
            })
        })
        .collect();
    view.push_list("ผู้ถือหุ้นต่างชาติที่ถือหุ้นตั้งแต่ 48% แต่น้อยกว่า 50%", holders);

    let mut percents: Vec<f64> = Vec::new();
    for (_, pct) in &in_range {
        if !percents.contains(pct) {
            percents.push(*pct);
        }
    }
    percents.sort_by(|a, b| a.total_cmp(b));
    if !percents.is_empty() {
        let text = percents
            .iter()
            .map(|p| pct_or_dash(Some(*p)))
            .collect::<Vec<_>>()
            .join(", ");
        view.push(DetailSection::text("สัดส่วนของผู้ถือหุ้นต่างชาติ", text));
    }
    view
}

/// Holders whose indirect stake exceeds the direct one.
fn u30000(resp: &IndicatorDetailResponse) -> DetailView {
    let mut view = DetailView::new(
        title_or(resp, "ผู้ถือหุ้นต่างชาติถือหุ้นทางอ้อมมากกว่าทางตรง"),
        Tone::Cyan,
    );

    let items = resp
        .rows()
        .iter()
        .filter_map(|r| match (to_num(r.get("percent_share")), to_num(r.get("diff_bo_direct"))) {
            (Some(direct), Some(indirect)) if indirect > direct => Some((r, direct, indirect)),
            _ => None,
        })
        .enumerate()
        .map(|(i, (r, direct, indirect))| {
            let name = shareholder_name(r).unwrap_or_else(|| format!("#{}", i + 1));
            format!(
                "{}: {} (ทางตรง) → {} (ทางอ้อม)",
                name,
                format_percent(direct, 4),
                format_percent(indirect, 4)
            )
        })
        .collect();
    view.push_list(
        "สัดส่วนหุ้นทางตรงและสัดส่วนหุ้นทางอ้อม (เฉพาะกรณีที่ทางอ้อม > ทางตรง)",
        items,
    );
    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::DetailTable;
    use serde_json::json;

    fn resp(code: &str, rows: Vec<Value>) -> IndicatorDetailResponse {
        let mut resp = IndicatorDetailResponse {
            details: DetailTable {
                rows,
                ..Default::default()
            },
            ..Default::default()
        };
        resp.indicator.code = code.to_string();
        resp
    }

    #[test]
    fn test_h20000_dedupes_before_summing() {
        let view = h20000(&resp(
            "H20000",
            vec![
                json!({"shareholder_name_en": "Acme  Holdings", "nationality_group": "FOREIGN", "percent_share": 24.5, "sh_upd_date": "2019-05-01"}),
                json!({"shareholder_name_en": "ACME HOLDINGS", "nationality_group": "FOREIGN", "percent_share": 24.5}),
                json!({"shareholder_name_en": "Beta", "nationality_group": "FOREIGN", "percent_share": 24.5}),
                json!({"shareholder_name_th": "นาย ก", "nationality_group": "THAI", "percent_share": 51}),
                json!({"shareholder_name_th": "ไม่ทราบ", "percent_share": null}),
            ],
        ));
        assert_eq!(view.sections[0].body, SectionBody::Text("2019-05-01".into()));
        assert_eq!(view.sections[1].body, SectionBody::Text("49%".into()));
        match &view.sections[2].body {
            SectionBody::Table { rows, .. } => {
                assert_eq!(rows[0], vec!["THAI", "1 ราย", "51%"]);
                assert_eq!(rows[1], vec!["FOREIGN", "2 ราย", "49%"]);
                assert_eq!(rows[2], vec!["UNKNOWN", "1 ราย", "0%"]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_s20000_range_and_percents() {
        let view = s20000(&resp(
            "S20000",
            vec![
                json!({"shareholder_name_en": "A", "nation_en": "JP", "percent_share": 48}),
                json!({"shareholder_name_en": "A", "nation_en": "JP", "percent_share": "49.5"}),
                json!({"shareholder_name_en": "B", "percent_share": 50}),
                json!({"shareholder_name_en": "C", "percent_share": 47.99}),
            ],
        ));
        assert_eq!(view.sections[0].body, SectionBody::List(vec!["A — JP".into()]));
        assert_eq!(view.sections[1].body, SectionBody::Text("48%, 49.5%".into()));
    }

    #[test]
    fn test_h40000_defaults_initial_to_zero() {
        let view = h40000(&resp("H40000", vec![json!({"percent_share": "12.5"})]));
        assert_eq!(view.sections[0].body, SectionBody::Text("0% / 12.5%".into()));
    }

    #[test]
    fn test_h30000_year_and_percents() {
        let view = h30000(&resp(
            "H30000",
            vec![json!({"next_sh_upd_date": "2020-07-01", "bf_pct_fr": "40", "next_pct_fr": 60})],
        ));
        assert_eq!(view.sections[0].body, SectionBody::Text("2020".into()));
        assert_eq!(view.sections[1].body, SectionBody::Text("40% / 60%".into()));
    }

    #[test]
    fn test_h70000_only_increases() {
        let view = h70000(&resp(
            "H70000",
            vec![
                json!({"shareholder_name_en": "A", "nation_en": "JP", "percent_share": 10, "next_percent_share": 20, "next_sh_upd_date": "2022-01-01"}),
                json!({"shareholder_name_en": "B", "percent_share": 30, "next_percent_share": 20}),
            ],
        ));
        assert_eq!(view.sections[0].body, SectionBody::List(vec!["A (JP)".into()]));
        assert_eq!(view.sections[1].body, SectionBody::List(vec!["A: 10% → 20%".into()]));
        assert_eq!(view.sections[2].body, SectionBody::List(vec!["2022-01-01".into()]));
    }

    #[test]
    fn test_c10000_counts_distinct_paths() {
        let view = c10000(&resp(
            "C10000",
            vec![
                json!({"path_id": 1, "company_id_detail": 5, "name_th": "เอ", "registration_id": "01"}),
                json!({"path_id": 1, "company_id_detail": 6, "name_th": "บี", "registration_id": "02"}),
                json!({"path_id": 2, "company_id_detail": 5, "name_th": "เอ", "registration_id": "01"}),
            ],
        ));
        assert_eq!(view.sections[0].body, SectionBody::Text("2 เส้นทาง".into()));
        assert_eq!(
            view.sections[1].body,
            SectionBody::List(vec!["เอ — 01".into(), "บี — 02".into()])
        );
    }

    #[test]
    fn test_u30000_indirect_over_direct() {
        let view = u30000(&resp(
            "U30000",
            vec![
                json!({"percent_share": 10, "diff_bo_direct": 39.12346}),
                json!({"shareholder_name_en": "B", "percent_share": 40, "diff_bo_direct": 9}),
            ],
        ));
        assert_eq!(
            view.sections[0].body,
            SectionBody::List(vec!["#1: 10% (ทางตรง) → 39.1235% (ทางอ้อม)".into()])
        );
    }
}
