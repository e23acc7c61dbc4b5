//! Foreigner-control indicators: signing power, nationality mix and UBOs.

use std::collections::{HashMap, HashSet};

use super::helpers::{
    count_text, first_row, first_text, number, person_label, text, title_or, to_num, unique_in_order,
};
use super::{DetailRegistry, DetailSection, DetailView, Tone};
use crate::api::IndicatorDetailResponse;
use crate::text::{format_percent, thai_collate};

pub(super) fn register(registry: &mut DetailRegistry) {
    registry.register("D40000", d40000);
    registry.register("S50000", s50000);
    registry.register("U10000", u10000);
}

fn d40000(resp: &IndicatorDetailResponse) -> DetailView {
    let rows = resp.rows();
    let first = first_row(resp);
    let mut view = DetailView::new(
        title_or(
            resp,
            "บุคคลต่างชาติเป็นกรรมการและมีอำนาจลงนาม ≥ กึ่งหนึ่งของกรรมการทั้งหมด",
        ),
        Tone::Cyan,
    );

    if let Some(total) = number(first, "nof_director") {
        view.push(DetailSection::text("จำนวนกรรมการทั้งหมด", count_text(total, "คน")));
    }
    if let Some(foreign) = number(first, "nof_fr_director_auth_power") {
        view.push(DetailSection::text("ต่างชาติที่มีอำนาจลงนาม", count_text(foreign, "คน")));
    }

    let mut seen = HashSet::new();
    let directors = rows
        .iter()
        .filter_map(|r| {
            let key = first_text(r, &["director_name_th", "director_name_en"])?;
            if !seen.insert(key) {
                return None;
            }
            let name = person_label(text(r, "director_name_th"), text(r, "director_name_en"))?;
            Some(match first_text(r, &["nation_th", "nation_en"]) {
                Some(nation) => format!("{} • {}", name, nation),
                None => name,
            })
        })
        .collect();
    view.push_list("สัญชาติและการมีอำนาจลงนามของกรรมการชุดปัจจุบัน", directors);
    view
}

fn s50000(resp: &IndicatorDetailResponse) -> DetailView {
    let mut view = DetailView::new(
        title_or(resp, "จำนวนผู้ถือหุ้นต่างชาติแยกตามสัญชาติ (ล่าสุด)"),
        Tone::Cyan,
    );

    // A row without a shareholder count stands for one shareholder.
    let mut by_nation: HashMap<String, f64> = HashMap::new();
    for row in resp.rows() {
        let Some(nation) = first_text(row, &["nation_th", "nation_en"]) else {
            continue;
        };
        let add = number(row, "nof_shareholder").filter(|n| n.is_finite()).unwrap_or(1.0);
        *by_nation.entry(nation).or_insert(0.0) += add;
    }

    let mut nations: Vec<(String, f64)> = by_nation.into_iter().collect();
    nations.sort_by(|a, b| thai_collate(&a.0, &b.0));
    view.push_list(
        "จำนวนของแต่ละสัญชาติของผู้ถือหุ้นล่าสุด",
        nations
            .into_iter()
            .map(|(nation, count)| format!("{} — {}", nation, count_text(count, "คน")))
            .collect(),
    );
    view
}

fn u10000(resp: &IndicatorDetailResponse) -> DetailView {
    let rows = resp.rows();
    let mut view = DetailView::new(
        title_or(
            resp,
            "ผู้รับผลประโยชน์สูงสุดเป็นต่างชาติและมีหุ้นตั้งแต่ 49% ขึ้นไป",
        ),
        Tone::Cyan,
    );

    view.push_list(
        "ชื่อบุคคลที่เป็นผู้รับผลประโยชน์สูงสุด",
        unique_in_order(rows.iter().filter_map(|r| first_text(r, &["ubo_name_th", "ubo_name_en"]))),
    );

    let mut percents: Vec<f64> = Vec::new();
    for pct in rows.iter().filter_map(|r| to_num(r.get("percent_ubo"))) {
        if !percents.contains(&pct) {
            percents.push(pct);
        }
    }
    percents.sort_by(|a, b| b.total_cmp(a));
    if !percents.is_empty() {
        let text = percents
            .iter()
            .map(|p| format_percent(*p, 4))
            .collect::<Vec<_>>()
            .join(", ");
        view.push(DetailSection::text("เปอร์เซ็นต์ของผู้รับผลประโยชน์สูงสุด (%BO)", text));
    }
    view
}
