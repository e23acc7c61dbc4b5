//! Directorship indicators: shared boards, short-lived and dissolved companies.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde_json::Value;

use super::helpers::{
    company_key, count_text, dedupe_companies, first_row, first_text, id_text, number, person_label,
    sorted_unique, text, title_or, ymd,
};
use super::{DetailRegistry, DetailSection, DetailView, SectionBody, Tone};
use crate::api::IndicatorDetailResponse;

/// Days of operation below which a dissolved company counts as short-lived.
const SHORT_LIVED_DAYS: f64 = 365.0;

pub(super) fn register(registry: &mut DetailRegistry) {
    registry.register("D10000", d10000);
    registry.register("D60000", d60000);
    registry.register("D70000", d70000);
    registry.register("D80000", d80000);
}

fn d10000(resp: &IndicatorDetailResponse) -> DetailView {
    let rows = resp.rows();
    let mut view = DetailView::new(
        title_or(
            resp,
            "กรรมการชุดปัจจุบันเป็นชุดเดียวกับกรรมการบริษัทอื่น (ตั้งแต่ 2 บริษัทขึ้นไป)",
        ),
        Tone::Emerald,
    );

    let mut seen = HashSet::new();
    let directors: Vec<String> = rows
        .iter()
        .filter_map(|r| {
            let key = first_text(r, &["director_name_th", "director_name_en"])?;
            if !seen.insert(key) {
                return None;
            }
            person_label(text(r, "director_name_th"), text(r, "director_name_en"))
        })
        .collect();
    view.push_list("กรรมการชุดปัจจุบัน", directors);

    // The parent company's own row is flagged with is_parent = 1.
    let companies = dedupe_companies(rows.iter().filter(|r| number(r, "is_parent") != Some(1.0)));
    view.push_list(
        "บริษัทที่มีกรรมการชุดปัจจุบันเดียวกัน",
        companies.iter().map(|c| c.label()).collect(),
    );
    view
}

fn registration_date(row: &Value) -> Option<String> {
    ymd(row, "regists_date").or_else(|| ymd(row, "regist_date"))
}

fn d60000(resp: &IndicatorDetailResponse) -> DetailView {
    let rows = resp.rows();
    let mut view = DetailView::new(
        title_or(
            resp,
            "กรรมการชุดปัจจุบันเคยเป็นกรรมการชุดแรกตั้งของบริษัทที่จดทะเบียนภายใน 1 ปี",
        ),
        Tone::Amber,
    );

    if let Some(count) = number(first_row(resp), "nof_com") {
        view.push(DetailSection::text(
            "จำนวนบริษัทที่กรรมการชุดปัจจุบัน เคยจดทะเบียนภายใน 1 ปี",
            count_text(count, "บริษัท"),
        ));
    }
    view.push_list(
        "วันที่กรรมการชุดปัจจุบัน เคยจดทะเบียนบริษัท",
        sorted_unique(rows.iter().filter_map(registration_date)),
    );
    view.push_list(
        "บริษัทที่เคยจดทะเบียนบริษัทในปีเดียวกัน",
        dedupe_companies(rows).iter().map(|c| c.label()).collect(),
    );
    view
}

fn d70000(resp: &IndicatorDetailResponse) -> DetailView {
    let rows = resp.rows();
    let mut view = DetailView::new(
        title_or(
            resp,
            "กรรมการชุดปัจจุบันเคยเป็นกรรมการชุดแรกตั้งของบริษัทที่จดทะเบียนเลิกกิจการภายใน 1 ปี",
        ),
        Tone::Rose,
    );

    // year -> distinct companies dissolved that year
    let mut per_year: BTreeMap<i64, BTreeSet<String>> = BTreeMap::new();
    for row in rows {
        let Some(year) = number(row, "year_focus").map(|y| y as i64).filter(|y| *y != 0) else {
            continue;
        };
        per_year.entry(year).or_default().insert(company_key(row));
    }
    view.push_list(
        "จำนวนบริษัทที่กรรมการชุดปัจจุบัน เคยจดทะเบียนเลิกกิจการในแต่ละปี",
        per_year
            .iter()
            .map(|(year, companies)| {
                format!("{}: {}", year, count_text(companies.len() as f64, "บริษัท"))
            })
            .collect(),
    );
    view.push_list(
        "รายชื่อบริษัท",
        dedupe_companies(rows).iter().map(|c| c.label()).collect(),
    );
    view.push_list(
        "วันที่กรรมการชุดปัจจุบัน เคยจดทะเบียนเลิกกิจการ",
        sorted_unique(rows.iter().filter_map(|r| ymd(r, "status_date"))),
    );
    view
}

/// Dissolved after operating for less than a year. Rows without `diff_day`
/// never qualify.
fn is_short_lived(row: &Value) -> bool {
    let dissolved = ymd(row, "status_date").is_some();
    dissolved && number(row, "diff_day").is_some_and(|days| days < SHORT_LIVED_DAYS)
}

fn d80000(resp: &IndicatorDetailResponse) -> DetailView {
    let rows = resp.rows();
    let mut view = DetailView::new(
        title_or(
            resp,
            "กรรมการชุดปัจจุบัน เคยดำเนินกิจการ < 1 ปี และปัจจุบันเลิกกิจการแล้ว",
        ),
        Tone::Purple,
    );

    let qualified: Vec<&Value> = rows.iter().filter(|r| is_short_lived(r)).collect();

    let count = number(first_row(resp), "nof_com").unwrap_or_else(|| {
        let distinct: HashSet<String> = qualified
            .iter()
            .map(|r| {
                id_text(r.get("company_id_detail")).unwrap_or_else(|| {
                    format!(
                        "{}-{}",
                        ymd(r, "regist_date").unwrap_or_else(|| "NA".into()),
                        ymd(r, "status_date").unwrap_or_else(|| "NA".into())
                    )
                })
            })
            .collect();
        distinct.len() as f64
    });
    view.push(DetailSection::text(
        "จำนวนบริษัทที่กรรมการชุดปัจจุบัน เคยดำเนินกิจการน้อยกว่า 1 ปี และปัจจุบันจดทะเบียนเลิกกิจการไปแล้ว",
        count_text(count, "บริษัท"),
    ));

    view.push_list(
        "วันที่กรรมการชุดปัจจุบัน เคยจดทะเบียนบริษัท",
        sorted_unique(qualified.iter().filter_map(|r| ymd(r, "regist_date"))),
    );

    // year of registration -> companies, deduplicated by id within the year
    let mut buckets: BTreeMap<String, Vec<(String, String)>> = BTreeMap::new();
    for row in &qualified {
        let Some(date) = ymd(row, "regist_date") else {
            continue;
        };
        let year = date[..4].to_string();
        let id = id_text(row.get("company_id_detail")).unwrap_or_default();
        let entries = buckets.entry(year).or_default();
        if !entries.iter().any(|(existing, _)| *existing == id) {
            entries.push((id, date));
        }
    }
    if !buckets.is_empty() {
        let groups = buckets
            .into_iter()
            .map(|(year, entries)| {
                let items = entries
                    .into_iter()
                    .map(|(id, date)| {
                        let id = if id.is_empty() { "Unknown Company".to_string() } else { id };
                        format!("{} — {}", id, date)
                    })
                    .collect();
                (year, items)
            })
            .collect();
        view.push(DetailSection {
            label: "บริษัทที่เคยจดทะเบียนบริษัทในปีเดียวกัน".to_string(),
            body: SectionBody::Groups(groups),
        });
    }
    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::DetailTable;
    use serde_json::json;

    fn resp(rows: Vec<Value>) -> IndicatorDetailResponse {
        IndicatorDetailResponse {
            details: DetailTable {
                rows,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_d10000_dedupes_and_skips_parent() {
        let view = d10000(&resp(vec![
            json!({"director_name_th": "นาย ก", "director_name_en": "Mr. K", "company_id_detail": 1, "is_parent": 1, "name_th": "แม่"}),
            json!({"director_name_th": "นาย ก", "company_id_detail": 2, "registration_id": "0102", "name_th": "ลูก"}),
            json!({"director_name_en": "Ms. B", "company_id_detail": 2, "registration_id": "0102", "name_th": "ลูก"}),
        ]));
        assert_eq!(
            view.sections[0].body,
            SectionBody::List(vec!["นาย ก — Mr. K".into(), "Ms. B".into()])
        );
        assert_eq!(view.sections[1].body, SectionBody::List(vec!["ลูก — 0102".into()]));
    }

    #[test]
    fn test_d70000_buckets_distinct_companies_per_year() {
        let view = d70000(&resp(vec![
            json!({"year_focus": 2021, "company_id_detail": 1, "status_date": "2021-03-01"}),
            json!({"year_focus": 2021, "company_id_detail": 1, "status_date": "2021-03-01"}),
            json!({"year_focus": 2021, "company_id_detail": 2, "status_date": "2021-05-01T00:00:00"}),
            json!({"year_focus": 2019, "company_id_detail": 3, "status_date": "2019-01-02"}),
        ]));
        assert_eq!(
            view.sections[0].body,
            SectionBody::List(vec!["2019: 1 บริษัท".into(), "2021: 2 บริษัท".into()])
        );
        assert_eq!(
            view.sections[2].body,
            SectionBody::List(vec!["2019-01-02".into(), "2021-03-01".into(), "2021-05-01".into()])
        );
    }

    #[test]
    fn test_d80000_qualifies_short_lived_dissolved() {
        let view = d80000(&resp(vec![
            json!({"company_id_detail": 10, "regist_date": "2020-01-10", "status_date": "2020-06-01", "diff_day": 143}),
            json!({"company_id_detail": 11, "regist_date": "2020-02-01", "status_date": "2022-06-01", "diff_day": 851}),
            json!({"company_id_detail": 12, "regist_date": "2021-04-01", "diff_day": 30}),
            json!({"company_id_detail": 13, "regist_date": "2021-04-05", "status_date": "2021-09-01", "diff_day": 149}),
        ]));
        assert_eq!(view.sections[0].body, SectionBody::Text("2 บริษัท".into()));
        assert_eq!(
            view.sections[1].body,
            SectionBody::List(vec!["2020-01-10".into(), "2021-04-05".into()])
        );
        assert_eq!(
            view.sections[2].body,
            SectionBody::Groups(vec![
                ("2020".into(), vec!["10 — 2020-01-10".into()]),
                ("2021".into(), vec!["13 — 2021-04-05".into()]),
            ])
        );
    }

    #[test]
    fn test_d80000_prefers_backend_count() {
        let view = d80000(&resp(vec![json!({"nof_com": 7})]));
        assert_eq!(view.sections[0].body, SectionBody::Text("7 บริษัท".into()));
    }

    #[test]
    fn test_d60000_dates_sorted_unique() {
        let view = d60000(&resp(vec![
            json!({"nof_com": 3, "regist_date": "2022-02-01", "company_id_detail": 1}),
            json!({"regists_date": "2021-01-01", "regist_date": "2022-02-01", "company_id_detail": 2}),
            json!({"regist_date": "2022-02-01", "company_id_detail": 2}),
        ]));
        assert_eq!(view.sections[0].body, SectionBody::Text("3 บริษัท".into()));
        assert_eq!(
            view.sections[1].body,
            SectionBody::List(vec!["2021-01-01".into(), "2022-02-01".into()])
        );
        match &view.sections[2].body {
            SectionBody::List(items) => assert_eq!(items.len(), 2),
            other => panic!("unexpected {:?}", other),
        }
    }
}
