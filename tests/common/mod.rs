#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use clarifind::api::types::{DetailTable, FoundCode, IndicatorRef};
use clarifind::api::{
    ApiError, IndicatorApi, IndicatorDetailResponse, IndicatorSummary, RawIndicatorRow, TrueOnlyResponse,
};

/// Canned backend for the indicator endpoints
#[derive(Default)]
pub struct MockIndicatorApi {
    pub summary: Mutex<Option<Result<IndicatorSummary, u16>>>,
    pub true_only: Mutex<Option<Result<TrueOnlyResponse, u16>>>,
    /// code (uppercase) -> queue of responses; `Err(status)` fails the call
    pub details: Mutex<HashMap<String, Vec<Result<Vec<Value>, u16>>>>,
    pub detail_delay: Duration,
    pub detail_calls: AtomicUsize,
    pub summary_calls: AtomicUsize,
}

fn status_error(status: u16) -> ApiError {
    match status {
        401 => ApiError::Unauthorized,
        404 => ApiError::NotFound,
        _ => ApiError::Status {
            status,
            message: "backend error".to_string(),
            body: None,
        },
    }
}

impl MockIndicatorApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_summary(self, rows: Vec<RawIndicatorRow>, company_name: Option<&str>) -> Self {
        let summary = IndicatorSummary {
            company_name: company_name.map(str::to_string),
            indicators: rows,
            ..Default::default()
        };
        *self.summary.try_lock().unwrap() = Some(Ok(summary));
        self
    }

    pub fn with_summary_status(self, status: u16) -> Self {
        *self.summary.try_lock().unwrap() = Some(Err(status));
        self
    }

    pub fn with_found(self, codes: &[&str]) -> Self {
        let res = TrueOnlyResponse {
            registration_id: None,
            indicators: codes.iter().map(|c| FoundCode { code: c.to_string() }).collect(),
        };
        *self.true_only.try_lock().unwrap() = Some(Ok(res));
        self
    }

    pub fn with_found_status(self, status: u16) -> Self {
        *self.true_only.try_lock().unwrap() = Some(Err(status));
        self
    }

    pub fn with_detail(self, code: &str, responses: Vec<Result<Vec<Value>, u16>>) -> Self {
        self.details.try_lock().unwrap().insert(code.to_uppercase(), responses);
        self
    }

    pub fn with_detail_delay(mut self, delay: Duration) -> Self {
        self.detail_delay = delay;
        self
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IndicatorApi for MockIndicatorApi {
    async fn indicator_summary(&self, _registration_id: &str) -> Result<IndicatorSummary, ApiError> {
        self.summary_calls.fetch_add(1, Ordering::SeqCst);
        match self.summary.lock().await.clone() {
            Some(Ok(summary)) => Ok(summary),
            Some(Err(status)) => Err(status_error(status)),
            None => Err(ApiError::NotFound),
        }
    }

    async fn indicator_true_only(&self, _registration_id: &str) -> Result<TrueOnlyResponse, ApiError> {
        match self.true_only.lock().await.clone() {
            Some(Ok(res)) => Ok(res),
            Some(Err(status)) => Err(status_error(status)),
            None => Ok(TrueOnlyResponse::default()),
        }
    }

    async fn indicator_details(
        &self,
        _registration_id: &str,
        code: &str,
    ) -> Result<IndicatorDetailResponse, ApiError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        if !self.detail_delay.is_zero() {
            tokio::time::sleep(self.detail_delay).await;
        }

        let next = {
            let mut details = self.details.lock().await;
            match details.get_mut(code) {
                Some(queue) if queue.len() > 1 => queue.remove(0),
                Some(queue) => queue.first().cloned().unwrap_or(Ok(Vec::new())),
                None => Ok(Vec::new()),
            }
        };
        let rows = next.map_err(status_error)?;
        Ok(IndicatorDetailResponse {
            indicator: IndicatorRef {
                code: code.to_string(),
                ..Default::default()
            },
            details: DetailTable {
                rows,
                ..Default::default()
            },
            ..Default::default()
        })
    }
}

pub fn row(code: &str, flag: bool, name_th: &str) -> RawIndicatorRow {
    RawIndicatorRow {
        code: Some(code.to_string()),
        name_th: Some(name_th.to_string()),
        flag,
        ..Default::default()
    }
}

/// A spread over four categories: two fails, four passes.
pub fn sample_rows() -> Vec<RawIndicatorRow> {
    vec![
        row("AD10000", true, "ที่อยู่ซ้ำกัน"),
        row("AU10000", false, "ผู้สอบบัญชีร่วม"),
        row("D40000", false, "กรรมการต่างชาติ"),
        row("C10000", true, "ถือหุ้นไขว้"),
        row("H20000", false, "ต่างชาติครั้งแรก"),
        row("I10000", false, "อุตสาหกรรมเสี่ยง"),
    ]
}

pub fn arc(api: MockIndicatorApi) -> Arc<MockIndicatorApi> {
    Arc::new(api)
}

pub fn address_row() -> Value {
    json!({"address_th": "99 ถนนสุขุมวิท", "dup_companies": 12})
}
