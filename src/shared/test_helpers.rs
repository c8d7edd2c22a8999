//! In-memory collaborators and fixtures shared by unit tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use fake::faker::lorem::en::{Sentence, Words};
use fake::Fake;
use image::codecs::jpeg::JpegEncoder;
use image::{Rgb, RgbImage};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::preferences::services::PreferenceStore;
use crate::features::reports::models::{Report, ReportCategory, ReportPriority, ReportStatus};
use crate::features::reports::services::ReportStore;
use crate::modules::imaging::CompressedImage;
use crate::modules::storage::{photo_path, MediaStore, PhotoRef};

/// A valid `New` report created an hour ago with severity 3 and no votes
pub fn report_fixture(id: &str, user_id: &str) -> Report {
    let created_at = Utc::now() - Duration::hours(1);
    let words: Vec<String> = Words(2..4).fake();

    Report {
        id: id.to_string(),
        title: Sentence(2..5).fake(),
        description: Sentence(5..12).fake(),
        category: ReportCategory::RoadDamage,
        status: ReportStatus::New,
        priority: ReportPriority::Medium,
        severity: 3,
        latitude: -6.2,
        longitude: 106.8,
        location_name: words.join(" "),
        address: "Jl. Merdeka No. 1".to_string(),
        photo_id: None,
        completion_photo_id: None,
        votes: 0,
        user_id: user_id.to_string(),
        created_at,
        updated_at: created_at,
    }
}

/// Baseline JPEG with some texture so re-encoding has work to do
pub fn sample_jpeg(width: u32, height: u32) -> Vec<u8> {
    let image = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x + y) * 3 % 256) as u8])
    });
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, 95)
        .encode_image(&image)
        .expect("encode sample jpeg");
    bytes
}

fn outage(what: &str) -> AppError {
    AppError::StoreUnavailable(format!("{} is offline", what))
}

pub struct InMemoryReportStore {
    reports: Mutex<Vec<Report>>,
    unavailable: AtomicBool,
}

impl InMemoryReportStore {
    pub fn new(reports: Vec<Report>) -> Self {
        Self {
            reports: Mutex::new(reports),
            unavailable: AtomicBool::new(false),
        }
    }

    pub fn replace(&self, reports: Vec<Report>) {
        *self.reports.lock().unwrap() = reports;
    }

    pub fn status_of(&self, id: &str) -> Option<ReportStatus> {
        self.reports
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.status)
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(outage("report store"));
        }
        Ok(())
    }
}

#[async_trait]
impl ReportStore for InMemoryReportStore {
    async fn fetch_all(&self) -> Result<Vec<Report>> {
        self.check()?;
        Ok(self.reports.lock().unwrap().clone())
    }

    async fn fetch_for_user(&self, user_id: &str) -> Result<Vec<Report>> {
        self.check()?;
        Ok(self
            .reports
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn apply_status_change(&self, report_id: &str, new_status: ReportStatus) -> Result<()> {
        self.check()?;
        let mut reports = self.reports.lock().unwrap();
        let report = reports
            .iter_mut()
            .find(|r| r.id == report_id)
            .ok_or_else(|| AppError::NotFound(format!("Report {} not found", report_id)))?;

        if report.status != new_status && !report.status.can_transition_to(new_status) {
            return Err(AppError::Conflict(format!(
                "Report {} cannot move from {} to {}",
                report_id, report.status, new_status
            )));
        }
        report.status = new_status;
        report.updated_at = Utc::now();
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryPreferenceStore {
    values: Mutex<HashMap<String, String>>,
    unavailable: AtomicBool,
}

impl InMemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(outage("preference store"));
        }
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(outage("preference store"));
        }
        self.values.lock().unwrap().insert(key.to_string(), value);
        Ok(())
    }
}

#[async_trait]
impl PreferenceStore for InMemoryPreferenceStore {
    async fn get_bool(&self, key: &str, default: bool) -> Result<bool> {
        Ok(self
            .get(key)?
            .and_then(|v| v.parse().ok())
            .unwrap_or(default))
    }

    async fn set_bool(&self, key: &str, value: bool) -> Result<()> {
        self.set(key, value.to_string())
    }

    async fn get_i64(&self, key: &str, default: i64) -> Result<i64> {
        Ok(self
            .get(key)?
            .and_then(|v| v.parse().ok())
            .unwrap_or(default))
    }

    async fn set_i64(&self, key: &str, value: i64) -> Result<()> {
        self.set(key, value.to_string())
    }
}

#[derive(Default)]
pub struct InMemoryMediaStore {
    objects: Mutex<HashMap<String, CompressedImage>>,
    unavailable: AtomicBool,
}

impl InMemoryMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stored_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

#[async_trait]
impl MediaStore for InMemoryMediaStore {
    async fn store(&self, image: CompressedImage, owner: &str) -> Result<PhotoRef> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(outage("media store"));
        }

        let photo_id = Uuid::now_v7().to_string();
        let key = format!("public/{}", photo_path(owner, &photo_id));
        self.objects.lock().unwrap().insert(key.clone(), image);

        Ok(PhotoRef {
            url: format!("memory://{}", key),
            photo_id,
            key,
        })
    }
}
