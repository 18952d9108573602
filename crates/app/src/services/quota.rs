use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{Local, NaiveDate};
use serde::Serialize;

use crate::services::{SharedConfig, open_db};
use lens_core::Tier;
use lens_db::{KEY_LAST_RESET_DATE, KEY_SCANS_USED_TODAY, KEY_SUBSCRIPTION_TIER};

pub const DAILY_FREE_LIMIT: u32 = 3;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// In-memory quota ledger. Authoritative for the session; written through to
/// durable storage after every mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Ledger {
    tier: Tier,
    scans_used_today: u32,
    last_reset_date: NaiveDate,
}

impl Ledger {
    fn defaults(today: NaiveDate) -> Self {
        Self {
            tier: Tier::Free,
            scans_used_today: 0,
            last_reset_date: today,
        }
    }

    /// Lazy day rollover, shared by every operation so `can_scan` and
    /// `record_scan` cannot diverge. Returns true when state changed.
    fn normalize_for_today(&mut self, today: NaiveDate) -> bool {
        if self.last_reset_date == today {
            return false;
        }
        self.scans_used_today = 0;
        self.last_reset_date = today;
        true
    }

    fn admits(&self) -> bool {
        match self.tier {
            Tier::Premium => true,
            Tier::Free => self.scans_used_today < DAILY_FREE_LIMIT,
        }
    }
}

/// Snapshot of the ledger for the UI.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaStatus {
    pub tier: Tier,
    pub scans_used_today: u32,
    pub daily_limit: u32,
    pub can_scan: bool,
}

#[derive(Clone)]
pub struct QuotaService {
    config: SharedConfig,
    ledger: Arc<Mutex<Ledger>>,
}

impl QuotaService {
    pub(super) fn new(config: SharedConfig) -> Self {
        let today = Local::now().date_naive();
        let service = Self {
            config,
            ledger: Arc::new(Mutex::new(Ledger::defaults(today))),
        };
        service.reload_on(today);
        service
    }

    /// Re-read the persisted ledger. Used after the database is first set up.
    pub fn reload(&self) {
        self.reload_on(Local::now().date_naive());
    }

    pub fn can_scan(&self) -> bool {
        self.can_scan_on(Local::now().date_naive())
    }

    pub fn record_scan(&self) {
        self.record_scan_on(Local::now().date_naive());
    }

    pub fn upgrade(&self, tier: Tier) {
        self.upgrade_on(tier, Local::now().date_naive());
    }

    pub fn status(&self) -> QuotaStatus {
        self.status_on(Local::now().date_naive())
    }

    fn can_scan_on(&self, today: NaiveDate) -> bool {
        let mut ledger = self.lock();
        if ledger.normalize_for_today(today) {
            self.persist(&ledger);
        }
        ledger.admits()
    }

    fn record_scan_on(&self, today: NaiveDate) {
        let mut ledger = self.lock();
        let rolled = ledger.normalize_for_today(today);
        if ledger.tier == Tier::Premium {
            // Premium consumption is never tracked.
            if rolled {
                self.persist(&ledger);
            }
            return;
        }
        ledger.scans_used_today += 1;
        self.persist(&ledger);
    }

    fn upgrade_on(&self, tier: Tier, today: NaiveDate) {
        let mut ledger = self.lock();
        ledger.normalize_for_today(today);
        // A mid-day upgrade leaves the historical counter in place.
        ledger.tier = tier;
        self.persist(&ledger);
    }

    fn status_on(&self, today: NaiveDate) -> QuotaStatus {
        let mut ledger = self.lock();
        if ledger.normalize_for_today(today) {
            self.persist(&ledger);
        }
        QuotaStatus {
            tier: ledger.tier,
            scans_used_today: ledger.scans_used_today,
            daily_limit: DAILY_FREE_LIMIT,
            can_scan: ledger.admits(),
        }
    }

    fn reload_on(&self, today: NaiveDate) {
        let mut loaded = self.read_ledger(today);
        // A stale counter is clamped as part of load; callers never observe
        // yesterday's count against today's allowance.
        if loaded.normalize_for_today(today) {
            self.persist(&loaded);
        }
        *self.lock() = loaded;
    }

    fn read_ledger(&self, today: NaiveDate) -> Ledger {
        let db = match open_db(&self.config) {
            Ok(db) => db,
            Err(err) => {
                tracing::warn!("quota ledger read failed, assuming defaults: {}", err);
                return Ledger::defaults(today);
            }
        };
        let tier = db
            .get_setting(KEY_SUBSCRIPTION_TIER)
            .ok()
            .flatten()
            .and_then(|value| Tier::parse(&value))
            .unwrap_or_default();
        let scans_used_today = db
            .get_setting(KEY_SCANS_USED_TODAY)
            .ok()
            .flatten()
            .and_then(|value| value.parse().ok())
            .unwrap_or(0);
        let last_reset_date = db
            .get_setting(KEY_LAST_RESET_DATE)
            .ok()
            .flatten()
            .and_then(|value| NaiveDate::parse_from_str(&value, DATE_FORMAT).ok())
            .unwrap_or(today);
        Ledger {
            tier,
            scans_used_today,
            last_reset_date,
        }
    }

    /// Write-through persistence. Failure leaves the in-memory ledger
    /// authoritative; a later restart may lose the update.
    fn persist(&self, ledger: &Ledger) {
        let result = open_db(&self.config).and_then(|mut db| {
            Ok(db.replace_settings(&[
                (KEY_SUBSCRIPTION_TIER, ledger.tier.as_str().to_string()),
                (KEY_SCANS_USED_TODAY, ledger.scans_used_today.to_string()),
                (
                    KEY_LAST_RESET_DATE,
                    ledger.last_reset_date.format(DATE_FORMAT).to_string(),
                ),
            ])?)
        });
        if let Err(err) = result {
            tracing::warn!("quota ledger write failed: {}", err);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Ledger> {
        self.ledger
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
