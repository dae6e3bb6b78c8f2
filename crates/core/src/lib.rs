pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

use chrono::{NaiveDate, Utc};
use models::{
    calendar::{CalendarCursor, MonthGrid},
    date_key::DateKey,
    memo::MemoBook,
    settings::Settings,
    summary::{DashboardSummary, DayDetail},
    transaction::{Transaction, TransactionKind, TransactionLedger},
};
use services::{
    calendar_service::CalendarService,
    ledger_service::{Confirmation, LedgerService},
    summary_service::SummaryService,
};
use storage::{kv::KeyValueStore, manager::StorageManager};
use tracing::{debug, info};

use errors::CoreError;

/// Main entry point for the daybook core library.
///
/// Owns the memo book, the transaction ledger, the calendar cursor and the
/// selected date. All mutation goes through its methods; every mutation is
/// written through to the store and rolled back if the write fails.
#[must_use]
pub struct Daybook<S: KeyValueStore> {
    store: S,
    settings: Settings,
    memos: MemoBook,
    ledger: TransactionLedger,
    cursor: CalendarCursor,
    selected: Option<DateKey>,
    calendar_service: CalendarService,
    ledger_service: LedgerService,
    summary_service: SummaryService,
}

impl<S: KeyValueStore> std::fmt::Debug for Daybook<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Daybook")
            .field("memos", &self.memos.len())
            .field("transactions", &self.ledger.len())
            .field("cursor", &self.cursor)
            .field("selected", &self.selected)
            .field("settings", &self.settings)
            .finish()
    }
}

impl<S: KeyValueStore> Daybook<S> {
    /// Load memos and ledger from `store`, with the cursor on the current month.
    pub fn open(store: S, settings: Settings) -> Self {
        let today = Utc::now().date_naive();
        Self::open_at(store, settings, today)
    }

    /// Like [`Daybook::open`] with an explicit "today" (tests, replays).
    ///
    /// Never fails: absent or malformed snapshots load as empty.
    pub fn open_at(store: S, settings: Settings, today: NaiveDate) -> Self {
        let memos: MemoBook = StorageManager::load_or_default(&store, &settings.memo_key);
        let mut ledger: TransactionLedger =
            StorageManager::load_or_default(&store, &settings.ledger_key);
        ledger.normalize();

        debug!(
            memos = memos.len(),
            transactions = ledger.len(),
            "daybook loaded"
        );

        Self {
            calendar_service: CalendarService::new(settings.date_key_style, settings.grid_layout),
            ledger_service: LedgerService::new(),
            summary_service: SummaryService::new(),
            cursor: CalendarCursor::containing(today),
            selected: None,
            store,
            settings,
            memos,
            ledger,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Tear down and hand the store back.
    pub fn into_store(self) -> S {
        self.store
    }

    // ── Calendar ────────────────────────────────────────────────────

    #[must_use]
    pub fn cursor(&self) -> CalendarCursor {
        self.cursor
    }

    pub fn set_cursor(&mut self, cursor: CalendarCursor) {
        self.cursor = cursor;
    }

    pub fn next_month(&mut self) -> CalendarCursor {
        self.cursor = self.cursor.next();
        self.cursor
    }

    pub fn prev_month(&mut self) -> CalendarCursor {
        self.cursor = self.cursor.prev();
        self.cursor
    }

    /// Select a day. The key is re-spelled in the configured style.
    pub fn select_date(&mut self, key: DateKey) {
        self.selected = Some(key.with_style(self.settings.date_key_style));
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    #[must_use]
    pub fn selected(&self) -> Option<&DateKey> {
        self.selected.as_ref()
    }

    /// Build a [`DateKey`] in the configured style.
    #[must_use]
    pub fn key_for(&self, date: NaiveDate) -> DateKey {
        DateKey::from_date(date, self.settings.date_key_style)
    }

    /// Grid for the month under the cursor. A day is marked when it has a
    /// non-empty memo or at least one transaction.
    #[must_use]
    pub fn month_grid(&self, today: NaiveDate) -> MonthGrid {
        self.calendar_service.build_month(
            self.cursor,
            today,
            self.selected.as_ref(),
            |key| self.memos.has_record(key) || self.ledger.has_records_on(key),
        )
    }

    // ── Memos ───────────────────────────────────────────────────────

    #[must_use]
    pub fn memos(&self) -> &MemoBook {
        &self.memos
    }

    #[must_use]
    pub fn memo(&self, key: &DateKey) -> Option<&str> {
        self.memos.get(key)
    }

    /// Set or overwrite the memo for `key` (trimmed; blank is kept as blank).
    pub fn upsert_memo(&mut self, key: DateKey, text: &str) -> Result<(), CoreError> {
        let key = key.with_style(self.settings.date_key_style);
        let previous = self.memos.clone();
        self.memos.upsert(key, text);
        if let Err(e) = self.persist_memos() {
            self.memos = previous;
            return Err(e);
        }
        info!(date = %key, "memo saved");
        Ok(())
    }

    /// Remove the memo for `key`. Returns the removed text.
    pub fn delete_memo(&mut self, key: &DateKey) -> Result<Option<String>, CoreError> {
        let previous = self.memos.clone();
        let removed = self.memos.delete(key);
        if removed.is_none() {
            return Ok(None);
        }
        if let Err(e) = self.persist_memos() {
            self.memos = previous;
            return Err(e);
        }
        info!(date = %key, "memo deleted");
        Ok(removed)
    }

    // ── Ledger ──────────────────────────────────────────────────────

    #[must_use]
    pub fn ledger(&self) -> &TransactionLedger {
        &self.ledger
    }

    /// Add an entry on the selected date from raw form input.
    ///
    /// `amount` is coerced to digits first; an empty, zero or non-numeric
    /// amount, a missing category or no selected date is rejected and the
    /// ledger is left untouched.
    pub fn add_transaction(
        &mut self,
        kind: TransactionKind,
        category: &str,
        amount: &str,
        name: Option<&str>,
    ) -> Result<Transaction, CoreError> {
        let date = self.selected.ok_or(CoreError::NoDateSelected)?;
        let amount = LedgerService::parse_amount(amount)?;
        self.add_transaction_on(kind, date, category, amount, name)
    }

    /// Add an entry on an explicit date.
    pub fn add_transaction_on(
        &mut self,
        kind: TransactionKind,
        date: DateKey,
        category: &str,
        amount: u64,
        name: Option<&str>,
    ) -> Result<Transaction, CoreError> {
        let now_millis = Utc::now().timestamp_millis();
        self.add_transaction_at(kind, date, category, amount, name, now_millis)
    }

    /// Add an entry with an explicit creation time (the id source).
    pub fn add_transaction_at(
        &mut self,
        kind: TransactionKind,
        date: DateKey,
        category: &str,
        amount: u64,
        name: Option<&str>,
        now_millis: i64,
    ) -> Result<Transaction, CoreError> {
        let date = date.with_style(self.settings.date_key_style);
        let new = self
            .ledger_service
            .validate(kind, date, category, amount, name)?;

        let previous = self.ledger.clone();
        let tx = self.ledger_service.append(&mut self.ledger, new, now_millis);
        if let Err(e) = self.persist_ledger() {
            self.ledger = previous;
            return Err(e);
        }
        Ok(tx)
    }

    // ── Summary ─────────────────────────────────────────────────────

    #[must_use]
    pub fn summary(&self) -> DashboardSummary {
        self.summary_service.summarize(&self.ledger)
    }

    #[must_use]
    pub fn day_detail(&self, key: &DateKey) -> DayDetail {
        self.summary_service.day_detail(&self.ledger, key)
    }

    /// Detail of the selected date, if one is selected.
    #[must_use]
    pub fn selected_detail(&self) -> Option<DayDetail> {
        self.selected.as_ref().map(|key| self.day_detail(key))
    }

    // ── Reset & Export ──────────────────────────────────────────────

    /// Delete every memo. Irreversible; requires confirmation.
    pub fn reset_memos(&mut self, confirmation: Confirmation) -> Result<(), CoreError> {
        confirmation.require()?;
        StorageManager::clear(&mut self.store, &self.settings.memo_key)?;
        self.memos.clear();
        info!("memos reset");
        Ok(())
    }

    /// Delete every transaction. Irreversible; requires confirmation.
    pub fn reset_transactions(&mut self, confirmation: Confirmation) -> Result<(), CoreError> {
        confirmation.require()?;
        StorageManager::clear(&mut self.store, &self.settings.ledger_key)?;
        self.ledger.clear();
        info!("transactions reset");
        Ok(())
    }

    /// The ledger as pretty-printed JSON (same shape as the snapshot).
    pub fn export_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(&self.ledger)
            .map_err(|e| CoreError::Serialization(format!("Failed to export ledger: {e}")))
    }

    // ── Persistence ─────────────────────────────────────────────────

    fn persist_memos(&mut self) -> Result<(), CoreError> {
        StorageManager::save(&mut self.store, &self.settings.memo_key, &self.memos)
    }

    fn persist_ledger(&mut self) -> Result<(), CoreError> {
        StorageManager::save(&mut self.store, &self.settings.ledger_key, &self.ledger)
    }
}
