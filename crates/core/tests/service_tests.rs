use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, TimeZone, Utc};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use daybook_core::errors::CoreError;
use daybook_core::models::analysis::StressAnalysis;
use daybook_core::models::calendar::{CalendarCell, CalendarCursor, GridLayout};
use daybook_core::models::category::Category;
use daybook_core::models::date_key::{DateKey, DateKeyStyle};
use daybook_core::models::rate::{CurrencyCode, CurrencyKind, RatePoint};
use daybook_core::models::settings::Settings;
use daybook_core::models::summary::{DonutChart, SummaryTotals, EMPTY_DAY_MESSAGE};
use daybook_core::models::transaction::{Transaction, TransactionKind, TransactionLedger};
use daybook_core::providers::analysis::SentimentAnalyzer;
use daybook_core::providers::backend::{LedgerBackend, TransactionRequest};
use daybook_core::providers::registry::RateProviderRegistry;
use daybook_core::providers::traits::RateProvider;
use daybook_core::services::calendar_service::{CalendarService, SIX_WEEK_CELLS};
use daybook_core::services::converter_service::ConverterService;
use daybook_core::services::ledger_service::{Confirmation, LedgerService, MAX_AMOUNT};
use daybook_core::services::post_service::{
    random_nickname, PostBoard, NICKNAME_ALPHABET, NICKNAME_MAX_LEN, NICKNAME_MIN_LEN,
};
use daybook_core::services::remote_service::RemoteDashboard;
use daybook_core::services::summary_service::SummaryService;
use daybook_core::storage::kv::{KeyValueStore, MemoryStore};

fn key(s: &str) -> DateKey {
    DateKey::parse(s).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn tx(id: i64, kind: TransactionKind, day: &str, category: Category, amount: u64) -> Transaction {
    Transaction {
        id,
        date: key(day),
        name: String::new(),
        category,
        amount,
        kind,
    }
}

// ═══════════════════════════════════════════════════════════════════
// CalendarService
// ═══════════════════════════════════════════════════════════════════

mod calendar_service {
    use super::*;

    #[test]
    fn leading_blanks_and_day_count_for_every_month() {
        let service = CalendarService::default();
        for year in [1999, 2023, 2024, 2100] {
            for month in 0..12 {
                let cursor = CalendarCursor::new(year, month).unwrap();
                let grid = service.build_month(cursor, date(2000, 1, 1), None, |_| false);
                let first = date(year, month + 1, 1);
                assert_eq!(
                    grid.leading_blanks(),
                    first.weekday().num_days_from_sunday() as usize
                );
                assert_eq!(grid.days().count() as u32, cursor.days_in_month());
                assert_eq!(grid.cells.len(), grid.leading_blanks() + grid.days().count());
            }
        }
    }

    #[test]
    fn february_2024() {
        let service = CalendarService::default();
        let grid = service.build_month(CalendarCursor::new(2024, 1).unwrap(), date(2024, 2, 14), None, |_| false);
        assert_eq!(grid.leading_blanks(), 4);
        assert_eq!(grid.days().count(), 29);
        assert_eq!(grid.title(), "February 2024");
        assert_eq!(grid.rows().count(), 5);
    }

    #[test]
    fn today_selected_and_record_flags() {
        let service = CalendarService::new(DateKeyStyle::Compact, GridLayout::Compact);
        let selected = key("2024-02-20");
        let grid = service.build_month(
            CalendarCursor::new(2024, 1).unwrap(),
            date(2024, 2, 14),
            Some(&selected),
            |k| *k == key("2024-2-5"),
        );

        let today = grid.day(14).unwrap();
        assert!(today.is_today && !today.is_selected);
        assert!(grid.day(20).unwrap().is_selected);
        assert!(grid.day(5).unwrap().has_record);
        assert_eq!(grid.days().filter(|d| d.has_record).count(), 1);
        assert_eq!(grid.days().filter(|d| d.is_today).count(), 1);
        assert_eq!(grid.day(5).unwrap().key.to_string(), "2024-2-5");
    }

    #[test]
    fn today_outside_month_marks_nothing() {
        let service = CalendarService::default();
        let grid = service.build_month(CalendarCursor::new(2024, 1).unwrap(), date(2024, 3, 1), None, |_| false);
        assert!(grid.days().all(|d| !d.is_today));
    }

    #[test]
    fn full_weeks_layout_pads_last_row() {
        let service = CalendarService::new(DateKeyStyle::Padded, GridLayout::FullWeeks);
        let grid = service.build_month(CalendarCursor::new(2024, 1).unwrap(), date(2024, 2, 1), None, |_| false);
        assert_eq!(grid.cells.len(), 35);
        assert!(grid.rows().all(|r| r.len() == 7));
        assert!(grid.cells.last().unwrap().is_blank());
    }

    #[test]
    fn six_weeks_layout_is_always_42() {
        let service = CalendarService::new(DateKeyStyle::Padded, GridLayout::SixWeeks);
        for month in 0..12 {
            let grid = service.build_month(CalendarCursor::new(2025, month).unwrap(), date(2025, 1, 1), None, |_| false);
            assert_eq!(grid.cells.len(), SIX_WEEK_CELLS);
        }
    }

    #[test]
    fn cells_are_blank_then_days_in_order() {
        let service = CalendarService::default();
        let grid = service.build_month(CalendarCursor::new(2024, 8).unwrap(), date(2024, 9, 1), None, |_| false);
        let days: Vec<u32> = grid
            .cells
            .iter()
            .filter_map(|c| match c {
                CalendarCell::Day(d) => Some(d.day),
                CalendarCell::Blank => None,
            })
            .collect();
        assert_eq!(days, (1..=30).collect::<Vec<_>>());
    }
}

// ═══════════════════════════════════════════════════════════════════
// LedgerService
// ═══════════════════════════════════════════════════════════════════

mod ledger_service {
    use super::*;

    #[test]
    fn parse_amount_strips_separators() {
        assert_eq!(LedgerService::parse_amount("500,000").unwrap(), 500000);
        assert_eq!(LedgerService::parse_amount(" 12 000 ₩").unwrap(), 12000);
    }

    #[test]
    fn parse_amount_rejects_empty_zero_and_overflow() {
        for bad in ["", "abc", "0", "000", "99999999999999999999999"] {
            assert!(
                matches!(LedgerService::parse_amount(bad), Err(CoreError::Validation(_))),
                "{bad}"
            );
        }
    }

    #[test]
    fn validate_requires_known_category() {
        let s = LedgerService::new();
        let d = key("2024-02-05");
        assert!(matches!(s.validate(TransactionKind::Expense, d, "", 10, None), Err(CoreError::Validation(_))));
        assert!(matches!(s.validate(TransactionKind::Expense, d, "pets", 10, None), Err(CoreError::Validation(_))));
        assert!(matches!(s.validate(TransactionKind::Expense, d, "food", 0, None), Err(CoreError::Validation(_))));

        let ok = s.validate(TransactionKind::Expense, d, "Food", 10, Some("  lunch ")).unwrap();
        assert_eq!(ok.category, Category::Food);
        assert_eq!(ok.name, "lunch");
    }

    #[test]
    fn parse_amount_caps_at_max_amount() {
        assert_eq!(LedgerService::parse_amount(&MAX_AMOUNT.to_string()).unwrap(), MAX_AMOUNT);
        for bad in ["9223372036854775808", "18446744073709551615", "10000000000000000000"] {
            assert!(
                matches!(LedgerService::parse_amount(bad), Err(CoreError::Validation(_))),
                "{bad}"
            );
        }
    }

    #[test]
    fn validate_rejects_amount_above_cap() {
        let s = LedgerService::new();
        let d = key("2024-02-05");
        assert!(matches!(
            s.validate(TransactionKind::Income, d, "salary", MAX_AMOUNT + 1, None),
            Err(CoreError::Validation(_))
        ));
        assert!(s.validate(TransactionKind::Income, d, "salary", MAX_AMOUNT, None).is_ok());
    }

    #[test]
    fn validate_rejects_category_from_other_side() {
        let s = LedgerService::new();
        let d = key("2024-02-05");
        assert!(matches!(s.validate(TransactionKind::Income, d, "food", 10, None), Err(CoreError::Validation(_))));
        assert!(matches!(s.validate(TransactionKind::Expense, d, "salary", 10, None), Err(CoreError::Validation(_))));
        assert!(s.validate(TransactionKind::Income, d, "investment", 10, None).is_ok());
        assert!(s.validate(TransactionKind::Expense, d, "savings", 10, None).is_ok());
    }

    #[test]
    fn ids_are_strictly_increasing() {
        let s = LedgerService::new();
        let mut ledger = TransactionLedger::new();
        let d = key("2024-02-05");

        let a = s.append(&mut ledger, s.validate(TransactionKind::Income, d, "salary", 1, None).unwrap(), 1000);
        // same millisecond
        let b = s.append(&mut ledger, s.validate(TransactionKind::Expense, d, "food", 1, None).unwrap(), 1000);
        // clock went backwards
        let c = s.append(&mut ledger, s.validate(TransactionKind::Expense, d, "food", 1, None).unwrap(), 500);
        let e = s.append(&mut ledger, s.validate(TransactionKind::Expense, d, "food", 1, None).unwrap(), 5000);

        assert_eq!((a.id, b.id, c.id, e.id), (1000, 1001, 1002, 5000));
        assert_eq!(ledger.incomes.len(), 1);
        assert_eq!(ledger.expenses.len(), 3);
        assert_eq!(ledger.expenses.last().unwrap().id, 5000);
    }

    #[test]
    fn confirmation() {
        assert!(Confirmation::Confirmed.require().is_ok());
        assert!(matches!(Confirmation::Declined.require(), Err(CoreError::ResetNotConfirmed)));
        assert_eq!(Confirmation::from(true), Confirmation::Confirmed);
        assert_eq!(Confirmation::from(false), Confirmation::Declined);
    }
}

// ═══════════════════════════════════════════════════════════════════
// SummaryService
// ═══════════════════════════════════════════════════════════════════

mod summary_service {
    use super::*;

    #[test]
    fn income_and_food_scenario() {
        let ledger = TransactionLedger {
            incomes: vec![tx(1, TransactionKind::Income, "2024-02-05", Category::Salary, 500000)],
            expenses: vec![tx(2, TransactionKind::Expense, "2024-02-05", Category::Food, 200000)],
        };
        let s = SummaryService::new().summarize(&ledger);

        assert_eq!(s.total_income, 500000);
        assert_eq!(s.total_expense, 200000);
        assert_eq!(s.remaining, 300000);
        assert!((s.remaining_pct - 60.0).abs() < 1e-9);
        assert_eq!(s.expense_by_category, BTreeMap::from([(Category::Food, 200000)]));
        assert_eq!(s.categories.len(), 1);
        assert!((s.categories[0].percentage - 100.0).abs() < 1e-9);
        assert_eq!(s.donut.to_css(), "conic-gradient(#FF453A 0% 100%)");
    }

    #[test]
    fn no_income_means_zero_percent() {
        let ledger = TransactionLedger {
            incomes: vec![],
            expenses: vec![tx(1, TransactionKind::Expense, "2024-02-05", Category::Food, 100)],
        };
        let s = SummaryService::new().summarize(&ledger);
        assert_eq!(s.remaining, -100);
        assert_eq!(s.remaining_pct, 0.0);
    }

    #[test]
    fn overspending_is_negative_but_bar_clamped() {
        let ledger = TransactionLedger {
            incomes: vec![tx(1, TransactionKind::Income, "2024-02-05", Category::Salary, 1000)],
            expenses: vec![tx(2, TransactionKind::Expense, "2024-02-05", Category::Living, 1500)],
        };
        let s = SummaryService::new().summarize(&ledger);
        assert_eq!(s.remaining, -500);
        assert_eq!(s.remaining_pct_rounded(), -50);
        assert_eq!(s.progress_width_pct(), 0.0);
    }

    #[test]
    fn huge_expenses_saturate_instead_of_overflowing() {
        let ledger = TransactionLedger {
            incomes: vec![tx(1, TransactionKind::Income, "2024-02-05", Category::Salary, 1000)],
            expenses: vec![
                tx(2, TransactionKind::Expense, "2024-02-05", Category::Food, 10_000_000_000_000_000_000),
                tx(3, TransactionKind::Expense, "2024-02-05", Category::Food, 10_000_000_000_000_000_000),
            ],
        };
        let s = SummaryService::new().summarize(&ledger);
        assert_eq!(s.total_expense, u64::MAX);
        assert_eq!(s.expense_by_category[&Category::Food], u64::MAX);
        assert_eq!(s.remaining, i64::MIN);
        assert_eq!(s.progress_width_pct(), 0.0);
        assert_eq!(s.donut.segments().last().unwrap().end_pct, 100.0);
    }

    #[test]
    fn huge_income_keeps_positive_remaining() {
        let ledger = TransactionLedger {
            incomes: vec![tx(1, TransactionKind::Income, "2024-02-05", Category::Salary, u64::MAX)],
            expenses: vec![],
        };
        let s = SummaryService::new().summarize(&ledger);
        assert_eq!(s.remaining, i64::MAX);
        assert!((s.remaining_pct - 100.0).abs() < 1e-9);
    }

    #[test]
    fn empty_ledger_renders_placeholder() {
        let s = SummaryService::new().summarize(&TransactionLedger::new());
        assert_eq!(s.donut, DonutChart::Placeholder);
        assert!(s.categories.is_empty());
        assert_eq!(s.remaining_pct, 0.0);
    }

    #[test]
    fn categories_sorted_descending_with_key_tie_break() {
        let ledger = TransactionLedger {
            incomes: vec![],
            expenses: vec![
                tx(1, TransactionKind::Expense, "2024-02-01", Category::Medical, 100),
                tx(2, TransactionKind::Expense, "2024-02-01", Category::Food, 300),
                tx(3, TransactionKind::Expense, "2024-02-02", Category::Communication, 100),
                tx(4, TransactionKind::Expense, "2024-02-03", Category::Food, 100),
                tx(5, TransactionKind::Expense, "2024-02-03", Category::from("pets"), 400),
            ],
        };
        let s = SummaryService::new().summarize(&ledger);
        let order: Vec<&str> = s.categories.iter().map(|c| c.category.key()).collect();
        assert_eq!(order, vec!["food", "pets", "communication", "medical"]);

        let sum: u64 = s.expense_by_category.values().sum();
        assert_eq!(sum, s.total_expense);
        let pct: f64 = s.categories.iter().map(|c| c.percentage).sum();
        assert!((pct - 100.0).abs() < 1e-6);

        let segments = s.donut.segments();
        assert_eq!(segments.first().unwrap().start_pct, 0.0);
        assert_eq!(segments.last().unwrap().end_pct, 100.0);
        for pair in segments.windows(2) {
            assert_eq!(pair[0].end_pct, pair[1].start_pct);
        }
        assert_eq!(s.categories[1].color, "#8E8E93");
        assert_eq!(s.categories[1].label, "pets");
    }

    #[test]
    fn remote_totals_render_like_local() {
        let totals = SummaryTotals {
            total_income: 500000,
            total_expense: 200000,
            expense_by_category: BTreeMap::from([(Category::Food, 200000), (Category::Etc, 0)]),
        };
        let s = SummaryService::new().summarize_totals(totals);
        assert_eq!(s.remaining, 300000);
        assert_eq!(s.categories.len(), 1);
    }

    #[test]
    fn day_detail_orders_by_id_and_signs() {
        let ledger = TransactionLedger {
            incomes: vec![tx(20, TransactionKind::Income, "2024-02-05", Category::Bonus, 1500)],
            expenses: vec![
                tx(10, TransactionKind::Expense, "2024-02-05", Category::Food, 200000),
                tx(30, TransactionKind::Expense, "2024-02-06", Category::Food, 1),
            ],
        };
        let detail = SummaryService::new().day_detail(&ledger, &key("2024-2-5"));
        let ids: Vec<i64> = detail.entries.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![10, 20]);
        assert_eq!(detail.entries[0].signed_amount(), "-200,000");
        assert_eq!(detail.entries[1].signed_amount(), "+1,500");
        assert_eq!(detail.entries[1].label, "Bonus");
        assert_eq!(detail.empty_message(), None);
    }

    #[test]
    fn empty_day_has_message() {
        let detail = SummaryService::new().day_detail(&TransactionLedger::new(), &key("2024-02-07"));
        assert!(detail.is_empty());
        assert_eq!(detail.empty_message(), Some(EMPTY_DAY_MESSAGE));
    }
}

// ═══════════════════════════════════════════════════════════════════
// ConverterService — with mock providers
// ═══════════════════════════════════════════════════════════════════

/// Returns a fixed rate and a two-point history; counts calls.
struct FixedRateProvider {
    name: String,
    kind: CurrencyKind,
    rate: f64,
    calls: Arc<AtomicUsize>,
}

impl FixedRateProvider {
    fn new(name: &str, kind: CurrencyKind, rate: f64) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                name: name.into(),
                kind,
                rate,
                calls: calls.clone(),
            },
            calls,
        )
    }
}

#[async_trait]
impl RateProvider for FixedRateProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn supported_kinds(&self) -> Vec<CurrencyKind> {
        vec![self.kind]
    }

    async fn get_rate(&self, _from: &CurrencyCode, _to: &CurrencyCode) -> Result<f64, CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.rate)
    }

    async fn get_history(
        &self,
        _from: &CurrencyCode,
        _to: &CurrencyCode,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RatePoint>, CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![
            RatePoint { date: start, rate: self.rate },
            RatePoint { date: end, rate: self.rate },
        ])
    }
}

struct DownProvider(CurrencyKind);

#[async_trait]
impl RateProvider for DownProvider {
    fn name(&self) -> &str {
        "Down"
    }

    fn supported_kinds(&self) -> Vec<CurrencyKind> {
        vec![self.0]
    }

    async fn get_rate(&self, _from: &CurrencyCode, _to: &CurrencyCode) -> Result<f64, CoreError> {
        Err(CoreError::Network("connection refused".into()))
    }

    async fn get_history(
        &self,
        _from: &CurrencyCode,
        _to: &CurrencyCode,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<Vec<RatePoint>, CoreError> {
        Err(CoreError::Network("connection refused".into()))
    }
}

fn code(s: &str) -> CurrencyCode {
    CurrencyCode::parse(s).unwrap()
}

mod converter_service {
    use super::*;

    fn service() -> (ConverterService, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let (fiat, fiat_calls) = FixedRateProvider::new("fiat", CurrencyKind::Fiat, 1300.0);
        let (crypto, crypto_calls) = FixedRateProvider::new("crypto", CurrencyKind::Crypto, 0.00002);
        let mut registry = RateProviderRegistry::new();
        registry.register(Box::new(fiat));
        registry.register(Box::new(crypto));
        (ConverterService::new(registry), fiat_calls, crypto_calls)
    }

    #[tokio::test]
    async fn fiat_pair_uses_fiat_provider() {
        let (svc, fiat, crypto) = service();
        let c = svc.convert(1000.0, &code("USD"), &code("KRW")).await.unwrap();
        assert_eq!(c.converted, 1_300_000.0);
        assert_eq!(c.describe(), "1,000 USD ≈ 1,300,000 KRW");
        assert_eq!((fiat.load(Ordering::SeqCst), crypto.load(Ordering::SeqCst)), (1, 0));
    }

    #[tokio::test]
    async fn crypto_involved_uses_crypto_provider() {
        let (svc, fiat, crypto) = service();
        svc.convert(50.0, &code("USD"), &code("BTC")).await.unwrap();
        svc.convert(1.0, &code("ETH"), &code("BTC")).await.unwrap();
        assert_eq!((fiat.load(Ordering::SeqCst), crypto.load(Ordering::SeqCst)), (0, 2));
    }

    #[tokio::test]
    async fn same_currency_is_identity_without_network() {
        let (svc, fiat, crypto) = service();
        let c = svc.convert(42.5, &code("EUR"), &code("EUR")).await.unwrap();
        assert_eq!((c.rate, c.converted), (1.0, 42.5));
        assert_eq!(fiat.load(Ordering::SeqCst) + crypto.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn rejects_non_positive_amounts() {
        let (svc, _, _) = service();
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                svc.convert(bad, &code("USD"), &code("KRW")).await,
                Err(CoreError::Validation(_))
            ));
        }
    }

    #[tokio::test]
    async fn history_window_and_unsupported_pairs() {
        let (svc, _, _) = service();
        let today = date(2024, 3, 31);
        let points = svc.history(&code("USD"), &code("KRW"), today, 30).await.unwrap();
        assert_eq!(points.first().unwrap().date, date(2024, 3, 1));
        assert_eq!(points.last().unwrap().date, today);

        assert!(matches!(
            svc.history(&code("USD"), &code("USD"), today, 30).await,
            Err(CoreError::Unsupported(_))
        ));
        assert!(matches!(
            svc.history(&code("BTC"), &code("ETH"), today, 30).await,
            Err(CoreError::Unsupported(_))
        ));
    }

    #[tokio::test]
    async fn falls_back_to_next_provider() {
        let (good, calls) = FixedRateProvider::new("backup", CurrencyKind::Fiat, 2.0);
        let mut registry = RateProviderRegistry::new();
        registry.register(Box::new(DownProvider(CurrencyKind::Fiat)));
        registry.register(Box::new(good));
        let svc = ConverterService::new(registry);

        let c = svc.convert(10.0, &code("USD"), &code("EUR")).await.unwrap();
        assert_eq!(c.converted, 20.0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn all_providers_down_surfaces_last_error() {
        let mut registry = RateProviderRegistry::new();
        registry.register(Box::new(DownProvider(CurrencyKind::Fiat)));
        let svc = ConverterService::new(registry);
        assert!(matches!(
            svc.convert(10.0, &code("USD"), &code("EUR")).await,
            Err(CoreError::Network(_))
        ));
    }

    #[tokio::test]
    async fn no_provider_for_kind() {
        let svc = ConverterService::new(RateProviderRegistry::new());
        assert!(!svc.has_provider_for(CurrencyKind::Crypto));
        assert!(matches!(
            svc.convert(1.0, &code("BTC"), &code("USD")).await,
            Err(CoreError::NoProvider(_))
        ));
    }

    #[tokio::test]
    async fn invalid_rate_is_rejected() {
        let (zero, _) = FixedRateProvider::new("zero", CurrencyKind::Fiat, 0.0);
        let mut registry = RateProviderRegistry::new();
        registry.register(Box::new(zero));
        let svc = ConverterService::new(registry);
        assert!(matches!(
            svc.convert(1.0, &code("USD"), &code("EUR")).await,
            Err(CoreError::Api { .. })
        ));
    }

    #[test]
    fn routing() {
        assert_eq!(ConverterService::route(&code("USD"), &code("KRW")), CurrencyKind::Fiat);
        assert_eq!(ConverterService::route(&code("USD"), &code("XRP")), CurrencyKind::Crypto);
        assert_eq!(ConverterService::route(&code("BTC"), &code("ETH")), CurrencyKind::Crypto);
    }
}

// ═══════════════════════════════════════════════════════════════════
// RemoteDashboard — with a mock backend
// ═══════════════════════════════════════════════════════════════════

#[derive(Default)]
struct MockBackend {
    fail: bool,
    posted: Mutex<Vec<(TransactionKind, TransactionRequest)>>,
    resets: AtomicUsize,
}

#[async_trait]
impl LedgerBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_summary(&self) -> Result<SummaryTotals, CoreError> {
        if self.fail {
            return Err(CoreError::Network("503".into()));
        }
        Ok(SummaryTotals {
            total_income: 500000,
            total_expense: 200000,
            expense_by_category: BTreeMap::from([(Category::Food, 200000)]),
        })
    }

    async fn fetch_transactions(&self, date: &DateKey) -> Result<Vec<Transaction>, CoreError> {
        if self.fail {
            return Err(CoreError::Network("503".into()));
        }
        Ok(vec![Transaction {
            id: 7,
            date: *date,
            name: String::new(),
            category: Category::Food,
            amount: 200000,
            kind: TransactionKind::Expense,
        }])
    }

    async fn add_transaction(
        &self,
        kind: TransactionKind,
        request: &TransactionRequest,
    ) -> Result<(), CoreError> {
        if self.fail {
            return Err(CoreError::Network("503".into()));
        }
        self.posted.lock().unwrap().push((kind, request.clone()));
        Ok(())
    }

    async fn reset(&self) -> Result<(), CoreError> {
        self.resets.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

mod remote_dashboard {
    use super::*;

    #[tokio::test]
    async fn summary_from_backend() {
        let dash = RemoteDashboard::new(MockBackend::default());
        let outcome = dash.summary().await;
        assert!(!outcome.is_degraded());
        assert_eq!(outcome.value.remaining, 300000);
        assert!((outcome.value.remaining_pct - 60.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn failures_fall_back_to_zeroes_and_empty_list() {
        let dash = RemoteDashboard::new(MockBackend { fail: true, ..Default::default() });

        let summary = dash.summary().await;
        assert!(summary.is_degraded());
        assert_eq!(summary.value.total_income, 0);
        assert_eq!(summary.value.total_expense, 0);
        assert_eq!(summary.value.donut, DonutChart::Placeholder);

        let day = dash.day_detail(&key("2024-02-05")).await;
        assert!(day.is_degraded());
        assert_eq!(day.value.empty_message(), Some(EMPTY_DAY_MESSAGE));
    }

    #[tokio::test]
    async fn day_detail_from_backend() {
        let dash = RemoteDashboard::new(MockBackend::default());
        let day = dash.day_detail(&key("2024-02-05")).await;
        assert_eq!(day.value.entries.len(), 1);
        assert_eq!(day.value.entries[0].signed_amount(), "-200,000");
    }

    #[tokio::test]
    async fn add_validates_before_posting() {
        let dash = RemoteDashboard::new(MockBackend::default());
        let d = key("2024-2-5");

        assert!(matches!(
            dash.add_transaction(TransactionKind::Expense, None, "food", "100").await,
            Err(CoreError::NoDateSelected)
        ));
        assert!(matches!(
            dash.add_transaction(TransactionKind::Expense, Some(&d), "food", "zero").await,
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            dash.add_transaction(TransactionKind::Expense, Some(&d), "", "100").await,
            Err(CoreError::Validation(_))
        ));
        assert!(dash.backend().posted.lock().unwrap().is_empty());

        dash.add_transaction(TransactionKind::Income, Some(&d), "salary", "500,000")
            .await
            .unwrap();
        let posted = dash.backend().posted.lock().unwrap();
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0].0, TransactionKind::Income);
        assert_eq!(
            posted[0].1,
            TransactionRequest {
                date: "2024-02-05".into(),
                category: "salary".into(),
                amount: 500000,
            }
        );
    }

    #[tokio::test]
    async fn add_reports_backend_failure() {
        let dash = RemoteDashboard::new(MockBackend { fail: true, ..Default::default() });
        let d = key("2024-02-05");
        assert!(matches!(
            dash.add_transaction(TransactionKind::Expense, Some(&d), "food", "100").await,
            Err(CoreError::Network(_))
        ));
    }

    #[tokio::test]
    async fn reset_requires_confirmation() {
        let dash = RemoteDashboard::new(MockBackend::default());
        assert!(matches!(dash.reset(Confirmation::Declined).await, Err(CoreError::ResetNotConfirmed)));
        assert_eq!(dash.backend().resets.load(Ordering::SeqCst), 0);
        dash.reset(Confirmation::Confirmed).await.unwrap();
        assert_eq!(dash.backend().resets.load(Ordering::SeqCst), 1);
    }
}

// ═══════════════════════════════════════════════════════════════════
// PostBoard — with a mock analyzer
// ═══════════════════════════════════════════════════════════════════

struct CountingAnalyzer {
    calls: AtomicUsize,
    seen: Mutex<Option<String>>,
}

impl CountingAnalyzer {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            seen: Mutex::new(None),
        }
    }
}

#[async_trait]
impl SentimentAnalyzer for CountingAnalyzer {
    fn name(&self) -> &str {
        "counting"
    }

    async fn analyze(&self, corpus: &str) -> Result<StressAnalysis, CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.seen.lock().unwrap() = Some(corpus.to_string());
        Ok(StressAnalysis {
            advice: "Take a walk.".into(),
            stress_analysis: BTreeMap::from([("#work".to_string(), 70.0), ("#health".to_string(), 30.0)]),
        })
    }
}

mod post_board {
    use super::*;

    fn at(h: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, h, 0, 0).unwrap()
    }

    #[test]
    fn nickname_shape() {
        for _ in 0..50 {
            let n = random_nickname().unwrap();
            assert!((NICKNAME_MIN_LEN..=NICKNAME_MAX_LEN).contains(&n.chars().count()));
            assert!(n.chars().all(|c| NICKNAME_ALPHABET.contains(&c)));
        }
    }

    #[test]
    fn user_id_created_once() {
        let settings = Settings::default();
        let board = PostBoard::open(MemoryStore::new(), settings.clone()).unwrap();
        let id = board.user_id().to_string();
        assert!(id.starts_with("user_"));

        let store = board.into_store();
        assert_eq!(store.get("stress-community-userId").unwrap().as_deref(), Some(id.as_str()));
        let reopened = PostBoard::open(store, settings).unwrap();
        assert_eq!(reopened.user_id(), id);
    }

    #[test]
    fn publish_prepends_and_persists() {
        let settings = Settings::default();
        let mut board = PostBoard::open(MemoryStore::new(), settings.clone()).unwrap();
        board.publish("first", at(9)).unwrap();
        board.publish("<b>second</b>", at(10)).unwrap();
        assert_eq!(board.feed().len(), 2);
        assert_eq!(board.feed().posts()[0].content, "<b>second</b>");

        let id = board.user_id().to_string();
        let store = board.into_store();
        assert!(store.contains_key(&format!("posts_{id}")));

        let reopened = PostBoard::open(store, settings).unwrap();
        assert_eq!(reopened.feed().len(), 2);
        assert_eq!(reopened.corpus(), "second\n\nfirst");
    }

    #[test]
    fn rejects_empty_content() {
        let mut board = PostBoard::open(MemoryStore::new(), Settings::default()).unwrap();
        for bad in ["", "   ", "<br>", " <BR> "] {
            assert!(matches!(board.publish(bad, at(9)), Err(CoreError::Validation(_))), "{bad:?}");
        }
        assert!(board.feed().is_empty());
    }

    #[tokio::test]
    async fn analyze_requires_posts() {
        let board = PostBoard::open(MemoryStore::new(), Settings::default()).unwrap();
        let analyzer = CountingAnalyzer::new();
        assert!(matches!(board.analyze(&analyzer).await, Err(CoreError::Validation(_))));
        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn analyze_sends_plain_corpus() {
        let mut board = PostBoard::open(MemoryStore::new(), Settings::default()).unwrap();
        board.publish("deadline<br>again", at(9)).unwrap();
        let analyzer = CountingAnalyzer::new();
        let result = board.analyze(&analyzer).await.unwrap();
        assert!(result.is_normalized());
        assert_eq!(analyzer.seen.lock().unwrap().as_deref(), Some("deadline\nagain"));
    }
}
