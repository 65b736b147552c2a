use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    CloseRegisterCmd, ClosingStatus, Currency, Engine, EngineError, Money, PaymentDetails,
    PaymentMethod, SaleCmd, SaleStatus, TransactionCmd, TransactionKind,
};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (username, password) VALUES (?, ?)",
        vec!["alice".into(), "password".into()],
    ))
    .await
    .unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .timezone(chrono_tz::America::Argentina::Buenos_Aires)
        .build()
        .await
        .unwrap();
    (engine, db)
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
}

/// Local noon of the test day (Buenos Aires is UTC-3).
fn noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 17, 15, 0, 0).unwrap()
}

async fn income(engine: &Engine, amount: i64, currency: Currency, at: DateTime<Utc>) {
    engine
        .record_transaction(
            TransactionCmd::new(
                TransactionKind::Ingreso,
                Money::new(amount),
                "cobro",
                "alice",
                at,
            )
            .currency(currency),
        )
        .await
        .unwrap();
}

async fn paid_sale(engine: &Engine, order: &str, details: PaymentDetails, at: DateTime<Utc>) {
    let total = details.total();
    let sale = engine
        .record_sale(SaleCmd::new(order, total, at).payment_details(details))
        .await
        .unwrap();
    engine
        .set_sale_status(sale.id, SaleStatus::Paid, at)
        .await
        .unwrap();
}

fn details(amounts: &[(PaymentMethod, i64)]) -> PaymentDetails {
    PaymentDetails {
        amounts: amounts
            .iter()
            .map(|(method, amount)| (*method, Money::new(*amount)))
            .collect(),
    }
}

#[tokio::test]
async fn manual_entry_is_validated() {
    let (engine, _db) = engine_with_db().await;

    let zero = engine
        .record_transaction(TransactionCmd::new(
            TransactionKind::Egreso,
            Money::ZERO,
            "flete",
            "alice",
            noon(),
        ))
        .await;
    assert!(matches!(zero, Err(EngineError::InvalidAmount(_))));

    let venta = engine
        .record_transaction(TransactionCmd::new(
            TransactionKind::Venta,
            Money::new(100),
            "venta suelta",
            "alice",
            noon(),
        ))
        .await;
    assert!(matches!(venta, Err(EngineError::InvalidTransaction(_))));

    let blank = engine
        .record_transaction(TransactionCmd::new(
            TransactionKind::Ingreso,
            Money::new(100),
            "   ",
            "alice",
            noon(),
        ))
        .await;
    assert!(matches!(blank, Err(EngineError::InvalidTransaction(_))));

    let adjustment = engine
        .record_transaction(
            TransactionCmd::new(
                TransactionKind::Ajuste,
                Money::new(-250),
                " recuento ",
                "alice",
                noon(),
            )
            .category("  "),
        )
        .await
        .unwrap();
    assert_eq!(adjustment.description, "recuento");
    assert_eq!(adjustment.category, None);

    assert_eq!(engine.transactions_for_day(day()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn day_merges_ledger_and_settled_sales() {
    let (engine, _db) = engine_with_db().await;

    income(&engine, 10_000, Currency::Peso, noon()).await;
    paid_sale(
        &engine,
        "1001",
        details(&[
            (PaymentMethod::CashUsd, 5_000),
            (PaymentMethod::TransferArs, 200_000),
        ]),
        noon() + Duration::hours(1),
    )
    .await;

    // Pending sales never reach the register.
    engine
        .record_sale(SaleCmd::new("1002", Money::new(9_999), noon()))
        .await
        .unwrap();

    let txs = engine.transactions_for_day(day()).await.unwrap();
    assert_eq!(txs.len(), 3);
    assert!(txs.windows(2).all(|w| w[0].time >= w[1].time));

    let sales: Vec<_> = txs
        .iter()
        .filter(|t| t.kind == TransactionKind::Venta)
        .collect();
    assert_eq!(sales.len(), 2);
    assert!(sales.iter().any(|t| t.currency == Currency::Usd && t.amount == Money::new(5_000)));
    assert!(sales.iter().any(|t| {
        t.currency == Currency::PesoTransferencia && t.amount == Money::new(200_000)
    }));
    assert!(sales.iter().all(|t| t.user == engine::SYSTEM_USER));
}

#[tokio::test]
async fn window_edges_are_inclusive() {
    let (engine, _db) = engine_with_db().await;
    let window = engine.day_window(day()).unwrap();

    income(&engine, 1, Currency::Peso, window.start()).await;
    income(&engine, 2, Currency::Peso, window.end()).await;
    income(&engine, 4, Currency::Peso, window.start() - Duration::milliseconds(1)).await;
    income(&engine, 8, Currency::Peso, window.end() + Duration::milliseconds(1)).await;

    let txs = engine.transactions_for_day(day()).await.unwrap();
    let amounts: Vec<i64> = txs.iter().map(|t| t.amount.minor()).collect();
    assert_eq!(amounts, vec![2, 1]);
}

#[tokio::test]
async fn sale_back_to_pending_leaves_the_day() {
    let (engine, _db) = engine_with_db().await;
    let sale = engine
        .record_sale(SaleCmd::new("2001", Money::new(7_500), noon()).currency(Currency::Euro))
        .await
        .unwrap();

    let paid = engine
        .set_sale_status(sale.id, SaleStatus::Delivered, noon())
        .await
        .unwrap();
    assert_eq!(paid.paid_at, Some(noon()));
    let balance = engine.balance_for_day(day()).await.unwrap();
    assert_eq!(balance.get(Currency::Euro).income, Money::new(7_500));

    let pending = engine
        .set_sale_status(sale.id, SaleStatus::Pending, noon())
        .await
        .unwrap();
    assert_eq!(pending.paid_at, None);
    assert!(engine.transactions_for_day(day()).await.unwrap().is_empty());

    let missing = engine
        .set_sale_status(Uuid::new_v4(), SaleStatus::Paid, noon())
        .await;
    assert!(matches!(missing, Err(EngineError::KeyNotFound(_))));
}

#[tokio::test]
async fn duplicate_order_numbers_are_rejected() {
    let (engine, _db) = engine_with_db().await;
    engine
        .record_sale(SaleCmd::new("3001", Money::new(100), noon()))
        .await
        .unwrap();
    let again = engine
        .record_sale(SaleCmd::new(" 3001 ", Money::new(100), noon()))
        .await;
    assert_eq!(again.unwrap_err(), EngineError::ExistingKey("3001".to_string()));
}

#[tokio::test]
async fn balance_follows_credit_flags() {
    let (engine, _db) = engine_with_db().await;

    income(&engine, 10_000, Currency::Peso, noon()).await;
    engine
        .record_transaction(
            TransactionCmd::new(
                TransactionKind::Ingreso,
                Money::new(3_000),
                "fiado",
                "alice",
                noon(),
            )
            .receivable(true),
        )
        .await
        .unwrap();
    engine
        .record_transaction(TransactionCmd::new(
            TransactionKind::Compra,
            Money::new(2_000),
            "mercaderia",
            "alice",
            noon(),
        ))
        .await
        .unwrap();
    engine
        .record_transaction(
            TransactionCmd::new(
                TransactionKind::Compra,
                Money::new(500),
                "a cuenta",
                "alice",
                noon(),
            )
            .is_debt(true),
        )
        .await
        .unwrap();

    let balance = engine.balance_for_day(day()).await.unwrap();
    let peso = balance.get(Currency::Peso);
    assert_eq!(peso.income, Money::new(10_000));
    assert_eq!(peso.receivable, Money::new(3_000));
    assert_eq!(peso.expense, Money::new(2_000));
    assert_eq!(peso.payable, Money::new(500));
    assert_eq!(peso.balance, Money::new(10_500));
    assert_eq!(balance.iter().count(), Currency::ALL.len());
    assert_eq!(balance.total(), Money::new(10_500));
}

#[tokio::test]
async fn closing_compares_count_with_balance() {
    let (engine, _db) = engine_with_db().await;
    income(&engine, 10_000, Currency::Peso, noon()).await;
    income(&engine, 5_000, Currency::Usd, noon()).await;

    let exact = engine
        .close_register(
            CloseRegisterCmd::new(day(), "alice", Money::new(10_000), Utc::now())
                .currency(Currency::Peso),
        )
        .await
        .unwrap();
    assert_eq!(exact.status, ClosingStatus::Correcto);
    assert_eq!(exact.difference, Money::ZERO);

    let short = engine
        .close_register(
            CloseRegisterCmd::new(day(), "alice", Money::new(14_000), Utc::now())
                .notes("faltan monedas"),
        )
        .await
        .unwrap();
    assert_eq!(short.calculated, Money::new(15_000));
    assert_eq!(short.difference, Money::new(-1_000));
    assert_eq!(short.status, ClosingStatus::Faltante);

    let over = engine
        .close_register(
            CloseRegisterCmd::new(day(), "alice", Money::new(6_000), Utc::now())
                .currency(Currency::Usd),
        )
        .await
        .unwrap();
    assert_eq!(over.status, ClosingStatus::Sobrante);

    let stored = engine.closing(short.id).await.unwrap();
    assert_eq!(stored, short);

    let missing = engine.closing(Uuid::new_v4()).await;
    assert!(matches!(missing, Err(EngineError::KeyNotFound(_))));
}

#[tokio::test]
async fn closings_page_newest_first() {
    let (engine, _db) = engine_with_db().await;
    let base = noon();
    let mut ids = Vec::new();
    for i in 0..5 {
        let closing = engine
            .close_register(CloseRegisterCmd::new(
                day(),
                "alice",
                Money::ZERO,
                base + Duration::minutes(i),
            ))
            .await
            .unwrap();
        ids.push(closing.id);
    }
    ids.reverse();

    let (first, cursor) = engine.list_closings(2, None).await.unwrap();
    assert_eq!(first.iter().map(|c| c.id).collect::<Vec<_>>(), ids[..2].to_vec());
    let cursor = cursor.unwrap();

    let (second, cursor) = engine.list_closings(2, Some(&cursor)).await.unwrap();
    assert_eq!(second.iter().map(|c| c.id).collect::<Vec<_>>(), ids[2..4].to_vec());

    let (last, cursor) = engine
        .list_closings(2, cursor.as_deref())
        .await
        .unwrap();
    assert_eq!(last.iter().map(|c| c.id).collect::<Vec<_>>(), ids[4..].to_vec());
    assert!(cursor.is_none());

    let bad = engine.list_closings(2, Some("???")).await;
    assert!(matches!(bad, Err(EngineError::InvalidCursor(_))));
}

#[tokio::test]
async fn closings_limit_is_clamped() {
    let (engine, _db) = engine_with_db().await;
    engine
        .close_register(CloseRegisterCmd::new(day(), "alice", Money::ZERO, noon()))
        .await
        .unwrap();

    for limit in [i64::MAX as u64, u64::MAX, engine::MAX_CLOSINGS_LIMIT + 1] {
        let (closings, cursor) = engine.list_closings(limit, None).await.unwrap();
        assert_eq!(closings.len(), 1);
        assert!(cursor.is_none());
    }
}

#[tokio::test]
async fn oversized_amounts_are_rejected_at_intake() {
    let (engine, _db) = engine_with_db().await;

    let huge = engine
        .record_transaction(TransactionCmd::new(
            TransactionKind::Ingreso,
            Money::new(i64::MAX),
            "cobro",
            "alice",
            noon(),
        ))
        .await;
    assert!(matches!(huge, Err(EngineError::InvalidAmount(_))));

    let huge_total = engine
        .record_sale(SaleCmd::new("9001", Money::new(i64::MAX), noon()))
        .await;
    assert!(matches!(huge_total, Err(EngineError::InvalidAmount(_))));

    let huge_part = engine
        .record_sale(
            SaleCmd::new("9002", Money::new(100), noon())
                .payment_details(details(&[(PaymentMethod::CashArs, i64::MAX)])),
        )
        .await;
    assert!(matches!(huge_part, Err(EngineError::InvalidAmount(_))));

    let huge_count = engine
        .close_register(CloseRegisterCmd::new(
            day(),
            "alice",
            Money::new(i64::MAX),
            noon(),
        ))
        .await;
    assert!(matches!(huge_count, Err(EngineError::InvalidAmount(_))));

    // The largest accepted amounts still fold without overflow.
    income(&engine, Money::MAX_INPUT.minor(), Currency::Peso, noon()).await;
    income(&engine, Money::MAX_INPUT.minor(), Currency::Peso, noon()).await;
    let balance = engine.balance_for_day(day()).await.unwrap();
    assert_eq!(
        balance.get(Currency::Peso).income,
        Money::new(2 * Money::MAX_INPUT.minor())
    );
}
