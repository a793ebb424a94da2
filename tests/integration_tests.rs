use chrono::NaiveDate;
use ledger_engine::chart_of_accounts::{BUSINESS_BANK, COMMISSION_INCOME, CREDIT_CARD, HST_PAID_ITC};
use ledger_engine::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn rental_property() -> Property {
    Property {
        id: "elm-12".to_string(),
        address: "12 Elm St".to_string(),
        purchase_price: 820_000.0,
        current_value: 905_000.0,
        cca_class: 1,
        opening_ucc: 780_000.0,
        additions: 20_000.0,
        tenant_name: "Priya Shah".to_string(),
        lease_end: date(2024, 7, 31),
        mortgage_balance: Some(512_000.0),
    }
}

fn june_transactions() -> Vec<Transaction> {
    let mut fuel = Transaction::new("t1", date(2024, 6, 3), "Shell", -113.0, LedgerType::Active, "Fuel/Auto");
    fuel.hst_included = Some(true);

    let mut lunch = Transaction::new("t2", date(2024, 6, 7), "Bistro", -140.0, LedgerType::Active, "Meals");
    lunch.status = Some(TransactionStatus::Pending);

    let dinner = Transaction::new("t3", date(2024, 6, 21), "Osteria", -110.0, LedgerType::Active, "Meals");

    let commission = Transaction::new("t4", date(2024, 6, 15), "Brokerage", 1_000.0, LedgerType::Active, "Commission");

    let mut roof = Transaction::new("t5", date(2024, 6, 12), "RoofCo", -2_260.0, LedgerType::Passive, "Repairs and Maintenance");
    roof.hst_included = Some(true);
    roof.property_id = Some("elm-12".to_string());

    let rent = Transaction::new("t6", date(2024, 6, 1), "Priya Shah", 2_400.0, LedgerType::Passive, "Rental Income");

    let groceries = Transaction::new("t7", date(2024, 6, 9), "Loblaws", -180.0, LedgerType::Personal, "Groceries");

    vec![fuel, lunch, dinner, commission, roof, rent, groceries]
}

#[test]
fn test_every_captured_transaction_balances() -> anyhow::Result<()> {
    let engine = BookkeepingEngine::new(EngineConfig::default())?;
    let properties = vec![rental_property()];

    let entries = june_transactions()
        .iter()
        .map(|t| engine.capture(t, PaymentMethod::CreditCard, &properties))
        .collect::<Result<Vec<_>>>()?;

    assert_eq!(entries.len(), 7);
    JournalBalancer::new(0.01).verify_all(&entries)?;

    for entry in &entries {
        for line in &entry.lines {
            assert!(line.debit >= 0.0 && line.credit >= 0.0);
        }
    }

    Ok(())
}

#[test]
fn test_simple_expense_scenario() -> anyhow::Result<()> {
    let engine = BookkeepingEngine::new(EngineConfig::default())?;
    let transactions = june_transactions();

    let entry = engine.capture(&transactions[0], PaymentMethod::CreditCard, &[])?;

    assert_eq!(entry.lines.len(), 3);
    assert_eq!(entry.lines[0].account_name, "Motor Vehicle Expenses");
    assert_eq!(entry.lines[0].debit, 100.0);
    assert_eq!(entry.lines[1].account_code, HST_PAID_ITC);
    assert_eq!(entry.lines[1].debit, 13.0);
    assert_eq!(entry.lines[2].account_code, CREDIT_CARD);
    assert_eq!(entry.lines[2].credit, 113.0);
    assert_eq!(entry.header.status, JournalEntryStatus::Posted);

    Ok(())
}

#[test]
fn test_commission_income_scenario() -> anyhow::Result<()> {
    let engine = BookkeepingEngine::new(EngineConfig::default())?;
    let transactions = june_transactions();

    let entry = engine.capture(&transactions[3], PaymentMethod::Bank, &[])?;

    assert_eq!(entry.lines.len(), 2);
    assert_eq!(entry.lines[0].account_code, BUSINESS_BANK);
    assert_eq!(entry.lines[0].debit, 1_000.0);
    assert_eq!(entry.lines[1].account_code, COMMISSION_INCOME);
    assert_eq!(entry.lines[1].credit, 1_000.0);

    Ok(())
}

#[test]
fn test_june_dashboard_notifications() -> anyhow::Result<()> {
    let engine = BookkeepingEngine::new(EngineConfig::default())?;
    let transactions = june_transactions();
    let budgets = vec![
        BudgetCategory::new("Meals", LedgerType::Active, 200.0),
        BudgetCategory::new("Repairs and Maintenance", LedgerType::Passive, 5_000.0),
        BudgetCategory::new("groceries", LedgerType::Personal, 150.0),
    ];
    let properties = vec![rental_property()];
    let today = date(2024, 6, 25);

    let notifications = engine.notifications(&transactions, &budgets, &properties, today)?;

    let count = |kind: NotificationType| {
        notifications
            .iter()
            .filter(|n| n.notification_type == kind)
            .count()
    };

    assert_eq!(count(NotificationType::PendingTx), 1);
    assert_eq!(count(NotificationType::BudgetOver), 2);
    assert_eq!(count(NotificationType::HstRemittance), 1);
    assert_eq!(count(NotificationType::LeaseExpiry), 1);

    let meals = notifications
        .iter()
        .find(|n| n.related_id.as_deref() == Some("active:meals"))
        .expect("meals overage alert");
    assert_eq!(meals.amount, Some(50.0));

    let groceries = notifications
        .iter()
        .find(|n| n.related_id.as_deref() == Some("personal:groceries"))
        .expect("groceries overage alert");
    assert_eq!(groceries.amount, Some(30.0));

    for pair in notifications.windows(2) {
        assert!(pair[0].date >= pair[1].date);
    }

    Ok(())
}

#[test]
fn test_notifications_are_recomputed_not_cached() -> anyhow::Result<()> {
    let engine = BookkeepingEngine::new(EngineConfig::default())?;
    let budgets = vec![BudgetCategory::new("Meals", LedgerType::Active, 200.0)];
    let today = date(2024, 6, 25);

    let mut transactions = june_transactions();
    let before = engine.notifications(&transactions, &budgets, &[], today)?;
    assert!(before.iter().any(|n| n.notification_type == NotificationType::BudgetOver));

    transactions.retain(|t| t.id != "t3");
    let after = engine.notifications(&transactions, &budgets, &[], today)?;
    assert!(!after.iter().any(|n| n.notification_type == NotificationType::BudgetOver));

    Ok(())
}

#[test]
fn test_property_cca_scenario() -> anyhow::Result<()> {
    let engine = BookkeepingEngine::new(EngineConfig::default())?;
    let schedule = engine.property_cca(&rental_property(), None)?;

    assert_eq!(schedule.ceiling, 31_600.0);
    assert_eq!(schedule.closing_ucc, 768_400.0);

    Ok(())
}

#[test]
fn test_tax_line_summary_for_year() -> anyhow::Result<()> {
    let engine = BookkeepingEngine::new(EngineConfig::default())?;
    let transactions: Vec<Transaction> = june_transactions()
        .iter()
        .map(|t| derive_hst(t, engine.config().hst_rate))
        .collect::<Result<_>>()?;

    let summary = engine.tax_line_summary(&transactions, 2024)?;

    assert_eq!(summary.line(TaxForm::T2125, "9281").map(|l| l.total), Some(-100.0));
    assert_eq!(summary.line(TaxForm::T2125, "8000").map(|l| l.total), Some(1_000.0));
    assert_eq!(summary.line(TaxForm::T776, "8960").map(|l| l.total), Some(-2_000.0));
    assert_eq!(summary.line(TaxForm::T776, "8141").map(|l| l.total), Some(2_400.0));

    Ok(())
}

#[test]
fn test_document_import_to_posting() -> anyhow::Result<()> {
    let engine = BookkeepingEngine::new(EngineConfig::default())?;
    let candidates: Vec<DraftCandidate> = serde_json::from_str(
        r#"[
            {"date": "2024-06-04", "vendor": "Staples", "amount": -56.5, "description": "Toner", "category_guess": "Office supplies"},
            {"date": "2024-06-05", "vendor": "Unknown", "amount": -20.0, "category_guess": "Misc"}
        ]"#,
    )?;

    let drafts = engine.draft_from_candidates(&candidates, LedgerType::Active, "receipt-42")?;
    assert_eq!(drafts.len(), 2);
    assert!(drafts[1].resolution.is_unmatched());

    let mut toner = drafts[0].transaction.clone();
    toner.hst_included = Some(true);
    let entry = engine.capture(&toner, PaymentMethod::CreditCard, &[])?;

    assert_eq!(entry.header.status, JournalEntryStatus::Draft);
    assert_eq!(entry.line_for("5200").map(|l| l.debit), Some(50.0));
    assert_eq!(entry.line_for(HST_PAID_ITC).map(|l| l.debit), Some(6.5));

    Ok(())
}

#[test]
fn test_split_bill_across_ledgers() -> anyhow::Result<()> {
    let engine = BookkeepingEngine::new(EngineConfig::default())?;
    let mut internet = Transaction::new("bill-1", date(2024, 6, 18), "Rogers", -90.4, LedgerType::Active, "Internet");
    internet.hst_included = Some(true);
    let internet = derive_hst(&internet, engine.config().hst_rate)?;

    let parts = apportion_split(&internet, &[(LedgerType::Active, 0.5), (LedgerType::Personal, 0.5)])?;
    assert_eq!(parts.len(), 2);

    let total: f64 = parts.iter().map(|p| p.amount).sum();
    assert!((total + 90.4).abs() < 1e-9);

    for part in &parts {
        let entry = engine.capture(part, PaymentMethod::Bank, &[])?;
        assert!(entry.is_balanced(0.01));
    }

    let budgets = engine.monthly_budgets(
        &parts,
        &[BudgetCategory::new("Internet", LedgerType::Personal, 100.0)],
        6,
        2024,
    )?;
    assert_eq!(budgets[&BudgetKey::new(LedgerType::Personal, "internet")].spent(), 45.2);

    Ok(())
}
