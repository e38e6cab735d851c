/// partial discount - the bank advances 80%, the customer settles the rest
use payment_processing_rs::chrono::{TimeZone, Utc};
use payment_processing_rs::{
    AccountKind, InvoiceInput, MemoryLedger, ModuleConfig, Money, PaymentBook,
    PaymentJournalBuilder, PaymentView, Rate, SafeTimeProvider, TimeSource, Uuid,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let time = SafeTimeProvider::new(TimeSource::Test(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()));
    let config = ModuleConfig::from_json(r#"{"approval_required": true}"#)?;
    let mut book = PaymentBook::new(MemoryLedger::new(), config, time)?;

    let receivable = book.ledger.add_account("Receivable", AccountKind::Receivable, true, true);
    let revenue = book.ledger.add_account("Revenue", AccountKind::Revenue, false, false);
    let processing = book.ledger.add_account("Customers Processing Payments", AccountKind::Receivable, true, true);
    let discounts = book.ledger.add_account("Customers Bank Discount", AccountKind::Other, true, false);
    let cash = book.ledger.add_account("Cash", AccountKind::Cash, false, false);
    let revenue_journal = book.ledger.add_journal("Revenue", "REV");
    let bank_journal = book.ledger.add_journal("Bank Statement", "BANK");
    let statements = book.add_statement_journal("Bank", bank_journal, cash)?;

    let journal = PaymentJournalBuilder::new("Manual receivable 80% discount")
        .clearing(discounts, revenue_journal)
        .clearing_percent(Rate::from_percentage(80))
        .processing(processing, revenue_journal)
        .build()?;
    let journal = book.add_payment_journal(journal)?;

    let today = book.today();
    let invoice = book.post_invoice(InvoiceInput::customer(
        Uuid::new_v4(),
        receivable,
        revenue,
        revenue_journal,
        Money::from_major(200),
        today,
    ))?;
    let payment = book.pay_line(book.invoice(invoice)?.line, journal)?;
    book.submit(payment)?;
    book.approve(payment)?;
    book.process(payment)?;

    // 160 advanced by the bank
    let statement = book.create_statement(statements, today)?;
    let line = book.add_statement_line(statement, Money::from_major(160), "bank discount")?;
    book.confirm_statement(statement)?;
    let move_line = book.resolve_payment_line(line, payment, None)?;
    book.add_move_line(line, move_line)?;
    book.post_statement_line(line)?;

    // 40 paid by the customer on the due date
    let statement = book.create_statement(statements, today)?;
    let line = book.add_statement_line(statement, Money::from_major(40), "pending payment")?;
    book.confirm_statement(statement)?;
    let move_line = book.resolve_invoice_line(line, invoice, None)?;
    book.add_move_line(line, move_line)?;
    book.post_statement_line(line)?;

    println!(
        "receivable {}, bank discount {}, cash {}",
        book.balance(receivable),
        book.balance(discounts),
        book.balance(cash)
    );
    let view = PaymentView::from_payment(&book, book.payment(payment)?)?;
    println!("{}", view.to_json_pretty()?);

    Ok(())
}
