/// bank discount - full advance, due date, recovery and direct payment
use payment_processing_rs::chrono::{TimeZone, Utc};
use payment_processing_rs::{
    AccountKind, InvoiceInput, MemoryLedger, ModuleConfig, Money, Party, PaymentBook,
    PaymentJournalBuilder, SafeTimeProvider, TimeSource,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let time = SafeTimeProvider::new(TimeSource::Test(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()));
    let mut book = PaymentBook::new(MemoryLedger::new(), ModuleConfig::default(), time)?;

    let receivable = book.ledger.add_account("Receivable", AccountKind::Receivable, true, true);
    let revenue = book.ledger.add_account("Revenue", AccountKind::Revenue, false, false);
    let processing = book.ledger.add_account("Customers Processing Payments", AccountKind::Receivable, true, true);
    let discounts = book.ledger.add_account("Customers Bank Discount", AccountKind::Other, true, false);
    let cash = book.ledger.add_account("Cash", AccountKind::Cash, false, false);
    let revenue_journal = book.ledger.add_journal("Revenue", "REV");
    let bank_journal = book.ledger.add_journal("Bank Statement", "BANK");
    let statements = book.add_statement_journal("Bank", bank_journal, cash)?;

    let journal = PaymentJournalBuilder::new("Manual receivable 100% discount")
        .clearing(discounts, revenue_journal)
        .processing(processing, revenue_journal)
        .build()?;
    let journal = book.add_payment_journal(journal)?;

    let customer = Party::new("Customer");
    let today = book.today();
    let invoice = book.post_invoice(InvoiceInput::customer(
        customer.id,
        receivable,
        revenue,
        revenue_journal,
        Money::from_major(100),
        today,
    ))?;
    let payment = book.pay_line(book.invoice(invoice)?.line, journal)?;
    book.submit(payment)?;
    book.process(payment)?;
    println!("processing: invoice {:?}", book.invoice_state(invoice)?);

    // the bank advances the payment
    let statement = book.create_statement(statements, today)?;
    let line = book.add_statement_line(statement, Money::from_major(100), "bank discount reception")?;
    book.confirm_statement(statement)?;
    let move_line = book.resolve_payment_line(line, payment, None)?;
    book.add_move_line(line, move_line)?;
    book.post_statement_line(line)?;
    println!("advanced: bank discount balance {}", book.balance(discounts));

    book.succeed(payment)?;
    println!("succeeded: bank discount balance {}", book.balance(discounts));

    // the bank takes the advance back
    let statement = book.create_statement(statements, today)?;
    let line = book.add_statement_line(statement, Money::from_major(-100), "bank discount recover")?;
    book.confirm_statement(statement)?;
    let move_line = book.resolve_payment_line(line, payment, None)?;
    book.add_move_line(line, move_line)?;
    book.post_statement_line(line)?;
    println!(
        "recovered: payment {}, receivable {}, cash {}",
        book.payment(payment)?.state,
        book.balance(receivable),
        book.balance(cash)
    );

    // the customer pays directly
    let statement = book.create_statement(statements, today)?;
    let line = book.add_statement_line(statement, Money::from_major(100), "invoice payment")?;
    book.confirm_statement(statement)?;
    let move_line = book.resolve_invoice_line(line, invoice, None)?;
    book.add_move_line(line, move_line)?;
    book.post_statement_line(line)?;
    println!(
        "paid: invoice {:?}, receivable {}, cash {}",
        book.invoice_state(invoice)?,
        book.balance(receivable),
        book.balance(cash)
    );

    for event in book.events.take_events() {
        println!("{:?}", event);
    }

    Ok(())
}
