/// quick start - process a customer payment through a manual journal
use payment_processing_rs::chrono::Utc;
use payment_processing_rs::{
    AccountKind, InvoiceInput, MemoryLedger, ModuleConfig, Money, PaymentBook, PaymentJournal,
    PaymentView, SafeTimeProvider, TimeSource, Uuid,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let time = SafeTimeProvider::new(TimeSource::Test(Utc::now()));
    let mut book = PaymentBook::new(MemoryLedger::new(), ModuleConfig::default(), time)?;

    let journal = book.ledger.add_journal("Revenue", "REV");
    let receivable = book.ledger.add_account("Receivable", AccountKind::Receivable, true, true);
    let revenue = book.ledger.add_account("Revenue", AccountKind::Revenue, false, false);

    // post a customer invoice
    let today = book.today();
    let invoice = book.post_invoice(InvoiceInput::customer(
        Uuid::new_v4(),
        receivable,
        revenue,
        journal,
        Money::from_major(250),
        today,
    ))?;

    // pay it through a manual journal
    let cash_journal = book.add_payment_journal(PaymentJournal::manual("Cash"))?;
    let line = book.invoice(invoice)?.line;
    let payment = book.pay_line(line, cash_journal)?;
    book.submit(payment)?;
    book.process(payment)?;
    book.succeed(payment)?;

    // print current state
    let view = PaymentView::from_payment(&book, book.payment(payment)?)?;
    println!("{}", view.to_json_pretty()?);

    Ok(())
}
