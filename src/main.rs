use clap::Parser;
use invoiceflow::application::engine::WorkflowEngine;
use invoiceflow::application::session::PaymentSession;
use invoiceflow::domain::invoice::InvoiceCatalog;
use invoiceflow::domain::workflow::{PaymentMethod, PaymentPhase, WorkflowEvent, WorkflowScript};
use invoiceflow::infrastructure::timer::TokioDelay;
use invoiceflow::interfaces::csv::invoice_reader::InvoiceReader;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// What to answer when the delay notice appears.
#[derive(Debug, Clone, Copy)]
enum DelayAnswer {
    Wait,
    Abort,
}

impl FromStr for DelayAnswer {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "wait" => Ok(Self::Wait),
            "abort" => Ok(Self::Abort),
            other => Err(format!("expected 'wait' or 'abort', got '{other}'")),
        }
    }
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input invoices CSV file (id, invoice_number, date_due, amount)
    input: PathBuf,

    /// Invoice ids to pay. Defaults to every invoice in the catalog.
    #[arg(long = "select")]
    select: Vec<String>,

    /// Payment method: bank, debit or credit
    #[arg(long, default_value = "bank")]
    method: PaymentMethod,

    /// Run the extended script that settles on its own
    #[arg(long)]
    settle: bool,

    /// Answer to the delay notice: wait or abort
    #[arg(long = "on-delay", default_value = "wait")]
    on_delay: DelayAnswer,

    /// Milliseconds spent in each phase before advancing
    #[arg(long, default_value_t = 2000)]
    step_delay_ms: u64,

    /// Milliseconds in the processing phase before the delay notice
    #[arg(long, default_value_t = 3000)]
    notify_delay_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let file = File::open(&cli.input).into_diagnostic()?;
    let mut invoices = Vec::new();
    for row in InvoiceReader::new(file).invoices() {
        match row {
            Ok(invoice) => invoices.push(invoice),
            Err(e) => eprintln!("Error reading invoice: {e}"),
        }
    }
    let catalog = Arc::new(InvoiceCatalog::new(invoices).into_diagnostic()?);

    let dwell = Duration::from_millis(cli.step_delay_ms);
    let script = if cli.settle {
        WorkflowScript::four_step(dwell)
    } else {
        WorkflowScript::three_step(dwell)
    }
    .notify_after(Duration::from_millis(cli.notify_delay_ms));

    let engine = WorkflowEngine::new(script, Arc::new(TokioDelay));
    let session = PaymentSession::new(catalog, engine);

    if cli.select.is_empty() {
        session.toggle_all().await;
    } else {
        for id in &cli.select {
            if let Err(e) = session.toggle_invoice(id).await {
                eprintln!("Error selecting invoice: {e}");
            }
        }
    }
    session.change_method(cli.method).await.into_diagnostic()?;

    let aggregate = session.aggregate().await;
    let rebate = session.incentive().await;
    println!(
        "selected={} total={} rebate={}",
        aggregate.count, aggregate.total, rebate
    );

    let mut events = session.subscribe().await;
    session.proceed_to_payment().await.into_diagnostic()?;

    while let Some(event) = events.recv().await {
        match event {
            WorkflowEvent::PhaseChanged(phase) => {
                println!("phase: {phase}");
                if matches!(phase, PaymentPhase::Settled | PaymentPhase::Start) {
                    break;
                }
            }
            WorkflowEvent::DelayNoticeShown => {
                println!("delay notice: processing is taking longer than expected");
                match cli.on_delay {
                    DelayAnswer::Wait => session.continue_waiting().await.into_diagnostic()?,
                    DelayAnswer::Abort => session.abort_payment().await.into_diagnostic()?,
                }
            }
            WorkflowEvent::DelayNoticeCleared => println!("delay notice cleared"),
        }
    }

    let snapshot = session.snapshot().await;
    println!("{}", serde_json::to_string(&snapshot).into_diagnostic()?);

    Ok(())
}
