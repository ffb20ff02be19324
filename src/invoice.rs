use chrono::Local;
use tracing::warn;

use crate::config::Config;
use crate::error::Error;
use crate::http::ApiClient;
use crate::invoices::{self, CreateInvoice};
use crate::models::{InvoiceLine, Money, TimeEntry};
use crate::time_entries;

#[derive(Debug, Default)]
pub struct InvoiceOptions {
    pub rate: Option<String>,
    pub currency: Option<String>,
    pub dry_run: bool,
    pub notes: Option<String>,
}

/// One invoice line per entry, in input order. The line name is the entry
/// note, falling back to "Consulting"; the description is the local date.
pub fn build_invoice_lines(entries: &[TimeEntry], rate: &str, currency: &str) -> Vec<InvoiceLine> {
    entries
        .iter()
        .map(|entry| {
            let name = if entry.note.is_empty() {
                "Consulting".to_string()
            } else {
                entry.note.clone()
            };
            InvoiceLine {
                line_type: 0,
                name,
                description: local_date_part(entry),
                qty: format!("{:.2}", entry.duration as f64 / 3600.0),
                unit_cost: Money {
                    amount: rate.to_string(),
                    code: currency.to_string(),
                },
            }
        })
        .collect()
}

fn local_date_part(entry: &TimeEntry) -> String {
    let raw = match entry.local_started_at.as_deref() {
        Some(local) if !local.is_empty() => local,
        _ => entry.started_at.as_str(),
    };
    raw.chars().take(10).collect()
}

/// Invoices all unbilled, billable entries for a client and returns the
/// report to print. Post-creation steps (share link, marking entries
/// billed) are best-effort and never fail the command once the invoice
/// exists.
pub fn run_invoice(
    client: &ApiClient,
    cfg: &Config,
    client_id: u64,
    options: &InvoiceOptions,
) -> Result<String, Error> {
    let entries = time_entries::list_unbilled_entries(client, cfg.business_id, client_id)?;

    if entries.is_empty() {
        return Ok("No unbilled time entries found for this client.".to_string());
    }

    let rate = options
        .rate
        .clone()
        .or_else(|| cfg.client_rates.get(&client_id.to_string()).cloned())
        .ok_or_else(|| {
            Error::Config(format!(
                "no rate configured for client {client_id}. \
                 Use --rate <amount> or set client_rates.{client_id} in the config file"
            ))
        })?;
    let rate_value: f64 = rate
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("invalid rate {rate:?}")))?;

    let currency = options
        .currency
        .clone()
        .or_else(|| cfg.default_currency.clone())
        .unwrap_or_else(|| "USD".to_string());

    let lines = build_invoice_lines(&entries, &rate, &currency);

    let total_seconds: i64 = entries.iter().map(|entry| entry.duration).sum();
    let total_hours = total_seconds as f64 / 3600.0;
    let total_amount = total_hours * rate_value;

    if options.dry_run {
        let mut output = Vec::new();
        output.push("Dry run: no invoice created.".to_string());
        output.push(String::new());
        output.push(format!("Entries: {}", entries.len()));
        output.push(format!("Hours:   {total_hours:.2}"));
        output.push(format!("Rate:    {rate} {currency}/hr"));
        output.push(format!("Total:   {total_amount:.2} {currency}"));
        output.push(String::new());
        output.push("Line items:".to_string());
        for line in &lines {
            output.push(format!("  {}  {}h  {}", line.description, line.qty, line.name));
        }
        return Ok(output.join("\n"));
    }

    let request = CreateInvoice {
        customer_id: client_id,
        create_date: Local::now().date_naive().format("%Y-%m-%d").to_string(),
        lines,
        status: cfg.invoice_status,
        notes: options.notes.clone(),
    };
    let invoice = invoices::create_invoice(client, &cfg.account_id, &request)?;

    let mut output = Vec::new();
    output.push(format!(
        "Invoice #{} created ({}).",
        invoice.invoice_number,
        cfg.invoice_status.label()
    ));
    output.push(format!("ID:      {}", invoice.invoiceid));
    output.push(format!("Entries: {}", entries.len()));
    output.push(format!("Hours:   {total_hours:.2}"));
    output.push(format!(
        "Total:   {} {}",
        invoice.amount.amount, invoice.amount.code
    ));

    match invoices::get_share_link(client, &cfg.account_id, invoice.invoiceid) {
        Some(link) => output.push(format!("Link:    {link}")),
        None => output
            .push("Link:    (share link unavailable, may need invoices:read scope)".to_string()),
    }

    let (marked, billing_err) = time_entries::mark_entries_billed(client, cfg.business_id, &entries);
    match billing_err {
        None => output.push(format!("Billed:  {marked} entries marked as billed")),
        Some(err) => {
            warn!(error = %err, "failed to mark entries as billed");
            output.push(format!(
                "Warning: marked {marked} of {} entries as billed: {err}",
                entries.len()
            ));
        }
    }

    Ok(output.join("\n"))
}
