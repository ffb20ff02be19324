use std::collections::HashMap;

use crate::error::Error;
use crate::http::ApiClient;
use crate::models::ClientRecord;

/// Display name for a client: organization, else "fname lname", else a
/// placeholder built from the id.
pub fn display_name(client: &ClientRecord) -> String {
    if !client.organization.is_empty() {
        return client.organization.clone();
    }
    let name = format!("{} {}", client.fname, client.lname);
    let name = name.trim();
    if !name.is_empty() {
        return name.to_string();
    }
    format!("Client #{}", client.id)
}

/// Fetches every client on the account, reduced to an id to display-name
/// map.
pub fn list_clients(client: &ApiClient, account_id: &str) -> Result<HashMap<u64, String>, Error> {
    let path = format!("/accounting/account/{account_id}/users/clients");
    let records: Vec<ClientRecord> = client.get_paginated(&path, "clients", &[])?;
    Ok(records
        .iter()
        .map(|record| (record.id, display_name(record)))
        .collect())
}

/// Renders the client listing for the `clients` command.
pub fn run_clients(client: &ApiClient, account_id: &str) -> Result<String, Error> {
    let clients = list_clients(client, account_id)?;

    const ID_WIDTH: usize = 8;
    let mut lines = Vec::new();
    lines.push(format!("{:<ID_WIDTH$}Name", "ID"));
    lines.push("─".repeat(40));

    if clients.is_empty() {
        lines.push("No clients found.".to_string());
        return Ok(lines.join("\n"));
    }

    let mut sorted: Vec<(u64, String)> = clients.into_iter().collect();
    sorted.sort_by(|a, b| a.1.cmp(&b.1));

    for (id, name) in sorted {
        lines.push(format!("{id:<ID_WIDTH$}{name}"));
    }
    Ok(lines.join("\n"))
}
