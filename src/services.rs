use std::collections::HashMap;

use crate::error::Error;
use crate::http::ApiClient;
use crate::models::Service;

/// Fetches the services configured for a business, as an id to name map.
pub fn list_services(client: &ApiClient, business_id: u64) -> Result<HashMap<u64, String>, Error> {
    let path = format!("/comments/business/{business_id}/services");
    let services: Vec<Service> = client.get_paginated(&path, "services", &[])?;
    Ok(services
        .into_iter()
        .map(|service| (service.id, service.name))
        .collect())
}
