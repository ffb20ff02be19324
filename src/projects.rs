use std::collections::HashMap;

use crate::error::Error;
use crate::http::ApiClient;
use crate::models::Project;

/// Fetches the projects visible for a client, as an id to title map.
pub fn list_projects(
    client: &ApiClient,
    business_id: u64,
    client_id: u64,
) -> Result<HashMap<u64, String>, Error> {
    let path = format!("/projects/business/{business_id}/projects");
    let projects: Vec<Project> =
        client.get_paginated(&path, "projects", &[("client_id", client_id.to_string())])?;
    Ok(projects
        .into_iter()
        .map(|project| (project.id, project.title))
        .collect())
}
