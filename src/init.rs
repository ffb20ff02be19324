use std::collections::HashMap;
use std::io::{self, BufRead, Write};

use crate::clients;
use crate::config::{self, ProjectConfig};
use crate::error::Error;
use crate::http;
use crate::projects;
use crate::services;

/// Interactive bootstrap of `.freshlog.json` in the working directory:
/// pick a client, then optionally a project and service.
pub fn run_init() -> Result<String, Error> {
    let cfg = config::load()?;
    let client = http::api_client(&cfg);
    let stdin = io::stdin();
    let mut reader = stdin.lock();

    let client_list = clients::list_clients(&client, &cfg.account_id)?;
    if client_list.is_empty() {
        return Err(Error::Config("no clients found on this account".to_string()));
    }
    let client_id = pick_from_map(&mut reader, "Client", &client_list)?;

    let project_list = projects::list_projects(&client, cfg.business_id, client_id)?;
    let project_id = if project_list.is_empty() {
        println!("No projects found for this client, skipping.");
        None
    } else {
        Some(pick_from_map(&mut reader, "Project", &project_list)?)
    };

    let service_list = services::list_services(&client, cfg.business_id)?;
    let service_id = if service_list.is_empty() {
        println!("No services found, skipping.");
        None
    } else {
        Some(pick_from_map(&mut reader, "Service", &service_list)?)
    };

    let cwd = std::env::current_dir()?;
    config::save_project_config(
        &cwd,
        &ProjectConfig {
            client_id: Some(client_id),
            project_id,
            service_id,
        },
    )?;

    Ok(format!("Wrote {}", config::PROJECT_CONFIG_FILE))
}

fn pick_from_map(
    reader: &mut impl BufRead,
    label: &str,
    items: &HashMap<u64, String>,
) -> Result<u64, Error> {
    let mut entries: Vec<(&u64, &String)> = items.iter().collect();
    entries.sort_by(|a, b| a.1.cmp(b.1));

    println!();
    println!("{label}:");
    for (index, (id, name)) in entries.iter().enumerate() {
        println!("  {}) {name} (ID: {id})", index + 1);
    }

    loop {
        print!("Select {} [1-{}]: ", label.to_lowercase(), entries.len());
        io::stdout().flush()?;

        let mut input = String::new();
        if reader.read_line(&mut input)? == 0 {
            return Err(Error::Config(
                "input closed before a selection was made".to_string(),
            ));
        }
        match input.trim().parse::<usize>() {
            Ok(choice) if (1..=entries.len()).contains(&choice) => {
                let (id, name) = entries[choice - 1];
                println!("Selected: {name}");
                return Ok(*id);
            }
            _ => println!("Invalid selection, try again."),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn items() -> HashMap<u64, String> {
        HashMap::from([
            (10, "Acme Corp".to_string()),
            (20, "Beta Inc".to_string()),
            (30, "Zenith".to_string()),
        ])
    }

    #[test]
    fn pick_from_map_selects_by_sorted_position() {
        let mut input = Cursor::new("2\n");
        let picked = pick_from_map(&mut input, "Client", &items()).unwrap();
        assert_eq!(picked, 20);
    }

    #[test]
    fn pick_from_map_retries_on_invalid_input() {
        let mut input = Cursor::new("0\nnope\n3\n");
        let picked = pick_from_map(&mut input, "Client", &items()).unwrap();
        assert_eq!(picked, 30);
    }

    #[test]
    fn pick_from_map_errors_on_closed_input() {
        let mut input = Cursor::new("");
        assert!(pick_from_map(&mut input, "Client", &items()).is_err());
    }
}
