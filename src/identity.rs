use serde::Deserialize;

use crate::error::Error;
use crate::http::ApiClient;

/// The account and business a token is tied to.
#[derive(Debug, Clone)]
pub struct Identity {
    pub account_id: String,
    pub business_id: u64,
}

#[derive(Deserialize)]
struct MeResponse {
    response: MeBody,
}

#[derive(Deserialize)]
struct MeBody {
    #[serde(default)]
    business_memberships: Vec<Membership>,
}

#[derive(Deserialize)]
struct Membership {
    business: Business,
}

#[derive(Deserialize)]
struct Business {
    id: u64,
    account_id: String,
}

pub fn get_identity(client: &ApiClient) -> Result<Identity, Error> {
    let data: MeResponse = client.get("/auth/api/v1/users/me", &[])?;
    let membership = data
        .response
        .business_memberships
        .into_iter()
        .next()
        .ok_or_else(|| {
            Error::Config("no business memberships found on this account".to_string())
        })?;
    Ok(Identity {
        account_id: membership.business.account_id,
        business_id: membership.business.id,
    })
}
