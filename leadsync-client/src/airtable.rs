//! Lead store adapter for an Airtable table.
//!
//! ```text
//! GET   {base}/v0/{base_id}/{table}?offset=...   -> {records:[...], offset?}
//! PATCH {base}/v0/{base_id}/{table}/{record_id}  <- {fields:{Status}}
//! ```

use serde::Deserialize;
use serde_json::json;

use leadsync_core::{
    config::AirtableSettings, types::UNNAMED_LEAD, Lead, LeadId, LeadSource, LeadStatus,
    SourceError,
};

use crate::http::{agent, call_err, decode_err};

pub const AIRTABLE_API: &str = "https://api.airtable.com";

/// One page of the list-records response.
#[derive(Debug, Deserialize)]
pub(crate) struct RecordPage {
    #[serde(default)]
    pub records: Vec<AirtableRecord>,
    #[serde(default)]
    pub offset: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AirtableRecord {
    pub id: String,
    #[serde(default)]
    pub fields: LeadFields,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct LeadFields {
    #[serde(rename = "Name")]
    pub name: Option<String>,
    #[serde(rename = "Status")]
    pub status: Option<String>,
    #[serde(rename = "Email")]
    pub email: Option<String>,
    #[serde(rename = "Source")]
    pub source: Option<String>,
}

impl From<AirtableRecord> for Lead {
    fn from(record: AirtableRecord) -> Self {
        let fields = record.fields;
        Lead {
            id: LeadId(record.id),
            name: fields
                .name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| UNNAMED_LEAD.to_string()),
            status: fields
                .status
                .filter(|s| !s.trim().is_empty())
                .map(|s| LeadStatus::parse(s.trim()))
                .unwrap_or_default(),
            email: fields.email.filter(|e| !e.is_empty()),
            source: fields.source.filter(|s| !s.is_empty()),
        }
    }
}

/// Follow `offset` cursors until the store stops returning one.
pub(crate) fn collect_pages<F>(mut fetch_page: F) -> Result<Vec<Lead>, SourceError>
where
    F: FnMut(Option<&str>) -> Result<RecordPage, SourceError>,
{
    let mut leads = Vec::new();
    let mut offset: Option<String> = None;
    loop {
        let page = fetch_page(offset.as_deref())?;
        leads.extend(page.records.into_iter().map(Lead::from));
        match page.offset {
            Some(next) if !next.is_empty() => offset = Some(next),
            _ => break,
        }
    }
    Ok(leads)
}

pub struct AirtableLeadSource {
    agent: ureq::Agent,
    table_url: String,
    auth_header: String,
}

impl AirtableLeadSource {
    pub fn new(settings: &AirtableSettings) -> Self {
        Self::with_base_url(settings, AIRTABLE_API)
    }

    pub fn with_base_url(settings: &AirtableSettings, base_url: &str) -> Self {
        Self {
            agent: agent(),
            table_url: format!(
                "{}/v0/{}/{}",
                base_url.trim_end_matches('/'),
                urlencoding::encode(&settings.base_id),
                urlencoding::encode(&settings.table_name)
            ),
            auth_header: format!("Bearer {}", settings.api_key),
        }
    }

    fn fetch_page(&self, offset: Option<&str>) -> Result<RecordPage, SourceError> {
        let mut request = self
            .agent
            .get(&self.table_url)
            .set("Authorization", &self.auth_header);
        if let Some(offset) = offset {
            request = request.query("offset", offset);
        }
        request
            .call()
            .map_err(|e| call_err(&self.table_url, e))?
            .into_json::<RecordPage>()
            .map_err(|e| decode_err(&self.table_url, e))
    }
}

impl LeadSource for AirtableLeadSource {
    fn fetch_leads(&self) -> Result<Vec<Lead>, SourceError> {
        let leads = collect_pages(|offset| self.fetch_page(offset)).map_err(|err| {
            tracing::error!("error fetching lead records: {err}");
            err
        })?;
        tracing::debug!("fetched {} lead records", leads.len());
        Ok(leads)
    }

    fn update_lead_status(&self, id: &LeadId, status: &LeadStatus) -> Result<Lead, SourceError> {
        let url = format!("{}/{}", self.table_url, id);
        let record = self
            .agent
            .request("PATCH", &url)
            .set("Authorization", &self.auth_header)
            .send_json(json!({ "fields": { "Status": status.as_str() } }))
            .map_err(|e| call_err(&url, e))?
            .into_json::<AirtableRecord>()
            .map_err(|e| decode_err(&url, e))?;
        tracing::info!("updated lead {id} to status {status}");
        Ok(record.into())
    }
}
