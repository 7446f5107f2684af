use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::platform::page::PageContext;

/// Loosely typed event parameters, serialized alongside the known fields.
pub type EventData = BTreeMap<String, Value>;

/// Data object describing a single page view.
///
/// Absent fields are omitted from the serialized payload; `extra` entries are
/// flattened next to the named fields.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PageviewData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utm_source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utm_medium: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utm_campaign: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utm_term: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utm_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utm_id: Option<String>,
    #[serde(flatten)]
    pub extra: EventData,
}

impl PageviewData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_referrer(mut self, referrer: impl Into<String>) -> Self {
        self.referrer = Some(referrer.into());
        self
    }

    pub fn with_utm_source(mut self, utm_source: impl Into<String>) -> Self {
        self.utm_source = Some(utm_source.into());
        self
    }

    pub fn with_utm_medium(mut self, utm_medium: impl Into<String>) -> Self {
        self.utm_medium = Some(utm_medium.into());
        self
    }

    pub fn with_utm_campaign(mut self, utm_campaign: impl Into<String>) -> Self {
        self.utm_campaign = Some(utm_campaign.into());
        self
    }

    pub fn with_utm_term(mut self, utm_term: impl Into<String>) -> Self {
        self.utm_term = Some(utm_term.into());
        self
    }

    pub fn with_utm_content(mut self, utm_content: impl Into<String>) -> Self {
        self.utm_content = Some(utm_content.into());
        self
    }

    pub fn with_utm_id(mut self, utm_id: impl Into<String>) -> Self {
        self.utm_id = Some(utm_id.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// True when no field carries a value.
    pub fn is_empty(&self) -> bool {
        self.url.is_none()
            && self.title.is_none()
            && self.referrer.is_none()
            && self.utm_source.is_none()
            && self.utm_medium.is_none()
            && self.utm_campaign.is_none()
            && self.utm_term.is_none()
            && self.utm_content.is_none()
            && self.utm_id.is_none()
            && self.extra.is_empty()
    }

    /// Snapshot of the page the call is made from, read at call time.
    pub fn current(page: &dyn PageContext) -> Self {
        Self {
            url: Some(page.url()),
            title: Some(page.title()),
            referrer: Some(page.referrer()),
            ..Default::default()
        }
    }

    /// Lays `overrides` on top of `self`: populated override fields win, and
    /// override extras replace same-key entries.
    pub fn merged_with(mut self, overrides: &PageviewData) -> Self {
        fn overlay(field: &mut Option<String>, over: &Option<String>) {
            if over.is_some() {
                *field = over.clone();
            }
        }

        overlay(&mut self.url, &overrides.url);
        overlay(&mut self.title, &overrides.title);
        overlay(&mut self.referrer, &overrides.referrer);
        overlay(&mut self.utm_source, &overrides.utm_source);
        overlay(&mut self.utm_medium, &overrides.utm_medium);
        overlay(&mut self.utm_campaign, &overrides.utm_campaign);
        overlay(&mut self.utm_term, &overrides.utm_term);
        overlay(&mut self.utm_content, &overrides.utm_content);
        overlay(&mut self.utm_id, &overrides.utm_id);
        for (key, value) in &overrides.extra {
            self.extra.insert(key.clone(), value.clone());
        }
        self
    }
}
