//! Canonical tag taxonomy
//!
//! These definitions are reapplied on every setup run, so editing an entry
//! here changes existing installs on their next start.

use super::{DisplayMode, TagAttributes, TagKind};

/// One row of the system tag table
#[derive(Debug, Clone, Copy)]
pub struct TagDefinition {
    pub key: &'static str,
    pub kind: TagKind,
    pub display: DisplayMode,
    pub display_order: Option<i64>,
    pub search_terms: Option<&'static str>,
    pub label: bool,
    pub flag_hides: bool,
    pub flag_editable: bool,
    pub color: Option<&'static str>,
    pub icon: Option<&'static str>,
    pub template: Option<&'static str>,
    pub name: &'static str,
}

impl TagDefinition {
    const fn new(key: &'static str, kind: TagKind, display: DisplayMode) -> Self {
        Self {
            key,
            kind,
            display,
            display_order: None,
            search_terms: None,
            label: true,
            flag_hides: false,
            flag_editable: false,
            color: None,
            icon: None,
            template: None,
            name: key,
        }
    }

    const fn order(mut self, order: i64) -> Self {
        self.display_order = Some(order);
        self
    }

    const fn search(mut self, terms: &'static str) -> Self {
        self.search_terms = Some(terms);
        self
    }

    const fn not_label(mut self) -> Self {
        self.label = false;
        self
    }

    const fn hides(mut self) -> Self {
        self.flag_hides = true;
        self
    }

    const fn editable(mut self) -> Self {
        self.flag_editable = true;
        self
    }

    const fn style(mut self, icon: &'static str, color: &'static str) -> Self {
        self.icon = Some(icon);
        self.color = Some(color);
        self
    }

    const fn template(mut self, template: &'static str) -> Self {
        self.template = Some(template);
        self
    }

    pub fn attributes(&self) -> TagAttributes {
        TagAttributes {
            kind: self.kind,
            display: self.display,
            display_order: self.display_order,
            search_terms: self.search_terms.map(str::to_string),
            label: self.label,
            flag_hides: self.flag_hides,
            flag_editable: self.flag_editable,
            color: self.color.map(str::to_string),
            icon: self.icon.map(str::to_string),
            template: self.template.map(str::to_string),
            name: self.name.to_string(),
        }
    }
}

use DisplayMode::{Contextual, Invisible, Priority};

/// Key of the tag whose creation marks a brand new taxonomy
pub const NEW_TAG: &str = "New";

pub const SYSTEM_TAGS: &[TagDefinition] = &[
    TagDefinition::new(NEW_TAG, TagKind::Unread, Invisible)
        .not_label()
        .style("icon-new", "03-gray-dark"),
    TagDefinition::new("Inbox", TagKind::Inbox, Priority)
        .order(2)
        .style("icon-inbox", "06-blue"),
    TagDefinition::new("Blank", TagKind::Blank, Invisible).editable(),
    TagDefinition::new("Drafts", TagKind::Drafts, Priority)
        .order(1)
        .editable()
        .style("icon-compose", "03-gray-dark"),
    TagDefinition::new("Outbox", TagKind::Outbox, Priority)
        .order(3)
        .style("icon-outbox", "06-blue"),
    TagDefinition::new("Sent", TagKind::Sent, Priority)
        .order(4)
        .style("icon-sent", "03-gray-dark"),
    TagDefinition::new("Spam", TagKind::Spam, Priority)
        .order(5)
        .hides()
        .style("icon-spam", "10-orange"),
    TagDefinition::new("MaybeSpam", TagKind::Tag, Invisible).style("icon-spam", "10-orange"),
    TagDefinition::new("Ham", TagKind::Ham, Invisible),
    TagDefinition::new("Trash", TagKind::Trash, Priority)
        .order(6)
        .hides()
        .style("icon-trash", "13-brown"),
    // Virtual tags backed by saved searches
    TagDefinition::new("All Mail", TagKind::Tag, Contextual)
        .order(1000)
        .search("all:mail")
        .style("icon-logo", "06-blue"),
    TagDefinition::new("Photos", TagKind::Tag, Contextual)
        .order(1001)
        .search("att:jpg")
        .template("photos")
        .style("icon-photos", "08-green"),
    TagDefinition::new("Files", TagKind::Tag, Contextual)
        .order(1002)
        .search("has:attachment")
        .template("files")
        .style("icon-document", "06-blue"),
    TagDefinition::new("Links", TagKind::Tag, Contextual)
        .order(1003)
        .search("http")
        .style("icon-links", "12-red"),
    // Internal tracking of user actions, input for the classifiers
    TagDefinition::new("mp_rpl", TagKind::Replied, Invisible).not_label(),
    TagDefinition::new("mp_fwd", TagKind::Forwarded, Invisible).not_label(),
    TagDefinition::new("mp_tag", TagKind::Tagged, Invisible).not_label(),
    TagDefinition::new("mp_read", TagKind::Read, Invisible).not_label(),
    TagDefinition::new("mp_ham", TagKind::Ham, Invisible).not_label(),
];

/// Outcomes of signature verification
pub const SIGNATURE_STATUSES: &[&str] = &[
    "none",
    "error",
    "mixed-error",
    "unknown",
    "mixed-unknown",
    "expired",
    "mixed-expired",
    "revoked",
    "mixed-revoked",
    "unverified",
    "mixed-unverified",
    "signed",
    "mixed-signed",
    "verified",
    "mixed-verified",
    "invalid",
    "mixed-invalid",
];

/// Outcomes of decryption
pub const ENCRYPTION_STATUSES: &[&str] = &[
    "none",
    "error",
    "mixed-error",
    "decrypted",
    "mixed-decrypted",
    "missingkey",
    "mixed-missingkey",
    "lockedkey",
    "mixed-lockedkey",
];

/// Attribute tag dimensions: key prefix and its statuses
pub const ATTRIBUTE_DIMENSIONS: &[(&str, &[&str])] = &[
    ("mp_sig", SIGNATURE_STATUSES),
    ("mp_enc", ENCRYPTION_STATUSES),
];

/// Key of the attribute tag for one status of one dimension
pub fn attribute_tag_key(prefix: &str, status: &str) -> String {
    format!("{}-{}", prefix, status)
}

/// Attributes shared by every attribute tag
pub fn attribute_tag_attributes(key: &str) -> TagAttributes {
    TagAttributes {
        kind: TagKind::Attribute,
        display: Invisible,
        label: false,
        ..TagAttributes::fresh(key)
    }
}

/// The full canonical taxonomy, system tags first, as `(key, attributes)`
pub fn canonical_tags() -> Vec<(String, TagAttributes)> {
    let mut tags: Vec<(String, TagAttributes)> = SYSTEM_TAGS
        .iter()
        .map(|def| (def.key.to_string(), def.attributes()))
        .collect();

    for (prefix, statuses) in ATTRIBUTE_DIMENSIONS {
        for status in statuses.iter() {
            let key = attribute_tag_key(prefix, status);
            let attributes = attribute_tag_attributes(&key);
            tags.push((key, attributes));
        }
    }

    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_keys_are_unique() {
        let tags = canonical_tags();
        let keys: HashSet<&str> = tags.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys.len(), tags.len());
    }

    #[test]
    fn test_attribute_tags_cross_product() {
        let tags = canonical_tags();
        let attributes: Vec<_> = tags
            .iter()
            .filter(|(_, a)| a.kind == TagKind::Attribute)
            .collect();

        assert_eq!(
            attributes.len(),
            SIGNATURE_STATUSES.len() + ENCRYPTION_STATUSES.len()
        );
        assert!(attributes.iter().all(|(_, a)| !a.label && a.display == Invisible));
        assert!(tags.iter().any(|(k, _)| k == "mp_sig-verified"));
        assert!(tags.iter().any(|(k, _)| k == "mp_enc-missingkey"));
    }

    #[test]
    fn test_system_tags_come_first() {
        let tags = canonical_tags();
        assert_eq!(tags[0].0, NEW_TAG);
        assert_eq!(tags[SYSTEM_TAGS.len() - 1].0, "mp_ham");
    }

    #[test]
    fn test_virtual_tags_have_searches() {
        let photos = SYSTEM_TAGS.iter().find(|t| t.key == "Photos").unwrap();
        let attrs = photos.attributes();
        assert_eq!(attrs.search_terms.as_deref(), Some("att:jpg"));
        assert_eq!(attrs.template.as_deref(), Some("photos"));
        assert!(attrs.label);

        let spam = SYSTEM_TAGS.iter().find(|t| t.key == "Spam").unwrap();
        assert!(spam.flag_hides);
    }
}
