// Per-integration service profiles.
// One adapter object per service replaces the per-service wizard copies the
// product UI used to carry: everything the generic wizard needs to know about
// Slack vs. Google Ads vs. the rest lives here.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    Slack,
    GoogleAds,
    Zapier,
    Meta,
    Klaviyo,
    Hubspot,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 6] = [
        ServiceKind::Slack,
        ServiceKind::GoogleAds,
        ServiceKind::Zapier,
        ServiceKind::Meta,
        ServiceKind::Klaviyo,
        ServiceKind::Hubspot,
    ];

    /// Human label for rendering.
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceKind::Slack => "Slack",
            ServiceKind::GoogleAds => "Google Ads",
            ServiceKind::Zapier => "Zapier",
            ServiceKind::Meta => "Meta",
            ServiceKind::Klaviyo => "Klaviyo",
            ServiceKind::Hubspot => "Hubspot",
        }
    }

    /// Wire id used as the `service_name` query parameter.
    pub fn as_id(&self) -> &'static str {
        match self {
            ServiceKind::Slack => "slack",
            ServiceKind::GoogleAds => "google_ads",
            ServiceKind::Zapier => "zapier",
            ServiceKind::Meta => "meta",
            ServiceKind::Klaviyo => "klaviyo",
            ServiceKind::Hubspot => "hubspot",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_ascii_lowercase().replace('-', "_");
        ServiceKind::ALL
            .into_iter()
            .find(|k| k.as_id() == s)
    }

    pub fn next(&self) -> Self {
        match self {
            ServiceKind::Slack => ServiceKind::GoogleAds,
            ServiceKind::GoogleAds => ServiceKind::Zapier,
            ServiceKind::Zapier => ServiceKind::Meta,
            ServiceKind::Meta => ServiceKind::Klaviyo,
            ServiceKind::Klaviyo => ServiceKind::Hubspot,
            ServiceKind::Hubspot => ServiceKind::Slack,
        }
    }
}

/// What the generic wizard needs to know about one integration.
#[derive(Debug, Clone)]
pub struct ServiceProfile {
    pub kind: ServiceKind,
    /// Google Ads scopes lists per customer account; the destination step
    /// then requires a sub-account pick before lists can load.
    pub requires_sub_account: bool,
    /// Noun used in UI copy ("channel", "audience list", "list").
    pub list_noun: &'static str,
    /// Default mapping rows seeded at wizard-open, (source label,
    /// destination field). These rows are not deletable.
    pub default_rows: &'static [(&'static str, &'static str)],
}

const CONTACT_ROWS: &[(&str, &str)] = &[
    ("Email", "email"),
    ("Full name", "full_name"),
    ("Phone", "phone"),
    ("Address", "address"),
];

const AD_AUDIENCE_ROWS: &[(&str, &str)] = &[
    ("Email", "email"),
    ("Full name", "full_name"),
    ("Phone", "phone_number"),
    ("Address", "mailing_address"),
];

impl ServiceProfile {
    pub fn for_kind(kind: ServiceKind) -> Self {
        match kind {
            ServiceKind::Slack => Self {
                kind,
                requires_sub_account: false,
                list_noun: "channel",
                default_rows: CONTACT_ROWS,
            },
            ServiceKind::GoogleAds => Self {
                kind,
                requires_sub_account: true,
                list_noun: "customer list",
                default_rows: AD_AUDIENCE_ROWS,
            },
            ServiceKind::Zapier => Self {
                kind,
                requires_sub_account: false,
                list_noun: "list",
                default_rows: CONTACT_ROWS,
            },
            ServiceKind::Meta => Self {
                kind,
                requires_sub_account: false,
                list_noun: "audience list",
                default_rows: AD_AUDIENCE_ROWS,
            },
            ServiceKind::Klaviyo => Self {
                kind,
                requires_sub_account: false,
                list_noun: "list",
                default_rows: CONTACT_ROWS,
            },
            ServiceKind::Hubspot => Self {
                kind,
                requires_sub_account: false,
                list_noun: "list",
                default_rows: CONTACT_ROWS,
            },
        }
    }

    pub fn service_name(&self) -> &'static str {
        self.kind.as_id()
    }
}
