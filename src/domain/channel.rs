// src/domain/channel.rs

use std::fmt;

/// Sales channel a booking is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChannelLabel {
    Is,
    Bdc,
    Agoda,
    GoMmt,
    WebApp,
    OtaOther,
    Owner,
    Unclassified,
}

impl ChannelLabel {
    #[cfg(test)]
    pub const ALL: [ChannelLabel; 8] = [
        ChannelLabel::Is,
        ChannelLabel::Bdc,
        ChannelLabel::Agoda,
        ChannelLabel::GoMmt,
        ChannelLabel::WebApp,
        ChannelLabel::OtaOther,
        ChannelLabel::Owner,
        ChannelLabel::Unclassified,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ChannelLabel::Is => "IS",
            ChannelLabel::Bdc => "BDC",
            ChannelLabel::Agoda => "Agoda",
            ChannelLabel::GoMmt => "GoMMT",
            ChannelLabel::WebApp => "Web/App",
            ChannelLabel::OtaOther => "OTA-Other",
            ChannelLabel::Owner => "Owner",
            ChannelLabel::Unclassified => "Unclassified",
        }
    }
}

impl fmt::Display for ChannelLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const OTA_BDC: i64 = 5;
const OTA_AGODA: i64 = 12;
const OTA_GOMMT: [i64; 2] = [1, 2];
const SOURCE_IS: i64 = 2;
const SOURCE_WEB_APP: [i64; 4] = [6, 11, 15, 23];
const SOURCE_OTA: [i64; 2] = [1, 28];
const SOURCE_OWNER: [i64; 2] = [13, 19];

/// Human-readable rule table, in precedence order. Shared with the SQL
/// assistant prompt so the model sees the same mapping the classifier applies.
pub const CHANNEL_RULES: [(&str, ChannelLabel); 7] = [
    ("ota_booking_source = 5", ChannelLabel::Bdc),
    ("ota_booking_source = 12", ChannelLabel::Agoda),
    ("ota_booking_source IN (1, 2)", ChannelLabel::GoMmt),
    ("booking_source IN (2)", ChannelLabel::Is),
    ("booking_source IN (6, 11, 15, 23)", ChannelLabel::WebApp),
    (
        "booking_source IN (1, 28) AND ota_booking_source NOT IN (1, 2, 5, 12)",
        ChannelLabel::OtaOther,
    ),
    ("booking_source IN (13, 19)", ChannelLabel::Owner),
];

/// Maps raw source codes to a channel. The order of checks is the precedence:
/// OTA codes win over `booking_source`, so `(1, 5)` is BDC, not OTA-Other.
///
/// Total: any combination that matches no rule is `Unclassified`.
pub fn classify(booking_source: Option<i64>, ota_booking_source: Option<i64>) -> ChannelLabel {
    if let Some(ota) = ota_booking_source {
        if ota == OTA_BDC {
            return ChannelLabel::Bdc;
        }
        if ota == OTA_AGODA {
            return ChannelLabel::Agoda;
        }
        if OTA_GOMMT.contains(&ota) {
            return ChannelLabel::GoMmt;
        }
    }

    let Some(source) = booking_source else {
        return ChannelLabel::Unclassified;
    };

    if source == SOURCE_IS {
        return ChannelLabel::Is;
    }
    if SOURCE_WEB_APP.contains(&source) {
        return ChannelLabel::WebApp;
    }
    // The OTA codes that would have matched above are already excluded here,
    // which is what the NOT IN (1, 2, 5, 12) clause expresses in SQL.
    if SOURCE_OTA.contains(&source) {
        return ChannelLabel::OtaOther;
    }
    if SOURCE_OWNER.contains(&source) {
        return ChannelLabel::Owner;
    }

    ChannelLabel::Unclassified
}
