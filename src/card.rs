//! Card model, parsed from a Track-2 magnetic-stripe string (§3).

use crate::error::{Error, Result};

/// A card read from the magnetic stripe reader.
///
/// Parsed from a Track-2 string of the form `;PAN=EXPIRY/SERVICE_CODE…`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Card {
    number: String,
    service_code: String,
    track2: String,
}

impl Card {
    /// Primary account number.
    pub fn number(&self) -> &str {
        &self.number
    }

    /// 3-digit service code, taken from offsets 4..7 of the post-`=`
    /// region.
    pub fn service_code(&self) -> &str {
        &self.service_code
    }

    /// The original raw Track-2 string.
    pub fn track2(&self) -> &str {
        &self.track2
    }

    /// Parse a raw Track-2 string into a [Card].
    ///
    /// A parse failure is a distinct error path from "no card" (§7: card
    /// parse failure transitions the terminal to `OutOfService`, whereas no
    /// card present is simply `card = None`).
    pub fn parse(track2: &str) -> Result<Self> {
        let body = track2
            .strip_prefix(';')
            .ok_or_else(|| Error::malformed("track2 missing leading ';'"))?;

        let (pan, rest) = body
            .split_once('=')
            .ok_or_else(|| Error::malformed("track2 missing '=' separator"))?;

        if pan.is_empty() {
            return Err(Error::malformed("track2 has empty PAN"));
        }

        if rest.len() < 7 {
            return Err(Error::malformed(
                "track2 post-'=' region too short for a service code",
            ));
        }

        let service_code = rest[4..7].to_string();

        Ok(Self {
            number: pan.to_string(),
            service_code,
            track2: track2.to_string(),
        })
    }
}
