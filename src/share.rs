// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Share-link payloads.
//!
//! A session can be packed into the `data` query parameter of a share URL
//! and restored from it. The payload is JSON, percent-encoded the way
//! `encodeURIComponent` does it, then base64-encoded with the standard
//! alphabet and padding.
//!
//! Even-split payloads carry only names and amounts; fresh IDs are assigned
//! when they are restored. Itemized payloads carry participant and dish IDs
//! because dishes reference their eaters by ID.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use warimaru_rs::{EvenSplitSession, share};
//!
//! let mut session = EvenSplitSession::new();
//! let a = session.people()[0].id.clone();
//! session.set_simple_payment(&a, dec!(2400)).unwrap();
//! session.set_non_paying_participants(1);
//!
//! let data = share::encode_even_split(&session).unwrap();
//! let restored = share::decode_even_split(&data).unwrap();
//! assert_eq!(restored.people()[0].name, "Aさん");
//! assert_eq!(restored.non_paying_participants(), 1);
//! ```

use crate::error::{SessionError, ShareLinkError};
use crate::itemized::{Dish, Participant};
use crate::person::{AMOUNT_LIMIT, PaymentItem, Person};
use crate::session::{EvenSplitSession, IdAllocator, ItemizedSession};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Bytes `encodeURIComponent` leaves as they are, besides ASCII alphanumerics.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Payment amount as it travels in a share payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedPayment {
    #[serde(with = "json_number")]
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedPerson {
    pub name: String,
    #[serde(default)]
    pub payments: Vec<SharedPayment>,
}

/// Share payload of the even-split calculator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvenSplitShare {
    pub people: Vec<SharedPerson>,
    #[serde(default)]
    pub non_paying_participants: usize,
}

/// Share payload of the per-dish calculator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemizedShare {
    #[serde(default)]
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub dishes: Vec<Dish>,
}

impl EvenSplitShare {
    pub fn from_session(session: &EvenSplitSession) -> Self {
        let people = session
            .people()
            .iter()
            .map(|person| SharedPerson {
                name: person.name.clone(),
                payments: person
                    .payments
                    .iter()
                    .map(|payment| SharedPayment {
                        amount: payment.amount,
                    })
                    .collect(),
            })
            .collect();
        Self {
            people,
            non_paying_participants: session.non_paying_participants(),
        }
    }

    /// Rebuilds a session, assigning fresh IDs in payload order.
    pub fn into_session(self) -> Result<EvenSplitSession, SessionError> {
        let mut ids = IdAllocator::new();
        let people = self
            .people
            .into_iter()
            .map(|shared| {
                let id = ids.person();
                let payments = shared
                    .payments
                    .into_iter()
                    .map(|p| PaymentItem::new(ids.payment(), p.amount, ""))
                    .collect();
                Person::new(id, shared.name).with_payments(payments)
            })
            .collect();
        EvenSplitSession::with_people(people, self.non_paying_participants)
    }
}

/// Amounts as plain JSON numbers, the way `JSON.stringify` writes them:
/// integers for whole yen, floats otherwise.
mod json_number {
    use super::AMOUNT_LIMIT;
    use rust_decimal::Decimal;
    use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(amount: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        match amount.to_i64() {
            Some(whole) if amount.fract().is_zero() => serializer.serialize_i64(whole),
            _ => serializer.serialize_f64(amount.to_f64().unwrap_or_default()),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        let number = serde_json::Number::deserialize(deserializer)?;
        number
            .as_i64()
            .map(Decimal::from)
            .or_else(|| number.as_f64().and_then(Decimal::from_f64))
            .filter(|amount| amount.abs() <= AMOUNT_LIMIT)
            .ok_or_else(|| D::Error::custom(format!("amount out of range: {number}")))
    }
}

/// Percent-encodes `text` with the `encodeURIComponent` unreserved set.
pub fn percent_encode(text: &str) -> String {
    utf8_percent_encode(text, URI_COMPONENT).to_string()
}

/// Reverses [`percent_encode`]. Accepts either hex case.
///
/// # Errors
///
/// A `%` not followed by two hex digits is rejected, as
/// `decodeURIComponent` does.
pub fn percent_decode(text: &str) -> Result<String, ShareLinkError> {
    let malformed = text.split('%').skip(1).any(|rest| {
        !rest
            .as_bytes()
            .get(..2)
            .is_some_and(|pair| pair.iter().all(u8::is_ascii_hexdigit))
    });
    if malformed {
        return Err(ShareLinkError::InvalidPercentEncoding);
    }
    percent_decode_str(text)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| ShareLinkError::InvalidUtf8)
}

/// Packs any payload into the share format.
pub fn encode_payload<T: Serialize>(payload: &T) -> Result<String, ShareLinkError> {
    let json = serde_json::to_string(payload).map_err(|e| ShareLinkError::InvalidJson(e.to_string()))?;
    Ok(STANDARD.encode(percent_encode(&json)))
}

/// Unpacks a share payload.
///
/// Query-string decoding turns `+` into a space, so spaces are read back as
/// `+` before base64 decoding.
pub fn decode_payload<T: DeserializeOwned>(data: &str) -> Result<T, ShareLinkError> {
    let cleaned: String = data.trim().replace(' ', "+");
    let raw = STANDARD
        .decode(cleaned.as_bytes())
        .map_err(|_| ShareLinkError::InvalidBase64)?;
    let escaped = String::from_utf8(raw).map_err(|_| ShareLinkError::InvalidUtf8)?;
    let json = percent_decode(&escaped)?;
    serde_json::from_str(&json).map_err(|e| ShareLinkError::InvalidJson(e.to_string()))
}

pub fn encode_even_split(session: &EvenSplitSession) -> Result<String, ShareLinkError> {
    encode_payload(&EvenSplitShare::from_session(session))
}

pub fn decode_even_split(data: &str) -> Result<EvenSplitSession, ShareLinkError> {
    Ok(decode_payload::<EvenSplitShare>(data)?.into_session()?)
}

pub fn encode_itemized(session: &ItemizedSession) -> Result<String, ShareLinkError> {
    encode_payload(&ItemizedShare {
        participants: session.participants().to_vec(),
        dishes: session.dishes().to_vec(),
    })
}

/// Restores an itemized session.
///
/// # Errors
///
/// Besides the payload errors, a payload with duplicate participant IDs is
/// reported as [`ShareLinkError::InvalidSession`].
pub fn decode_itemized(data: &str) -> Result<ItemizedSession, ShareLinkError> {
    let share: ItemizedShare = decode_payload(data)?;
    Ok(ItemizedSession::with_parts(share.participants, share.dishes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn percent_encoding_matches_uri_component_rules() {
        assert_eq!(percent_encode("abc-_.!~*'()"), "abc-_.!~*'()");
        assert_eq!(percent_encode("{\"a\":1}"), "%7B%22a%22%3A1%7D");
        assert_eq!(percent_encode("Aさん"), "A%E3%81%95%E3%82%93");
        assert_eq!(percent_encode("a b+c/?#"), "a%20b%2Bc%2F%3F%23");
    }

    #[test]
    fn percent_decoding_accepts_lowercase_hex() {
        assert_eq!(percent_decode("%e3%81%95").unwrap(), "さ");
    }

    #[test]
    fn truncated_escape_is_rejected() {
        assert_eq!(percent_decode("abc%4"), Err(ShareLinkError::InvalidPercentEncoding));
        assert_eq!(percent_decode("%zz"), Err(ShareLinkError::InvalidPercentEncoding));
        assert_eq!(percent_decode("100%"), Err(ShareLinkError::InvalidPercentEncoding));
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        assert_eq!(percent_decode("%FF"), Err(ShareLinkError::InvalidUtf8));
    }

    #[test]
    fn amounts_are_written_as_json_numbers() {
        let whole = SharedPayment { amount: dec!(3000) };
        assert_eq!(serde_json::to_string(&whole).unwrap(), r#"{"amount":3000}"#);

        let fractional = SharedPayment { amount: dec!(1500.5) };
        assert_eq!(serde_json::to_string(&fractional).unwrap(), r#"{"amount":1500.5}"#);
    }

    #[test]
    fn fractional_and_oversized_amounts_on_read() {
        let parsed: SharedPayment = serde_json::from_str(r#"{"amount":1500.5}"#).unwrap();
        assert_eq!(parsed.amount, dec!(1500.5));

        let parsed: SharedPayment = serde_json::from_str(r#"{"amount":-300}"#).unwrap();
        assert_eq!(parsed.amount, dec!(-300));

        assert!(serde_json::from_str::<SharedPayment>(r#"{"amount":1e30}"#).is_err());
        assert!(serde_json::from_str::<SharedPayment>(r#"{"amount":"3000"}"#).is_err());
    }
}
