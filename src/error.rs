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

//! Error types for session edits and share-link decoding.
//!
//! The calculation core itself never fails; these cover the surfaces that
//! take untrusted input.

use crate::base::{DishId, PaymentId, PersonId};
use thiserror::Error;

/// Session editing errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Referenced person is not in the roster
    #[error("person not found: {0}")]
    PersonNotFound(PersonId),

    /// Referenced payment does not belong to the person
    #[error("payment not found: {0}")]
    PaymentNotFound(PaymentId),

    /// Referenced dish does not exist
    #[error("dish not found: {0}")]
    DishNotFound(DishId),

    /// A person with the same ID is already in the roster
    #[error("duplicate person ID: {0}")]
    DuplicatePerson(PersonId),
}

/// Share-link payload decoding errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShareLinkError {
    /// Payload is not valid base64
    #[error("share data is not valid base64")]
    InvalidBase64,

    /// Payload contains a malformed percent escape
    #[error("share data has a malformed percent escape")]
    InvalidPercentEncoding,

    /// Decoded bytes are not UTF-8
    #[error("share data is not valid UTF-8")]
    InvalidUtf8,

    /// Decoded text is not the expected JSON shape
    #[error("share data is not valid JSON: {0}")]
    InvalidJson(String),

    /// Payload parsed but does not describe a valid session
    #[error("share data describes an invalid session: {0}")]
    InvalidSession(#[from] SessionError),
}

#[cfg(test)]
mod tests {
    use super::{SessionError, ShareLinkError};
    use crate::base::{DishId, PaymentId, PersonId};

    #[test]
    fn session_error_display_messages() {
        assert_eq!(
            SessionError::PersonNotFound(PersonId::from("p9")).to_string(),
            "person not found: p9"
        );
        assert_eq!(
            SessionError::PaymentNotFound(PaymentId::from("pay3")).to_string(),
            "payment not found: pay3"
        );
        assert_eq!(
            SessionError::DishNotFound(DishId::from("d1")).to_string(),
            "dish not found: d1"
        );
        assert_eq!(
            SessionError::DuplicatePerson(PersonId::from("p1")).to_string(),
            "duplicate person ID: p1"
        );
    }

    #[test]
    fn share_link_error_display_messages() {
        assert_eq!(
            ShareLinkError::InvalidBase64.to_string(),
            "share data is not valid base64"
        );
        assert_eq!(
            ShareLinkError::InvalidPercentEncoding.to_string(),
            "share data has a malformed percent escape"
        );
        assert_eq!(ShareLinkError::InvalidUtf8.to_string(), "share data is not valid UTF-8");
        assert_eq!(
            ShareLinkError::InvalidJson("eof".into()).to_string(),
            "share data is not valid JSON: eof"
        );
        assert_eq!(
            ShareLinkError::InvalidSession(SessionError::DuplicatePerson(PersonId::from("u1")))
                .to_string(),
            "share data describes an invalid session: duplicate person ID: u1"
        );
    }

    #[test]
    fn session_errors_convert_into_share_link_errors() {
        let error: ShareLinkError = SessionError::DishNotFound(DishId::from("d2")).into();
        assert_eq!(
            error,
            ShareLinkError::InvalidSession(SessionError::DishNotFound(DishId::from("d2")))
        );
    }

    #[test]
    fn errors_are_cloneable() {
        let error = SessionError::PersonNotFound(PersonId::from("p1"));
        let cloned = error.clone();
        assert_eq!(error, cloned);
    }
}
