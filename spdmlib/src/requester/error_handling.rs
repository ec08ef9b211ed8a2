// Copyright (c) 2022 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

use crate::error::SpdmStatus;
use crate::message::{SpdmErrorCode, SpdmErrorResponsePayload};

/// Maps a decoded ERROR response (spec §7) to the `SpdmStatus` a
/// `send_receive_*` call should fail with. `ResponseNotReady`'s
/// RESPOND_IF_READY retry loop is a Non-goal here (see SPEC_FULL.md); it
/// surfaces as `NotReady` for the caller to act on instead.
pub fn map_error_response(error: &SpdmErrorResponsePayload) -> SpdmStatus {
    match error.error_code {
        SpdmErrorCode::SpdmErrorBusy => SpdmStatus::Busy,
        SpdmErrorCode::SpdmErrorResponseNotReady => SpdmStatus::NotReady,
        SpdmErrorCode::SpdmErrorRequestResynch => SpdmStatus::RequestResynch,
        SpdmErrorCode::SpdmErrorVersionMismatch => SpdmStatus::VersionMismatch,
        SpdmErrorCode::SpdmErrorDecryptError => SpdmStatus::DecryptError,
        SpdmErrorCode::SpdmErrorUnsupportedRequest => SpdmStatus::UnsupportedRequest,
        SpdmErrorCode::SpdmErrorUnexpectedRequest => SpdmStatus::UnexpectedRequest,
        _ => SpdmStatus::InvalidRequest,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case0_busy_maps_to_busy_status() {
        let error = SpdmErrorResponsePayload {
            error_code: SpdmErrorCode::SpdmErrorBusy,
            error_data: 0,
            extended_data: None,
        };
        assert_eq!(map_error_response(&error), SpdmStatus::Busy);
    }
}
