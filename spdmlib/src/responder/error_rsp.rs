// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

use codec::Writer;

use crate::common::spdm_codec::SpdmCodec;
use crate::common::SpdmContext;
use crate::config::MAX_SPDM_TRANSPORT_SIZE;
use crate::error::SpdmResult;
use crate::message::*;

/// Builds a plain (non-extended-data) ERROR response. Used both for the
/// dispatcher's catch-all on an unrecognized/out-of-state request code and
/// by handlers that need to report a specific failure mid-exchange.
pub fn encode(common: &mut SpdmContext, error_code: SpdmErrorCode, error_data: u8) -> SpdmResult<Vec<u8>> {
    let message = SpdmMessage {
        header: SpdmMessageHeader {
            version: common.negotiate_info.spdm_version_sel,
            request_response_code: SpdmRequestResponseCode::SpdmResponseError,
        },
        payload: SpdmMessagePayload::SpdmErrorResponse(SpdmErrorResponsePayload {
            error_code,
            error_data,
            extended_data: None,
        }),
    };
    let mut buf = [0u8; MAX_SPDM_TRANSPORT_SIZE];
    let mut writer = Writer::init(&mut buf);
    message.spdm_encode(common, &mut writer);
    let used = writer.used();
    Ok(buf[..used].to_vec())
}
