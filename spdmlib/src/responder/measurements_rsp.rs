// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

use codec::Writer;

use crate::common::algo::{
    SpdmDmtfMeasurementStructure, SpdmMeasurementBlockStructure, SpdmMeasurementRecordStructure, SpdmSignatureStruct,
};
use crate::common::opaque::SpdmOpaqueStruct;
use crate::common::transcript::TranscriptScope;
use crate::common::SpdmConnectionState;
use crate::config::MAX_SPDM_TRANSPORT_SIZE;
use crate::common::spdm_codec::SpdmCodec;
use crate::error::SpdmResult;
use crate::spdm_result_err;
use crate::message::measurement::{SPDM_MEASUREMENT_REQUEST_ALL, SPDM_MEASUREMENT_REQUEST_TOTAL_NUMBER};
use crate::message::*;
use crate::responder::ResponderContext;

pub fn handle(
    ctx: &mut ResponderContext,
    raw_request: &[u8],
    request: &SpdmGetMeasurementsRequestPayload,
) -> SpdmResult<Vec<u8>> {
    if ctx.common.runtime_info.connection_state < SpdmConnectionState::AfterCertificate {
        return spdm_result_err!(UnexpectedRequest);
    }

    let total_blocks = ctx.common.runtime_info.message_count_in_measurement.max(1);

    if request.measurement_operation == SPDM_MEASUREMENT_REQUEST_TOTAL_NUMBER {
        let response = SpdmMeasurementsResponsePayload {
            number_of_measurement: total_blocks,
            slot_id: request.slot_id,
            measurement_record: SpdmMeasurementRecordStructure::default(),
            nonce: [0u8; 32],
            opaque: SpdmOpaqueStruct::default(),
            signature: SpdmSignatureStruct::default(),
        };
        let encoded = ctx.encode(
            SpdmMessagePayload::SpdmMeasurementsResponse(response),
            SpdmRequestResponseCode::SpdmResponseMeasurements,
        );
        ctx.common.transcript.append(TranscriptScope::L1L2, raw_request)?;
        ctx.common.transcript.append(TranscriptScope::L1L2, &encoded)?;
        return Ok(encoded);
    }

    let blocks_wanted = if request.measurement_operation == SPDM_MEASUREMENT_REQUEST_ALL {
        total_blocks as usize
    } else {
        1
    };
    let mut record = SpdmMeasurementRecordStructure::default();
    for i in 0..blocks_wanted.min(crate::config::MAX_SPDM_MEASUREMENT_BLOCK_COUNT) {
        let index = if request.measurement_operation == SPDM_MEASUREMENT_REQUEST_ALL {
            i as u8 + 1
        } else {
            request.measurement_operation
        };
        record.record[i] = SpdmMeasurementBlockStructure {
            index,
            measurement_specification: ctx.common.negotiate_info.measurement_specification_sel,
            measurement_size: 0,
            measurement: SpdmDmtfMeasurementStructure::default(),
        };
    }
    record.number_of_blocks = blocks_wanted.min(crate::config::MAX_SPDM_MEASUREMENT_BLOCK_COUNT) as u8;

    let mut nonce = [0u8; 32];
    ctx.common.crypto.random_bytes(&mut nonce)?;

    let sign = request.measurement_attributes_signature_requested;
    let sig_size = if sign { ctx.common.negotiate_info.base_asym_sel.get_size() as usize } else { 0 };

    ctx.common.transcript.append(TranscriptScope::L1L2, raw_request)?;

    let message = SpdmMessage {
        header: SpdmMessageHeader {
            version: ctx.common.negotiate_info.spdm_version_sel,
            request_response_code: SpdmRequestResponseCode::SpdmResponseMeasurements,
        },
        payload: SpdmMessagePayload::SpdmMeasurementsResponse(SpdmMeasurementsResponsePayload {
            number_of_measurement: 0,
            slot_id: request.slot_id,
            measurement_record: record,
            nonce,
            opaque: SpdmOpaqueStruct::default(),
            signature: SpdmSignatureStruct::default(),
        }),
    };

    let mut buf = [0u8; MAX_SPDM_TRANSPORT_SIZE];
    let mut writer = Writer::init(&mut buf);
    message.spdm_encode(&mut ctx.common, &mut writer);
    let total_len = writer.used();
    let unsigned_len = total_len - sig_size;

    ctx.common.transcript.append(TranscriptScope::L1L2, &buf[..unsigned_len])?;

    if sign {
        let base_hash_sel = ctx.common.negotiate_info.base_hash_sel;
        let l1l2_hash = ctx.common.transcript.snapshot(TranscriptScope::L1L2, ctx.common.crypto, base_hash_sel)?;
        let private_key = ctx
            .common
            .provision_info
            .my_private_key
            .as_ref()
            .ok_or_else(|| crate::spdm_err!(InternalError))?;
        let signature = ctx.common.crypto.asym_sign(
            ctx.common.negotiate_info.base_asym_sel,
            base_hash_sel,
            private_key,
            l1l2_hash.as_ref(),
        )?;
        buf[unsigned_len..total_len].copy_from_slice(signature.as_ref());
        ctx.common.transcript.append(TranscriptScope::L1L2, &buf[unsigned_len..total_len])?;
    }

    Ok(buf[..total_len].to_vec())
}
